//! Local accounts and the active session.
//!
//! Passwords are stored as a keyed BLAKE3 hash over a random per-account
//! salt. This is a convenience gate for a single-device tracker, not an
//! identity provider.

use std::sync::Arc;

use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::{info, warn};
use uuid::Uuid;
use vigilant_shared::constants::{DEMO_DISPLAY_NAME, DEMO_PHONE, DEMO_USER_ID, LOCAL_USER_PREFIX};
use vigilant_shared::{UserId, UserProfile};
use vigilant_store::Account;

use crate::directory::DirectorySync;
use crate::error::{AuthError, ClientError, Result};
use crate::facade::PersistenceFacade;

const PASSWORD_KDF_CONTEXT: &str = "vigilant 2026 local account password v1";
const SALT_LEN: usize = 16;

#[derive(Clone)]
pub struct AuthService {
    facade: Arc<PersistenceFacade>,
    directory: DirectorySync,
}

impl AuthService {
    pub fn new(facade: Arc<PersistenceFacade>) -> Self {
        let directory = DirectorySync::new(facade.clone());
        Self { facade, directory }
    }

    /// Create a local account and sign it in.
    pub async fn register(&self, phone: &str, password: &str, confirm: &str) -> Result<UserProfile> {
        if password != confirm {
            return Err(AuthError::PasswordMismatch.into());
        }
        let phone = phone.trim();
        if phone.is_empty() {
            return Err(AuthError::MissingPhone.into());
        }

        let accounts = self.facade.local();
        if accounts.find_account(phone)?.is_some() {
            return Err(AuthError::DuplicatePhone.into());
        }

        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);

        let account = Account {
            user_id: UserId(format!("{LOCAL_USER_PREFIX}{}", Uuid::new_v4().simple())),
            phone: phone.to_string(),
            display_name: format!("User {}", last_four(phone)),
            password_hash: hash_password(&salt, password).to_hex().to_string(),
            salt: hex::encode(salt),
            created_at: Utc::now(),
        };
        accounts.insert_account(&account)?;
        info!(user = %account.user_id, "account registered");

        self.start_session(profile_of(&account)).await
    }

    pub async fn login(&self, phone: &str, password: &str) -> Result<UserProfile> {
        let account = self
            .facade
            .local()
            .find_account(phone.trim())?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&account, password) {
            return Err(AuthError::InvalidCredentials.into());
        }
        info!(user = %account.user_id, "logged in");

        self.start_session(profile_of(&account)).await
    }

    /// Sign in as the shared guest profile.
    pub async fn demo_login(&self) -> Result<UserProfile> {
        let profile = UserProfile {
            id: UserId::from(DEMO_USER_ID),
            display_name: DEMO_DISPLAY_NAME.to_string(),
            phone: Some(DEMO_PHONE.to_string()),
            email: None,
        };
        info!("guest session started");
        self.start_session(profile).await
    }

    pub fn logout(&self) -> Result<()> {
        self.facade.local().clear_active_session()?;
        info!("logged out");
        Ok(())
    }

    pub fn current(&self) -> Result<Option<UserProfile>> {
        self.facade.local().active_session()
    }

    /// Like [`current`](Self::current) but fails without a session.
    pub fn require(&self) -> Result<UserProfile> {
        self.current()?.ok_or(ClientError::NoSession)
    }

    async fn start_session(&self, profile: UserProfile) -> Result<UserProfile> {
        self.facade.local().set_active_session(&profile)?;
        self.directory.sync(&profile, Utc::now()).await?;
        Ok(profile)
    }
}

fn profile_of(account: &Account) -> UserProfile {
    UserProfile {
        id: account.user_id.clone(),
        display_name: account.display_name.clone(),
        phone: Some(account.phone.clone()),
        email: None,
    }
}

fn hash_password(salt: &[u8], password: &str) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new_derive_key(PASSWORD_KDF_CONTEXT);
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize()
}

fn verify_password(account: &Account, password: &str) -> bool {
    let (Ok(salt), Ok(stored)) = (
        hex::decode(&account.salt),
        blake3::Hash::from_hex(&account.password_hash),
    ) else {
        warn!(user = %account.user_id, "stored credentials are unreadable");
        return false;
    };
    // blake3::Hash equality is constant-time.
    hash_password(&salt, password) == stored
}

/// Last four digits of a phone number, or all of them if there are fewer.
fn last_four(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(char::is_ascii_digit).collect();
    digits[digits.len().saturating_sub(4)..].iter().collect()
}
