//! SQLite-backed implementation of every repository trait.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use vigilant_shared::{
    AlertConfig, DirectoryEntry, Item, ItemId, NotificationLogEntry, UserId, UserProfile,
};
use vigilant_store::{Account, Database, StoreError};

use crate::error::{ClientError, Result};
use crate::repository::{
    AccountRepository, ConfigRepository, DirectoryRepository, ItemRepository, LogRepository,
};

/// The local mirror. Owns the connection; every call takes the lock for the
/// duration of one synchronous query and never across an `.await`.
pub struct LocalStore {
    db: Mutex<Database>,
}

impl LocalStore {
    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    /// Open (or create) the mirror at `path`.
    pub fn open_at(path: &Path) -> Result<Self> {
        Ok(Self::new(Database::open_at(path)?))
    }

    /// Open the platform default database.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(Database::new()?))
    }

    fn db(&self) -> Result<MutexGuard<'_, Database>> {
        self.db
            .lock()
            .map_err(|e| ClientError::LockPoisoned(e.to_string()))
    }
}

impl ItemRepository for LocalStore {
    fn list_items(&self, owner: &UserId) -> Result<Vec<Item>> {
        Ok(self.db()?.list_items(owner)?)
    }

    fn get_item(&self, owner: &UserId, id: &ItemId) -> Result<Option<Item>> {
        match self.db()?.get_item(owner, id) {
            Ok(item) => Ok(Some(item)),
            Err(StoreError::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put_item(&self, item: &Item) -> Result<()> {
        Ok(self.db()?.upsert_item(item)?)
    }

    fn delete_item(&self, owner: &UserId, id: &ItemId) -> Result<bool> {
        Ok(self.db()?.delete_item(owner, id)?)
    }

    fn replace_items(&self, owner: &UserId, items: &[Item]) -> Result<()> {
        Ok(self.db()?.replace_items(owner, items)?)
    }
}

impl LogRepository for LocalStore {
    fn list_logs(&self, owner: &UserId) -> Result<Vec<NotificationLogEntry>> {
        Ok(self.db()?.list_logs(owner)?)
    }

    fn prepend_logs(
        &self,
        owner: &UserId,
        entries: &[NotificationLogEntry],
        capacity: usize,
    ) -> Result<Vec<NotificationLogEntry>> {
        Ok(self.db()?.prepend_logs(owner, entries, capacity)?)
    }
}

impl ConfigRepository for LocalStore {
    fn get_config(&self, owner: &UserId) -> Result<AlertConfig> {
        Ok(self.db()?.get_config(owner)?)
    }

    fn put_config(&self, owner: &UserId, config: &AlertConfig) -> Result<()> {
        Ok(self.db()?.put_config(owner, config)?)
    }
}

impl DirectoryRepository for LocalStore {
    fn list_directory(&self) -> Result<Vec<DirectoryEntry>> {
        Ok(self.db()?.list_directory()?)
    }

    fn upsert_entry(&self, entry: &DirectoryEntry) -> Result<bool> {
        Ok(self.db()?.upsert_directory_entry(entry)?)
    }

    fn find_by_user(&self, user_id: &UserId) -> Result<Option<DirectoryEntry>> {
        Ok(self.db()?.find_directory_entry(user_id)?)
    }
}

impl AccountRepository for LocalStore {
    fn find_account(&self, phone: &str) -> Result<Option<Account>> {
        Ok(self.db()?.find_account_by_phone(phone)?)
    }

    fn insert_account(&self, account: &Account) -> Result<()> {
        Ok(self.db()?.insert_account(account)?)
    }

    fn active_session(&self) -> Result<Option<UserProfile>> {
        Ok(self.db()?.get_session()?)
    }

    fn set_active_session(&self, profile: &UserProfile) -> Result<()> {
        Ok(self.db()?.set_session(profile)?)
    }

    fn clear_active_session(&self) -> Result<()> {
        Ok(self.db()?.clear_session()?)
    }
}
