//! Store-only records. Domain types live in `vigilant-shared`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vigilant_shared::UserId;

/// A locally registered credential.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub user_id: UserId,
    /// Login identifier. Unique.
    pub phone: String,
    pub display_name: String,
    /// Hex-encoded salted hash of the password.
    pub password_hash: String,
    /// Hex-encoded per-account salt.
    pub salt: String,
    pub created_at: DateTime<Utc>,
}
