//! Repository layer.
//!
//! Per-owner data access interfaces. Every call names the owner it acts on;
//! nothing reaches into shared ambient state. [`LocalStore`] implements all
//! of them over the SQLite mirror.
//!
//! [`LocalStore`]: crate::local::LocalStore

use vigilant_shared::{
    AlertConfig, DirectoryEntry, Item, ItemId, NotificationLogEntry, UserId, UserProfile,
};
use vigilant_store::Account;

use crate::error::Result;

pub trait ItemRepository: Send + Sync {
    /// Items of `owner`, most recently added first.
    fn list_items(&self, owner: &UserId) -> Result<Vec<Item>>;

    fn get_item(&self, owner: &UserId, id: &ItemId) -> Result<Option<Item>>;

    /// Insert or replace.
    fn put_item(&self, item: &Item) -> Result<()>;

    fn delete_item(&self, owner: &UserId, id: &ItemId) -> Result<bool>;

    /// Replace the owner's whole collection.
    fn replace_items(&self, owner: &UserId, items: &[Item]) -> Result<()>;
}

pub trait LogRepository: Send + Sync {
    /// Newest first.
    fn list_logs(&self, owner: &UserId) -> Result<Vec<NotificationLogEntry>>;

    /// Prepend `entries` (kept in order) and evict beyond `capacity`.
    fn prepend_logs(
        &self,
        owner: &UserId,
        entries: &[NotificationLogEntry],
        capacity: usize,
    ) -> Result<Vec<NotificationLogEntry>>;
}

pub trait ConfigRepository: Send + Sync {
    fn get_config(&self, owner: &UserId) -> Result<AlertConfig>;

    fn put_config(&self, owner: &UserId, config: &AlertConfig) -> Result<()>;
}

pub trait DirectoryRepository: Send + Sync {
    fn list_directory(&self) -> Result<Vec<DirectoryEntry>>;

    /// Keyed by phone. Returns `true` when a new entry was created.
    fn upsert_entry(&self, entry: &DirectoryEntry) -> Result<bool>;

    fn find_by_user(&self, user_id: &UserId) -> Result<Option<DirectoryEntry>>;
}

pub trait AccountRepository: Send + Sync {
    fn find_account(&self, phone: &str) -> Result<Option<Account>>;

    fn insert_account(&self, account: &Account) -> Result<()>;

    fn active_session(&self) -> Result<Option<UserProfile>>;

    fn set_active_session(&self, profile: &UserProfile) -> Result<()>;

    fn clear_active_session(&self) -> Result<()>;
}

/// Everything the facade needs from the local mirror.
pub trait LocalMirror:
    ItemRepository + LogRepository + ConfigRepository + DirectoryRepository + AccountRepository
{
}

impl<T> LocalMirror for T where
    T: ItemRepository + LogRepository + ConfigRepository + DirectoryRepository + AccountRepository
{
}
