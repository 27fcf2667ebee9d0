//! Persistence facade.
//!
//! One item / directory / log / config API whether or not a remote store is
//! configured or reachable. Writes always land in the local mirror first and
//! go to the remote best-effort. Reads prefer the remote. Remote failures are
//! logged and never returned; instead every result carries the
//! [`DataSource`] that actually served it.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};
use vigilant_shared::constants::LOG_CAPACITY;
use vigilant_shared::{AlertConfig, DirectoryEntry, Item, ItemId, NotificationLogEntry, UserId};

use crate::error::Result;
use crate::remote::RemoteStore;
use crate::repository::LocalMirror;

/// Which backend served a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DataSource {
    /// The remote store answered (writes: it accepted the write too).
    RemoteSuccess,
    /// A remote is configured but failed; the local mirror was used.
    RemoteUnavailableFallbackUsed,
    /// No remote is configured, or the data only ever lives locally.
    LocalOnly,
}

/// A value together with the backend that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sourced<T> {
    pub value: T,
    pub source: DataSource,
}

impl<T> Sourced<T> {
    fn new(value: T, source: DataSource) -> Self {
        Self { value, source }
    }

    fn local(value: T) -> Self {
        Self::new(value, DataSource::LocalOnly)
    }
}

pub struct PersistenceFacade {
    local: Arc<dyn LocalMirror>,
    remote: Option<Arc<dyn RemoteStore>>,
}

impl PersistenceFacade {
    pub fn new(local: Arc<dyn LocalMirror>, remote: Option<Arc<dyn RemoteStore>>) -> Self {
        Self { local, remote }
    }

    pub fn local_only(local: Arc<dyn LocalMirror>) -> Self {
        Self::new(local, None)
    }

    /// Direct access to the local mirror, for data that never leaves it.
    pub fn local(&self) -> &dyn LocalMirror {
        self.local.as_ref()
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    // -----------------------------------------------------------------------
    // Items
    // -----------------------------------------------------------------------

    /// Items of `owner`. A successful remote read refreshes the mirror, but
    /// a local `last_notified_at` newer than the remote one is kept: a stamp
    /// whose remote write failed must still suppress same-day alerts.
    pub async fn list_items(&self, owner: &UserId) -> Result<Sourced<Vec<Item>>> {
        let Some(remote) = &self.remote else {
            return Ok(Sourced::local(self.local.list_items(owner)?));
        };

        match remote.list_items(owner).await {
            Ok(mut items) => {
                keep_latest_stamps(&mut items, self.local.list_items(owner)?);
                self.local.replace_items(owner, &items)?;
                Ok(Sourced::new(items, DataSource::RemoteSuccess))
            }
            Err(e) => {
                warn!(owner = %owner, error = %e, "remote item read failed, using local mirror");
                Ok(Sourced::new(
                    self.local.list_items(owner)?,
                    DataSource::RemoteUnavailableFallbackUsed,
                ))
            }
        }
    }

    pub async fn save_item(&self, item: &Item) -> Result<DataSource> {
        self.local.put_item(item)?;

        let Some(remote) = &self.remote else {
            return Ok(DataSource::LocalOnly);
        };
        match remote.put_item(item).await {
            Ok(()) => Ok(DataSource::RemoteSuccess),
            Err(e) => {
                warn!(item = %item.id, error = %e, "remote item write failed, kept locally");
                Ok(DataSource::RemoteUnavailableFallbackUsed)
            }
        }
    }

    /// `value` is whether the item existed in the local mirror.
    pub async fn delete_item(&self, owner: &UserId, id: &ItemId) -> Result<Sourced<bool>> {
        let existed = self.local.delete_item(owner, id)?;

        let Some(remote) = &self.remote else {
            return Ok(Sourced::local(existed));
        };
        match remote.delete_item(id).await {
            Ok(()) => Ok(Sourced::new(existed, DataSource::RemoteSuccess)),
            Err(e) => {
                warn!(item = %id, error = %e, "remote item delete failed");
                Ok(Sourced::new(existed, DataSource::RemoteUnavailableFallbackUsed))
            }
        }
    }

    // -----------------------------------------------------------------------
    // Directory
    // -----------------------------------------------------------------------

    /// The shared directory. An empty remote directory also falls back to
    /// the local copy.
    pub async fn list_directory(&self) -> Result<Sourced<Vec<DirectoryEntry>>> {
        let Some(remote) = &self.remote else {
            return Ok(Sourced::local(self.local.list_directory()?));
        };

        match remote.list_users().await {
            Ok(users) if !users.is_empty() => Ok(Sourced::new(users, DataSource::RemoteSuccess)),
            Ok(_) => {
                debug!("remote directory empty, using local mirror");
                Ok(Sourced::new(
                    self.local.list_directory()?,
                    DataSource::RemoteUnavailableFallbackUsed,
                ))
            }
            Err(e) => {
                warn!(error = %e, "remote directory read failed, using local mirror");
                Ok(Sourced::new(
                    self.local.list_directory()?,
                    DataSource::RemoteUnavailableFallbackUsed,
                ))
            }
        }
    }

    /// Most recently seen directory entry of `user_id`. Same fallback rules
    /// as [`list_directory`](Self::list_directory).
    pub async fn find_directory_entry(
        &self,
        user_id: &UserId,
    ) -> Result<Sourced<Option<DirectoryEntry>>> {
        let Some(remote) = &self.remote else {
            return Ok(Sourced::local(self.local.find_by_user(user_id)?));
        };

        match remote.list_users().await {
            Ok(users) if !users.is_empty() => {
                let entry = users
                    .into_iter()
                    .filter(|e| &e.user_id == user_id)
                    .max_by_key(|e| e.last_seen);
                Ok(Sourced::new(entry, DataSource::RemoteSuccess))
            }
            Ok(_) => {
                debug!("remote directory empty, using local mirror");
                Ok(Sourced::new(
                    self.local.find_by_user(user_id)?,
                    DataSource::RemoteUnavailableFallbackUsed,
                ))
            }
            Err(e) => {
                warn!(error = %e, "remote directory read failed, using local mirror");
                Ok(Sourced::new(
                    self.local.find_by_user(user_id)?,
                    DataSource::RemoteUnavailableFallbackUsed,
                ))
            }
        }
    }

    /// `value` is whether a new local entry was created.
    pub async fn upsert_directory_entry(&self, entry: &DirectoryEntry) -> Result<Sourced<bool>> {
        let created = self.local.upsert_entry(entry)?;

        let Some(remote) = &self.remote else {
            return Ok(Sourced::local(created));
        };
        match remote.upsert_user(entry).await {
            Ok(()) => Ok(Sourced::new(created, DataSource::RemoteSuccess)),
            Err(e) => {
                warn!(user = %entry.user_id, error = %e, "remote directory write failed");
                Ok(Sourced::new(created, DataSource::RemoteUnavailableFallbackUsed))
            }
        }
    }

    // -----------------------------------------------------------------------
    // Logs & config (local only)
    // -----------------------------------------------------------------------

    pub fn list_logs(&self, owner: &UserId) -> Result<Sourced<Vec<NotificationLogEntry>>> {
        Ok(Sourced::local(self.local.list_logs(owner)?))
    }

    /// Prepend and cap at [`LOG_CAPACITY`].
    pub fn prepend_logs(
        &self,
        owner: &UserId,
        entries: &[NotificationLogEntry],
    ) -> Result<Sourced<Vec<NotificationLogEntry>>> {
        Ok(Sourced::local(
            self.local.prepend_logs(owner, entries, LOG_CAPACITY)?,
        ))
    }

    pub fn get_config(&self, owner: &UserId) -> Result<Sourced<AlertConfig>> {
        Ok(Sourced::local(self.local.get_config(owner)?))
    }

    /// Full overwrite, no merge.
    pub fn save_config(&self, owner: &UserId, config: &AlertConfig) -> Result<DataSource> {
        self.local.put_config(owner, config)?;
        Ok(DataSource::LocalOnly)
    }

    // -----------------------------------------------------------------------
    // Connectivity
    // -----------------------------------------------------------------------

    /// `false` when no remote is configured or it does not answer.
    pub async fn probe(&self) -> bool {
        let Some(remote) = &self.remote else {
            return false;
        };
        match remote.probe().await {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "remote probe failed");
                false
            }
        }
    }
}

/// Raise each remote item's `last_notified_at` to the mirror's copy when the
/// mirror's is later. `None` orders before any stamp.
fn keep_latest_stamps(remote: &mut [Item], local: Vec<Item>) {
    let stamps: HashMap<ItemId, _> = local
        .into_iter()
        .map(|item| (item.id, item.last_notified_at))
        .collect();
    for item in remote.iter_mut() {
        if let Some(local_stamp) = stamps.get(&item.id) {
            item.last_notified_at = item.last_notified_at.max(*local_stamp);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use vigilant_shared::Category;

    use super::*;
    use crate::error::RemoteError;
    use crate::local::LocalStore;

    /// Remote that refuses every call.
    pub(crate) struct DownRemote;

    fn down() -> RemoteError {
        RemoteError::Status {
            status: 503,
            url: "http://remote.test".into(),
        }
    }

    #[async_trait]
    impl RemoteStore for DownRemote {
        async fn list_items(&self, _owner: &UserId) -> std::result::Result<Vec<Item>, RemoteError> {
            Err(down())
        }
        async fn put_item(&self, _item: &Item) -> std::result::Result<(), RemoteError> {
            Err(down())
        }
        async fn delete_item(&self, _id: &ItemId) -> std::result::Result<(), RemoteError> {
            Err(down())
        }
        async fn list_users(&self) -> std::result::Result<Vec<DirectoryEntry>, RemoteError> {
            Err(down())
        }
        async fn upsert_user(&self, _entry: &DirectoryEntry) -> std::result::Result<(), RemoteError> {
            Err(down())
        }
        async fn probe(&self) -> std::result::Result<(), RemoteError> {
            Err(down())
        }
    }

    /// In-memory remote that accepts everything.
    #[derive(Default)]
    pub(crate) struct MemoryRemote {
        pub items: Mutex<Vec<Item>>,
        pub users: Mutex<Vec<DirectoryEntry>>,
    }

    #[async_trait]
    impl RemoteStore for MemoryRemote {
        async fn list_items(&self, owner: &UserId) -> std::result::Result<Vec<Item>, RemoteError> {
            let items = self.items.lock().unwrap();
            Ok(items.iter().filter(|i| &i.owner == owner).cloned().collect())
        }
        async fn put_item(&self, item: &Item) -> std::result::Result<(), RemoteError> {
            let mut items = self.items.lock().unwrap();
            items.retain(|i| i.id != item.id);
            items.push(item.clone());
            Ok(())
        }
        async fn delete_item(&self, id: &ItemId) -> std::result::Result<(), RemoteError> {
            self.items.lock().unwrap().retain(|i| &i.id != id);
            Ok(())
        }
        async fn list_users(&self) -> std::result::Result<Vec<DirectoryEntry>, RemoteError> {
            Ok(self.users.lock().unwrap().clone())
        }
        async fn upsert_user(&self, entry: &DirectoryEntry) -> std::result::Result<(), RemoteError> {
            let mut users = self.users.lock().unwrap();
            users.retain(|u| u.user_id != entry.user_id);
            users.push(entry.clone());
            Ok(())
        }
        async fn probe(&self) -> std::result::Result<(), RemoteError> {
            Ok(())
        }
    }

    /// Serves reads from a [`MemoryRemote`] but rejects every write.
    #[derive(Default)]
    pub(crate) struct ReadOnlyRemote(pub MemoryRemote);

    #[async_trait]
    impl RemoteStore for ReadOnlyRemote {
        async fn list_items(&self, owner: &UserId) -> std::result::Result<Vec<Item>, RemoteError> {
            self.0.list_items(owner).await
        }
        async fn put_item(&self, _item: &Item) -> std::result::Result<(), RemoteError> {
            Err(down())
        }
        async fn delete_item(&self, _id: &ItemId) -> std::result::Result<(), RemoteError> {
            Err(down())
        }
        async fn list_users(&self) -> std::result::Result<Vec<DirectoryEntry>, RemoteError> {
            self.0.list_users().await
        }
        async fn upsert_user(&self, _entry: &DirectoryEntry) -> std::result::Result<(), RemoteError> {
            Err(down())
        }
        async fn probe(&self) -> std::result::Result<(), RemoteError> {
            Ok(())
        }
    }

    pub(crate) fn local_store() -> (Arc<LocalStore>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open_at(&dir.path().join("facade.db")).unwrap();
        (Arc::new(store), dir)
    }

    fn item(owner: &str, name: &str) -> Item {
        Item {
            id: ItemId::new(),
            name: name.into(),
            category: Category::Cosmetics,
            expiry_date: "2026-07-01".into(),
            reminder_days: 3,
            added_at: Utc::now(),
            owner: UserId::from(owner),
            last_notified_at: None,
        }
    }

    #[tokio::test]
    async fn test_local_only_paths() {
        let (local, _dir) = local_store();
        let facade = PersistenceFacade::local_only(local);
        let owner = UserId::from("alice");

        assert_eq!(facade.save_item(&item("alice", "Lipstick")).await.unwrap(), DataSource::LocalOnly);
        let listed = facade.list_items(&owner).await.unwrap();
        assert_eq!(listed.source, DataSource::LocalOnly);
        assert_eq!(listed.value.len(), 1);
        assert!(!facade.probe().await);
    }

    #[tokio::test]
    async fn test_remote_down_falls_back_silently() {
        let (local, _dir) = local_store();
        let facade = PersistenceFacade::new(local, Some(Arc::new(DownRemote)));
        let owner = UserId::from("alice");
        let it = item("alice", "Lipstick");

        let source = facade.save_item(&it).await.unwrap();
        assert_eq!(source, DataSource::RemoteUnavailableFallbackUsed);

        let listed = facade.list_items(&owner).await.unwrap();
        assert_eq!(listed.source, DataSource::RemoteUnavailableFallbackUsed);
        assert_eq!(listed.value, vec![it.clone()]);

        let deleted = facade.delete_item(&owner, &it.id).await.unwrap();
        assert!(deleted.value);
        assert_eq!(deleted.source, DataSource::RemoteUnavailableFallbackUsed);
        assert!(!facade.probe().await);
    }

    #[tokio::test]
    async fn test_remote_read_refreshes_mirror() {
        let (local, _dir) = local_store();
        let remote = Arc::new(MemoryRemote::default());
        let facade = PersistenceFacade::new(local.clone(), Some(remote.clone()));
        let owner = UserId::from("alice");

        // Written elsewhere, only the remote knows about it.
        remote.items.lock().unwrap().push(item("alice", "Perfume"));

        let listed = facade.list_items(&owner).await.unwrap();
        assert_eq!(listed.source, DataSource::RemoteSuccess);
        assert_eq!(listed.value.len(), 1);

        use crate::repository::ItemRepository;
        assert_eq!(local.list_items(&owner).unwrap(), listed.value);
        assert!(facade.probe().await);
    }

    #[tokio::test]
    async fn test_empty_remote_directory_uses_local() {
        let (local, _dir) = local_store();
        let remote = Arc::new(MemoryRemote::default());
        let facade = PersistenceFacade::new(local.clone(), Some(remote));

        let entry = DirectoryEntry {
            user_id: UserId::from("alice"),
            display_name: "Alice".into(),
            phone: "+1555".into(),
            email: None,
            last_seen: Utc::now(),
        };
        use crate::repository::DirectoryRepository;
        local.upsert_entry(&entry).unwrap();

        let dir = facade.list_directory().await.unwrap();
        assert_eq!(dir.source, DataSource::RemoteUnavailableFallbackUsed);
        assert_eq!(dir.value, vec![entry.clone()]);

        let found = facade.find_directory_entry(&entry.user_id).await.unwrap();
        assert_eq!(found.source, DataSource::RemoteUnavailableFallbackUsed);
        assert_eq!(found.value, Some(entry));
    }

    #[tokio::test]
    async fn test_find_directory_entry_prefers_latest_remote() {
        let (local, _dir) = local_store();
        let remote = Arc::new(MemoryRemote::default());
        let facade = PersistenceFacade::new(local, Some(remote.clone()));

        let old = DirectoryEntry {
            user_id: UserId::from("alice"),
            display_name: "Alice".into(),
            phone: "+1555".into(),
            email: None,
            last_seen: Utc::now() - chrono::Duration::days(3),
        };
        let new = DirectoryEntry {
            phone: "+1666".into(),
            last_seen: Utc::now(),
            ..old.clone()
        };
        // MemoryRemote merges by user id, so seed both rows directly.
        remote.users.lock().unwrap().extend([new.clone(), old]);

        let found = facade.find_directory_entry(&UserId::from("alice")).await.unwrap();
        assert_eq!(found.source, DataSource::RemoteSuccess);
        assert_eq!(found.value, Some(new));

        let missing = facade.find_directory_entry(&UserId::from("bob")).await.unwrap();
        assert_eq!(missing.value, None);
    }

    #[tokio::test]
    async fn test_refresh_keeps_newer_local_stamp() {
        let (local, _dir) = local_store();
        let remote = Arc::new(ReadOnlyRemote::default());
        let facade = PersistenceFacade::new(local.clone(), Some(remote.clone()));
        let owner = UserId::from("alice");

        let it = item("alice", "Perfume");
        remote.0.items.lock().unwrap().push(it.clone());

        let mut stamped = it.clone();
        stamped.last_notified_at = Some(Utc::now());
        let source = facade.save_item(&stamped).await.unwrap();
        assert_eq!(source, DataSource::RemoteUnavailableFallbackUsed);

        let listed = facade.list_items(&owner).await.unwrap();
        assert_eq!(listed.source, DataSource::RemoteSuccess);
        assert_eq!(listed.value, vec![stamped.clone()]);

        use crate::repository::ItemRepository;
        assert_eq!(local.get_item(&owner, &it.id).unwrap(), Some(stamped));
    }

    #[test]
    fn test_keep_latest_stamps() {
        let earlier = Utc::now() - chrono::Duration::hours(2);
        let later = Utc::now();

        let mut a = item("alice", "A");
        a.last_notified_at = Some(later);
        let mut b = item("alice", "B");
        b.last_notified_at = Some(earlier);
        let c = item("alice", "C");

        let mut local_a = a.clone();
        local_a.last_notified_at = Some(earlier);
        let mut local_b = b.clone();
        local_b.last_notified_at = Some(later);
        let local_c = c.clone();

        let mut remote = vec![a, b, c];
        keep_latest_stamps(&mut remote, vec![local_a, local_b, local_c]);

        assert_eq!(remote[0].last_notified_at, Some(later));
        assert_eq!(remote[1].last_notified_at, Some(later));
        assert_eq!(remote[2].last_notified_at, None);
    }
}
