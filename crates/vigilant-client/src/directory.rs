//! Directory sync.
//!
//! The directory is keyed by phone number, so a user who changes number gets
//! a second entry rather than an updated one.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;
use vigilant_shared::{DirectoryEntry, UserId, UserProfile};

use crate::error::Result;
use crate::facade::{PersistenceFacade, Sourced};

#[derive(Clone)]
pub struct DirectorySync {
    facade: Arc<PersistenceFacade>,
}

impl DirectorySync {
    pub fn new(facade: Arc<PersistenceFacade>) -> Self {
        Self { facade }
    }

    /// Upsert `profile` and refresh its `last_seen`. Returns `None` (and
    /// writes nothing) when the profile has no phone number; otherwise
    /// whether a new entry was created.
    pub async fn sync(
        &self,
        profile: &UserProfile,
        now: DateTime<Utc>,
    ) -> Result<Option<Sourced<bool>>> {
        let Some(entry) = DirectoryEntry::from_profile(profile, now) else {
            debug!(user = %profile.id, "no phone number, directory sync skipped");
            return Ok(None);
        };

        let outcome = self.facade.upsert_directory_entry(&entry).await?;
        debug!(
            user = %profile.id,
            created = outcome.value,
            source = ?outcome.source,
            "directory entry synced"
        );
        Ok(Some(outcome))
    }

    /// Entry of `user_id` in the current directory. When the user has several
    /// numbers on file the most recently seen one wins.
    pub async fn lookup(&self, user_id: &UserId) -> Result<Sourced<Option<DirectoryEntry>>> {
        self.facade.find_directory_entry(user_id).await
    }
}
