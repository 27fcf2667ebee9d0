//! Item management, search and dashboard statistics.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;
use vigilant_shared::constants::EXPIRING_SOON_LIMIT;
use vigilant_shared::{
    Category, Item, ItemId, ItemStatus, NewItem, NotificationLogEntry, Statistics, UserId,
};

use crate::error::{ClientError, Result};
use crate::facade::{PersistenceFacade, Sourced};

/// Narrows [`InventoryService::list_items`]. The default matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    /// Case-insensitive substring of the item name.
    pub search: Option<String>,
    /// `None` is every category.
    pub category: Option<Category>,
}

impl ItemFilter {
    pub fn matches(&self, item: &Item) -> bool {
        self.category.map_or(true, |c| c == item.category)
            && self
                .search
                .as_deref()
                .map_or(true, |q| contains_ignore_case(&item.name, q))
    }
}

#[derive(Clone)]
pub struct InventoryService {
    facade: Arc<PersistenceFacade>,
}

impl InventoryService {
    pub fn new(facade: Arc<PersistenceFacade>) -> Self {
        Self { facade }
    }

    /// Validate and store a new item. Invalid input is rejected before any
    /// write happens.
    pub async fn add_item(
        &self,
        owner: &UserId,
        new_item: NewItem,
        now: DateTime<Utc>,
    ) -> Result<Sourced<Item>> {
        let item = new_item.into_item(owner.clone(), now)?;
        let source = self.facade.save_item(&item).await?;
        info!(owner = %owner, item = %item.id, name = %item.name, "item added");
        Ok(Sourced { value: item, source })
    }

    /// Items of `owner` matching `filter`, newest first.
    pub async fn list_items(&self, owner: &UserId, filter: &ItemFilter) -> Result<Sourced<Vec<Item>>> {
        let mut items = self.facade.list_items(owner).await?;
        items.value.retain(|item| filter.matches(item));
        Ok(items)
    }

    /// Remove an item and return what was removed.
    pub async fn delete_item(&self, owner: &UserId, id: &ItemId) -> Result<Sourced<Item>> {
        let item = self
            .facade
            .local()
            .get_item(owner, id)?
            .ok_or_else(|| ClientError::NotFound(format!("item {id}")))?;

        let deleted = self.facade.delete_item(owner, id).await?;
        info!(owner = %owner, item = %id, "item deleted");
        Ok(Sourced {
            value: item,
            source: deleted.source,
        })
    }

    pub async fn statistics(&self, owner: &UserId, today: NaiveDate) -> Result<Statistics> {
        let items = self.facade.list_items(owner).await?;
        Ok(compute_statistics(&items.value, today))
    }

    /// The dashboard's short list of items expiring in the next few days.
    pub async fn expiring_soon(&self, owner: &UserId, today: NaiveDate) -> Result<Vec<Item>> {
        let items = self.facade.list_items(owner).await?;
        Ok(select_expiring_soon(items.value, today))
    }

    /// Notification log of `owner`, newest first, optionally narrowed to
    /// entries whose recipient or item name contains `search`.
    pub fn notification_logs(
        &self,
        owner: &UserId,
        search: Option<&str>,
    ) -> Result<Vec<NotificationLogEntry>> {
        let mut logs = self.facade.list_logs(owner)?.value;
        if let Some(q) = search {
            logs.retain(|log| {
                contains_ignore_case(&log.recipient, q) || contains_ignore_case(&log.item_name, q)
            });
        }
        Ok(logs)
    }
}

/// Freshness and category counts. Items with unreadable expiry dates count
/// towards `total`, `invalid` and their category only.
pub fn compute_statistics(items: &[Item], today: NaiveDate) -> Statistics {
    let mut stats = Statistics::default();
    for item in items {
        stats.total += 1;
        *stats.by_category.entry(item.category).or_default() += 1;

        match item.days_remaining(today).map(ItemStatus::from_days) {
            Ok(ItemStatus::Fresh) => stats.fresh += 1,
            Ok(ItemStatus::ExpiringSoon) => stats.soon += 1,
            Ok(ItemStatus::Expired) => stats.expired += 1,
            Err(_) => stats.invalid += 1,
        }
    }
    stats
}

/// Items still in date but in the "soon" bucket, earliest expiry first,
/// at most [`EXPIRING_SOON_LIMIT`] of them.
pub fn select_expiring_soon(items: Vec<Item>, today: NaiveDate) -> Vec<Item> {
    let mut soon: Vec<(NaiveDate, Item)> = items
        .into_iter()
        .filter_map(|item| {
            let expiry = item.expiry().ok()?;
            let days = vigilant_shared::days_remaining(expiry, today);
            (ItemStatus::from_days(days) == ItemStatus::ExpiringSoon).then_some((expiry, item))
        })
        .collect();
    soon.sort_by_key(|(expiry, _)| *expiry);
    soon.into_iter()
        .take(EXPIRING_SOON_LIMIT)
        .map(|(_, item)| item)
        .collect()
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
