use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::DEFAULT_LANGUAGE;
use crate::error::ValidationError;
use crate::expiry::{days_remaining, parse_expiry};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Food,
    Medicine,
    Cosmetics,
    Household,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Self::Food,
        Self::Medicine,
        Self::Cosmetics,
        Self::Household,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Medicine => "Medicine",
            Self::Cosmetics => "Cosmetics",
            Self::Household => "Household",
            Self::Other => "Other",
        }
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownCategory(s.to_string()))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked item.
///
/// `expiry_date` is kept as the stored `YYYY-MM-DD` text: records coming back
/// from the remote store are not guaranteed to be well formed, and the sweep
/// has to be able to see (and skip) the bad ones.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub category: Category,
    pub expiry_date: String,
    pub reminder_days: u32,
    pub added_at: DateTime<Utc>,
    #[serde(rename = "userId")]
    pub owner: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_notified_at: Option<DateTime<Utc>>,
}

impl Item {
    pub fn expiry(&self) -> Result<NaiveDate, ValidationError> {
        parse_expiry(&self.expiry_date)
    }

    pub fn days_remaining(&self, today: NaiveDate) -> Result<i64, ValidationError> {
        Ok(days_remaining(self.expiry()?, today))
    }
}

/// User-submitted fields of a new item, before an id is assigned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub name: String,
    pub category: Category,
    pub expiry_date: String,
    pub reminder_days: u32,
}

impl NewItem {
    /// Validate and turn into a storable [`Item`]. Nothing is saved on error.
    pub fn into_item(self, owner: UserId, now: DateTime<Utc>) -> Result<Item, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let expiry = parse_expiry(&self.expiry_date)?;
        if self.reminder_days < 1 {
            return Err(ValidationError::InvalidReminderDays(self.reminder_days));
        }

        Ok(Item {
            id: ItemId::new(),
            name: name.to_string(),
            category: self.category,
            expiry_date: expiry.format(crate::constants::EXPIRY_DATE_FORMAT).to_string(),
            reminder_days: self.reminder_days,
            added_at: now,
            owner,
            last_notified_at: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Users & directory
// ---------------------------------------------------------------------------

/// The signed-in user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "uid")]
    pub id: UserId,
    pub display_name: String,
    #[serde(default, rename = "phoneNumber")]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A contactable profile in the shared directory. Keyed by phone number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    #[serde(rename = "uid")]
    pub user_id: UserId,
    pub display_name: String,
    #[serde(rename = "phoneNumber")]
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    pub last_seen: DateTime<Utc>,
}

impl DirectoryEntry {
    /// `None` when the profile has no (non-blank) phone number.
    pub fn from_profile(profile: &UserProfile, now: DateTime<Utc>) -> Option<Self> {
        let phone = profile.phone.as_deref().map(str::trim).filter(|p| !p.is_empty())?;
        Some(Self {
            user_id: profile.id.clone(),
            display_name: profile.display_name.clone(),
            phone: phone.to_string(),
            email: profile.email.clone(),
            last_seen: now,
        })
    }
}

// ---------------------------------------------------------------------------
// Notification log
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DeliveryStatus {
    Delivered,
    Ready,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delivered => "Delivered",
            Self::Ready => "Ready",
            Self::Failed => "Failed",
        }
    }
}

impl FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Delivered" => Ok(Self::Delivered),
            "Ready" => Ok(Self::Ready),
            "Failed" => Ok(Self::Failed),
            other => Err(format!("unknown delivery status: {other}")),
        }
    }
}

/// One dispatched alert. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationLogEntry {
    pub id: String,
    #[serde(rename = "productId")]
    pub item_id: ItemId,
    #[serde(rename = "productName")]
    pub item_name: String,
    pub recipient: String,
    #[serde(rename = "timestamp")]
    pub dispatched_at: DateTime<Utc>,
    pub content: String,
    pub status: DeliveryStatus,
}

/// Simulated SMS handed to the caller's alert sink. Never leaves the process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SmsEvent {
    pub body: String,
    pub from: String,
    pub to: String,
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Per-user settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    System,
}

impl FromStr for Theme {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" => Ok(Self::System),
            _ => Err(ValidationError::UnknownTheme(s.to_string())),
        }
    }
}

/// Alert and display preferences. Missing keys deserialize to the defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct AlertConfig {
    #[serde(rename = "enabled")]
    pub notifications_enabled: bool,
    pub sms_enabled: bool,
    pub theme: Theme,
    pub language: String,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            notifications_enabled: true,
            sms_enabled: true,
            theme: Theme::Light,
            language: DEFAULT_LANGUAGE.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Statistics {
    pub total: usize,
    pub fresh: usize,
    pub soon: usize,
    pub expired: usize,
    /// Items whose stored expiry date could not be parsed.
    pub invalid: usize,
    pub by_category: BTreeMap<Category, usize>,
}
