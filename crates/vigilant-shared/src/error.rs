use thiserror::Error;

/// Rejections raised before anything reaches persistence.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Item name must not be empty")]
    EmptyName,

    #[error("Invalid expiry date '{0}': expected YYYY-MM-DD")]
    InvalidExpiryDate(String),

    #[error("Reminder offset must be at least 1 day, got {0}")]
    InvalidReminderDays(u32),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Unknown theme: {0}")]
    UnknownTheme(String),
}
