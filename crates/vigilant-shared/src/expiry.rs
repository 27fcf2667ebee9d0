//! Expiry arithmetic.
//!
//! Everything here works on calendar dates (`NaiveDate`), never on instants,
//! so a daylight-saving shift cannot turn one calendar day into two.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::{EXPIRY_DATE_FORMAT, GRACE_DAYS, SOON_THRESHOLD_DAYS};
use crate::error::ValidationError;

/// Parse a stored `YYYY-MM-DD` expiry date.
pub fn parse_expiry(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), EXPIRY_DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidExpiryDate(raw.to_string()))
}

/// Whole calendar days from `today` until `expiry`. Negative once expired.
pub fn days_remaining(expiry: NaiveDate, today: NaiveDate) -> i64 {
    expiry.signed_duration_since(today).num_days()
}

/// An item is urgent inside the window `[-GRACE_DAYS, reminder_days]`.
pub fn is_urgent(days_remaining: i64, reminder_days: u32) -> bool {
    days_remaining <= i64::from(reminder_days) && days_remaining >= -GRACE_DAYS
}

/// Freshness bucket used by the dashboard statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemStatus {
    Fresh,
    #[serde(rename = "Expiring Soon")]
    ExpiringSoon,
    Expired,
}

impl ItemStatus {
    pub fn from_days(days_remaining: i64) -> Self {
        if days_remaining < 0 {
            Self::Expired
        } else if days_remaining <= SOON_THRESHOLD_DAYS {
            Self::ExpiringSoon
        } else {
            Self::Fresh
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fresh => "Fresh",
            Self::ExpiringSoon => "Expiring Soon",
            Self::Expired => "Expired",
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_expiry(s).unwrap()
    }

    #[test]
    fn test_days_remaining() {
        let today = date("2026-03-10");
        assert_eq!(days_remaining(date("2026-03-10"), today), 0);
        assert_eq!(days_remaining(date("2026-03-20"), today), 10);
        assert_eq!(days_remaining(date("2026-03-05"), today), -5);
        // across a month boundary
        assert_eq!(days_remaining(date("2026-04-01"), today), 22);
    }

    #[test]
    fn test_urgency_window_bounds() {
        let reminder = 3;
        for d in -10..=10 {
            let expected = (-2..=3).contains(&d);
            assert_eq!(is_urgent(d, reminder), expected, "days_remaining = {d}");
        }
    }

    #[test]
    fn test_urgency_with_large_offset() {
        assert!(is_urgent(30, 30));
        assert!(!is_urgent(31, 30));
        assert!(!is_urgent(-3, 30));
    }

    #[test]
    fn test_parse_expiry_rejects_garbage() {
        assert!(parse_expiry("2026-13-01").is_err());
        assert!(parse_expiry("tomorrow").is_err());
        assert!(parse_expiry("").is_err());
        assert_eq!(
            parse_expiry("31/12/2026"),
            Err(ValidationError::InvalidExpiryDate("31/12/2026".into()))
        );
    }

    #[test]
    fn test_status_buckets() {
        assert_eq!(ItemStatus::from_days(-1), ItemStatus::Expired);
        assert_eq!(ItemStatus::from_days(0), ItemStatus::ExpiringSoon);
        assert_eq!(ItemStatus::from_days(3), ItemStatus::ExpiringSoon);
        assert_eq!(ItemStatus::from_days(4), ItemStatus::Fresh);
    }
}
