/// Sender id stamped on every simulated SMS
pub const SMS_SENDER_ID: &str = "VIGILANT-AUTH";

/// Maximum notification log entries retained per user
pub const LOG_CAPACITY: usize = 50;

/// Days after expiry during which alerts still fire
pub const GRACE_DAYS: i64 = 2;

/// Reminder offset used when the caller does not pick one
pub const DEFAULT_REMINDER_DAYS: u32 = 3;

/// Items with at most this many days left count as "expiring soon"
pub const SOON_THRESHOLD_DAYS: i64 = 3;

/// Length of the dashboard's "expiring soon" list
pub const EXPIRING_SOON_LIMIT: usize = 6;

/// Expiry dates are stored as calendar dates in this format
pub const EXPIRY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Guest account used by the demo login
pub const DEMO_USER_ID: &str = "demo-user";
pub const DEMO_DISPLAY_NAME: &str = "Guest Operative";
pub const DEMO_PHONE: &str = "+15550009999";

/// Prefix of locally registered user ids
pub const LOCAL_USER_PREFIX: &str = "local-";

/// Default UI language
pub const DEFAULT_LANGUAGE: &str = "English";
