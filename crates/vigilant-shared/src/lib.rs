//! # vigilant-shared
//!
//! Domain types shared by every Vigilant crate: tracked items, user and
//! directory profiles, notification log records, per-user alert settings and
//! the expiry arithmetic the sweep is built on.

pub mod constants;
pub mod error;
pub mod expiry;
pub mod types;

pub use error::ValidationError;
pub use expiry::{days_remaining, is_urgent, parse_expiry, ItemStatus};
pub use types::*;
