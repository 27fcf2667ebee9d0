//! # vigilant-store
//!
//! Local mirror for the Vigilant tracker, backed by SQLite.
//!
//! Every write the application makes lands here first, whether or not a
//! remote store is configured. The crate exposes a synchronous `Database`
//! handle that wraps a `rusqlite::Connection` and provides typed helpers for
//! items, notification logs, alert configs, the shared directory and local
//! accounts.

pub mod accounts;
pub mod configs;
pub mod database;
pub mod directory;
pub mod items;
pub mod logs;
pub mod migrations;
pub mod models;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use models::*;
