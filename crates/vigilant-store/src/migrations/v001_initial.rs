//! v001 -- Initial schema creation.
//!
//! Creates the six tables: `items`, `notification_logs`, `alert_configs`,
//! `directory`, `accounts` and `session`.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Tracked items
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS items (
    id               TEXT PRIMARY KEY NOT NULL,
    owner            TEXT NOT NULL,               -- user id
    name             TEXT NOT NULL,
    category         TEXT NOT NULL,
    expiry_date      TEXT NOT NULL,               -- YYYY-MM-DD, not validated here
    reminder_days    INTEGER NOT NULL,
    added_at         TEXT NOT NULL,               -- RFC-3339
    last_notified_at TEXT                         -- RFC-3339, nullable
);

CREATE INDEX IF NOT EXISTS idx_items_owner_added
    ON items(owner, added_at DESC);

-- ----------------------------------------------------------------
-- Notification log (capped per owner by the writer)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS notification_logs (
    seq           INTEGER PRIMARY KEY AUTOINCREMENT,
    id            TEXT NOT NULL UNIQUE,
    owner         TEXT NOT NULL,
    item_id       TEXT NOT NULL,
    item_name     TEXT NOT NULL,
    recipient     TEXT NOT NULL,
    dispatched_at TEXT NOT NULL,
    content       TEXT NOT NULL,
    status        TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_logs_owner_seq
    ON notification_logs(owner, seq DESC);

-- ----------------------------------------------------------------
-- Per-user alert configuration (JSON document)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS alert_configs (
    owner TEXT PRIMARY KEY NOT NULL,
    json  TEXT NOT NULL
);

-- ----------------------------------------------------------------
-- Shared directory, keyed by phone number
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS directory (
    phone        TEXT PRIMARY KEY NOT NULL,
    user_id      TEXT NOT NULL,
    display_name TEXT NOT NULL,
    email        TEXT,
    last_seen    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_directory_user ON directory(user_id);

-- ----------------------------------------------------------------
-- Local accounts and the active session
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS accounts (
    user_id       TEXT PRIMARY KEY NOT NULL,
    phone         TEXT NOT NULL UNIQUE,
    display_name  TEXT NOT NULL,
    password_hash TEXT NOT NULL,              -- hex BLAKE3
    salt          TEXT NOT NULL,              -- hex
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS session (
    id           INTEGER PRIMARY KEY CHECK (id = 1),
    profile_json TEXT NOT NULL
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
