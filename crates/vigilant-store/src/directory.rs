use rusqlite::{params, OptionalExtension};
use vigilant_shared::{DirectoryEntry, UserId};

use crate::database::{parse_timestamp, Database};
use crate::error::Result;

impl Database {
    /// Insert the entry, or update the entry already holding its phone number
    /// in place. Returns `true` when a new row was created.
    pub fn upsert_directory_entry(&self, entry: &DirectoryEntry) -> Result<bool> {
        let tx = self.conn().unchecked_transaction()?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM directory WHERE phone = ?1)",
            params![entry.phone],
            |row| row.get(0),
        )?;

        tx.execute(
            "INSERT INTO directory (phone, user_id, display_name, email, last_seen)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(phone) DO UPDATE SET
                 user_id      = excluded.user_id,
                 display_name = excluded.display_name,
                 email        = excluded.email,
                 last_seen    = excluded.last_seen",
            params![
                entry.phone,
                entry.user_id.as_str(),
                entry.display_name,
                entry.email,
                entry.last_seen.to_rfc3339(),
            ],
        )?;
        tx.commit()?;

        Ok(!exists)
    }

    /// The whole directory in insertion order.
    pub fn list_directory(&self) -> Result<Vec<DirectoryEntry>> {
        let mut stmt = self.conn().prepare(
            "SELECT phone, user_id, display_name, email, last_seen
             FROM directory ORDER BY rowid ASC",
        )?;
        let rows = stmt.query_map([], row_to_entry)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Most recently seen entry belonging to `user_id`.
    pub fn find_directory_entry(&self, user_id: &UserId) -> Result<Option<DirectoryEntry>> {
        Ok(self
            .conn()
            .query_row(
                "SELECT phone, user_id, display_name, email, last_seen
                 FROM directory WHERE user_id = ?1
                 ORDER BY last_seen DESC LIMIT 1",
                params![user_id.as_str()],
                row_to_entry,
            )
            .optional()?)
    }
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<DirectoryEntry> {
    let phone: String = row.get(0)?;
    let user_id: String = row.get(1)?;
    let display_name: String = row.get(2)?;
    let email: Option<String> = row.get(3)?;
    let seen_str: String = row.get(4)?;

    Ok(DirectoryEntry {
        user_id: UserId(user_id),
        display_name,
        phone,
        email,
        last_seen: parse_timestamp(4, &seen_str)?,
    })
}
