use rusqlite::params;
use vigilant_shared::{ItemId, NotificationLogEntry, UserId};

use crate::database::{parse_text, parse_timestamp, Database};
use crate::error::Result;

impl Database {
    /// The owner's log, newest first.
    pub fn list_logs(&self, owner: &UserId) -> Result<Vec<NotificationLogEntry>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, item_id, item_name, recipient, dispatched_at, content, status
             FROM notification_logs
             WHERE owner = ?1
             ORDER BY seq DESC",
        )?;
        let rows = stmt.query_map(params![owner.as_str()], row_to_log)?;

        let mut logs = Vec::new();
        for row in rows {
            logs.push(row?);
        }
        Ok(logs)
    }

    /// Put `entries` in front of the owner's log, keeping their order, then
    /// evict the oldest entries beyond `capacity`. Returns the resulting log.
    pub fn prepend_logs(
        &self,
        owner: &UserId,
        entries: &[NotificationLogEntry],
        capacity: usize,
    ) -> Result<Vec<NotificationLogEntry>> {
        let tx = self.conn().unchecked_transaction()?;

        // Highest seq is listed first, so the first entry goes in last.
        for entry in entries.iter().rev() {
            tx.execute(
                "INSERT INTO notification_logs
                    (id, owner, item_id, item_name, recipient, dispatched_at, content, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    entry.id,
                    owner.as_str(),
                    entry.item_id.as_str(),
                    entry.item_name,
                    entry.recipient,
                    entry.dispatched_at.to_rfc3339(),
                    entry.content,
                    entry.status.as_str(),
                ],
            )?;
        }

        let evicted = tx.execute(
            "DELETE FROM notification_logs
             WHERE owner = ?1 AND seq NOT IN (
                 SELECT seq FROM notification_logs
                 WHERE owner = ?1
                 ORDER BY seq DESC
                 LIMIT ?2
             )",
            params![owner.as_str(), capacity as i64],
        )?;
        tx.commit()?;

        if evicted > 0 {
            tracing::debug!(owner = %owner, evicted, "pruned notification log");
        }

        self.list_logs(owner)
    }
}

fn row_to_log(row: &rusqlite::Row<'_>) -> rusqlite::Result<NotificationLogEntry> {
    let id: String = row.get(0)?;
    let item_id: String = row.get(1)?;
    let item_name: String = row.get(2)?;
    let recipient: String = row.get(3)?;
    let ts_str: String = row.get(4)?;
    let content: String = row.get(5)?;
    let status: String = row.get(6)?;

    Ok(NotificationLogEntry {
        id,
        item_id: ItemId(item_id),
        item_name,
        recipient,
        dispatched_at: parse_timestamp(4, &ts_str)?,
        content,
        status: parse_text(6, &status)?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use vigilant_shared::DeliveryStatus;

    use super::*;

    fn entry(n: usize) -> NotificationLogEntry {
        NotificationLogEntry {
            id: format!("log-{n}"),
            item_id: ItemId(format!("item-{n}")),
            item_name: format!("Item {n}"),
            recipient: "+15550001111".into(),
            dispatched_at: Utc::now(),
            content: format!("VIGILANT: Item {n} alert routed to +15550001111."),
            status: DeliveryStatus::Delivered,
        }
    }

    fn test_db() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("logs.db")).unwrap();
        (db, dir)
    }

    #[test]
    fn test_prepend_keeps_batch_order() {
        let (db, _dir) = test_db();
        let owner = UserId::from("alice");

        db.prepend_logs(&owner, &[entry(1)], 50).unwrap();
        let logs = db.prepend_logs(&owner, &[entry(2), entry(3)], 50).unwrap();

        let ids: Vec<_> = logs.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["log-2", "log-3", "log-1"]);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let (db, _dir) = test_db();
        let owner = UserId::from("alice");

        for n in 0..55 {
            db.prepend_logs(&owner, &[entry(n)], 50).unwrap();
        }

        let logs = db.list_logs(&owner).unwrap();
        assert_eq!(logs.len(), 50);
        assert_eq!(logs.first().unwrap().id, "log-54");
        assert_eq!(logs.last().unwrap().id, "log-5");
    }

    #[test]
    fn test_capacity_is_per_owner() {
        let (db, _dir) = test_db();
        let alice = UserId::from("alice");
        let bob = UserId::from("bob");

        let batch: Vec<_> = (0..3).map(entry).collect();
        db.prepend_logs(&alice, &batch, 2).unwrap();
        db.prepend_logs(&bob, &[entry(10)], 2).unwrap();

        assert_eq!(db.list_logs(&alice).unwrap().len(), 2);
        assert_eq!(db.list_logs(&bob).unwrap().len(), 1);
    }
}
