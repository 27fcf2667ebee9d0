use rusqlite::params;
use vigilant_shared::{Item, ItemId, UserId};

use crate::database::{not_found, parse_text, parse_timestamp, Database};
use crate::error::Result;

const ITEM_COLUMNS: &str =
    "id, owner, name, category, expiry_date, reminder_days, added_at, last_notified_at";

impl Database {
    /// Insert or fully replace an item.
    pub fn upsert_item(&self, item: &Item) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO items
                (id, owner, name, category, expiry_date, reminder_days, added_at, last_notified_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                item.id.as_str(),
                item.owner.as_str(),
                item.name,
                item.category.as_str(),
                item.expiry_date,
                item.reminder_days,
                item.added_at.to_rfc3339(),
                item.last_notified_at.map(|ts| ts.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    pub fn get_item(&self, owner: &UserId, id: &ItemId) -> Result<Item> {
        self.conn()
            .query_row(
                &format!("SELECT {ITEM_COLUMNS} FROM items WHERE owner = ?1 AND id = ?2"),
                params![owner.as_str(), id.as_str()],
                row_to_item,
            )
            .map_err(not_found)
    }

    /// Items of one owner, most recently added first.
    pub fn list_items(&self, owner: &UserId) -> Result<Vec<Item>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE owner = ?1 ORDER BY added_at DESC"
        ))?;
        let rows = stmt.query_map(params![owner.as_str()], row_to_item)?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }

    /// Replace the owner's whole collection, e.g. with a fresh remote copy.
    pub fn replace_items(&self, owner: &UserId, items: &[Item]) -> Result<()> {
        let tx = self.conn().unchecked_transaction()?;
        tx.execute("DELETE FROM items WHERE owner = ?1", params![owner.as_str()])?;
        for item in items {
            tx.execute(
                "INSERT OR REPLACE INTO items
                    (id, owner, name, category, expiry_date, reminder_days, added_at, last_notified_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    item.id.as_str(),
                    owner.as_str(),
                    item.name,
                    item.category.as_str(),
                    item.expiry_date,
                    item.reminder_days,
                    item.added_at.to_rfc3339(),
                    item.last_notified_at.map(|ts| ts.to_rfc3339()),
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn delete_item(&self, owner: &UserId, id: &ItemId) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM items WHERE owner = ?1 AND id = ?2",
            params![owner.as_str(), id.as_str()],
        )?;
        Ok(affected > 0)
    }
}

fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<Item> {
    let id: String = row.get(0)?;
    let owner: String = row.get(1)?;
    let name: String = row.get(2)?;
    let category: String = row.get(3)?;
    let expiry_date: String = row.get(4)?;
    let reminder_days: u32 = row.get(5)?;
    let added_str: String = row.get(6)?;
    let notified_str: Option<String> = row.get(7)?;

    let last_notified_at = notified_str
        .as_deref()
        .map(|s| parse_timestamp(7, s))
        .transpose()?;

    Ok(Item {
        id: ItemId(id),
        name,
        category: parse_text(3, &category)?,
        expiry_date,
        reminder_days,
        added_at: parse_timestamp(6, &added_str)?,
        owner: UserId(owner),
        last_notified_at,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use vigilant_shared::Category;

    use super::*;

    fn item(owner: &str, name: &str, added_offset_secs: i64) -> Item {
        Item {
            id: ItemId::new(),
            name: name.into(),
            category: Category::Food,
            expiry_date: "2026-06-01".into(),
            reminder_days: 3,
            added_at: Utc::now() + Duration::seconds(added_offset_secs),
            owner: UserId::from(owner),
            last_notified_at: None,
        }
    }

    fn test_db() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("items.db")).unwrap();
        (db, dir)
    }

    #[test]
    fn test_upsert_and_list_per_owner() {
        let (db, _dir) = test_db();
        let older = item("alice", "Milk", 0);
        let newer = item("alice", "Bread", 10);
        db.upsert_item(&older).unwrap();
        db.upsert_item(&newer).unwrap();
        db.upsert_item(&item("bob", "Soap", 5)).unwrap();

        let alice = db.list_items(&UserId::from("alice")).unwrap();
        assert_eq!(alice.len(), 2);
        assert_eq!(alice[0].name, "Bread");
        assert_eq!(alice[1].name, "Milk");
        assert_eq!(db.list_items(&UserId::from("bob")).unwrap().len(), 1);
    }

    #[test]
    fn test_upsert_replaces_stamp() {
        let (db, _dir) = test_db();
        let mut it = item("alice", "Milk", 0);
        db.upsert_item(&it).unwrap();

        it.last_notified_at = Some(Utc::now());
        db.upsert_item(&it).unwrap();

        let stored = db.get_item(&it.owner, &it.id).unwrap();
        assert!(stored.last_notified_at.is_some());
        assert_eq!(db.list_items(&it.owner).unwrap().len(), 1);
    }

    #[test]
    fn test_malformed_expiry_survives_storage() {
        let (db, _dir) = test_db();
        let mut it = item("alice", "Mystery jar", 0);
        it.expiry_date = "someday".into();
        db.upsert_item(&it).unwrap();

        let stored = db.get_item(&it.owner, &it.id).unwrap();
        assert_eq!(stored.expiry_date, "someday");
        assert!(stored.expiry().is_err());
    }

    #[test]
    fn test_delete_scoped_to_owner() {
        let (db, _dir) = test_db();
        let it = item("alice", "Milk", 0);
        db.upsert_item(&it).unwrap();

        assert!(!db.delete_item(&UserId::from("bob"), &it.id).unwrap());
        assert!(db.delete_item(&it.owner, &it.id).unwrap());
        assert!(matches!(
            db.get_item(&it.owner, &it.id),
            Err(crate::StoreError::NotFound)
        ));
    }

    #[test]
    fn test_replace_items() {
        let (db, _dir) = test_db();
        let owner = UserId::from("alice");
        db.upsert_item(&item("alice", "Old", 0)).unwrap();
        db.upsert_item(&item("bob", "Untouched", 0)).unwrap();

        db.replace_items(&owner, &[item("alice", "Fresh copy", 0)]).unwrap();

        let alice = db.list_items(&owner).unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].name, "Fresh copy");
        assert_eq!(db.list_items(&UserId::from("bob")).unwrap().len(), 1);
    }
}
