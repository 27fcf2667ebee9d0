use rusqlite::{params, OptionalExtension};
use vigilant_shared::{UserId, UserProfile};

use crate::database::{parse_timestamp, Database};
use crate::error::Result;
use crate::models::Account;

impl Database {
    pub fn insert_account(&self, account: &Account) -> Result<()> {
        self.conn().execute(
            "INSERT INTO accounts (user_id, phone, display_name, password_hash, salt, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                account.user_id.as_str(),
                account.phone,
                account.display_name,
                account.password_hash,
                account.salt,
                account.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn find_account_by_phone(&self, phone: &str) -> Result<Option<Account>> {
        Ok(self
            .conn()
            .query_row(
                "SELECT user_id, phone, display_name, password_hash, salt, created_at
                 FROM accounts WHERE phone = ?1",
                params![phone],
                |row| {
                    let user_id: String = row.get(0)?;
                    let created_str: String = row.get(5)?;
                    Ok(Account {
                        user_id: UserId(user_id),
                        phone: row.get(1)?,
                        display_name: row.get(2)?,
                        password_hash: row.get(3)?,
                        salt: row.get(4)?,
                        created_at: parse_timestamp(5, &created_str)?,
                    })
                },
            )
            .optional()?)
    }

    // ---------------------------------------------------------------------
    // Active session pointer
    // ---------------------------------------------------------------------

    pub fn set_session(&self, profile: &UserProfile) -> Result<()> {
        let json = serde_json::to_string(profile)?;
        self.conn().execute(
            "INSERT OR REPLACE INTO session (id, profile_json) VALUES (1, ?1)",
            params![json],
        )?;
        Ok(())
    }

    pub fn get_session(&self) -> Result<Option<UserProfile>> {
        let json: Option<String> = self
            .conn()
            .query_row("SELECT profile_json FROM session WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub fn clear_session(&self) -> Result<()> {
        self.conn().execute("DELETE FROM session", [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_account_lookup_and_unique_phone() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("acc.db")).unwrap();

        let account = Account {
            user_id: UserId::from("local-abc"),
            phone: "+15551234".into(),
            display_name: "User 1234".into(),
            password_hash: "00".into(),
            salt: "11".into(),
            created_at: Utc::now(),
        };
        db.insert_account(&account).unwrap();

        let found = db.find_account_by_phone("+15551234").unwrap().unwrap();
        assert_eq!(found.user_id, account.user_id);
        assert!(db.find_account_by_phone("+10000000").unwrap().is_none());

        let clash = Account { user_id: UserId::from("local-def"), ..account };
        assert!(db.insert_account(&clash).is_err());
    }

    #[test]
    fn test_session_pointer() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("acc.db")).unwrap();
        assert!(db.get_session().unwrap().is_none());

        let profile = UserProfile {
            id: UserId::from("demo-user"),
            display_name: "Guest Operative".into(),
            phone: Some("+15550009999".into()),
            email: None,
        };
        db.set_session(&profile).unwrap();
        assert_eq!(db.get_session().unwrap(), Some(profile));

        db.clear_session().unwrap();
        assert!(db.get_session().unwrap().is_none());
    }
}
