use rusqlite::{params, OptionalExtension};
use vigilant_shared::{AlertConfig, UserId};

use crate::database::Database;
use crate::error::Result;

impl Database {
    /// The owner's config. Missing keys are filled from defaults; a missing
    /// or unreadable record yields [`AlertConfig::default`].
    pub fn get_config(&self, owner: &UserId) -> Result<AlertConfig> {
        let json: Option<String> = self
            .conn()
            .query_row(
                "SELECT json FROM alert_configs WHERE owner = ?1",
                params![owner.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        let Some(json) = json else {
            return Ok(AlertConfig::default());
        };

        match serde_json::from_str(&json) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!(owner = %owner, error = %e, "corrupt alert config, using defaults");
                Ok(AlertConfig::default())
            }
        }
    }

    /// Overwrite the owner's config.
    pub fn put_config(&self, owner: &UserId, config: &AlertConfig) -> Result<()> {
        let json = serde_json::to_string(config)?;
        self.conn().execute(
            "INSERT OR REPLACE INTO alert_configs (owner, json) VALUES (?1, ?2)",
            params![owner.as_str(), json],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use vigilant_shared::Theme;

    use super::*;

    fn test_db() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("configs.db")).unwrap();
        (db, dir)
    }

    #[test]
    fn test_missing_config_is_default() {
        let (db, _dir) = test_db();
        assert_eq!(db.get_config(&UserId::from("nobody")).unwrap(), AlertConfig::default());
    }

    #[test]
    fn test_round_trip() {
        let (db, _dir) = test_db();
        let owner = UserId::from("alice");
        let config = AlertConfig {
            notifications_enabled: false,
            sms_enabled: false,
            theme: Theme::Dark,
            language: "Français".into(),
        };

        db.put_config(&owner, &config).unwrap();
        assert_eq!(db.get_config(&owner).unwrap(), config);
    }

    #[test]
    fn test_partial_document_default_filled() {
        let (db, _dir) = test_db();
        let owner = UserId::from("alice");
        db.conn()
            .execute(
                "INSERT INTO alert_configs (owner, json) VALUES (?1, ?2)",
                params![owner.as_str(), r#"{"theme":"system"}"#],
            )
            .unwrap();

        let config = db.get_config(&owner).unwrap();
        assert_eq!(config.theme, Theme::System);
        assert!(config.sms_enabled);
        assert_eq!(config.language, "English");
    }

    #[test]
    fn test_corrupt_document_yields_default() {
        let (db, _dir) = test_db();
        let owner = UserId::from("alice");
        db.conn()
            .execute(
                "INSERT INTO alert_configs (owner, json) VALUES (?1, 'not json')",
                params![owner.as_str()],
            )
            .unwrap();

        assert_eq!(db.get_config(&owner).unwrap(), AlertConfig::default());
    }
}
