//! CLI configuration loaded from environment variables.
//!
//! Every setting is optional: with nothing set the tracker runs against the
//! platform default database and no remote store.

use std::path::PathBuf;
use std::time::Duration;

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Explicit SQLite database path.
    /// Env: `VIGILANT_DB_PATH`
    /// Default: `vigilant.db` in the platform data directory.
    pub db_path: Option<PathBuf>,

    /// Base URL of the remote store.
    /// Env: `VIGILANT_REMOTE_URL`
    /// Default: unset (local-only).
    pub remote_url: Option<String>,

    /// Bearer token sent to the remote store.
    /// Env: `VIGILANT_REMOTE_TOKEN`
    pub remote_token: Option<String>,

    /// HTTP timeout for remote calls.
    /// Env: `VIGILANT_REMOTE_TIMEOUT_SECS`
    /// Default: 10 seconds.
    pub remote_timeout: Duration,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            remote_url: None,
            remote_token: None,
            remote_timeout: Duration::from_secs(10),
        }
    }
}

impl CliConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = non_empty("VIGILANT_DB_PATH") {
            config.db_path = Some(PathBuf::from(path));
        }

        if let Some(url) = non_empty("VIGILANT_REMOTE_URL") {
            config.remote_url = Some(url.trim().to_string());
        }

        config.remote_token = non_empty("VIGILANT_REMOTE_TOKEN");

        if let Some(val) = non_empty("VIGILANT_REMOTE_TIMEOUT_SECS") {
            match val.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.remote_timeout = Duration::from_secs(secs),
                _ => {
                    tracing::warn!(
                        value = %val,
                        "Invalid VIGILANT_REMOTE_TIMEOUT_SECS, using default"
                    );
                }
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> CliConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CliConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        assert_eq!(load(&[]), CliConfig::default());
        assert_eq!(CliConfig::default().remote_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_all_variables() {
        let config = load(&[
            ("VIGILANT_DB_PATH", "/tmp/v.db"),
            ("VIGILANT_REMOTE_URL", " https://store.example "),
            ("VIGILANT_REMOTE_TOKEN", "secret"),
            ("VIGILANT_REMOTE_TIMEOUT_SECS", "3"),
        ]);
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/v.db")));
        assert_eq!(config.remote_url.as_deref(), Some("https://store.example"));
        assert_eq!(config.remote_token.as_deref(), Some("secret"));
        assert_eq!(config.remote_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = load(&[
            ("VIGILANT_REMOTE_URL", ""),
            ("VIGILANT_REMOTE_TIMEOUT_SECS", "soon"),
        ]);
        assert_eq!(config.remote_url, None);
        assert_eq!(config.remote_timeout, Duration::from_secs(10));

        assert_eq!(
            load(&[("VIGILANT_REMOTE_TIMEOUT_SECS", "0")]).remote_timeout,
            Duration::from_secs(10)
        );
    }
}
