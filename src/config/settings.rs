//! Application settings.
//!
//! Settings come from an optional `settings.toml` file with environment
//! variables taking precedence, so a deployment can run from environment
//! alone. `DISCORD_BOT_TOKEN` is environment-only and never written to a
//! file.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default gold for brand-new players.
pub const DEFAULT_STARTING_GOLD: i64 = 10;

/// Runtime configuration for the bot.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    /// Database connection string
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Gold granted to a player on first contact
    #[serde(default = "default_gold")]
    pub default_gold: i64,
    /// Path to a catalog TOML file; the built-in catalog is used when absent
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
}

fn default_database_url() -> String {
    "sqlite://data/wayfarer.sqlite?mode=rwc".to_string()
}

const fn default_gold() -> i64 {
    DEFAULT_STARTING_GOLD
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            default_gold: default_gold(),
            catalog_path: None,
        }
    }
}

impl AppSettings {
    /// Loads settings: `settings.toml` if it exists, then environment
    /// variable overrides.
    pub fn load() -> Result<Self> {
        let mut settings = if Path::new("settings.toml").exists() {
            Self::from_file("settings.toml")?
        } else {
            Self::default()
        };
        settings.apply_env();
        Ok(settings)
    }

    /// Parses settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
            message: format!("Failed to read settings file: {e}"),
        })?;
        toml::from_str(&contents).map_err(|e| Error::Config {
            message: format!("Failed to parse settings file: {e}"),
        })
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database_url = url;
        }
        if let Ok(gold) = std::env::var("DEFAULT_GOLD")
            && let Ok(gold) = gold.parse()
        {
            self.default_gold = gold;
        }
        if let Ok(path) = std::env::var("CATALOG_PATH") {
            self.catalog_path = Some(PathBuf::from(path));
        }
    }
}

/// Reads the Discord bot token from the environment.
pub fn discord_token() -> Result<String> {
    std::env::var("DISCORD_BOT_TOKEN").map_err(|_| Error::Config {
        message: "DISCORD_BOT_TOKEN environment variable is not set".to_string(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_settings_toml() {
        let toml_str = r#"
            database_url = "sqlite::memory:"
            default_gold = 25
            catalog_path = "data/catalog.toml"
        "#;

        let settings: AppSettings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.database_url, "sqlite::memory:");
        assert_eq!(settings.default_gold, 25);
        assert_eq!(
            settings.catalog_path.as_deref(),
            Some(Path::new("data/catalog.toml"))
        );
    }

    #[test]
    fn test_partial_settings_use_defaults() {
        let settings: AppSettings = toml::from_str("default_gold = 5").unwrap();
        assert_eq!(settings.default_gold, 5);
        assert_eq!(settings.database_url, default_database_url());
        assert!(settings.catalog_path.is_none());
    }
}
