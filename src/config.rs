// ⚙️ Configuration - where the Book lives and how the session behaves
//
// Read from a JSON file; every field has a default so a partial or missing
// file still yields a usable config.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Single pretty-printed JSON document
    Json,

    /// SQLite database keeping every distinct saved Book
    Sqlite,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Json => "json",
            StorageBackend::Sqlite => "sqlite",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Location of the saved Book
    pub data_file: PathBuf,

    pub storage: StorageBackend,

    /// Look-ahead window for birthday and expiry reminders
    pub reminder_window_days: i64,

    /// Start from sample data when no saved Book exists
    pub load_sample_when_missing: bool,

    /// tracing filter used when RUST_LOG is not set
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_file: PathBuf::from("data/policybook.json"),
            storage: StorageBackend::Json,
            reminder_window_days: 7,
            load_sample_when_missing: true,
            log_filter: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load from `path`, or defaults if the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        if config.reminder_window_days < 0 {
            anyhow::bail!(
                "reminder_window_days must not be negative (got {})",
                config.reminder_window_days
            );
        }
        Ok(config)
    }
}
