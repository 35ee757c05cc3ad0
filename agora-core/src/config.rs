//! Store configuration

use std::path::PathBuf;

use serde::Deserialize;

use crate::debug::{ActionLogConfig, ActionLoggerConfig};
use crate::error::{Result, StoreError};
use crate::repository::{JsonFileRepository, MemoryRepository, StateRepository};

pub const DEFAULT_STORAGE_KEY: &str = "agora-app-state";
const APP_DIR_NAME: &str = "agora";

/// Upper bound for `action_log_capacity`
pub const MAX_ACTION_LOG_CAPACITY: usize = 10_000;

pub const ENV_STORAGE_DIR: &str = "AGORA_STORAGE_DIR";
pub const ENV_STORAGE_KEY: &str = "AGORA_STORAGE_KEY";
pub const ENV_PERSIST: &str = "AGORA_PERSIST";

/// Where and how the store keeps its state
///
/// Every field has a default, so an empty document deserializes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Key the state document is stored under
    pub storage_key: String,
    /// Directory holding `<storage_key>.json`
    pub storage_dir: PathBuf,
    /// `false` keeps state in memory only
    pub persist: bool,
    /// Entries kept in the action log
    pub action_log_capacity: usize,
    /// Glob patterns; when non-empty only matching actions are logged
    pub log_include: Vec<String>,
    /// Glob patterns of actions never logged
    pub log_exclude: Vec<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            storage_dir: default_storage_dir(),
            persist: true,
            action_log_capacity: 100,
            log_include: Vec::new(),
            log_exclude: Vec::new(),
        }
    }
}

/// Platform data directory joined with `agora`, or the working directory
pub fn default_storage_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("."))
}

impl StoreConfig {
    /// In-memory configuration, handy for tests and previews
    pub fn ephemeral() -> Self {
        Self {
            persist: false,
            ..Self::default()
        }
    }

    /// Parse a JSON config document
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Defaults overlaid with `AGORA_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    /// Overlay values from a variable lookup
    ///
    /// Only malformed values fail here. Call [`StoreConfig::validate`] once
    /// every override is in place; [`AppStore::open`](crate::AppStore::open)
    /// does so.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_STORAGE_DIR) {
            self.storage_dir = PathBuf::from(dir);
        }
        if let Some(key) = lookup(ENV_STORAGE_KEY) {
            self.storage_key = key;
        }
        if let Some(raw) = lookup(ENV_PERSIST) {
            self.persist = parse_bool(&raw).ok_or_else(|| {
                StoreError::Config(format!("{} must be a boolean, got {:?}", ENV_PERSIST, raw))
            })?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage_key.trim().is_empty() {
            return Err(StoreError::Config("storage_key must not be empty".into()));
        }
        if self
            .storage_key
            .contains(|c: char| c == '/' || c == '\\')
        {
            return Err(StoreError::Config(format!(
                "storage_key {:?} must not contain path separators",
                self.storage_key
            )));
        }
        if self.action_log_capacity > MAX_ACTION_LOG_CAPACITY {
            return Err(StoreError::Config(format!(
                "action_log_capacity {} exceeds {}",
                self.action_log_capacity, MAX_ACTION_LOG_CAPACITY
            )));
        }
        Ok(())
    }

    /// Build the repository this configuration describes
    pub fn repository(&self) -> Box<dyn StateRepository + Send> {
        if self.persist {
            Box::new(JsonFileRepository::new(&self.storage_dir, &self.storage_key))
        } else {
            Box::new(MemoryRepository::new())
        }
    }

    /// Action log settings derived from this configuration
    pub fn action_log(&self) -> ActionLogConfig {
        ActionLogConfig::new(
            self.action_log_capacity,
            ActionLoggerConfig::with_patterns(self.log_include.clone(), self.log_exclude.clone()),
        )
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
