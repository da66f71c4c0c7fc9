//! Storage engine configuration, loadable from TOML or JSON.

use crate::error::{Error, Result};
use crate::strategy::ChildWritePolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Engine-wide tunables. Everything here has a sensible default
/// matching [`crate::strategy::JsonStrategy`]; callers only need to
/// set what they want to change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub shard_depth: usize,
    pub max_depth: usize,
    pub child_write_policy: ChildWritePolicyConfig,
    pub lock_timeout_ms: u64,
    pub enable_fsync: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            shard_depth: 2,
            max_depth: 64,
            child_write_policy: ChildWritePolicyConfig::Always,
            lock_timeout_ms: 10_000,
            enable_fsync: true,
        }
    }
}

impl StoreConfig {
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    /// Parses TOML content into a [`StoreConfig`].
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Serialization(format!("invalid TOML config: {e}")))
    }

    /// Parses JSON content into a [`StoreConfig`].
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::Serialization(format!("invalid JSON config: {e}")))
    }

    /// Loads a config file, dispatching on its extension (`.toml` or
    /// `.json`); any other extension is treated as TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Serialization(format!("could not read config {}: {e}", path.display()))
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }
}

/// Serializable mirror of [`ChildWritePolicy`] (which lives in
/// `strategy.rs` and isn't itself `Serialize`, since strategies are
/// usually constructed in code, not config).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildWritePolicyConfig {
    Always,
    Never,
    IfNotExist,
}

impl From<ChildWritePolicyConfig> for ChildWritePolicy {
    fn from(value: ChildWritePolicyConfig) -> Self {
        match value {
            ChildWritePolicyConfig::Always => ChildWritePolicy::Always,
            ChildWritePolicyConfig::Never => ChildWritePolicy::Never,
            ChildWritePolicyConfig::IfNotExist => ChildWritePolicy::IfNotExist,
        }
    }
}
