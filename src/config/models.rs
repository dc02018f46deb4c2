//! Configuration data models
//!
//! This module defines the data structures used for configuration. Every section
//! falls back to its defaults when absent, so a partial file such as
//! `{"query": {"sort_order": "app_name"}}` is valid.

use crate::lister::{LabelPolicy, QueryOptions, SortOrder};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Which package registry backend to query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryBackend {
    /// Native registry of the compile target (Android or Windows)
    #[default]
    Auto,
    /// JSON snapshot file
    Snapshot,
}

/// Registry selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Backend to use
    pub backend: RegistryBackend,
    /// Snapshot file for the `snapshot` backend
    pub snapshot_path: Option<PathBuf>,
}

/// Query behavior
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// What to do when a single package's label cannot be resolved
    pub label_policy: LabelPolicy,
    /// Result ordering
    pub sort_order: SortOrder,
    /// Deadline for one query in milliseconds (none = wait indefinitely)
    pub timeout_ms: Option<u64>,
}

impl QueryConfig {
    /// Options for [`InstalledApplicationLister`](crate::lister::InstalledApplicationLister)
    pub fn to_options(&self) -> QueryOptions {
        QueryOptions {
            label_policy: self.label_policy,
            sort_order: self.sort_order,
            timeout: self.timeout_ms.map(Duration::from_millis),
        }
    }
}

/// Logging output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// Directory for `installed-apps.log`; stderr when unset
    pub log_dir: Option<PathBuf>,
    /// Number of previous session logs kept next to the current one
    pub max_files: u8,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
            max_files: 9,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListerConfig {
    /// Registry selection
    pub registry: RegistryConfig,
    /// Query behavior
    pub query: QueryConfig,
    /// Logging output
    pub logging: LoggingConfig,
}
