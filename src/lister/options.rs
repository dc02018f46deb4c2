//! Query options

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Handling of a package whose label cannot be resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelPolicy {
    /// Fail the whole query
    #[default]
    Strict,
    /// Use the package identifier as the display name
    PackageNameFallback,
    /// Leave the package out of the result
    Skip,
}

/// Ordering of the query result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Whatever order the registry produced (not guaranteed stable)
    #[default]
    Registry,
    /// Case-insensitive by display name, ties broken by package identifier
    AppName,
}

/// Options for one lister
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Label failure handling
    pub label_policy: LabelPolicy,
    /// Result ordering
    pub sort_order: SortOrder,
    /// Deadline applied by the bridge; `None` waits indefinitely
    pub timeout: Option<Duration>,
}
