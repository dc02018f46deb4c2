//! Result record

use serde::{Deserialize, Serialize};

/// A user-installed application as reported to the calling front-end
///
/// Serialized as `{"appName": "...", "packageName": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledApplicationRecord {
    app_name: String,
    package_name: String,
}

impl InstalledApplicationRecord {
    /// Create a record from a resolved label and the OS package identifier
    pub fn new(app_name: impl Into<String>, package_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            package_name: package_name.into(),
        }
    }

    /// Display label resolved by the OS (may be empty)
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// OS package identifier, exactly as the registry reported it
    pub fn package_name(&self) -> &str {
        &self.package_name
    }
}
