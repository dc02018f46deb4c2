//! In-memory package registry
//!
//! Holds a fixed package set, either built in code or loaded from a JSON snapshot
//! exported from a device:
//!
//! ```json
//! {
//!   "packages": [
//!     { "packageName": "com.os.settings", "system": true, "label": "Settings" },
//!     { "packageName": "com.example.todo", "system": false, "label": "Todo App" }
//!   ]
//! }
//! ```
//!
//! An entry without a `label` has no resolvable display name; resolving it fails
//! with [`RegistryError::LabelUnresolved`].
//!
//! The package set can be replaced between queries to simulate installs and
//! uninstalls.

use super::{PackageMetadata, PackageRegistry};
use crate::error::RegistryError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One package as recorded in a registry snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotEntry {
    /// OS package identifier
    pub package_name: String,
    /// System-application flag
    #[serde(default)]
    pub system: bool,
    /// Resolved display label, if the OS produced one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    packages: Vec<SnapshotEntry>,
}

/// Package registry backed by an in-memory package list
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    packages: RwLock<Vec<SnapshotEntry>>,
}

impl InMemoryRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding `entries`, in registry order
    pub fn from_entries(entries: Vec<SnapshotEntry>) -> Self {
        Self {
            packages: RwLock::new(entries),
        }
    }

    /// Parse a JSON snapshot document
    pub fn from_snapshot_json(json: &str) -> Result<Self, RegistryError> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        tracing::debug!("Loaded registry snapshot with {} packages", snapshot.packages.len());
        Ok(Self::from_entries(snapshot.packages))
    }

    /// Load a JSON snapshot from disk
    pub fn from_snapshot_file(path: &Path) -> Result<Self, RegistryError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_snapshot_json(&json)
    }

    /// Serialize the current package set as a snapshot document
    pub fn to_snapshot_json(&self) -> Result<String, RegistryError> {
        let snapshot = Snapshot {
            packages: self.packages.read().clone(),
        };
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }

    /// Add a user-installed package with a resolvable label
    #[must_use]
    pub fn with_user_package(self, package_name: &str, label: &str) -> Self {
        self.install(SnapshotEntry {
            package_name: package_name.to_string(),
            system: false,
            label: Some(label.to_string()),
        });
        self
    }

    /// Add a system package with a resolvable label
    #[must_use]
    pub fn with_system_package(self, package_name: &str, label: &str) -> Self {
        self.install(SnapshotEntry {
            package_name: package_name.to_string(),
            system: true,
            label: Some(label.to_string()),
        });
        self
    }

    /// Add a user-installed package whose label cannot be resolved
    #[must_use]
    pub fn with_unlabeled_package(self, package_name: &str) -> Self {
        self.install(SnapshotEntry {
            package_name: package_name.to_string(),
            system: false,
            label: None,
        });
        self
    }

    /// Append a package to the registry
    pub fn install(&self, entry: SnapshotEntry) {
        self.packages.write().push(entry);
    }

    /// Remove every entry for `package_name`, returning whether anything was removed
    pub fn uninstall(&self, package_name: &str) -> bool {
        let mut packages = self.packages.write();
        let before = packages.len();
        packages.retain(|p| p.package_name != package_name);
        packages.len() != before
    }

    /// Replace the whole package set
    pub fn replace(&self, entries: Vec<SnapshotEntry>) {
        *self.packages.write() = entries;
    }

    /// Number of packages currently recorded, system packages included
    pub fn len(&self) -> usize {
        self.packages.read().len()
    }

    /// Whether no packages are recorded
    pub fn is_empty(&self) -> bool {
        self.packages.read().is_empty()
    }
}

impl PackageRegistry for InMemoryRegistry {
    fn list_packages(&self) -> Result<Vec<PackageMetadata>, RegistryError> {
        Ok(self
            .packages
            .read()
            .iter()
            .enumerate()
            .map(|(index, entry)| PackageMetadata {
                package_name: entry.package_name.clone(),
                is_system: entry.system,
                lookup_key: Some(index.to_string()),
            })
            .collect())
    }

    fn resolve_label(&self, package: &PackageMetadata) -> Result<String, RegistryError> {
        let packages = self.packages.read();
        // The lookup key is the entry's position at enumeration time. Fall back to
        // the first entry with that name when there is no key or the set changed since.
        let entry = package
            .lookup_key
            .as_deref()
            .and_then(|key| key.parse::<usize>().ok())
            .and_then(|index| packages.get(index))
            .filter(|p| p.package_name == package.package_name)
            .or_else(|| packages.iter().find(|p| p.package_name == package.package_name))
            .ok_or_else(|| RegistryError::LabelUnresolved {
                package_name: package.package_name.clone(),
                message: format!("{} is not installed", package.package_name),
            })?;

        entry
            .label
            .clone()
            .ok_or_else(|| RegistryError::LabelUnresolved {
                package_name: package.package_name.clone(),
                message: format!("no label recorded for {}", package.package_name),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "packages": [
            { "packageName": "com.os.settings", "system": true, "label": "Settings" },
            { "packageName": "com.example.todo", "label": "Todo App" },
            { "packageName": "com.example.raw" }
        ]
    }"#;

    #[test]
    fn test_snapshot_parsing_defaults() {
        let registry = InMemoryRegistry::from_snapshot_json(SNAPSHOT).unwrap();
        let packages = registry.list_packages().unwrap();

        assert_eq!(packages.len(), 3);
        assert!(packages[0].is_system);
        assert!(!packages[1].is_system, "system defaults to false");
        assert_eq!(packages[2].package_name, "com.example.raw");
    }

    #[test]
    fn test_resolve_label() {
        let registry = InMemoryRegistry::from_snapshot_json(SNAPSHOT).unwrap();
        let label = registry
            .resolve_label(&PackageMetadata::user("com.example.todo"))
            .unwrap();
        assert_eq!(label, "Todo App");
    }

    #[test]
    fn test_missing_label_is_label_failure() {
        let registry = InMemoryRegistry::from_snapshot_json(SNAPSHOT).unwrap();
        let err = registry
            .resolve_label(&PackageMetadata::user("com.example.raw"))
            .unwrap_err();
        assert!(err.is_label_failure());
        assert_eq!(err.to_string(), "no label recorded for com.example.raw");
    }

    #[test]
    fn test_resolve_label_uses_enumerated_entry() {
        let registry = InMemoryRegistry::new()
            .with_system_package("com.example.todo", "System Todo")
            .with_user_package("com.example.todo", "Todo App");
        let packages = registry.list_packages().unwrap();

        assert_eq!(registry.resolve_label(&packages[0]).unwrap(), "System Todo");
        assert_eq!(registry.resolve_label(&packages[1]).unwrap(), "Todo App");
    }

    #[test]
    fn test_stale_lookup_key_falls_back_to_name() {
        let registry = InMemoryRegistry::new()
            .with_user_package("com.example.mail", "Mail")
            .with_user_package("com.example.todo", "Todo App");
        let packages = registry.list_packages().unwrap();

        registry.uninstall("com.example.mail");
        assert_eq!(registry.resolve_label(&packages[1]).unwrap(), "Todo App");
    }

    #[test]
    fn test_malformed_snapshot() {
        let err = InMemoryRegistry::from_snapshot_json("{\"packages\": 3}").unwrap_err();
        assert!(matches!(err, RegistryError::Snapshot(_)));
    }

    #[test]
    fn test_install_and_uninstall() {
        let registry = InMemoryRegistry::new().with_user_package("com.example.todo", "Todo App");
        assert_eq!(registry.len(), 1);

        assert!(registry.uninstall("com.example.todo"));
        assert!(!registry.uninstall("com.example.todo"));
        assert!(registry.is_empty());

        let err = registry
            .resolve_label(&PackageMetadata::user("com.example.todo"))
            .unwrap_err();
        assert!(err.to_string().contains("not installed"));
    }

    #[test]
    fn test_snapshot_file_round_trip() {
        let dir = crate::test_utils::create_test_dir();
        let path = dir.path().join("snapshot.json");

        let registry = InMemoryRegistry::new()
            .with_system_package("com.os.settings", "Settings")
            .with_unlabeled_package("com.example.raw");
        std::fs::write(&path, registry.to_snapshot_json().unwrap()).unwrap();

        let loaded = InMemoryRegistry::from_snapshot_file(&path).unwrap();
        assert_eq!(
            loaded.list_packages().unwrap(),
            registry.list_packages().unwrap()
        );
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("\"label\": null"));
    }
}
