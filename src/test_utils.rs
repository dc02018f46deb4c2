//! Shared test utilities for `installed-apps` unit tests.
//!
//! This module provides common test infrastructure used across multiple test modules.
//! It is only compiled during testing (`#[cfg(test)]`).

use crate::error::{RegistryError, StringError};
use crate::registry::{InMemoryRegistry, PackageMetadata, PackageRegistry};
use std::time::Duration;
use tempfile::TempDir;

/// Helper function to create a temporary test directory using tempfile.
/// Returns a `TempDir` that automatically cleans up when dropped.
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Registry with two system packages and three user packages, labels in mixed case
pub fn sample_registry() -> InMemoryRegistry {
    InMemoryRegistry::new()
        .with_system_package("com.os.settings", "Settings")
        .with_user_package("com.example.todo", "Todo App")
        .with_system_package("com.os.launcher", "Launcher")
        .with_user_package("org.example.zebra", "Zebra")
        .with_user_package("net.example.alpha", "alpha")
}

/// Registry whose enumeration or label resolution fails in a chosen way
pub struct FailingRegistry {
    mode: FailureMode,
}

enum FailureMode {
    PermissionDenied(String),
    LabelPlatform { package_name: String, message: String },
}

impl FailingRegistry {
    /// Enumeration fails with `RegistryError::PermissionDenied(message)`
    pub fn permission_denied(message: &str) -> Self {
        Self {
            mode: FailureMode::PermissionDenied(message.to_string()),
        }
    }

    /// Lists one user package whose label lookup fails with a platform (non-label) error
    pub fn label_platform_error(package_name: &str, message: &str) -> Self {
        Self {
            mode: FailureMode::LabelPlatform {
                package_name: package_name.to_string(),
                message: message.to_string(),
            },
        }
    }
}

impl PackageRegistry for FailingRegistry {
    fn list_packages(&self) -> Result<Vec<PackageMetadata>, RegistryError> {
        match &self.mode {
            FailureMode::PermissionDenied(msg) => Err(RegistryError::PermissionDenied(msg.clone())),
            FailureMode::LabelPlatform { package_name, .. } => {
                Ok(vec![PackageMetadata::user(package_name.clone())])
            }
        }
    }

    fn resolve_label(&self, _package: &PackageMetadata) -> Result<String, RegistryError> {
        match &self.mode {
            FailureMode::PermissionDenied(msg) => Err(RegistryError::PermissionDenied(msg.clone())),
            FailureMode::LabelPlatform { message, .. } => {
                Err(RegistryError::Platform(StringError::new(message.clone())))
            }
        }
    }
}

/// Registry that sleeps before enumerating, for deadline tests
pub struct SlowRegistry {
    inner: InMemoryRegistry,
    delay: Duration,
}

impl SlowRegistry {
    /// Wrap `inner`, delaying every enumeration by `delay`
    pub fn new(inner: InMemoryRegistry, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

impl PackageRegistry for SlowRegistry {
    fn list_packages(&self) -> Result<Vec<PackageMetadata>, RegistryError> {
        std::thread::sleep(self.delay);
        self.inner.list_packages()
    }

    fn resolve_label(&self, package: &PackageMetadata) -> Result<String, RegistryError> {
        self.inner.resolve_label(package)
    }
}

/// Registry whose enumeration panics, taking the query worker down with it
pub struct PanickingRegistry;

impl PackageRegistry for PanickingRegistry {
    fn list_packages(&self) -> Result<Vec<PackageMetadata>, RegistryError> {
        panic!("package registry crashed");
    }

    fn resolve_label(&self, _package: &PackageMetadata) -> Result<String, RegistryError> {
        panic!("package registry crashed");
    }
}
