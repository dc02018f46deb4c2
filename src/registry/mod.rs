//! OS package registry access
//!
//! The lister never talks to the operating system directly. It depends on the
//! [`PackageRegistry`] trait, which has two responsibilities:
//!
//! - **Enumeration**: list every installed package together with its system flag
//! - **Label resolution**: turn a package's metadata into a localized display name
//!
//! # Backends
//!
//! - [`AndroidPackageRegistry`]: `PackageManager` over JNI (`target_os = "android"`)
//! - [`WinRtPackageRegistry`]: WinRT `Management.Deployment.PackageManager` (Windows)
//! - [`InMemoryRegistry`]: fixed package set, built in code or loaded from a JSON snapshot
//!
//! [`platform_registry`] picks a backend according to [`RegistryConfig`].
//!
//! # Example
//!
//! ```
//! use installed_apps::registry::{InMemoryRegistry, PackageRegistry};
//!
//! let registry = InMemoryRegistry::new()
//!     .with_system_package("com.os.settings", "Settings")
//!     .with_user_package("com.example.todo", "Todo App");
//!
//! let packages = registry.list_packages().unwrap();
//! assert_eq!(packages.len(), 2);
//! ```

pub mod memory;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(windows)]
pub mod windows;

pub use memory::{InMemoryRegistry, SnapshotEntry};

#[cfg(target_os = "android")]
pub use android::AndroidPackageRegistry;

#[cfg(windows)]
pub use self::windows::WinRtPackageRegistry;

use crate::config::{RegistryBackend, RegistryConfig};
use crate::error::RegistryError;
use std::sync::Arc;

/// One raw entry from the OS package registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMetadata {
    /// OS-assigned unique identifier (e.g. "com.example.todo")
    pub package_name: String,

    /// Whether the OS flags this package as part of the system image
    pub is_system: bool,

    /// Backend-specific handle for label resolution, when it differs from `package_name`
    pub lookup_key: Option<String>,
}

impl PackageMetadata {
    /// Metadata for a user-installed package
    pub fn user(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            is_system: false,
            lookup_key: None,
        }
    }

    /// Metadata for a system package
    pub fn system(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            is_system: true,
            lookup_key: None,
        }
    }

    /// Attach a backend lookup key
    #[must_use]
    pub fn with_lookup_key(mut self, key: impl Into<String>) -> Self {
        self.lookup_key = Some(key.into());
        self
    }

    /// Key to hand to the OS when resolving this package's label
    pub fn lookup_key(&self) -> &str {
        self.lookup_key.as_deref().unwrap_or(&self.package_name)
    }
}

/// The host operating system's package-management query facility
///
/// Implementations are treated as read-only external resources and may be shared
/// between concurrent queries.
pub trait PackageRegistry: Send + Sync {
    /// List all installed packages, including system packages
    fn list_packages(&self) -> Result<Vec<PackageMetadata>, RegistryError>;

    /// Resolve the human-readable display label of a package
    fn resolve_label(&self, package: &PackageMetadata) -> Result<String, RegistryError>;
}

impl<R: PackageRegistry + ?Sized> PackageRegistry for Arc<R> {
    fn list_packages(&self) -> Result<Vec<PackageMetadata>, RegistryError> {
        (**self).list_packages()
    }

    fn resolve_label(&self, package: &PackageMetadata) -> Result<String, RegistryError> {
        (**self).resolve_label(package)
    }
}

/// Create the registry backend selected by `config`
///
/// `Auto` selects the native registry of the compile target. Hosts without one
/// report [`RegistryError::Unavailable`].
pub fn platform_registry(
    config: &RegistryConfig,
) -> Result<Arc<dyn PackageRegistry>, RegistryError> {
    match config.backend {
        RegistryBackend::Snapshot => {
            let path = config.snapshot_path.as_ref().ok_or_else(|| {
                RegistryError::Unavailable(
                    "snapshot backend selected but no snapshot path configured".to_string(),
                )
            })?;
            tracing::debug!("Using snapshot registry from {}", path.display());
            Ok(Arc::new(InMemoryRegistry::from_snapshot_file(path)?))
        }
        RegistryBackend::Auto => native_registry(),
    }
}

#[cfg(target_os = "android")]
fn native_registry() -> Result<Arc<dyn PackageRegistry>, RegistryError> {
    tracing::debug!("Using Android PackageManager registry");
    Ok(Arc::new(AndroidPackageRegistry::from_android_context()?))
}

#[cfg(windows)]
fn native_registry() -> Result<Arc<dyn PackageRegistry>, RegistryError> {
    tracing::debug!("Using WinRT PackageManager registry");
    Ok(Arc::new(WinRtPackageRegistry::new()?))
}

#[cfg(not(any(target_os = "android", windows)))]
fn native_registry() -> Result<Arc<dyn PackageRegistry>, RegistryError> {
    Err(RegistryError::Unavailable(format!(
        "no native package registry on {}",
        std::env::consts::OS
    )))
}
