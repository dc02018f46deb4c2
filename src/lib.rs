//! `installed-apps` - user-installed application listing
//!
//! Queries the operating system's package registry, drops system-provided
//! packages and returns each remaining application's display name and package
//! identifier to a calling front-end.
//!
//! # Layout
//!
//! - [`registry`]: the `PackageRegistry` seam and its Android, Windows and snapshot backends
//! - [`lister`]: the query itself, its options and the deferred variant
//! - [`bridge`]: the `getInstalledApps` reply envelope
//! - [`config`] / [`utils`]: configuration file and logging setup
//!
//! Each query is a fresh point-in-time snapshot; nothing is cached or persisted.

// Module declarations
pub mod bridge;
pub mod config;
pub mod error;
pub mod lister;
pub mod registry;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use bridge::{BridgeResponse, get_installed_apps};
pub use error::{AppListerError, RegistryError, Result};
pub use lister::{InstalledApplicationLister, InstalledApplicationRecord};
pub use registry::PackageRegistry;
