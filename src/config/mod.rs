//! Configuration management module
//!
//! This module handles loading, saving, and managing configuration.
//! Configuration is stored as JSON (by default in
//! `%APPDATA%\installed-apps\config.json` or `$XDG_CONFIG_HOME/installed-apps/config.json`)
//! with atomic writes to prevent corruption.

pub mod manager;
pub mod models;

pub use manager::ConfigManager;
pub use models::{ListerConfig, LoggingConfig, QueryConfig, RegistryBackend, RegistryConfig};
