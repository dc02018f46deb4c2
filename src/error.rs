//! Error types for `installed-apps`
//!
//! Two layers of errors are defined here:
//!
//! - [`RegistryError`]: failures reported by a [`PackageRegistry`](crate::registry::PackageRegistry)
//!   backend. Its `Display` output is the underlying failure's message, unmodified.
//! - [`AppListerError`]: the crate-level error. A failed query surfaces as
//!   [`AppListerError::QueryError`], which forwards the registry message as-is so the
//!   calling front-end sees exactly what the OS reported.
//!
//! Error variants use `#[source]` to preserve error chains.

use std::time::Duration;
use thiserror::Error;

/// Bridge error code for query failures and every other non-timeout failure
pub const ERROR_CODE: &str = "ERROR";

/// Bridge error code for an expired query deadline
pub const TIMEOUT_CODE: &str = "TIMEOUT";

/// Simple error type for wrapping string messages while implementing `std::error::Error`
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StringError(pub String);

impl StringError {
    /// Create a new `StringError` from a string message
    pub fn new(msg: impl Into<String>) -> Box<Self> {
        Box::new(Self(msg.into()))
    }
}

/// Failure reported by the OS package registry
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry cannot be reached on this host
    #[error("{0}")]
    Unavailable(String),

    /// The caller lacks permission to query the registry
    #[error("{0}")]
    PermissionDenied(String),

    /// Platform API failure
    /// Preserves the underlying error source for full error chain transparency
    #[error("{0}")]
    Platform(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Label resolution failed for a single package
    #[error("{message}")]
    LabelUnresolved {
        /// Package whose label could not be resolved
        package_name: String,
        /// Message reported by the OS
        message: String,
    },

    /// IO error while reading a registry snapshot
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Malformed registry snapshot
    #[error("{0}")]
    Snapshot(#[from] serde_json::Error),
}

impl RegistryError {
    /// Whether this failure concerns a single package's label rather than the registry as a whole
    pub fn is_label_failure(&self) -> bool {
        matches!(self, Self::LabelUnresolved { .. })
    }
}

/// Main error type for `installed-apps`
#[derive(Debug, Error)]
pub enum AppListerError {
    /// The package registry could not be enumerated, or an entry failed during processing
    #[error("{0}")]
    QueryError(#[source] RegistryError),

    /// The query did not finish before its deadline
    #[error("Installed application query timed out after {0:?}")]
    Timeout(Duration),

    /// The query worker exited without reporting a result
    #[error("Installed application query worker terminated unexpectedly")]
    WorkerLost,

    /// Configuration error
    /// Preserves the underlying error source for full error chain transparency
    #[error("Configuration error: {0}")]
    ConfigError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<RegistryError> for AppListerError {
    fn from(error: RegistryError) -> Self {
        Self::QueryError(error)
    }
}

/// Result type alias for `installed-apps` operations
pub type Result<T> = std::result::Result<T, AppListerError>;

/// Category string reported across the `getInstalledApps` boundary
pub fn error_code(error: &AppListerError) -> &'static str {
    match error {
        AppListerError::Timeout(_) => TIMEOUT_CODE,
        _ => ERROR_CODE,
    }
}

/// Convert an error to a user-friendly message
///
/// Used by the command-line host when printing failures to stderr.
pub fn get_user_friendly_error(error: &AppListerError) -> String {
    match error {
        AppListerError::QueryError(RegistryError::PermissionDenied(msg)) => {
            format!(
                "Permission to query installed applications was denied:\n\n{msg}\n\n\
                 On Android 11+ the host app must declare QUERY_ALL_PACKAGES\n\
                 or matching <queries> entries in its manifest."
            )
        }
        AppListerError::QueryError(RegistryError::Unavailable(msg)) => {
            format!(
                "The package registry is not available:\n\n{msg}\n\n\
                 Use --backend snapshot with --snapshot <file> on hosts\n\
                 without a native registry."
            )
        }
        AppListerError::QueryError(RegistryError::LabelUnresolved { package_name, message }) => {
            format!(
                "Could not resolve the display name of {package_name}:\n\n{message}\n\n\
                 Try --label-policy fallback to use package names instead."
            )
        }
        AppListerError::QueryError(e) => {
            format!("Failed to query installed applications:\n\n{e}")
        }
        AppListerError::Timeout(d) => {
            format!(
                "The installed application query did not finish within {} ms.\n\n\
                 Increase --timeout-ms or omit it to wait indefinitely.",
                d.as_millis()
            )
        }
        AppListerError::WorkerLost => "The installed application query stopped unexpectedly.\n\n\
             Check the log output for a panic message."
            .to_string(),
        AppListerError::ConfigError(_) => "Failed to load or save configuration.\n\n\
             Check that the configuration file is readable and its\n\
             directory is writable."
            .to_string(),
        AppListerError::IoError(e) => {
            format!(
                "A file system error occurred:\n\n{e}\n\n\
                 Please check file permissions and disk space."
            )
        }
        AppListerError::JsonError(e) => {
            format!("Invalid JSON input:\n\n{e}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error_display_is_underlying_message() {
        let error: AppListerError =
            RegistryError::PermissionDenied("Permission denial: getInstalledPackages".to_string())
                .into();
        assert_eq!(error.to_string(), "Permission denial: getInstalledPackages");
    }

    #[test]
    fn test_platform_error_keeps_source_message() {
        let error = AppListerError::QueryError(RegistryError::Platform(StringError::new(
            "DeadObjectException",
        )));
        assert_eq!(error.to_string(), "DeadObjectException");
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_label_unresolved_display() {
        let error = RegistryError::LabelUnresolved {
            package_name: "com.example.todo".to_string(),
            message: "NameNotFoundException".to_string(),
        };
        assert!(error.is_label_failure());
        assert_eq!(error.to_string(), "NameNotFoundException");
    }

    #[test]
    fn test_error_codes() {
        let query: AppListerError = RegistryError::Unavailable("gone".to_string()).into();
        assert_eq!(error_code(&query), ERROR_CODE);
        assert_eq!(
            error_code(&AppListerError::Timeout(Duration::from_millis(50))),
            TIMEOUT_CODE
        );
        assert_eq!(error_code(&AppListerError::WorkerLost), ERROR_CODE);
    }

    #[test]
    fn test_error_from_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: AppListerError = io_error.into();
        assert!(matches!(error, AppListerError::IoError(_)));
    }

    #[test]
    fn test_user_friendly_permission_hint() {
        let error = AppListerError::QueryError(RegistryError::PermissionDenied(
            "denied".to_string(),
        ));
        let message = get_user_friendly_error(&error);
        assert!(message.contains("denied"));
        assert!(message.contains("QUERY_ALL_PACKAGES"));
    }

    #[test]
    fn test_user_friendly_label_hint() {
        let error = AppListerError::QueryError(RegistryError::LabelUnresolved {
            package_name: "com.example.todo".to_string(),
            message: "boom".to_string(),
        });
        let message = get_user_friendly_error(&error);
        assert!(message.contains("com.example.todo"));
        assert!(message.contains("--label-policy fallback"));
    }

    #[test]
    fn test_user_friendly_timeout() {
        let message = get_user_friendly_error(&AppListerError::Timeout(Duration::from_millis(250)));
        assert!(message.contains("250 ms"));
    }
}
