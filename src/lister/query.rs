//! The installed application query

use super::deferred::PendingQuery;
use super::options::{LabelPolicy, QueryOptions, SortOrder};
use super::record::InstalledApplicationRecord;
use crate::error::{AppListerError, Result};
use crate::registry::{PackageMetadata, PackageRegistry};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Lists user-installed applications from a [`PackageRegistry`]
///
/// Cheap to clone; clones share the registry. Concurrent queries share no mutable state.
#[derive(Clone)]
pub struct InstalledApplicationLister {
    registry: Arc<dyn PackageRegistry>,
    options: QueryOptions,
}

impl InstalledApplicationLister {
    /// Create a lister with default options (strict labels, registry order, no deadline)
    pub fn new(registry: Arc<dyn PackageRegistry>) -> Self {
        Self {
            registry,
            options: QueryOptions::default(),
        }
    }

    /// Replace the query options
    #[must_use]
    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    /// Current query options
    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// Query the registry and return every user-installed application
    ///
    /// Enumeration failures abort the query with [`AppListerError::QueryError`]
    /// carrying the registry's message unmodified. Label failures are handled
    /// according to [`LabelPolicy`]; non-label failures during resolution are
    /// always fatal. No partial result is returned on failure.
    pub fn list_installed_applications(&self) -> Result<Vec<InstalledApplicationRecord>> {
        let packages = self.registry.list_packages().map_err(|e| {
            error!("Failed to enumerate installed packages: {}", e);
            AppListerError::QueryError(e)
        })?;

        let total = packages.len();
        let mut seen = HashSet::with_capacity(total);
        let mut records = Vec::new();

        for package in packages {
            if package.is_system {
                continue;
            }
            if package.package_name.is_empty() {
                warn!("Ignoring registry entry with an empty package identifier");
                continue;
            }
            if seen.contains(&package.package_name) {
                debug!("Ignoring repeated entry for {}", package.package_name);
                continue;
            }

            // An identifier is only taken once a record exists for it, so a skipped
            // entry does not shadow a later resolvable one
            let package_name = package.package_name.clone();
            if let Some(record) = self.project(package)? {
                seen.insert(package_name);
                records.push(record);
            }
        }

        if self.options.sort_order == SortOrder::AppName {
            records.sort_by_cached_key(|r| (r.app_name().to_lowercase(), r.package_name().to_string()));
        }

        debug!(
            "Listed {} user-installed applications out of {} packages",
            records.len(),
            total
        );
        Ok(records)
    }

    /// Resolve the label of one non-system package and build its record
    fn project(&self, package: PackageMetadata) -> Result<Option<InstalledApplicationRecord>> {
        let error = match self.registry.resolve_label(&package) {
            Ok(label) => {
                return Ok(Some(InstalledApplicationRecord::new(
                    label,
                    package.package_name,
                )));
            }
            Err(e) => e,
        };

        if !error.is_label_failure() {
            error!("Registry failed while resolving {}: {}", package.package_name, error);
            return Err(AppListerError::QueryError(error));
        }

        match self.options.label_policy {
            LabelPolicy::Strict => {
                error!("Failed to resolve label of {}: {}", package.package_name, error);
                Err(AppListerError::QueryError(error))
            }
            LabelPolicy::PackageNameFallback => {
                warn!(
                    "Failed to resolve label of {}, using package name: {}",
                    package.package_name, error
                );
                Ok(Some(InstalledApplicationRecord::new(
                    package.package_name.clone(),
                    package.package_name,
                )))
            }
            LabelPolicy::Skip => {
                warn!("Skipping {}, label unresolved: {}", package.package_name, error);
                Ok(None)
            }
        }
    }

    /// Run the query on a worker thread
    pub fn spawn_query(&self) -> Result<PendingQuery> {
        PendingQuery::spawn(self.clone())
    }
}

impl std::fmt::Debug for InstalledApplicationLister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstalledApplicationLister")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
