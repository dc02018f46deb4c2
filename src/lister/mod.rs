//! Installed application listing
//!
//! [`InstalledApplicationLister`] is the single query of this crate: enumerate the
//! registry, drop system packages, resolve a label for each remaining package and
//! return [`InstalledApplicationRecord`]s.
//!
//! # Query Steps
//!
//! 1. `PackageRegistry::list_packages()` - any failure aborts the query
//! 2. Skip entries whose system flag is set
//! 3. Skip repeated identifiers (first occurrence wins)
//! 4. `PackageRegistry::resolve_label()` - failures handled per [`LabelPolicy`]
//! 5. Order per [`SortOrder`]
//!
//! Results are point-in-time snapshots. Nothing is cached between queries.
//!
//! # Deferred Queries
//!
//! [`InstalledApplicationLister::spawn_query`] runs the blocking query on a worker
//! thread and hands back a [`PendingQuery`], for callers on a thread that must not
//! block. A deadline can be applied with [`PendingQuery::wait_timeout`].
//!
//! # Example
//!
//! ```
//! use installed_apps::lister::InstalledApplicationLister;
//! use installed_apps::registry::InMemoryRegistry;
//! use std::sync::Arc;
//!
//! let registry = InMemoryRegistry::new()
//!     .with_system_package("com.os.settings", "Settings")
//!     .with_user_package("com.example.todo", "Todo App");
//!
//! let lister = InstalledApplicationLister::new(Arc::new(registry));
//! let apps = lister.list_installed_applications().unwrap();
//!
//! assert_eq!(apps.len(), 1);
//! assert_eq!(apps[0].app_name(), "Todo App");
//! assert_eq!(apps[0].package_name(), "com.example.todo");
//! ```

pub mod deferred;
pub mod options;
pub mod query;
pub mod record;

pub use deferred::PendingQuery;
pub use options::{LabelPolicy, QueryOptions, SortOrder};
pub use query::InstalledApplicationLister;
pub use record::InstalledApplicationRecord;
