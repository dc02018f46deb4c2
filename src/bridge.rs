//! The `getInstalledApps` call boundary
//!
//! The calling front-end receives either the resolved list or a rejection carrying
//! an error category and the underlying failure's message:
//!
//! ```json
//! {"outcome":"resolved","apps":[{"appName":"Todo App","packageName":"com.example.todo"}]}
//! {"outcome":"rejected","code":"ERROR","message":"Permission denial: ..."}
//! ```

use crate::error::{Result, error_code};
use crate::lister::{InstalledApplicationLister, InstalledApplicationRecord};
use serde::{Deserialize, Serialize};

/// Name under which the query is exposed to the calling layer
pub const METHOD_NAME: &str = "getInstalledApps";

/// Reply handed back across the boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum BridgeResponse {
    /// The query succeeded
    Resolved {
        /// User-installed applications
        apps: Vec<InstalledApplicationRecord>,
    },
    /// The query failed
    Rejected {
        /// Error category
        code: String,
        /// Underlying failure's message
        message: String,
    },
}

impl BridgeResponse {
    /// Whether the query succeeded
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }

    /// Serialize the reply
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

impl From<Result<Vec<InstalledApplicationRecord>>> for BridgeResponse {
    fn from(result: Result<Vec<InstalledApplicationRecord>>) -> Self {
        match result {
            Ok(apps) => Self::Resolved { apps },
            Err(e) => Self::Rejected {
                code: error_code(&e).to_string(),
                message: e.to_string(),
            },
        }
    }
}

/// Run the query, applying the lister's configured deadline if any
///
/// With a deadline the query runs on a worker thread.
pub fn query_with_deadline(
    lister: &InstalledApplicationLister,
) -> Result<Vec<InstalledApplicationRecord>> {
    match lister.options().timeout {
        Some(timeout) => lister
            .spawn_query()
            .and_then(|pending| pending.wait_timeout(timeout)),
        None => lister.list_installed_applications(),
    }
}

/// Run the installed application query for the calling layer
pub fn get_installed_apps(lister: &InstalledApplicationLister) -> BridgeResponse {
    tracing::debug!("{} invoked", METHOD_NAME);

    let result = query_with_deadline(lister);
    if let Err(e) = &result {
        tracing::error!("{} rejected: {}", METHOD_NAME, e);
    }
    BridgeResponse::from(result)
}
