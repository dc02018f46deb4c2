//! Deferred queries
//!
//! The query itself is blocking. Callers on a thread that must stay responsive
//! start it on a worker thread and collect the result later, optionally with a
//! deadline. A query that misses its deadline keeps running in the background;
//! its result is discarded.

use super::query::InstalledApplicationLister;
use super::record::InstalledApplicationRecord;
use crate::error::{AppListerError, Result};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

type QueryResult = Result<Vec<InstalledApplicationRecord>>;

/// A query running on a worker thread
#[derive(Debug)]
pub struct PendingQuery {
    receiver: Receiver<QueryResult>,
    handle: JoinHandle<()>,
}

impl PendingQuery {
    pub(crate) fn spawn(lister: InstalledApplicationLister) -> Result<Self> {
        let (tx, receiver) = mpsc::sync_channel(1);
        let handle = thread::Builder::new()
            .name("installed-apps-query".to_string())
            .spawn(move || {
                let result = lister.list_installed_applications();
                // Receiver is gone when the caller gave up waiting
                if tx.send(result).is_err() {
                    tracing::debug!("Query finished after its caller stopped waiting");
                }
            })?;

        Ok(Self { receiver, handle })
    }

    /// Whether the worker has finished
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the query completes
    pub fn wait(self) -> QueryResult {
        self.receiver
            .recv()
            .map_err(|_| AppListerError::WorkerLost)?
    }

    /// Block until the query completes or `timeout` elapses
    pub fn wait_timeout(self, timeout: Duration) -> QueryResult {
        match self.receiver.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!("Installed application query exceeded {:?}", timeout);
                Err(AppListerError::Timeout(timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(AppListerError::WorkerLost),
        }
    }

    /// Take the result if the query has completed, without blocking
    ///
    /// Yields the result once; later calls report [`AppListerError::WorkerLost`].
    pub fn try_result(&self) -> Option<QueryResult> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(AppListerError::WorkerLost)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{PanickingRegistry, SlowRegistry, sample_registry};
    use std::sync::Arc;

    #[test]
    fn test_spawned_query_matches_blocking_query() {
        let lister = InstalledApplicationLister::new(Arc::new(sample_registry()));
        let expected = lister.list_installed_applications().unwrap();

        let pending = lister.spawn_query().unwrap();
        assert_eq!(pending.wait().unwrap(), expected);
    }

    #[test]
    fn test_wait_timeout_expires() {
        let registry = SlowRegistry::new(sample_registry(), Duration::from_millis(500));
        let lister = InstalledApplicationLister::new(Arc::new(registry));

        let pending = lister.spawn_query().unwrap();
        let err = pending.wait_timeout(Duration::from_millis(20)).unwrap_err();
        assert!(matches!(err, AppListerError::Timeout(d) if d == Duration::from_millis(20)));
    }

    #[test]
    fn test_wait_timeout_completes_in_time() {
        let lister = InstalledApplicationLister::new(Arc::new(sample_registry()));
        let pending = lister.spawn_query().unwrap();
        let apps = pending.wait_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(apps.len(), 3);
    }

    #[test]
    fn test_try_result_polls() {
        let registry = SlowRegistry::new(sample_registry(), Duration::from_millis(100));
        let lister = InstalledApplicationLister::new(Arc::new(registry));
        let pending = lister.spawn_query().unwrap();

        assert!(pending.try_result().is_none());

        let mut result = None;
        for _ in 0..100 {
            if let Some(r) = pending.try_result() {
                result = Some(r);
                break;
            }
            thread::sleep(Duration::from_millis(20));
        }
        assert_eq!(result.expect("query should finish").unwrap().len(), 3);
    }

    #[test]
    fn test_wait_reports_lost_worker() {
        let lister = InstalledApplicationLister::new(Arc::new(PanickingRegistry));
        let err = lister.spawn_query().unwrap().wait().unwrap_err();
        assert!(matches!(err, AppListerError::WorkerLost));
    }

    #[test]
    fn test_wait_timeout_reports_lost_worker() {
        let lister = InstalledApplicationLister::new(Arc::new(PanickingRegistry));
        let err = lister
            .spawn_query()
            .unwrap()
            .wait_timeout(Duration::from_secs(5))
            .unwrap_err();
        assert!(matches!(err, AppListerError::WorkerLost));
    }
}
