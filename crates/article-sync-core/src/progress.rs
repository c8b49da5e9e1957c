//! Progress events emitted by the load and sync stages.
//!
//! Only the reporting trait lives here; the stderr and JSON reporters are in
//! the application crate.

use std::path::PathBuf;

/// A single progress event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncProgressEvent {
    /// Source files in this directory are being loaded. Total unknown.
    Loading { dir: PathBuf },
    /// `n` of `total` articles have been written.
    Syncing { n: u64, total: u64 },
    /// Stale articles were removed during reconciliation.
    Reconciled { deleted: u64 },
}

pub trait SyncProgressReporter: Send + Sync {
    fn report(&self, event: SyncProgressEvent);
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl SyncProgressReporter for NoProgress {
    fn report(&self, _event: SyncProgressEvent) {}
}
