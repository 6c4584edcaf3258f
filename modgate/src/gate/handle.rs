//! Handle to a running update check.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::error::GateError;
use super::report::UpdateReport;

/// Handle to the update check started by [`Gate::on_load`](super::Gate::on_load).
///
/// Dropping the handle does not stop the check; call [`cancel`](Self::cancel).
pub struct UpdateHandle {
    task: JoinHandle<UpdateReport>,
    cancellation: CancellationToken,
}

impl UpdateHandle {
    pub(super) fn new(task: JoinHandle<UpdateReport>, cancellation: CancellationToken) -> Self {
        Self { task, cancellation }
    }

    /// Ask the check to stop at its next checkpoint.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub fn cancellation(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the check to finish.
    pub async fn wait(self) -> Result<UpdateReport, GateError> {
        self.task
            .await
            .map_err(|e| GateError::TaskFailed(e.to_string()))
    }
}

/// Marks an update check as running for as long as it is alive.
pub(super) struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlightGuard {
    /// Claim the flag, or `None` if another check holds it.
    pub(super) fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
