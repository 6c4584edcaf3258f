//! Gate errors.

use thiserror::Error;

/// Errors returned by the host-facing [`Gate`](super::Gate) API.
///
/// Failures inside the update flow itself are never returned here; they are
/// logged and recorded in the [`UpdateReport`](super::UpdateReport).
#[derive(Debug, Error)]
pub enum GateError {
    /// `on_load` was called while an update check is still running.
    #[error("an update check is already in progress")]
    UpdateInProgress,

    /// `on_load` was called outside a tokio runtime.
    #[error("no tokio runtime available to run the update check")]
    NoRuntime,

    /// The update task panicked or was aborted.
    #[error("update task failed: {0}")]
    TaskFailed(String),
}
