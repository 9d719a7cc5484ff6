//! Run an orchestrator from async code without blocking the executor.

use std::sync::Arc;

use crate::core::{Orchestrator, RunReport, SchedulerError};

/// Run `orchestrator` on tokio's blocking pool and await its report.
///
/// # Errors
///
/// Whatever [`Orchestrator::run`] returns, or `SchedulerError::DispatcherSpawn`
/// if the blocking task itself failed.
pub async fn run_async(orchestrator: Arc<Orchestrator>) -> Result<RunReport, SchedulerError> {
    tokio::task::spawn_blocking(move || orchestrator.run())
        .await
        .map_err(|e| SchedulerError::DispatcherSpawn(format!("blocking task failed: {e}")))?
}
