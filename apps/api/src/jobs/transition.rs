use tracing::{info, warn};

use crate::errors::AppError;
use crate::jobs::status::JobStatus;
use crate::jobs::store::JobStore;
use crate::models::job::StatusChange;

/// Moves a job to `requested`.
///
/// The status is validated against the enumeration before storage is touched.
/// Reachability from the current state is NOT enforced; off-graph moves are logged only.
pub async fn transition(
    store: &dyn JobStore,
    job_id: i64,
    requested: &str,
) -> Result<StatusChange, AppError> {
    let status: JobStatus = requested.parse()?;

    let change = store
        .update_status(job_id, status)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    let previous = change.previous_status;
    if previous.is_terminal() && previous != status {
        warn!("Job {job_id} reopened from terminal status {previous} to {status}");
    } else if !previous.follows_graph(status) {
        warn!("Job {job_id} moved {previous} -> {status} outside the usual lifecycle");
    }
    info!("Job {job_id} status set to {status}");

    Ok(change)
}
