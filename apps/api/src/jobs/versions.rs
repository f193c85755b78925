//! Version Resolver: every attempt at one `(owner, company, role)` identity.

use crate::errors::AppError;
use crate::jobs::store::JobStore;
use crate::models::job::JobVersionRow;

/// All attempts, highest version first. Empty when the identity has no rows.
pub async fn versions(
    store: &dyn JobStore,
    owner: &str,
    company: &str,
    role: &str,
) -> Result<Vec<JobVersionRow>, AppError> {
    let mut rows = store.list_versions(owner, company, role).await?;
    rows.sort_by(|a, b| b.version.cmp(&a.version));
    Ok(rows)
}

/// The latest attempt in a list produced by [`versions`].
pub fn latest(versions: &[JobVersionRow]) -> Option<&JobVersionRow> {
    versions.iter().max_by_key(|v| v.version)
}
