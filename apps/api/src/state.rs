use std::sync::Arc;

use crate::artifacts::ArtifactResolver;
use crate::jobs::store::JobStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Job persistence. Default: PgJobStore.
    pub jobs: Arc<dyn JobStore>,
    /// Resume delivery across the object store and the legacy local files directory.
    pub resolver: Arc<ArtifactResolver>,
}
