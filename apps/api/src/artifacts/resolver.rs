//! Resume delivery: resolves a job's artifact across both backends.
//!
//! Flow: job row → classify `artifact_path` → dispatch to the backend reader →
//!       (local + rendered + miss) compile once via the render service → re-read once.
//!
//! The rendered file on local disk is the cache. Once compiled it stays next to
//! the source and later requests are served by the reader without compiling.
//! Artifacts never change after `artifact_path` is set, so nothing is evicted.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::artifacts::local::LocalFileReader;
use crate::artifacts::locator::{basename, ArtifactFormat, ArtifactKeys, ArtifactLocator, ArtifactRef};
use crate::artifacts::reader::{ArtifactContent, ArtifactReader, StorageError};
use crate::errors::AppError;
use crate::models::job::JobRow;
use crate::render_client::RenderService;

/// A resolved artifact, ready to be sent.
#[derive(Debug)]
pub struct Delivery {
    pub content: ArtifactContent,
    pub filename: String,
    pub format: ArtifactFormat,
}

impl Delivery {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}

#[derive(Clone)]
pub struct ArtifactResolver {
    locator: ArtifactLocator,
    object_store: Arc<dyn ArtifactReader>,
    local: LocalFileReader,
    renderer: Arc<dyn RenderService>,
}

impl ArtifactResolver {
    pub fn new(
        locator: ArtifactLocator,
        object_store: Arc<dyn ArtifactReader>,
        local: LocalFileReader,
        renderer: Arc<dyn RenderService>,
    ) -> Self {
        Self {
            locator,
            object_store,
            local,
            renderer,
        }
    }

    pub async fn resolve(&self, job: &JobRow, format: ArtifactFormat) -> Result<Delivery, AppError> {
        let path = job
            .artifact_path
            .as_deref()
            .ok_or_else(|| AppError::NotFound(format!("Resume for job {} not found", job.id)))?;

        if !job.status.expects_artifact() {
            warn!(
                "Job {} has artifact path recorded while in status '{}'",
                job.id, job.status
            );
        }

        let reference = self.locator.classify(path)?;
        let key = reference.key(format);
        debug!(
            "Job {} resolved to {} key '{}' ({})",
            job.id,
            reference.backend(),
            key,
            format.as_str()
        );

        let content = match &reference {
            ArtifactRef::ObjectStore(_) => self.object_store.fetch(key).await?,
            ArtifactRef::Local(keys) => self.fetch_local(keys, format).await?,
        };

        if let Some(reported) = content.content_type.as_deref() {
            debug!("Backend reported content type '{reported}' for '{key}'");
        }

        Ok(Delivery {
            filename: basename(key).to_string(),
            content,
            format,
        })
    }

    async fn fetch_local(
        &self,
        keys: &ArtifactKeys,
        format: ArtifactFormat,
    ) -> Result<ArtifactContent, AppError> {
        match self.local.fetch(keys.get(format)).await {
            Err(StorageError::NotFound(_)) if format == ArtifactFormat::Rendered => {}
            other => return Ok(other?),
        }

        // Nothing to compile from.
        if !self.local.exists(&keys.source).await? {
            return Err(AppError::NotFound(format!(
                "Resume source {} not found",
                keys.source
            )));
        }

        info!(
            "Rendered artifact {} missing; compiling {}",
            keys.rendered, keys.source
        );
        self.renderer.compile(&keys.source).await?;

        // At most one compile per request: a second miss is a failed compile, not a retry.
        match self.local.fetch(&keys.rendered).await {
            Ok(content) => Ok(content),
            Err(StorageError::NotFound(_)) => Err(AppError::RenderCompilationFailed(format!(
                "{} still missing after compiling {}",
                keys.rendered, keys.source
            ))),
            Err(e) => Err(e.into()),
        }
    }
}
