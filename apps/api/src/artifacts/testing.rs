//! Test doubles for the object store and the render service.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;

use crate::artifacts::reader::{ArtifactBody, ArtifactContent, ArtifactReader, StorageError};
use crate::render_client::{RenderError, RenderService};

/// Object store keyed by object key. Serves bodies as streams, like S3.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, Bytes>>,
    gets: AtomicUsize,
}

impl MemoryObjectStore {
    pub fn with(objects: &[(&str, &[u8])]) -> Self {
        let store = Self::default();
        {
            let mut map = store.objects.lock().unwrap();
            for (key, body) in objects {
                map.insert(key.to_string(), Bytes::copy_from_slice(body));
            }
        }
        store
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArtifactReader for MemoryObjectStore {
    async fn fetch(&self, key: &str) -> Result<ArtifactContent, StorageError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        let body = self
            .objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;
        Ok(ArtifactContent {
            length: Some(body.len() as u64),
            content_type: Some("binary/octet-stream".to_string()),
            body: ArtifactBody::Stream(Box::pin(stream::iter(vec![Ok::<_, std::io::Error>(body)]))),
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub enum RenderBehavior {
    /// Writes `<stem>.pdf` next to the source under the root.
    Compile,
    /// Answers success without producing a file.
    SucceedWithoutOutput,
    /// Answers with a non-success status.
    Fail,
    /// Cannot be reached.
    Unreachable,
}

/// Render service that counts invocations and acts on the local root directly.
pub struct FakeRenderer {
    root: PathBuf,
    behavior: RenderBehavior,
    calls: Mutex<Vec<String>>,
}

impl FakeRenderer {
    pub fn new(root: impl Into<PathBuf>, behavior: RenderBehavior) -> Arc<Self> {
        Arc::new(Self {
            root: root.into(),
            behavior,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RenderService for FakeRenderer {
    async fn compile(&self, source_path: &str) -> Result<(), RenderError> {
        self.calls.lock().unwrap().push(source_path.to_string());
        match self.behavior {
            RenderBehavior::Compile => {
                let source = self.root.join(source_path);
                let markup = tokio::fs::read(&source)
                    .await
                    .map_err(|e| RenderError::CompilationFailed(e.to_string()))?;
                let mut rendered = b"%PDF-1.7\n".to_vec();
                rendered.extend_from_slice(&markup);
                tokio::fs::write(source.with_extension("pdf"), rendered)
                    .await
                    .map_err(|e| RenderError::CompilationFailed(e.to_string()))
            }
            RenderBehavior::SucceedWithoutOutput => Ok(()),
            RenderBehavior::Fail => Err(RenderError::CompilationFailed(
                "render service returned 500 Internal Server Error".to_string(),
            )),
            RenderBehavior::Unreachable => {
                Err(RenderError::Unavailable("connection refused".to_string()))
            }
        }
    }
}
