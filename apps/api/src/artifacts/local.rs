use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::artifacts::reader::{ArtifactContent, ArtifactReader, StorageError};

/// Reads legacy artifacts from the shared local files directory.
#[derive(Debug, Clone)]
pub struct LocalFileReader {
    root: PathBuf,
}

impl LocalFileReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, relpath: &str) -> PathBuf {
        self.root.join(relpath)
    }

    pub async fn exists(&self, relpath: &str) -> Result<bool, StorageError> {
        Ok(tokio::fs::try_exists(self.resolve(relpath)).await?)
    }
}

#[async_trait]
impl ArtifactReader for LocalFileReader {
    async fn fetch(&self, key: &str) -> Result<ArtifactContent, StorageError> {
        let path = self.resolve(key);
        debug!("Reading local artifact {}", path.display());

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(ArtifactContent::from_bytes(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound(key.to_string())),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}
