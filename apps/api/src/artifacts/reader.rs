use std::fmt;
use std::io;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
#[cfg(test)]
use futures::TryStreamExt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("artifact not found: {0}")]
    NotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Artifact bytes, either fully buffered (local files) or streamed (object store).
pub enum ArtifactBody {
    Bytes(Bytes),
    Stream(BoxStream<'static, io::Result<Bytes>>),
}

impl ArtifactBody {
    /// Drains the body into memory.
    #[cfg(test)]
    pub async fn collect(self) -> io::Result<Bytes> {
        match self {
            ArtifactBody::Bytes(bytes) => Ok(bytes),
            ArtifactBody::Stream(stream) => {
                let chunks: Vec<Bytes> = stream.try_collect().await?;
                Ok(chunks.concat().into())
            }
        }
    }
}

impl fmt::Debug for ArtifactBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactBody::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            ArtifactBody::Stream(_) => f.write_str("Stream"),
        }
    }
}

#[derive(Debug)]
pub struct ArtifactContent {
    pub body: ArtifactBody,
    /// Content type reported by the backend, if any.
    pub content_type: Option<String>,
    pub length: Option<u64>,
}

impl ArtifactContent {
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        ArtifactContent {
            length: Some(bytes.len() as u64),
            body: ArtifactBody::Bytes(bytes),
            content_type: None,
        }
    }
}

/// Read side of an artifact backend. Implementations never write.
///
/// `key` is already backend-specific: an object key for the object store,
/// a root-relative path for the local filesystem.
#[async_trait]
pub trait ArtifactReader: Send + Sync {
    async fn fetch(&self, key: &str) -> Result<ArtifactContent, StorageError>;
}
