use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::get_object::GetObjectError;
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::artifacts::reader::{ArtifactBody, ArtifactContent, ArtifactReader, StorageError};

/// Reads artifacts from the S3 bucket the generation pipeline uploads to.
///
/// The pipeline writes both variants up front, so a missing key is final:
/// no retry and no compile-on-miss here.
#[derive(Clone)]
pub struct S3ArtifactReader {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ArtifactReader {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl ArtifactReader for S3ArtifactReader {
    async fn fetch(&self, key: &str) -> Result<ArtifactContent, StorageError> {
        debug!("GET s3://{}/{}", self.bucket, key);

        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_get_error(key, e))?;

        let content_type = output.content_type().map(str::to_string);
        let length = output.content_length().and_then(|l| u64::try_from(l).ok());
        // Dropping the stream drops the underlying connection.
        let stream = ReaderStream::new(output.body.into_async_read());

        Ok(ArtifactContent {
            body: ArtifactBody::Stream(Box::pin(stream)),
            content_type,
            length,
        })
    }
}

fn map_get_error<R>(key: &str, err: SdkError<GetObjectError, R>) -> StorageError
where
    R: std::fmt::Debug,
{
    // Some S3-compatible stores answer a missing key with a bare `NotFound` code.
    let missing = err
        .as_service_error()
        .map(|e| e.is_no_such_key() || e.code() == Some("NotFound"))
        .unwrap_or(false);
    if missing {
        StorageError::NotFound(key.to_string())
    } else {
        StorageError::Backend(DisplayErrorContext(err).to_string())
    }
}
