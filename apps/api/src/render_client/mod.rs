/// Render client: the single point of entry for calls to the LaTeX compile service.
///
/// The service compiles a `.tex` file that lives under the shared local files
/// directory and writes the `.pdf` next to it. It returns nothing we need
/// beyond the status code; callers check the filesystem afterward.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

const COMPILE_PATH: &str = "/compile";

#[derive(Debug, Error)]
pub enum RenderError {
    /// The service could not be reached (connect failure, timeout). Safe to retry.
    #[error("render service unavailable: {0}")]
    Unavailable(String),

    /// The service answered but did not produce a usable document.
    #[error("compilation failed: {0}")]
    CompilationFailed(String),
}

#[derive(Debug, Serialize)]
struct CompileRequest<'a> {
    file_path: &'a str,
}

/// Compiles a source artifact into its rendered form.
#[async_trait]
pub trait RenderService: Send + Sync {
    /// `source_path` is relative to the shared local files root.
    async fn compile(&self, source_path: &str) -> Result<(), RenderError>;
}

#[derive(Clone)]
pub struct LatexServiceClient {
    client: Client,
    base_url: String,
}

impl LatexServiceClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn compile_url(&self) -> String {
        format!("{}{}", self.base_url, COMPILE_PATH)
    }
}

#[async_trait]
impl RenderService for LatexServiceClient {
    async fn compile(&self, source_path: &str) -> Result<(), RenderError> {
        info!("Requesting compile of {source_path}");

        // Exactly one attempt. Callers re-issue the whole request on Unavailable.
        let response = self
            .client
            .post(self.compile_url())
            .json(&CompileRequest {
                file_path: source_path,
            })
            .send()
            .await
            .map_err(|e| {
                warn!("Render service unreachable: {e}");
                RenderError::Unavailable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RenderError::CompilationFailed(format!(
                "render service returned {status}: {body}"
            )));
        }

        Ok(())
    }
}
