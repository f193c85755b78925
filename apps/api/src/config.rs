use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::artifacts::locator::LocatorConfig;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: Option<String>,
    pub aws_region: String,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    /// Root directory that legacy local artifact paths are relative to.
    pub files_base_path: PathBuf,
    pub legacy_path_prefixes: Vec<String>,
    pub object_store_scheme: String,
    pub latex_service_url: String,
    pub render_timeout: Duration,
    pub source_extension: String,
    pub rendered_extension: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: optional_env("S3_ENDPOINT"),
            aws_region: env_or("AWS_REGION", "us-east-1"),
            aws_access_key_id: optional_env("AWS_ACCESS_KEY_ID"),
            aws_secret_access_key: optional_env("AWS_SECRET_ACCESS_KEY"),
            files_base_path: PathBuf::from(env_or("FILES_BASE_PATH", "./local_files")),
            legacy_path_prefixes: parse_prefixes(&env_or("LEGACY_PATH_PREFIXES", "/files/")),
            object_store_scheme: env_or("OBJECT_STORE_SCHEME", "s3://"),
            latex_service_url: env_or("LATEX_SERVICE_URL", "http://localhost:3001"),
            render_timeout: Duration::from_secs(
                env_or("RENDER_TIMEOUT_SECS", "120")
                    .parse::<u64>()
                    .context("RENDER_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            source_extension: env_or("SOURCE_EXTENSION", "tex"),
            rendered_extension: env_or("RENDERED_EXTENSION", "pdf"),
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    /// The slice of configuration the artifact locator needs.
    pub fn locator_config(&self) -> LocatorConfig {
        LocatorConfig {
            store_scheme: self.object_store_scheme.clone(),
            legacy_prefixes: self.legacy_path_prefixes.clone(),
            source_extension: self.source_extension.clone(),
            rendered_extension: self.rendered_extension.clone(),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_prefixes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
