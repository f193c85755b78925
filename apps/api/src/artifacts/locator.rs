//! Artifact Locator: turns a job's stored `artifact_path` into a backend-tagged reference.
//!
//! Two path shapes exist in the `jobs` table:
//!   - object store:  `s3://<bucket>/resumes/Acme/v1/Resume_Acme.tex`
//!   - legacy local:  `/files/output/Acme/v1/Resume_Acme.tex` (relative to `FILES_BASE_PATH`)
//!
//! Classification is pure. All I/O lives in the readers.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocateError {
    #[error("artifact path is empty")]
    Empty,

    #[error("unrecognized artifact path '{0}'")]
    Unrecognized(String),

    #[error("object store path '{0}' has no key after the bucket segment")]
    MissingKey(String),

    #[error("artifact path '{0}' escapes the local root")]
    Traversal(String),

    #[error("artifact path '{0}' has neither the source nor the rendered extension")]
    UnknownExtension(String),
}

/// Which of the two artifact variants the caller wants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArtifactFormat {
    /// Fixed-layout document produced from the source (PDF).
    #[default]
    Rendered,
    /// Editable markup the rendered form is compiled from (LaTeX).
    Source,
}

impl ArtifactFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ArtifactFormat::Rendered => "application/pdf",
            ArtifactFormat::Source => "text/plain",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactFormat::Rendered => "rendered",
            ArtifactFormat::Source => "source",
        }
    }
}

impl FromStr for ArtifactFormat {
    type Err = String;

    /// Accepts the dashboard's historical `pdf`/`tex` names as aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rendered" | "pdf" => Ok(ArtifactFormat::Rendered),
            "source" | "tex" => Ok(ArtifactFormat::Source),
            other => Err(format!(
                "Invalid format '{other}'. Must be one of: rendered, source"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    ObjectStore,
    Local,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::ObjectStore => f.write_str("object_store"),
            Backend::Local => f.write_str("local"),
        }
    }
}

/// The two candidate keys for one artifact, identical except for the extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactKeys {
    pub source: String,
    pub rendered: String,
}

impl ArtifactKeys {
    pub fn get(&self, format: ArtifactFormat) -> &str {
        match format {
            ArtifactFormat::Rendered => &self.rendered,
            ArtifactFormat::Source => &self.source,
        }
    }
}

/// A classified artifact path. Produced once per request, then dispatched on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactRef {
    /// Keys are object keys inside the configured bucket (no scheme, no bucket).
    ObjectStore(ArtifactKeys),
    /// Keys are paths relative to the configured local root.
    Local(ArtifactKeys),
}

impl ArtifactRef {
    pub fn backend(&self) -> Backend {
        match self {
            ArtifactRef::ObjectStore(_) => Backend::ObjectStore,
            ArtifactRef::Local(_) => Backend::Local,
        }
    }

    pub fn keys(&self) -> &ArtifactKeys {
        match self {
            ArtifactRef::ObjectStore(keys) | ArtifactRef::Local(keys) => keys,
        }
    }

    pub fn key(&self, format: ArtifactFormat) -> &str {
        self.keys().get(format)
    }
}

#[derive(Debug, Clone)]
pub struct LocatorConfig {
    /// Scheme prefix of object store paths, e.g. `s3://`.
    pub store_scheme: String,
    /// Prefixes stripped from legacy local paths, e.g. `/files/`.
    pub legacy_prefixes: Vec<String>,
    /// Extension of the source variant, without the dot.
    pub source_extension: String,
    /// Extension of the rendered variant, without the dot.
    pub rendered_extension: String,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        LocatorConfig {
            store_scheme: "s3://".to_string(),
            legacy_prefixes: vec!["/files/".to_string()],
            source_extension: "tex".to_string(),
            rendered_extension: "pdf".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactLocator {
    config: LocatorConfig,
}

impl ArtifactLocator {
    pub fn new(config: LocatorConfig) -> Self {
        Self { config }
    }

    /// Classifies a stored artifact path and derives both candidate keys.
    pub fn classify(&self, path: &str) -> Result<ArtifactRef, LocateError> {
        let path = path.trim();
        if path.is_empty() {
            return Err(LocateError::Empty);
        }

        if let Some(rest) = path.strip_prefix(self.config.store_scheme.as_str()) {
            let key = match rest.split_once('/') {
                Some((bucket, key)) if !bucket.is_empty() => key.trim_start_matches('/'),
                _ => return Err(LocateError::MissingKey(path.to_string())),
            };
            if key.is_empty() {
                return Err(LocateError::MissingKey(path.to_string()));
            }
            reject_traversal(path, key)?;
            return Ok(ArtifactRef::ObjectStore(self.keys_for(path, key)?));
        }

        // Any other URL scheme is not something we know how to read.
        if path.contains("://") {
            return Err(LocateError::Unrecognized(path.to_string()));
        }

        let relpath = match self
            .config
            .legacy_prefixes
            .iter()
            .find_map(|prefix| path.strip_prefix(prefix.as_str()))
        {
            Some(stripped) => stripped.trim_start_matches('/'),
            // An absolute path outside every legacy prefix is not under the local root.
            None if path.starts_with('/') => {
                return Err(LocateError::Unrecognized(path.to_string()))
            }
            None => path,
        };
        if relpath.is_empty() {
            return Err(LocateError::Unrecognized(path.to_string()));
        }
        reject_traversal(path, relpath)?;

        Ok(ArtifactRef::Local(self.keys_for(path, relpath)?))
    }

    /// Swaps the extension of `key` to the one matching `format`.
    pub fn with_format(&self, key: &str, format: ArtifactFormat) -> Option<String> {
        let stem = self.stem(key)?;
        let ext = match format {
            ArtifactFormat::Rendered => &self.config.rendered_extension,
            ArtifactFormat::Source => &self.config.source_extension,
        };
        Some(format!("{stem}.{ext}"))
    }

    fn keys_for(&self, path: &str, key: &str) -> Result<ArtifactKeys, LocateError> {
        let unknown = || LocateError::UnknownExtension(path.to_string());
        Ok(ArtifactKeys {
            source: self
                .with_format(key, ArtifactFormat::Source)
                .ok_or_else(unknown)?,
            rendered: self
                .with_format(key, ArtifactFormat::Rendered)
                .ok_or_else(unknown)?,
        })
    }

    fn stem<'a>(&self, key: &'a str) -> Option<&'a str> {
        [&self.config.source_extension, &self.config.rendered_extension]
            .into_iter()
            .find_map(|ext| {
                key.strip_suffix(ext.as_str())
                    .and_then(|s| s.strip_suffix('.'))
            })
            .filter(|stem| !stem.is_empty() && !stem.ends_with('/'))
    }
}

fn reject_traversal(path: &str, key: &str) -> Result<(), LocateError> {
    if key.split('/').any(|segment| segment == "..") {
        return Err(LocateError::Traversal(path.to_string()));
    }
    Ok(())
}

/// Last path segment of a key, used as the download filename.
pub fn basename(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}
