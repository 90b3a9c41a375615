// Copyright (c) 2025 - Cowboy AI, Inc.
//! Container Image Reference Value Objects
//!
//! A locally built image is pushed by the build service and comes back as a
//! digest-qualified URI:
//!
//! ```text
//! registry-host/path/to/repo@sha256:<digest>[:tag]
//! ```
//!
//! The repository name is derived from that URI by dropping the digest
//! (everything from `@`), then the registry host (first `/` segment), then
//! any tag (everything after the final `:`). An empty or malformed result
//! is an error, never a silent fallback.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::invariants::ValidationError;

/// Image reference validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("Image URI is empty")]
    Empty,

    #[error("Image URI is not digest-qualified (no '@'): {0}")]
    MissingDigest(String),

    #[error("Image URI has an empty digest: {0}")]
    EmptyDigest(String),

    #[error("Image URI has no repository path after the registry host: {0}")]
    EmptyRepositoryName(String),

    #[error("Invalid repository name: {0}")]
    InvalidRepositoryName(String),
}

/// Digest-qualified image URI produced by the build service
///
/// # Examples
///
/// ```rust
/// use cim_environment_stack::domain::ImageUri;
///
/// let uri = ImageUri::new("123.dkr.ecr.region.amazonaws.com/myapp@sha256:abcd:latest").unwrap();
/// assert_eq!(uri.registry_host(), "123.dkr.ecr.region.amazonaws.com");
/// assert_eq!(uri.digest(), "sha256:abcd:latest");
/// assert_eq!(uri.repository_name().unwrap().as_str(), "myapp");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageUri(String);

impl ImageUri {
    /// Parse a digest-qualified URI
    ///
    /// # Invariants
    /// - Non-empty
    /// - Contains `@` followed by a non-empty digest
    pub fn new(uri: impl Into<String>) -> Result<Self, ImageError> {
        let uri = uri.into();
        if uri.is_empty() {
            return Err(ImageError::Empty);
        }
        match uri.split_once('@') {
            None => Err(ImageError::MissingDigest(uri)),
            Some((_, digest)) if digest.is_empty() => Err(ImageError::EmptyDigest(uri)),
            Some(_) => Ok(Self(uri)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Portion before the digest
    fn locator(&self) -> &str {
        self.0.split('@').next().unwrap_or_default()
    }

    /// First path segment (registry host, possibly with port)
    pub fn registry_host(&self) -> &str {
        self.locator().split('/').next().unwrap_or_default()
    }

    /// Everything after the first `@`
    pub fn digest(&self) -> &str {
        self.0.split_once('@').map(|(_, d)| d).unwrap_or_default()
    }

    /// Derive the canonical repository name
    pub fn repository_name(&self) -> Result<RepositoryName, ImageError> {
        derive_repository_name(self.as_str())
    }
}

impl fmt::Display for ImageUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ImageUri {
    type Error = ImageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ImageUri> for String {
    fn from(uri: ImageUri) -> Self {
        uri.0
    }
}

/// Derive a repository name from a digest-qualified image URI
///
/// 1. Take the portion before the first `@` (strip digest)
/// 2. Split on `/`, discard the first segment (registry host), rejoin
/// 3. Take the portion before the final `:` (strip tag)
pub fn derive_repository_name(uri: &str) -> Result<RepositoryName, ImageError> {
    let (locator, digest) = uri
        .split_once('@')
        .ok_or_else(|| ImageError::MissingDigest(uri.to_string()))?;
    if digest.is_empty() {
        return Err(ImageError::EmptyDigest(uri.to_string()));
    }

    let path = locator.split('/').skip(1).collect::<Vec<_>>().join("/");
    let name = match path.rsplit_once(':') {
        Some((name, _tag)) => name,
        None => path.as_str(),
    };

    if name.is_empty() {
        return Err(ImageError::EmptyRepositoryName(uri.to_string()));
    }
    RepositoryName::new(name)
}

/// Registry repository name (host, digest and tag stripped)
///
/// # Invariants
/// - Non-empty
/// - `/`-separated segments, each non-empty
/// - Segments contain only `[a-z0-9._-]` and start with an alphanumeric
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepositoryName(String);

impl RepositoryName {
    pub fn new(name: impl Into<String>) -> Result<Self, ImageError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ImageError::InvalidRepositoryName(name));
        }
        let segment_ok = |segment: &str| {
            segment.starts_with(|c: char| c.is_ascii_lowercase() || c.is_ascii_digit())
                && segment.chars().all(|c| {
                    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-')
                })
        };
        if !name.split('/').all(segment_ok) {
            return Err(ImageError::InvalidRepositoryName(name));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepositoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RepositoryName {
    type Error = ImageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RepositoryName> for String {
    fn from(name: RepositoryName) -> Self {
        name.0
    }
}

/// Local directory handed to the build service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildContext {
    directory: PathBuf,
}

impl BuildContext {
    /// # Invariants
    /// - Absolute path
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self, ValidationError> {
        let directory = directory.into();
        if directory.as_os_str().is_empty() {
            return Err(ValidationError::Empty("build directory"));
        }
        if !directory.is_absolute() {
            return Err(ValidationError::RelativeBuildDirectory(
                directory.display().to_string(),
            ));
        }
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

/// Registry-bound handle the compute service pulls from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PullHandle {
    /// Repository name as known to the registry
    pub repository: RepositoryName,

    /// Fully qualified repository URI (`host/name`)
    pub repository_uri: String,

    /// Tag pulled by the service
    pub tag: String,
}

impl PullHandle {
    /// Tag used when importing a repository by name
    pub const DEFAULT_TAG: &'static str = "latest";

    /// Handle for `repository` hosted at `registry_host`, pulling the default tag
    pub fn new(registry_host: &str, repository: RepositoryName) -> Self {
        Self {
            repository_uri: format!("{}/{}", registry_host, repository),
            repository,
            tag: Self::DEFAULT_TAG.to_string(),
        }
    }

    /// `repository_uri:tag`
    pub fn image_reference(&self) -> String {
        format!("{}:{}", self.repository_uri, self.tag)
    }
}

/// Image asset entry in the declaration tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub logical_id: String,
    pub build_context: BuildContext,
    pub image_uri: ImageUri,
    pub repository: RepositoryName,
}

/// Repository import entry in the declaration tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryImport {
    pub logical_id: String,
    pub handle: PullHandle,
}
