// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for stack composition

use thiserror::Error;

use crate::domain::{ImageError, ValidationError};

/// Broad classification of a [`StackError`]
///
/// Every category is fatal to the composition; the classification only tells
/// the caller what has to be corrected before re-invoking it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// A named external entity (profile, repository) does not exist
    Resolution,
    /// A derived value (repository name, bounds, shapes) is invalid
    Derivation,
    /// An external collaborator failed or rejected the request
    External,
    /// Caller-supplied configuration could not be loaded
    Configuration,
}

/// Errors that can occur while composing or submitting an environment stack
#[derive(Debug, Error)]
pub enum StackError {
    /// Datastore configuration profile not found in the registry
    #[error("Configuration profile not found: {0}")]
    ProfileNotFound(String),

    /// Derived repository name not found in the image registry
    #[error("Image repository not found in registry: {0}")]
    RepositoryNotFound(String),

    /// Image URI could not be turned into a repository name
    #[error("Image reference error: {0}")]
    Image(#[from] ImageError),

    /// Declared value violates a domain invariant
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Secret backend failure
    #[error("Secret backend error: {0}")]
    SecretBackend(String),

    /// Profile registry or image registry failure
    #[error("Registry error: {0}")]
    Registry(String),

    /// Container build/push failure
    #[error("Image build error: {0}")]
    ImageBuild(String),

    /// Provisioning engine rejected or failed to accept the declaration
    #[error("Provisioning engine error: {0}")]
    Engine(String),

    /// NATS transport error
    #[error("NATS error: {0}")]
    Nats(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl StackError {
    /// Classify this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            StackError::ProfileNotFound(_) | StackError::RepositoryNotFound(_) => {
                ErrorCategory::Resolution
            }
            StackError::Image(_) | StackError::Validation(_) => ErrorCategory::Derivation,
            StackError::SecretBackend(_)
            | StackError::Registry(_)
            | StackError::ImageBuild(_)
            | StackError::Engine(_)
            | StackError::Nats(_)
            | StackError::Serialization(_) => ErrorCategory::External,
            StackError::Configuration(_) => ErrorCategory::Configuration,
        }
    }
}

/// Result type for stack operations
pub type StackResult<T> = Result<T, StackError>;

impl From<async_nats::Error> for StackError {
    fn from(err: async_nats::Error) -> Self {
        StackError::Nats(err.to_string())
    }
}

impl From<serde_json::Error> for StackError {
    fn from(err: serde_json::Error) -> Self {
        StackError::Serialization(err.to_string())
    }
}
