// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resolution Collaborators
//!
//! External services the composer consults before it can declare anything.
//! Each is a narrow async trait so the composer can run against in-memory
//! implementations in tests and against NATS request/reply services in
//! production.
//!
//! # Collaborators
//!
//! ```text
//! SecretBackend    policy        → SecretReference
//! ProfileRegistry  profile name  → ProfileHandle | not found
//! ImageBuilder     build context → digest-qualified ImageUri
//! ImageRegistry    repository    → PullHandle | not found
//! ```
//!
//! Lookups report "not found" as `Ok(None)`; the composer turns that into the
//! matching fatal [`StackError`](crate::StackError) variant. Transport and
//! backend failures are returned as errors and carried verbatim.

use async_trait::async_trait;

use crate::domain::{
    BuildContext, ImageUri, ProfileHandle, PullHandle, RepositoryName, SecretGenerationPolicy,
    SecretReference,
};
use crate::errors::StackResult;

pub mod memory;
pub mod nats;

pub use memory::{
    InMemoryImageRegistry, InMemorySecretBackend, StaticImageBuilder, StaticProfileRegistry,
};
pub use nats::NatsCollaborators;

/// Credential store that generates secrets and hands back references
#[async_trait]
pub trait SecretBackend: Send + Sync {
    /// Register a generated secret under `name`
    ///
    /// Registering the same name again returns the existing reference; the
    /// value is written once.
    async fn generate(
        &self,
        name: &str,
        policy: &SecretGenerationPolicy,
    ) -> StackResult<SecretReference>;
}

/// Registry of pre-existing datastore parameter profiles
#[async_trait]
pub trait ProfileRegistry: Send + Sync {
    async fn lookup(&self, name: &str) -> StackResult<Option<ProfileHandle>>;
}

/// Container build-and-push service
#[async_trait]
pub trait ImageBuilder: Send + Sync {
    async fn build_and_push(&self, context: &BuildContext) -> StackResult<ImageUri>;
}

/// Image registry that resolves repository names to pull handles
#[async_trait]
pub trait ImageRegistry: Send + Sync {
    async fn lookup(&self, repository: &RepositoryName) -> StackResult<Option<PullHandle>>;
}
