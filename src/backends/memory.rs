// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-memory collaborators
//!
//! Deterministic stand-ins for local runs and tests. None of them perform
//! I/O.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::debug;

use super::{ImageBuilder, ImageRegistry, ProfileRegistry, SecretBackend};
use crate::domain::{
    BuildContext, ImageUri, ProfileHandle, PullHandle, RepositoryName, SecretGenerationPolicy,
    SecretReference,
};
use crate::errors::{StackError, StackResult};

/// Secret backend that keeps entries in a map
///
/// References use the dynamic-reference token form, so the same name always
/// yields the same reference.
#[derive(Debug, Default)]
pub struct InMemorySecretBackend {
    entries: Mutex<BTreeMap<String, (SecretReference, SecretGenerationPolicy)>>,
    unavailable: Option<String>,
}

impl InMemorySecretBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that fails every request with `reason`
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            entries: Mutex::default(),
            unavailable: Some(reason.into()),
        }
    }

    /// Names of registered entries
    pub fn names(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Policy an entry was generated with
    pub fn policy_of(&self, name: &str) -> Option<SecretGenerationPolicy> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(name).map(|(_, policy)| policy.clone()))
    }
}

#[async_trait]
impl SecretBackend for InMemorySecretBackend {
    async fn generate(
        &self,
        name: &str,
        policy: &SecretGenerationPolicy,
    ) -> StackResult<SecretReference> {
        if let Some(reason) = &self.unavailable {
            return Err(StackError::SecretBackend(reason.clone()));
        }
        policy.validate()?;

        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StackError::SecretBackend(e.to_string()))?;
        if let Some((reference, _)) = entries.get(name) {
            debug!("Secret {} already registered", name);
            return Ok(reference.clone());
        }

        let reference = SecretReference::dynamic(name)?;
        entries.insert(name.to_string(), (reference.clone(), policy.clone()));
        debug!("Registered secret {}", name);
        Ok(reference)
    }
}

/// Profile registry backed by a fixed set of profiles
#[derive(Debug, Clone, Default)]
pub struct StaticProfileRegistry {
    profiles: HashMap<String, ProfileHandle>,
}

impl StaticProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, profile: ProfileHandle) -> Self {
        self.profiles.insert(profile.name.clone(), profile);
        self
    }
}

#[async_trait]
impl ProfileRegistry for StaticProfileRegistry {
    async fn lookup(&self, name: &str) -> StackResult<Option<ProfileHandle>> {
        Ok(self.profiles.get(name).cloned())
    }
}

/// Build service that answers with pre-registered URIs per directory
#[derive(Debug, Clone, Default)]
pub struct StaticImageBuilder {
    images: HashMap<PathBuf, ImageUri>,
}

impl StaticImageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, directory: impl Into<PathBuf>, uri: ImageUri) -> Self {
        self.images.insert(directory.into(), uri);
        self
    }
}

#[async_trait]
impl ImageBuilder for StaticImageBuilder {
    async fn build_and_push(&self, context: &BuildContext) -> StackResult<ImageUri> {
        self.images.get(context.directory()).cloned().ok_or_else(|| {
            StackError::ImageBuild(format!(
                "no build output for {}",
                context.directory().display()
            ))
        })
    }
}

/// Registry holding a set of repositories on one host
#[derive(Debug, Clone)]
pub struct InMemoryImageRegistry {
    registry_host: String,
    repositories: HashSet<RepositoryName>,
}

impl InMemoryImageRegistry {
    pub fn new(registry_host: impl Into<String>) -> Self {
        Self {
            registry_host: registry_host.into(),
            repositories: HashSet::new(),
        }
    }

    pub fn with_repository(mut self, repository: RepositoryName) -> Self {
        self.repositories.insert(repository);
        self
    }
}

#[async_trait]
impl ImageRegistry for InMemoryImageRegistry {
    async fn lookup(&self, repository: &RepositoryName) -> StackResult<Option<PullHandle>> {
        Ok(self
            .repositories
            .get(repository)
            .map(|name| PullHandle::new(&self.registry_host, name.clone())))
    }
}
