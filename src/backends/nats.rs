// Copyright (c) 2025 - Cowboy AI, Inc.
//! NATS request/reply collaborators
//!
//! Each collaborator is a service answering JSON requests on its subject
//! (see [`crate::subjects`]) with a [`Reply`] envelope.
//!
//! | Trait             | Subject                  | Request               |
//! |-------------------|--------------------------|-----------------------|
//! | `SecretBackend`   | `stack.secrets.generate` | [`GenerateSecret`]    |
//! | `ProfileRegistry` | `stack.profiles.lookup`  | [`LookupProfile`]     |
//! | `ImageBuilder`    | `stack.images.build`     | [`BuildImage`]        |
//! | `ImageRegistry`   | `stack.registry.lookup`  | [`LookupRepository`]  |

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

use super::{ImageBuilder, ImageRegistry, ProfileRegistry, SecretBackend};
use crate::domain::{
    BuildContext, ImageUri, ProfileHandle, PullHandle, RepositoryName, SecretGenerationPolicy,
    SecretReference,
};
use crate::errors::{StackError, StackResult};
use crate::nats::{NatsClient, Reply};
use crate::subjects::StackSubjects;

/// Request body for `secrets.generate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateSecret {
    pub name: String,
    pub policy: SecretGenerationPolicy,
}

/// Request body for `profiles.lookup`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupProfile {
    pub name: String,
}

/// Request body for `images.build`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildImage {
    pub directory: PathBuf,
}

/// Request body for `registry.lookup`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRepository {
    pub repository: RepositoryName,
}

/// All resolution collaborators reached through one NATS connection
#[derive(Clone)]
pub struct NatsCollaborators {
    client: NatsClient,
    subjects: StackSubjects,
}

impl NatsCollaborators {
    pub fn new(client: NatsClient) -> Self {
        Self::with_subjects(client, StackSubjects::default())
    }

    pub fn with_subjects(client: NatsClient, subjects: StackSubjects) -> Self {
        Self { client, subjects }
    }

    pub fn subjects(&self) -> &StackSubjects {
        &self.subjects
    }

    async fn call<T, R>(&self, subject: &str, request: &T) -> StackResult<Reply<R>>
    where
        T: Serialize + Sync,
        R: for<'de> Deserialize<'de>,
    {
        debug!("Requesting {}", subject);
        self.client.request(subject, request).await
    }
}

/// Map a reply where "not found" is a valid answer
fn optional<R>(reply: Reply<R>, to_error: fn(String) -> StackError) -> StackResult<Option<R>> {
    match reply {
        Reply::Ok { value } => Ok(Some(value)),
        Reply::NotFound => Ok(None),
        Reply::Error { message } => Err(to_error(message)),
    }
}

/// Map a reply where "not found" is itself a failure
fn required<R>(
    reply: Reply<R>,
    what: &str,
    to_error: fn(String) -> StackError,
) -> StackResult<R> {
    optional(reply, to_error)?.ok_or_else(|| to_error(format!("{} not found", what)))
}

#[async_trait]
impl SecretBackend for NatsCollaborators {
    async fn generate(
        &self,
        name: &str,
        policy: &SecretGenerationPolicy,
    ) -> StackResult<SecretReference> {
        let request = GenerateSecret {
            name: name.to_string(),
            policy: policy.clone(),
        };
        let reply = self.call(&self.subjects.secrets_generate, &request).await?;
        required(reply, name, StackError::SecretBackend)
    }
}

#[async_trait]
impl ProfileRegistry for NatsCollaborators {
    async fn lookup(&self, name: &str) -> StackResult<Option<ProfileHandle>> {
        let request = LookupProfile {
            name: name.to_string(),
        };
        let reply = self.call(&self.subjects.profiles_lookup, &request).await?;
        optional(reply, StackError::Registry)
    }
}

#[async_trait]
impl ImageBuilder for NatsCollaborators {
    async fn build_and_push(&self, context: &BuildContext) -> StackResult<ImageUri> {
        let request = BuildImage {
            directory: context.directory().to_path_buf(),
        };
        let reply = self.call(&self.subjects.images_build, &request).await?;
        required(
            reply,
            &context.directory().display().to_string(),
            StackError::ImageBuild,
        )
    }
}

#[async_trait]
impl ImageRegistry for NatsCollaborators {
    async fn lookup(&self, repository: &RepositoryName) -> StackResult<Option<PullHandle>> {
        let request = LookupRepository {
            repository: repository.clone(),
        };
        let reply = self.call(&self.subjects.registry_lookup, &request).await?;
        optional(reply, StackError::Registry)
    }
}
