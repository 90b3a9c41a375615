// Copyright (c) 2025 - Cowboy AI, Inc.
//! Provisioning engine reached over NATS request/reply

use async_trait::async_trait;
use tracing::{info, warn};

use super::{DeploymentReceipt, ProvisioningEngine, StackSubmission};
use crate::errors::{StackError, StackResult};
use crate::nats::{NatsClient, Reply};
use crate::subjects::StackSubjects;

/// Submits declarations on `stack.engine.submit`
///
/// The engine answers with a [`Reply`] carrying a [`DeploymentReceipt`].
#[derive(Clone)]
pub struct NatsProvisioningEngine {
    client: NatsClient,
    subject: String,
}

impl NatsProvisioningEngine {
    pub fn new(client: NatsClient) -> Self {
        Self::with_subjects(client, &StackSubjects::default())
    }

    pub fn with_subjects(client: NatsClient, subjects: &StackSubjects) -> Self {
        Self {
            client,
            subject: subjects.engine_submit.clone(),
        }
    }
}

#[async_trait]
impl ProvisioningEngine for NatsProvisioningEngine {
    async fn submit(&self, submission: &StackSubmission) -> StackResult<DeploymentReceipt> {
        info!(
            "Submitting stack {} ({} resources) as {}",
            submission.stack.name,
            submission.stack.resources().len(),
            submission.submission_id
        );

        let reply: Reply<DeploymentReceipt> = self.client.request(&self.subject, submission).await?;
        match reply {
            Reply::Ok { value } => Ok(value),
            Reply::NotFound => Err(StackError::Engine(format!(
                "no engine accepted submission {}",
                submission.submission_id
            ))),
            Reply::Error { message } => {
                warn!("Engine rejected stack {}: {}", submission.stack.name, message);
                Err(StackError::Engine(message))
            }
        }
    }
}
