// Copyright (c) 2025 - Cowboy AI, Inc.
//! Provisioning Engine Boundary
//!
//! The composed [`EnvironmentStack`] is handed to the provisioning engine
//! exactly once. Ordering, retries, readiness and rollback are the engine's
//! concern; this crate only submits and reports the engine's answer.
//!
//! # Architecture
//!
//! ```text
//! StackConfig → StackComposer::compose() → EnvironmentStack   (pure declaration)
//!                                               │
//!                                               ▼
//!                                        StackSubmission
//!                                               │
//!                                               ▼
//!                          ProvisioningEngine::submit() → DeploymentReceipt
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::domain::EnvironmentStack;
use crate::errors::{StackError, StackResult};

pub mod nats;

pub use nats::NatsProvisioningEngine;

/// Envelope carrying one stack declaration to the engine
///
/// The envelope identity changes per submission; the stack inside does not
/// for equal inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackSubmission {
    pub submission_id: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub stack: EnvironmentStack,
}

impl StackSubmission {
    pub fn new(stack: EnvironmentStack) -> Self {
        Self {
            submission_id: Uuid::now_v7(),
            submitted_at: Utc::now(),
            stack,
        }
    }
}

/// Engine acknowledgement of an accepted declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentReceipt {
    pub submission_id: Uuid,
    pub stack_name: String,
    pub resource_count: usize,
    pub accepted_at: DateTime<Utc>,
}

impl DeploymentReceipt {
    pub fn for_submission(submission: &StackSubmission) -> Self {
        Self {
            submission_id: submission.submission_id,
            stack_name: submission.stack.name.clone(),
            resource_count: submission.stack.resources().len(),
            accepted_at: Utc::now(),
        }
    }
}

/// External engine that turns declarations into live infrastructure
#[async_trait]
pub trait ProvisioningEngine: Send + Sync {
    /// Submit a declaration
    ///
    /// Rejections and transport failures are returned as
    /// [`StackError::Engine`] / [`StackError::Nats`] with the engine's
    /// message unchanged. Implementations must not retry.
    async fn submit(&self, submission: &StackSubmission) -> StackResult<DeploymentReceipt>;
}

/// Engine that records submissions in memory
///
/// Accepts everything unless built with [`RecordingEngine::rejecting`].
#[derive(Debug, Default)]
pub struct RecordingEngine {
    submissions: Mutex<Vec<StackSubmission>>,
    rejection: Option<String>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine that rejects every submission with `reason`
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            submissions: Mutex::default(),
            rejection: Some(reason.into()),
        }
    }

    /// Accepted submissions, oldest first
    pub fn submissions(&self) -> Vec<StackSubmission> {
        self.submissions
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ProvisioningEngine for RecordingEngine {
    async fn submit(&self, submission: &StackSubmission) -> StackResult<DeploymentReceipt> {
        if let Some(reason) = &self.rejection {
            return Err(StackError::Engine(reason.clone()));
        }
        self.submissions
            .lock()
            .map_err(|e| StackError::Engine(e.to_string()))?
            .push(submission.clone());

        info!(
            "Recorded submission {} for stack {}",
            submission.submission_id, submission.stack.name
        );
        Ok(DeploymentReceipt::for_submission(submission))
    }
}
