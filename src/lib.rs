// Copyright (c) 2025 - Cowboy AI, Inc.
//! Environment stack composition for the Composable Information Machine
//!
//! Declares one deployable application environment (a load-balanced
//! container service, a clustered relational datastore, the image the
//! service runs and the network and scaling wiring between them) as an
//! immutable declaration tree, then submits it once to an external
//! provisioning engine.
//!
//! Composition is two-phase: collaborators (secret backend, profile
//! registry, image builder, image registry) are consulted first, then the
//! stack is assembled purely from their answers.

pub mod backends;
pub mod composer;
pub mod config;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod nats;
pub mod subjects;

// Re-export commonly used types
pub use composer::{ResolvedInputs, StackComposer};
pub use config::StackConfig;
pub use domain::EnvironmentStack;
pub use engine::{DeploymentReceipt, ProvisioningEngine, StackSubmission};
pub use errors::{ErrorCategory, StackError, StackResult};
pub use nats::{NatsClient, NatsConfig};
