// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stack Composer
//!
//! Composes one environment stack through NATS collaborators and submits it
//! to the provisioning engine.
//!
//! Run with: cargo run --bin stack-composer
//!
//! Environment:
//! - `NATS_URL` (default: localhost:4222)
//! - `STACK_SUBJECT_ROOT` (default: stack)
//! - `STACK_CONFIG` or `STACK_NAME` / `STACK_VPC_ID` / `STACK_CLUSTER_NAME` /
//!   `STACK_BUILD_DIR`
//! - `STACK_DRY_RUN=1` prints the declaration instead of submitting it

use anyhow::{Context, Result};
use cim_environment_stack::{
    backends::NatsCollaborators,
    engine::NatsProvisioningEngine,
    subjects::{StackSubjects, STACK_ROOT},
    NatsClient, NatsConfig, StackComposer, StackConfig,
};
use std::sync::Arc;
use tracing::{info, warn};

fn dry_run() -> bool {
    matches!(
        std::env::var("STACK_DRY_RUN").as_deref(),
        Ok("1") | Ok("true")
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting stack composer");

    let config = StackConfig::from_env().context("Failed to load stack configuration")?;
    config.validate().context("Invalid stack configuration")?;
    info!("Configuration loaded:");
    info!("  - Stack: {}", config.stack_name);
    info!("  - Network: {}", config.network);
    info!("  - Cluster: {}", config.cluster);
    info!("  - Build directory: {}", config.image.build_directory.display());

    let nats_url = std::env::var("NATS_URL").unwrap_or_else(|_| "localhost:4222".to_string());
    let root = std::env::var("STACK_SUBJECT_ROOT").unwrap_or_else(|_| STACK_ROOT.to_string());
    let subjects = StackSubjects::with_root(&root);

    info!("Connecting to NATS at {}", nats_url);
    let client = NatsClient::new(NatsConfig::with_url(&nats_url))
        .await
        .context("Failed to connect to NATS")?;

    let collaborators = Arc::new(NatsCollaborators::with_subjects(
        client.clone(),
        subjects.clone(),
    ));
    let composer = StackComposer::new(
        collaborators.clone(),
        collaborators.clone(),
        collaborators.clone(),
        collaborators,
    );

    if dry_run() {
        warn!("Dry run: the declaration will not be submitted");
        let stack = composer
            .compose(&config)
            .await
            .context("Stack composition failed")?;
        println!("{}", stack.to_json()?);
        return Ok(());
    }

    let engine = NatsProvisioningEngine::with_subjects(client, &subjects);
    let receipt = composer
        .deploy(&config, &engine)
        .await
        .context("Stack deployment failed")?;

    info!(
        "Submission {} accepted for {} ({} resources)",
        receipt.submission_id, receipt.stack_name, receipt.resource_count
    );
    Ok(())
}
