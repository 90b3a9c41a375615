// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-environment-stack
//!
//! Deterministic configuration and in-memory collaborators for the
//! reference deployment. Every integration test composes through these.
#![allow(dead_code)]

use std::sync::Arc;

use cim_environment_stack::backends::{
    InMemoryImageRegistry, InMemorySecretBackend, StaticImageBuilder, StaticProfileRegistry,
};
use cim_environment_stack::domain::{
    ClusterContext, ImageUri, NetworkContext, ProfileHandle, RepositoryName,
};
use cim_environment_stack::{StackComposer, StackConfig};

pub const STACK_NAME: &str = "RailsFooFargateStack";
pub const VPC_ID: &str = "vpc-0abc1234";
pub const CLUSTER_NAME: &str = "apps";
pub const BUILD_DIR: &str = "/app";
pub const REGISTRY_HOST: &str = "123.dkr.ecr.region.amazonaws.com";
pub const IMAGE_URI: &str = "123.dkr.ecr.region.amazonaws.com/myapp@sha256:abcd:latest";
pub const REPOSITORY: &str = "myapp";
pub const PROFILE: &str = "aws-rails-provisioner-default-aurora-mysql";

/// Reference configuration
pub fn stack_config() -> StackConfig {
    StackConfig::new(
        STACK_NAME,
        NetworkContext::new(VPC_ID).expect("Invalid vpc id in test fixture"),
        ClusterContext::new(CLUSTER_NAME).expect("Invalid cluster name in test fixture"),
        BUILD_DIR,
    )
}

/// Collaborators that know about everything the reference config needs
pub struct Collaborators {
    pub secrets: Arc<InMemorySecretBackend>,
    pub profiles: StaticProfileRegistry,
    pub images: StaticImageBuilder,
    pub registry: InMemoryImageRegistry,
}

impl Collaborators {
    pub fn reference() -> Self {
        Self {
            secrets: Arc::new(InMemorySecretBackend::new()),
            profiles: StaticProfileRegistry::new()
                .with_profile(ProfileHandle::new(PROFILE).with_family("aurora-mysql5.7")),
            images: StaticImageBuilder::new().with_image(BUILD_DIR, image_uri()),
            registry: InMemoryImageRegistry::new(REGISTRY_HOST).with_repository(repository()),
        }
    }

    pub fn without_profiles(mut self) -> Self {
        self.profiles = StaticProfileRegistry::new();
        self
    }

    pub fn without_repositories(mut self) -> Self {
        self.registry = InMemoryImageRegistry::new(REGISTRY_HOST);
        self
    }

    pub fn with_build_output(mut self, uri: &str) -> Self {
        self.images = StaticImageBuilder::new()
            .with_image(BUILD_DIR, ImageUri::new(uri).expect("Invalid image uri in test fixture"));
        self
    }

    pub fn with_secrets(mut self, secrets: Arc<InMemorySecretBackend>) -> Self {
        self.secrets = secrets;
        self
    }

    pub fn composer(self) -> StackComposer {
        StackComposer::new(
            self.secrets,
            Arc::new(self.profiles),
            Arc::new(self.images),
            Arc::new(self.registry),
        )
    }
}

pub fn image_uri() -> ImageUri {
    ImageUri::new(IMAGE_URI).expect("Invalid image uri in test fixture")
}

pub fn repository() -> RepositoryName {
    RepositoryName::new(REPOSITORY).expect("Invalid repository in test fixture")
}

/// Composer wired to the reference collaborators
pub fn reference_composer() -> StackComposer {
    Collaborators::reference().composer()
}
