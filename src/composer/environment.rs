// Copyright (c) 2025 - Cowboy AI, Inc.
//! Environment stack composer
//!
//! [`StackComposer::resolve`] is the only step that talks to collaborators.
//! [`StackComposer::assemble`] is a pure function of the configuration and
//! the resolved inputs, so equal inputs always give equal stacks.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::backends::{ImageBuilder, ImageRegistry, ProfileRegistry, SecretBackend};
use crate::config::StackConfig;
use crate::domain::{
    AdminCredentials, BuildContext, ComputeService, ConnectionString, DatastoreCluster,
    DatastoreHandle, DatastoreSpec, EnvironmentStack, ImageAsset, ImageUri, IngressRule,
    InstanceType, ProfileHandle, ProfileImport, PullHandle, RepositoryImport, RepositoryName,
    Resource, ScalingPolicy, SecretDeclaration, SecretReference, ServiceHandle, StackOutputs,
    TaskShape, DATABASE_URL_VAR,
};
use crate::engine::{DeploymentReceipt, ProvisioningEngine, StackSubmission};
use crate::errors::{StackError, StackResult};

/// Everything the collaborators answered during resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedInputs {
    pub secret: SecretReference,
    pub profile: ProfileHandle,
    pub build_context: BuildContext,
    pub image_uri: ImageUri,
    pub repository: RepositoryName,
    pub pull: PullHandle,
}

/// Composes environment stacks from configuration
///
/// Holds the four resolution collaborators. The provisioning engine is
/// passed to [`deploy`](Self::deploy) separately so a composed stack can be
/// inspected without one.
#[derive(Clone)]
pub struct StackComposer {
    secrets: Arc<dyn SecretBackend>,
    profiles: Arc<dyn ProfileRegistry>,
    images: Arc<dyn ImageBuilder>,
    registry: Arc<dyn ImageRegistry>,
}

impl StackComposer {
    pub fn new(
        secrets: Arc<dyn SecretBackend>,
        profiles: Arc<dyn ProfileRegistry>,
        images: Arc<dyn ImageBuilder>,
        registry: Arc<dyn ImageRegistry>,
    ) -> Self {
        Self {
            secrets,
            profiles,
            images,
            registry,
        }
    }

    /// Backend name of the admin secret
    ///
    /// Derived from the stack name so a re-run reuses the same entry.
    pub fn secret_name(config: &StackConfig) -> String {
        format!("{}/{}", config.stack_name, config.credentials.secret_id)
    }

    /// Consult every collaborator, in dependency order
    pub async fn resolve(&self, config: &StackConfig) -> StackResult<ResolvedInputs> {
        let secret_name = Self::secret_name(config);
        info!("Generating admin secret {}", secret_name);
        let secret = self
            .secrets
            .generate(&secret_name, &config.credentials.policy)
            .await?;

        let profile_name = &config.datastore.parameter_profile;
        info!("Looking up parameter profile {}", profile_name);
        let profile = self
            .profiles
            .lookup(profile_name)
            .await?
            .ok_or_else(|| StackError::ProfileNotFound(profile_name.clone()))?;

        let build_context = BuildContext::new(config.image.build_directory.clone())?;
        info!(
            "Building image from {}",
            build_context.directory().display()
        );
        let image_uri = self.images.build_and_push(&build_context).await?;
        debug!("Build produced {}", image_uri);

        let repository = image_uri.repository_name()?;
        info!("Resolving repository {} in registry", repository);
        let pull = self
            .registry
            .lookup(&repository)
            .await?
            .ok_or_else(|| StackError::RepositoryNotFound(repository.to_string()))?;
        if pull.repository != repository {
            return Err(StackError::Registry(format!(
                "lookup of {} answered with repository {}",
                repository, pull.repository
            )));
        }

        Ok(ResolvedInputs {
            secret,
            profile,
            build_context,
            image_uri,
            repository,
            pull,
        })
    }

    /// Declare the full stack from resolved inputs
    ///
    /// Performs no I/O.
    pub fn assemble(
        config: &StackConfig,
        resolved: &ResolvedInputs,
    ) -> StackResult<EnvironmentStack> {
        let credentials = &config.credentials;
        let datastore = &config.datastore;
        let service = &config.service;

        let mut stack = EnvironmentStack::builder(
            config.stack_name.clone(),
            config.network.clone(),
            config.cluster.clone(),
        );

        stack.declare(Resource::Secret(SecretDeclaration {
            logical_id: credentials.secret_id.clone(),
            reference: resolved.secret.clone(),
            policy: credentials.policy.clone(),
        }))?;

        stack.declare(Resource::ParameterProfile(ProfileImport {
            logical_id: datastore.profile_logical_id.clone(),
            profile: resolved.profile.clone(),
        }))?;

        let cluster = DatastoreCluster::declare(
            datastore.logical_id.clone(),
            DatastoreSpec {
                engine: datastore.engine,
                instance_type: InstanceType::new(datastore.instance_type.clone())?,
                instances: datastore.instances,
                subnet_placement: datastore.subnet_placement,
                default_database_name: datastore.default_database_name.clone(),
                removal_policy: datastore.removal_policy,
            },
            AdminCredentials {
                username: credentials.username.clone(),
                password: resolved.secret.clone(),
            },
            resolved.profile.clone(),
            config.network.clone(),
        )?;
        debug!(
            "Declared {} {} with {} instances",
            cluster.engine, cluster.logical_id, cluster.instances
        );

        stack.declare(Resource::Datastore(cluster.clone()))?;

        let connection_string = ConnectionString::compose(
            cluster.engine.connection_scheme(),
            &cluster.admin.username,
            &cluster.admin.password,
            &cluster.endpoint,
        )?;

        stack.declare(Resource::ImageAsset(ImageAsset {
            logical_id: config.image.asset_logical_id.clone(),
            build_context: resolved.build_context.clone(),
            image_uri: resolved.image_uri.clone(),
            repository: resolved.repository.clone(),
        }))?;

        stack.declare(Resource::Repository(RepositoryImport {
            logical_id: config.image.repository_logical_id.clone(),
            handle: resolved.pull.clone(),
        }))?;

        let compute = ComputeService::builder(
            service.logical_id.clone(),
            config.cluster.clone(),
            resolved.pull.clone(),
        )
        .service_name(service.service_name.clone())
        .container(service.container_name.clone(), service.container_port)
        .env(DATABASE_URL_VAR, connection_string.as_str())
        .desired_count(service.desired_count)
        .shape(TaskShape::new(service.cpu, service.memory_mib)?)
        .assign_public_ip(service.assign_public_ip)
        .public_load_balancer(service.public_load_balancer)
        .build()?;
        stack.declare(Resource::ComputeService(compute.clone()))?;

        let scaling = match config.scaling.min_capacity {
            Some(min) => {
                ScalingPolicy::with_bounds(&compute.logical_id, min, config.scaling.max_capacity)?
            }
            None => ScalingPolicy::new(&compute.logical_id, config.scaling.max_capacity)?,
        };
        scaling.admits(compute.desired_count)?;

        let ingress = IngressRule::allow_default_port_from(
            &cluster,
            &compute,
            service.ingress_description.clone(),
        );
        debug!(
            "Authorizing {} -> {} on port {}",
            ingress.source, ingress.target, ingress.port
        );
        stack.declare(Resource::Ingress(ingress))?;
        stack.declare(Resource::Scaling(scaling))?;

        let outputs = StackOutputs {
            service: ServiceHandle {
                logical_id: compute.logical_id.clone(),
                service_name: compute.service_name.clone(),
            },
            repository_name: resolved.repository.clone(),
            connection_string,
            datastore: DatastoreHandle {
                logical_id: cluster.logical_id.clone(),
                endpoint: cluster.endpoint.to_string(),
            },
        };

        let stack = stack.finish(outputs)?;
        info!(
            "Assembled stack {} with {} resources",
            stack.name,
            stack.resources().len()
        );
        Ok(stack)
    }

    /// Validate, resolve and assemble
    pub async fn compose(&self, config: &StackConfig) -> StackResult<EnvironmentStack> {
        config.validate()?;
        let resolved = self.resolve(config).await?;
        Self::assemble(config, &resolved)
    }

    /// Compose and submit the stack once
    pub async fn deploy(
        &self,
        config: &StackConfig,
        engine: &dyn ProvisioningEngine,
    ) -> StackResult<DeploymentReceipt> {
        let stack = self.compose(config).await?;
        let submission = StackSubmission::new(stack);
        let receipt = engine.submit(&submission).await?;
        info!(
            "Stack {} accepted ({} resources, submission {})",
            receipt.stack_name, receipt.resource_count, receipt.submission_id
        );
        Ok(receipt)
    }
}
