// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stack configuration supplied by the caller
//!
//! Only the network and cluster contexts, the stack name and the build
//! directory have no sensible default. Everything else defaults to the
//! reference deployment: an Aurora MySQL cluster behind a single
//! load-balanced Fargate service.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::invariants::{
    validate_admin_username, validate_database_name, validate_instance_count, validate_logical_id,
    validate_port,
};
use crate::domain::{
    BuildContext, ClusterContext, DatabaseEngine, InstanceType, NetworkContext, RemovalPolicy,
    ScalingPolicy, SecretGenerationPolicy, SubnetPlacement, TaskShape, ValidationError,
    IMPLICIT_MIN_CAPACITY,
};
use crate::errors::{StackError, StackResult};

/// Admin identity of the datastore
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialConfig {
    /// Logical id of the generated secret
    pub secret_id: String,
    pub username: String,
    pub policy: SecretGenerationPolicy,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            secret_id: "Secret".to_string(),
            username: "RailsFooDBAdminU".to_string(),
            policy: SecretGenerationPolicy::connection_string_safe(),
        }
    }
}

/// Datastore cluster settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatastoreConfig {
    pub logical_id: String,
    pub profile_logical_id: String,
    pub engine: DatabaseEngine,
    pub instance_type: String,
    pub instances: u32,
    pub subnet_placement: SubnetPlacement,
    /// Registry name of the parameter profile
    pub parameter_profile: String,
    pub default_database_name: String,
    pub removal_policy: RemovalPolicy,
}

impl Default for DatastoreConfig {
    fn default() -> Self {
        Self {
            logical_id: "DBCluster".to_string(),
            profile_logical_id: "DBClusterPG".to_string(),
            engine: DatabaseEngine::AuroraMysql,
            instance_type: "r5.large".to_string(),
            instances: 2,
            subnet_placement: SubnetPlacement::Isolated,
            parameter_profile: "aws-rails-provisioner-default-aurora-mysql".to_string(),
            default_database_name: "app_development".to_string(),
            removal_policy: RemovalPolicy::Retain,
        }
    }
}

/// Container image source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub asset_logical_id: String,
    pub repository_logical_id: String,
    pub build_directory: PathBuf,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            asset_logical_id: "ImageAssetBuild".to_string(),
            repository_logical_id: "EcrRepo".to_string(),
            build_directory: PathBuf::new(),
        }
    }
}

/// Compute service settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub logical_id: String,
    pub service_name: String,
    pub container_name: String,
    pub container_port: u16,
    pub cpu: u32,
    pub memory_mib: u32,
    pub desired_count: u32,
    pub public_load_balancer: bool,
    pub assign_public_ip: bool,
    /// Description attached to the datastore ingress rule
    pub ingress_description: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            logical_id: "LBFargate".to_string(),
            service_name: "RailsFoo".to_string(),
            container_name: "FargateTaskContainer".to_string(),
            container_port: 80,
            cpu: 256,
            memory_mib: 512,
            desired_count: 1,
            public_load_balancer: true,
            assign_public_ip: true,
            ingress_description: "From Fargate".to_string(),
        }
    }
}

/// Replica bounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalingConfig {
    /// Raised floor; the implicit minimum of 1 applies when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_capacity: Option<i64>,
    pub max_capacity: i64,
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self {
            min_capacity: None,
            max_capacity: 2,
        }
    }
}

/// Everything needed to compose one environment stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackConfig {
    pub stack_name: String,
    pub network: NetworkContext,
    pub cluster: ClusterContext,
    #[serde(default)]
    pub credentials: CredentialConfig,
    #[serde(default)]
    pub datastore: DatastoreConfig,
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub scaling: ScalingConfig,
}

impl StackConfig {
    /// Configuration with reference defaults for everything but the inputs
    pub fn new(
        stack_name: impl Into<String>,
        network: NetworkContext,
        cluster: ClusterContext,
        build_directory: impl Into<PathBuf>,
    ) -> Self {
        Self {
            stack_name: stack_name.into(),
            network,
            cluster,
            credentials: CredentialConfig::default(),
            datastore: DatastoreConfig::default(),
            image: ImageConfig {
                build_directory: build_directory.into(),
                ..ImageConfig::default()
            },
            service: ServiceConfig::default(),
            scaling: ScalingConfig::default(),
        }
    }

    /// Parse a JSON document
    pub fn from_json_str(json: &str) -> StackResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| StackError::Configuration(format!("invalid stack config: {}", e)))
    }

    /// Read a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> StackResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            StackError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    /// Load configuration from environment variables
    ///
    /// `STACK_CONFIG` names a JSON file to start from. `STACK_NAME`,
    /// `STACK_VPC_ID`, `STACK_CLUSTER_NAME` and `STACK_BUILD_DIR` override
    /// (or, without a file, provide) the caller inputs.
    pub fn from_env() -> StackResult<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        let required = |name: &str| {
            var(name).ok_or_else(|| StackError::Configuration(format!("{} not set", name)))
        };

        let mut config = match var("STACK_CONFIG") {
            Some(path) => Self::from_json_file(path)?,
            None => Self::new(
                required("STACK_NAME")?,
                NetworkContext::new(required("STACK_VPC_ID")?)?,
                ClusterContext::new(required("STACK_CLUSTER_NAME")?)?,
                required("STACK_BUILD_DIR")?,
            ),
        };

        if let Some(name) = var("STACK_NAME") {
            config.stack_name = name;
        }
        if let Some(vpc) = var("STACK_VPC_ID") {
            config.network = NetworkContext::new(vpc)?;
        }
        if let Some(cluster) = var("STACK_CLUSTER_NAME") {
            config.cluster = ClusterContext::new(cluster)?;
        }
        if let Some(dir) = var("STACK_BUILD_DIR") {
            config.image.build_directory = PathBuf::from(dir);
        }
        Ok(config)
    }

    /// Check every value that does not need an external lookup
    ///
    /// Anything [`StackComposer::assemble`](crate::StackComposer::assemble)
    /// would reject is rejected here, before a collaborator is consulted.
    pub fn validate(&self) -> StackResult<()> {
        if self.stack_name.trim().is_empty() {
            return Err(StackError::Configuration("stack name is empty".to_string()));
        }
        NetworkContext::new(self.network.vpc_id.clone())?;
        ClusterContext::new(self.cluster.cluster_name.clone())?;
        self.validate_logical_ids()?;

        self.credentials.policy.validate_for_connection_string()?;
        validate_admin_username(
            &self.credentials.username,
            self.datastore.engine.max_username_length(),
        )?;

        InstanceType::new(self.datastore.instance_type.clone())?;
        validate_instance_count(i64::from(self.datastore.instances))?;
        validate_database_name(&self.datastore.default_database_name)?;
        if self.datastore.subnet_placement.is_publicly_routable() {
            return Err(ValidationError::PublicDatastore.into());
        }
        if self.datastore.parameter_profile.trim().is_empty() {
            return Err(StackError::Configuration(
                "parameter profile name is empty".to_string(),
            ));
        }

        BuildContext::new(self.image.build_directory.clone())?;

        if self.service.container_name.is_empty() {
            return Err(ValidationError::Empty("container name").into());
        }
        validate_port(u32::from(self.service.container_port))?;
        TaskShape::new(self.service.cpu, self.service.memory_mib)?;

        let min = self
            .scaling
            .min_capacity
            .unwrap_or(i64::from(IMPLICIT_MIN_CAPACITY));
        ScalingPolicy::with_bounds(&self.service.logical_id, min, self.scaling.max_capacity)?
            .admits(self.service.desired_count)?;
        Ok(())
    }

    /// Every configured logical id is well formed and distinct
    fn validate_logical_ids(&self) -> StackResult<()> {
        let ids = [
            &self.credentials.secret_id,
            &self.datastore.profile_logical_id,
            &self.datastore.logical_id,
            &self.image.asset_logical_id,
            &self.image.repository_logical_id,
            &self.service.logical_id,
        ];
        for (i, id) in ids.iter().enumerate() {
            validate_logical_id(id)?;
            if ids[..i].contains(id) {
                return Err(ValidationError::DuplicateLogicalId(id.to_string()).into());
            }
        }
        Ok(())
    }
}
