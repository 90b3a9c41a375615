// Copyright (c) 2025 - Cowboy AI, Inc.
//! Load-Balanced Compute Service Declaration
//!
//! A containerised service running one image on an existing cluster,
//! fronted by a load balancer, with environment configuration and log
//! capture. Declaring the service also declares its load balancer and
//! service registration; their runtime state is not managed here.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::context::ClusterContext;
use super::image::PullHandle;
use super::invariants::{
    validate_environment_key, validate_logical_id, validate_port, validate_task_shape,
    ValidationError,
};
use super::security::SecurityGroupRef;

/// Environment variable carrying the datastore connection string
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

/// Environment variable carrying the container's listening port
pub const PORT_VAR: &str = "PORT";

/// CPU units and memory of one task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskShape {
    pub cpu: u32,
    pub memory_mib: u32,
}

impl TaskShape {
    /// # Invariants
    /// - A CPU/memory combination Fargate offers
    pub fn new(cpu: u32, memory_mib: u32) -> Result<Self, ValidationError> {
        validate_task_shape(cpu, memory_mib)?;
        Ok(Self { cpu, memory_mib })
    }
}

/// Load balancer placed in front of the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancer {
    /// Internet-facing when true
    pub public: bool,
    pub listener_port: u16,
    pub target_port: u16,
}

impl LoadBalancer {
    /// HTTP listener port
    pub const HTTP_PORT: u16 = 80;
}

/// Container log capture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfiguration {
    pub enabled: bool,
    pub stream_prefix: String,
}

/// Declared compute service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeService {
    pub logical_id: String,
    pub service_name: String,
    pub cluster: ClusterContext,
    pub image: PullHandle,
    pub container_name: String,
    pub container_port: u16,
    /// Sorted so the declaration does not depend on insertion order
    pub environment: BTreeMap<String, String>,
    pub desired_count: u32,
    pub shape: TaskShape,
    pub assign_public_ip: bool,
    pub load_balancer: LoadBalancer,
    pub logging: LogConfiguration,
    pub security_group: SecurityGroupRef,
}

impl ComputeService {
    pub fn builder(
        logical_id: impl Into<String>,
        cluster: ClusterContext,
        image: PullHandle,
    ) -> ComputeServiceBuilder {
        ComputeServiceBuilder::new(logical_id.into(), cluster, image)
    }

    pub fn env(&self, key: &str) -> Option<&str> {
        self.environment.get(key).map(String::as_str)
    }
}

/// Builder for [`ComputeService`] with fluent API
pub struct ComputeServiceBuilder {
    logical_id: String,
    cluster: ClusterContext,
    image: PullHandle,
    service_name: Option<String>,
    container_name: String,
    container_port: u16,
    environment: BTreeMap<String, String>,
    desired_count: u32,
    shape: TaskShape,
    assign_public_ip: bool,
    public_load_balancer: bool,
}

impl ComputeServiceBuilder {
    fn new(logical_id: String, cluster: ClusterContext, image: PullHandle) -> Self {
        Self {
            logical_id,
            cluster,
            image,
            service_name: None,
            container_name: "web".to_string(),
            container_port: LoadBalancer::HTTP_PORT,
            environment: BTreeMap::new(),
            desired_count: 1,
            shape: TaskShape {
                cpu: 256,
                memory_mib: 512,
            },
            assign_public_ip: false,
            public_load_balancer: true,
        }
    }

    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    pub fn container(mut self, name: impl Into<String>, port: u16) -> Self {
        self.container_name = name.into();
        self.container_port = port;
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    pub fn desired_count(mut self, count: u32) -> Self {
        self.desired_count = count;
        self
    }

    pub fn shape(mut self, shape: TaskShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn assign_public_ip(mut self, assign: bool) -> Self {
        self.assign_public_ip = assign;
        self
    }

    pub fn public_load_balancer(mut self, public: bool) -> Self {
        self.public_load_balancer = public;
        self
    }

    /// Finish the declaration
    ///
    /// `PORT` is always set to the container port and logging is always on.
    pub fn build(mut self) -> Result<ComputeService, ValidationError> {
        validate_logical_id(&self.logical_id)?;
        validate_port(u32::from(self.container_port))?;
        validate_task_shape(self.shape.cpu, self.shape.memory_mib)?;
        if self.container_name.is_empty() {
            return Err(ValidationError::Empty("container name"));
        }
        for key in self.environment.keys() {
            validate_environment_key(key)?;
        }

        self.environment
            .insert(PORT_VAR.to_string(), self.container_port.to_string());

        let service_name = self
            .service_name
            .unwrap_or_else(|| self.logical_id.clone());

        Ok(ComputeService {
            security_group: SecurityGroupRef::of(&self.logical_id),
            load_balancer: LoadBalancer {
                public: self.public_load_balancer,
                listener_port: LoadBalancer::HTTP_PORT,
                target_port: self.container_port,
            },
            logging: LogConfiguration {
                enabled: true,
                stream_prefix: service_name.clone(),
            },
            logical_id: self.logical_id,
            service_name,
            cluster: self.cluster,
            image: self.image,
            container_name: self.container_name,
            container_port: self.container_port,
            environment: self.environment,
            desired_count: self.desired_count,
            shape: self.shape,
            assign_public_ip: self.assign_public_ip,
        })
    }
}
