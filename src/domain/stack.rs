// Copyright (c) 2025 - Cowboy AI, Inc.
//! Environment Stack Declaration Tree
//!
//! The immutable result of composition: an ordered list of resource
//! declarations with cross-references, plus the values the stack publishes
//! to sibling stacks. Building it performs no I/O; submitting it is a
//! separate step (see [`crate::engine`]).
//!
//! # Invariants
//!
//! - Logical ids are unique within a stack
//! - Every published output points at a declared resource
//! - Equal inputs produce equal stacks (and byte-identical JSON)

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::compute::ComputeService;
use super::connection::ConnectionString;
use super::context::{ClusterContext, NetworkContext};
use super::datastore::{DatastoreCluster, ProfileImport};
use super::image::{ImageAsset, RepositoryImport, RepositoryName};
use super::invariants::{validate_logical_id, ValidationError};
use super::scaling::ScalingPolicy;
use super::secret::SecretDeclaration;
use super::security::{IngressRule, SecurityGroupRef};
use crate::errors::StackResult;

/// One declared resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Resource {
    Secret(SecretDeclaration),
    ParameterProfile(ProfileImport),
    Datastore(DatastoreCluster),
    ImageAsset(ImageAsset),
    Repository(RepositoryImport),
    ComputeService(ComputeService),
    Ingress(IngressRule),
    Scaling(ScalingPolicy),
}

impl Resource {
    pub fn logical_id(&self) -> &str {
        match self {
            Resource::Secret(r) => &r.logical_id,
            Resource::ParameterProfile(r) => &r.logical_id,
            Resource::Datastore(r) => &r.logical_id,
            Resource::ImageAsset(r) => &r.logical_id,
            Resource::Repository(r) => &r.logical_id,
            Resource::ComputeService(r) => &r.logical_id,
            Resource::Ingress(r) => &r.logical_id,
            Resource::Scaling(r) => &r.logical_id,
        }
    }

    /// Short kind name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Resource::Secret(_) => "secret",
            Resource::ParameterProfile(_) => "parameter_profile",
            Resource::Datastore(_) => "datastore",
            Resource::ImageAsset(_) => "image_asset",
            Resource::Repository(_) => "repository",
            Resource::ComputeService(_) => "compute_service",
            Resource::Ingress(_) => "ingress",
            Resource::Scaling(_) => "scaling",
        }
    }
}

/// Published handle of the compute service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHandle {
    pub logical_id: String,
    pub service_name: String,
}

/// Published handle of the datastore cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatastoreHandle {
    pub logical_id: String,
    pub endpoint: String,
}

/// Values other stacks and scripts can reference without re-deriving them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackOutputs {
    pub service: ServiceHandle,
    pub repository_name: RepositoryName,
    pub connection_string: ConnectionString,
    pub datastore: DatastoreHandle,
}

/// Complete declaration of one application environment
///
/// Deserialization replays every declaration through [`StackBuilder`], so a
/// decoded stack holds the same invariants as a composed one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StackDeclaration")]
pub struct EnvironmentStack {
    pub name: String,
    pub network: NetworkContext,
    pub cluster: ClusterContext,
    resources: Vec<Resource>,
    pub outputs: StackOutputs,
}

/// Unchecked wire form of [`EnvironmentStack`]
#[derive(Deserialize)]
struct StackDeclaration {
    name: String,
    network: NetworkContext,
    cluster: ClusterContext,
    resources: Vec<Resource>,
    outputs: StackOutputs,
}

impl TryFrom<StackDeclaration> for EnvironmentStack {
    type Error = ValidationError;

    fn try_from(declaration: StackDeclaration) -> Result<Self, Self::Error> {
        let mut builder = Self::builder(
            declaration.name,
            declaration.network,
            declaration.cluster,
        );
        for resource in declaration.resources {
            builder.declare(resource)?;
        }
        builder.finish(declaration.outputs)
    }
}

impl EnvironmentStack {
    pub fn builder(
        name: impl Into<String>,
        network: NetworkContext,
        cluster: ClusterContext,
    ) -> StackBuilder {
        StackBuilder {
            name: name.into(),
            network,
            cluster,
            resources: Vec::new(),
            ids: BTreeSet::new(),
        }
    }

    /// Resources in declaration order
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn resource(&self, logical_id: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.logical_id() == logical_id)
    }

    pub fn datastore(&self) -> Option<&DatastoreCluster> {
        self.resources.iter().find_map(|r| match r {
            Resource::Datastore(d) => Some(d),
            _ => None,
        })
    }

    pub fn compute_service(&self) -> Option<&ComputeService> {
        self.resources.iter().find_map(|r| match r {
            Resource::ComputeService(s) => Some(s),
            _ => None,
        })
    }

    pub fn ingress_rules(&self) -> impl Iterator<Item = &IngressRule> {
        self.resources.iter().filter_map(|r| match r {
            Resource::Ingress(rule) => Some(rule),
            _ => None,
        })
    }

    pub fn scaling_policy(&self) -> Option<&ScalingPolicy> {
        self.resources.iter().find_map(|r| match r {
            Resource::Scaling(p) => Some(p),
            _ => None,
        })
    }

    /// Whether any declared rule lets `from` reach `to` on `port`
    pub fn permits_flow(&self, from: &SecurityGroupRef, to: &SecurityGroupRef, port: u16) -> bool {
        self.ingress_rules().any(|rule| rule.permits(from, to, port))
    }

    /// Pretty JSON rendering handed to the provisioning engine
    pub fn to_json(&self) -> StackResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Accumulates declarations in order, rejecting duplicate logical ids
pub struct StackBuilder {
    name: String,
    network: NetworkContext,
    cluster: ClusterContext,
    resources: Vec<Resource>,
    ids: BTreeSet<String>,
}

impl StackBuilder {
    /// Append a declaration
    pub fn declare(&mut self, resource: Resource) -> Result<&mut Self, ValidationError> {
        let id = resource.logical_id();
        validate_logical_id(id)?;
        if !self.ids.insert(id.to_string()) {
            return Err(ValidationError::DuplicateLogicalId(id.to_string()));
        }
        self.resources.push(resource);
        Ok(self)
    }

    pub fn is_declared(&self, logical_id: &str) -> bool {
        self.ids.contains(logical_id)
    }

    /// Seal the stack with its published outputs
    pub fn finish(self, outputs: StackOutputs) -> Result<EnvironmentStack, ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Empty("stack name"));
        }
        for id in [&outputs.service.logical_id, &outputs.datastore.logical_id] {
            if !self.ids.contains(id) {
                return Err(ValidationError::UnknownReference(id.clone()));
            }
        }
        for rule_target in self.resources.iter().filter_map(|r| match r {
            Resource::Scaling(p) => Some(&p.target),
            _ => None,
        }) {
            if !self.ids.contains(rule_target) {
                return Err(ValidationError::UnknownReference(rule_target.clone()));
            }
        }

        Ok(EnvironmentStack {
            name: self.name,
            network: self.network,
            cluster: self.cluster,
            resources: self.resources,
            outputs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ProfileHandle, ScalingPolicy};

    fn builder() -> StackBuilder {
        EnvironmentStack::builder(
            "RailsFooFargateStack",
            NetworkContext::new("vpc-0abc").unwrap(),
            ClusterContext::new("apps").unwrap(),
        )
    }

    fn profile(id: &str) -> Resource {
        Resource::ParameterProfile(ProfileImport {
            logical_id: id.to_string(),
            profile: ProfileHandle::new("default-aurora-mysql"),
        })
    }

    #[test]
    fn test_duplicate_logical_id_rejected() {
        let mut stack = builder();
        stack.declare(profile("DBClusterPG")).unwrap();
        assert_eq!(
            stack.declare(profile("DBClusterPG")).err(),
            Some(ValidationError::DuplicateLogicalId("DBClusterPG".into()))
        );
        assert!(stack.is_declared("DBClusterPG"));
    }

    #[test]
    fn test_invalid_logical_id_rejected() {
        let mut stack = builder();
        assert!(stack.declare(profile("db-cluster-pg")).is_err());
        assert!(!stack.is_declared("db-cluster-pg"));
    }

    #[test]
    fn test_scaling_target_must_exist() {
        let mut stack = builder();
        stack
            .declare(Resource::Scaling(ScalingPolicy::new("LBFargate", 2).unwrap()))
            .unwrap();
        let outputs = StackOutputs {
            service: ServiceHandle {
                logical_id: "LBFargate".into(),
                service_name: "RailsFoo".into(),
            },
            repository_name: RepositoryName::new("myapp").unwrap(),
            connection_string: serde_json::from_str("\"mysql2://a:b@c:1\"").unwrap(),
            datastore: DatastoreHandle {
                logical_id: "DBCluster".into(),
                endpoint: "c:1".into(),
            },
        };
        assert!(matches!(
            stack.finish(outputs),
            Err(ValidationError::UnknownReference(_))
        ));
    }
}
