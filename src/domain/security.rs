// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Authorization Between Declared Resources
//!
//! Flow is authorized one way only: from the compute service's security
//! group to the datastore's default port. [`IngressRule`] can only be built
//! with the datastore as target and the service as source, so the reverse
//! direction cannot be expressed.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::compute::ComputeService;
use super::datastore::DatastoreCluster;
use super::attribute_ref;

/// Network identity of a declared resource (its security group)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecurityGroupRef(String);

impl SecurityGroupRef {
    /// Security group owned by the resource with `logical_id`
    pub fn of(logical_id: &str) -> Self {
        Self(attribute_ref(logical_id, "SecurityGroupId"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SecurityGroupRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
}

/// Allow rule attached to the datastore's security group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressRule {
    pub logical_id: String,
    pub source: SecurityGroupRef,
    pub target: SecurityGroupRef,
    pub protocol: Protocol,
    pub port: u16,
    pub description: String,
}

impl IngressRule {
    /// Let `service` reach `datastore` on the datastore's default port
    pub fn allow_default_port_from(
        datastore: &DatastoreCluster,
        service: &ComputeService,
        description: impl Into<String>,
    ) -> Self {
        Self {
            logical_id: format!("{}IngressFrom{}", datastore.logical_id, service.logical_id),
            source: service.security_group.clone(),
            target: datastore.security_group.clone(),
            protocol: Protocol::Tcp,
            port: datastore.default_port(),
            description: description.into(),
        }
    }

    /// Whether this rule lets `from` open a TCP connection to `to` on `port`
    pub fn permits(&self, from: &SecurityGroupRef, to: &SecurityGroupRef, port: u16) -> bool {
        &self.source == from && &self.target == to && self.port == port
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        AdminCredentials, ClusterContext, DatabaseEngine, DatastoreSpec, InstanceType,
        NetworkContext, ProfileHandle, PullHandle, RemovalPolicy, RepositoryName,
        SecretReference, SubnetPlacement,
    };

    fn datastore(engine: DatabaseEngine) -> DatastoreCluster {
        DatastoreCluster::declare(
            "DBCluster",
            DatastoreSpec {
                engine,
                instance_type: InstanceType::new("r5.large").unwrap(),
                instances: 2,
                subnet_placement: SubnetPlacement::Isolated,
                default_database_name: "app_development".to_string(),
                removal_policy: RemovalPolicy::Retain,
            },
            AdminCredentials {
                username: "admin".to_string(),
                password: SecretReference::dynamic("db-admin").unwrap(),
            },
            ProfileHandle::new("default"),
            NetworkContext::new("vpc-0abc").unwrap(),
        )
        .unwrap()
    }

    fn service() -> ComputeService {
        ComputeService::builder(
            "LBFargate",
            ClusterContext::new("apps").unwrap(),
            PullHandle::new("registry.host", RepositoryName::new("myapp").unwrap()),
        )
        .build()
        .unwrap()
    }

    #[test]
    fn test_rule_targets_datastore_default_port() {
        let db = datastore(DatabaseEngine::AuroraMysql);
        let svc = service();
        let rule = IngressRule::allow_default_port_from(&db, &svc, "From Fargate");

        assert_eq!(rule.logical_id, "DBClusterIngressFromLBFargate");
        assert_eq!(rule.source.as_str(), "${LBFargate.SecurityGroupId}");
        assert_eq!(rule.target.as_str(), "${DBCluster.SecurityGroupId}");
        assert_eq!(rule.protocol, Protocol::Tcp);
        assert_eq!(rule.port, 3306);
    }

    #[test]
    fn test_rule_is_one_directional() {
        let db = datastore(DatabaseEngine::AuroraPostgresql);
        let svc = service();
        let rule = IngressRule::allow_default_port_from(&db, &svc, "From Fargate");

        assert!(rule.permits(&svc.security_group, &db.security_group, 5432));
        assert!(!rule.permits(&db.security_group, &svc.security_group, 5432));
        assert!(!rule.permits(&svc.security_group, &db.security_group, 3306));
    }
}
