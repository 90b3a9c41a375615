// Copyright (c) 2025 - Cowboy AI, Inc.
//! Datastore Cluster Declaration
//!
//! A clustered relational datastore placed in non-public subnets, using a
//! named parameter profile that already exists in the profile registry.
//! Availability characteristics (instance count, subnet placement) and the
//! removal policy are declared here and enforced by the provisioning engine.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::connection::SocketAddress;
use super::context::NetworkContext;
use super::invariants::{
    validate_admin_username, validate_database_name, validate_instance_count,
    validate_logical_id, ValidationError,
};
use super::secret::SecretReference;
use super::security::SecurityGroupRef;
use super::attribute_ref;

/// Relational engine family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DatabaseEngine {
    AuroraMysql,
    AuroraPostgresql,
}

impl DatabaseEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuroraMysql => "aurora-mysql",
            Self::AuroraPostgresql => "aurora-postgresql",
        }
    }

    /// Port the cluster listens on unless told otherwise
    pub fn default_port(&self) -> u16 {
        match self {
            Self::AuroraMysql => 3306,
            Self::AuroraPostgresql => 5432,
        }
    }

    /// URL scheme understood by the application's database adapter
    pub fn connection_scheme(&self) -> &'static str {
        match self {
            Self::AuroraMysql => "mysql2",
            Self::AuroraPostgresql => "postgres",
        }
    }

    /// Longest admin username the engine accepts
    pub fn max_username_length(&self) -> usize {
        match self {
            Self::AuroraMysql => 16,
            Self::AuroraPostgresql => 63,
        }
    }
}

impl fmt::Display for DatabaseEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Instance class and size, e.g. `r5.large`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstanceType(String);

impl InstanceType {
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let part_ok = |p: &str| {
            !p.is_empty()
                && p
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        };
        match value.split_once('.') {
            Some((class, size)) if part_ok(class) && part_ok(size) => Ok(Self(value)),
            _ => Err(ValidationError::InvalidInstanceType(value)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `db.`-prefixed form used by managed database APIs
    pub fn database_class(&self) -> String {
        format!("db.{}", self.0)
    }
}

impl TryFrom<String> for InstanceType {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<InstanceType> for String {
    fn from(value: InstanceType) -> Self {
        value.0
    }
}

/// Subnet class a resource is placed into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubnetPlacement {
    /// Routed to and from the internet
    Public,
    /// Outbound-only internet access through NAT
    Private,
    /// No route to or from the internet
    Isolated,
}

impl SubnetPlacement {
    pub fn is_publicly_routable(&self) -> bool {
        matches!(self, Self::Public)
    }
}

/// What the provisioning engine does with storage when the stack is torn down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalPolicy {
    Retain,
    Snapshot,
    Destroy,
}

impl RemovalPolicy {
    pub fn retains_storage(&self) -> bool {
        !matches!(self, Self::Destroy)
    }
}

/// Handle to a parameter profile that exists in the profile registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProfileHandle {
    /// Registry name the profile was looked up by
    pub name: String,

    /// Engine family the profile applies to, if the registry reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
}

impl ProfileHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            family: None,
        }
    }

    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = Some(family.into());
        self
    }
}

/// Profile import entry in the declaration tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileImport {
    pub logical_id: String,
    pub profile: ProfileHandle,
}

/// Master identity of the cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCredentials {
    pub username: String,
    pub password: SecretReference,
}

/// Caller-chosen properties of the cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatastoreSpec {
    pub engine: DatabaseEngine,
    pub instance_type: InstanceType,
    pub instances: u32,
    pub subnet_placement: SubnetPlacement,
    pub default_database_name: String,
    pub removal_policy: RemovalPolicy,
}

/// Declared datastore cluster
///
/// # Invariants
/// - Admin username satisfies the engine's naming rules
/// - 1-15 instances
/// - Never placed in public subnets
/// - Default database name is a valid identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatastoreCluster {
    pub logical_id: String,
    pub engine: DatabaseEngine,
    pub admin: AdminCredentials,
    pub instance_type: InstanceType,
    pub instances: u32,
    pub subnet_placement: SubnetPlacement,
    pub network: NetworkContext,
    pub parameter_profile: ProfileHandle,
    pub default_database_name: String,
    pub removal_policy: RemovalPolicy,
    pub endpoint: SocketAddress,
    pub security_group: SecurityGroupRef,
}

impl DatastoreCluster {
    /// Declare a cluster
    ///
    /// The endpoint host is an attribute reference resolved after apply; the
    /// port is the engine default.
    pub fn declare(
        logical_id: impl Into<String>,
        spec: DatastoreSpec,
        admin: AdminCredentials,
        parameter_profile: ProfileHandle,
        network: NetworkContext,
    ) -> Result<Self, ValidationError> {
        let logical_id = logical_id.into();
        validate_logical_id(&logical_id)?;
        validate_admin_username(&admin.username, spec.engine.max_username_length())?;
        validate_instance_count(i64::from(spec.instances))?;
        validate_database_name(&spec.default_database_name)?;
        if spec.subnet_placement.is_publicly_routable() {
            return Err(ValidationError::PublicDatastore);
        }

        let endpoint = SocketAddress::new(
            attribute_ref(&logical_id, "Endpoint.Address"),
            spec.engine.default_port(),
        )?;
        let security_group = SecurityGroupRef::of(&logical_id);

        Ok(Self {
            engine: spec.engine,
            admin,
            instance_type: spec.instance_type,
            instances: spec.instances,
            subnet_placement: spec.subnet_placement,
            network,
            parameter_profile,
            default_database_name: spec.default_database_name,
            removal_policy: spec.removal_policy,
            endpoint,
            security_group,
            logical_id,
        })
    }

    /// Port other resources must be authorized on to reach the cluster
    pub fn default_port(&self) -> u16 {
        self.endpoint.port()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> DatastoreSpec {
        DatastoreSpec {
            engine: DatabaseEngine::AuroraMysql,
            instance_type: InstanceType::new("r5.large").unwrap(),
            instances: 2,
            subnet_placement: SubnetPlacement::Isolated,
            default_database_name: "app_development".to_string(),
            removal_policy: RemovalPolicy::Retain,
        }
    }

    fn admin(username: &str) -> AdminCredentials {
        AdminCredentials {
            username: username.to_string(),
            password: SecretReference::dynamic("db-admin").unwrap(),
        }
    }

    fn declare(spec: DatastoreSpec, username: &str) -> Result<DatastoreCluster, ValidationError> {
        DatastoreCluster::declare(
            "DBCluster",
            spec,
            admin(username),
            ProfileHandle::new("aws-rails-provisioner-default-aurora-mysql"),
            NetworkContext::new("vpc-0abc").unwrap(),
        )
    }

    #[test]
    fn test_declare_keeps_requested_values() {
        let cluster = declare(spec(), "RailsFooDBAdminU").unwrap();
        assert_eq!(cluster.default_database_name, "app_development");
        assert_eq!(cluster.instances, 2);
        assert_eq!(cluster.removal_policy, RemovalPolicy::Retain);
        assert!(cluster.removal_policy.retains_storage());
        assert_eq!(cluster.endpoint.to_string(), "${DBCluster.Endpoint.Address}:3306");
        assert_eq!(cluster.default_port(), 3306);
    }

    #[test]
    fn test_public_placement_rejected() {
        let mut spec = spec();
        spec.subnet_placement = SubnetPlacement::Public;
        assert_eq!(
            declare(spec, "RailsFooDBAdminU"),
            Err(ValidationError::PublicDatastore)
        );
    }

    #[test]
    fn test_instance_count_checked() {
        let mut spec = spec();
        spec.instances = 0;
        assert_eq!(
            declare(spec, "admin"),
            Err(ValidationError::InvalidInstanceCount(0))
        );
    }

    #[test]
    fn test_username_length_depends_on_engine() {
        let long = "PostgresAdministrator";
        assert!(declare(spec(), long).is_err());

        let mut pg = spec();
        pg.engine = DatabaseEngine::AuroraPostgresql;
        let cluster = declare(pg, long).unwrap();
        assert_eq!(cluster.default_port(), 5432);
    }

    #[test]
    fn test_instance_type_format() {
        assert_eq!(
            InstanceType::new("r5.large").unwrap().database_class(),
            "db.r5.large"
        );
        assert!(InstanceType::new("r5").is_err());
        assert!(InstanceType::new("R5.large").is_err());
        assert!(InstanceType::new(".large").is_err());
    }

    #[test]
    fn test_removal_policies() {
        assert!(RemovalPolicy::Snapshot.retains_storage());
        assert!(!RemovalPolicy::Destroy.retains_storage());
    }
}
