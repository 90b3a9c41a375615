// Copyright (c) 2025 - Cowboy AI, Inc.
//! Environment Stack Domain Models
//!
//! Value objects and resource declarations that make up one application
//! environment. Everything in this module is pure: constructing a value
//! validates it, and nothing here talks to an external system.
//!
//! # Value Objects with Invariants
//!
//! - [`SecretReference`] / [`SecretGenerationPolicy`] - opaque credential handle
//! - [`SocketAddress`] / [`ConnectionString`] - datastore URL composition
//! - [`ImageUri`] / [`RepositoryName`] - digest-qualified image parsing
//! - [`InstanceType`], [`TaskShape`] - instance and task sizing
//! - [`ScalingPolicy`] - replica bounds (1 <= min <= max)
//!
//! # Declarations
//!
//! - [`DatastoreCluster`] - clustered relational datastore
//! - [`ComputeService`] - load-balanced container service
//! - [`IngressRule`] - service-to-datastore authorization
//! - [`EnvironmentStack`] - the declaration tree that owns all of the above
//!
//! # Attribute References
//!
//! Values only known after apply (endpoints, security group ids) are
//! rendered as `${LogicalId.Attribute}` and substituted by the provisioning
//! engine.

pub mod compute;
pub mod connection;
pub mod context;
pub mod datastore;
pub mod image;
pub mod invariants;
pub mod scaling;
pub mod secret;
pub mod security;
pub mod stack;

pub use compute::{
    ComputeService, ComputeServiceBuilder, LoadBalancer, LogConfiguration, TaskShape,
    DATABASE_URL_VAR, PORT_VAR,
};
pub use connection::{ConnectionString, SocketAddress};
pub use context::{ClusterContext, NetworkContext};
pub use datastore::{
    AdminCredentials, DatabaseEngine, DatastoreCluster, DatastoreSpec, InstanceType,
    ProfileHandle, ProfileImport, RemovalPolicy, SubnetPlacement,
};
pub use image::{
    derive_repository_name, BuildContext, ImageAsset, ImageError, ImageUri, PullHandle,
    RepositoryImport, RepositoryName,
};
pub use invariants::{ValidationError, ValidationResult};
pub use scaling::{ScalingPolicy, IMPLICIT_MIN_CAPACITY};
pub use secret::{SecretDeclaration, SecretGenerationPolicy, SecretReference};
pub use security::{IngressRule, Protocol, SecurityGroupRef};
pub use stack::{
    DatastoreHandle, EnvironmentStack, Resource, ServiceHandle, StackBuilder, StackOutputs,
};

/// Render a reference to `attribute` of the resource with `logical_id`
pub fn attribute_ref(logical_id: &str, attribute: &str) -> String {
    format!("${{{}.{}}}", logical_id, attribute)
}
