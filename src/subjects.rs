// Copyright (c) 2025 - Cowboy AI, Inc.

//! NATS subject hierarchy for stack collaborators
//!
//! Every collaborator service listens on a request/reply subject following
//!
//! ```text
//! {root}.{collaborator}.{operation}
//! ```
//!
//! The root defaults to `stack` and can be changed to isolate environments
//! sharing one NATS deployment.
//!
//! # Examples
//!
//! ```rust
//! use cim_environment_stack::subjects::{Collaborator, Operation, SubjectBuilder};
//!
//! let subject = SubjectBuilder::new()
//!     .collaborator(Collaborator::Registry)
//!     .operation(Operation::Lookup)
//!     .build();
//! assert_eq!(subject, "stack.registry.lookup");
//!
//! let wildcard = SubjectBuilder::new().root("staging").build_wildcard();
//! assert_eq!(wildcard, "staging.>");
//! ```

use std::fmt;

/// Default root namespace
pub const STACK_ROOT: &str = "stack";

/// Collaborator services reached over NATS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collaborator {
    /// Credential store
    Secrets,
    /// Datastore parameter profile registry
    Profiles,
    /// Container build/push service
    Images,
    /// Image registry
    Registry,
    /// Provisioning engine
    Engine,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collaborator::Secrets => write!(f, "secrets"),
            Collaborator::Profiles => write!(f, "profiles"),
            Collaborator::Images => write!(f, "images"),
            Collaborator::Registry => write!(f, "registry"),
            Collaborator::Engine => write!(f, "engine"),
        }
    }
}

/// Requests a collaborator answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Generate,
    Lookup,
    Build,
    Submit,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Generate => write!(f, "generate"),
            Operation::Lookup => write!(f, "lookup"),
            Operation::Build => write!(f, "build"),
            Operation::Submit => write!(f, "submit"),
        }
    }
}

/// Builder for collaborator subjects
#[derive(Debug, Clone)]
pub struct SubjectBuilder {
    root: String,
    collaborator: Option<Collaborator>,
    operation: Option<Operation>,
}

impl SubjectBuilder {
    pub fn new() -> Self {
        Self {
            root: STACK_ROOT.to_string(),
            collaborator: None,
            operation: None,
        }
    }

    pub fn root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
    }

    pub fn collaborator(mut self, collaborator: Collaborator) -> Self {
        self.collaborator = Some(collaborator);
        self
    }

    pub fn operation(mut self, operation: Operation) -> Self {
        self.operation = Some(operation);
        self
    }

    /// Concrete subject; missing parts are left out
    pub fn build(&self) -> String {
        let mut parts = vec![self.root.clone()];
        if let Some(c) = self.collaborator {
            parts.push(c.to_string());
        }
        if let Some(o) = self.operation {
            parts.push(o.to_string());
        }
        parts.join(".")
    }

    /// Wildcard over everything below the parts set so far
    pub fn build_wildcard(&self) -> String {
        format!("{}.>", self.build())
    }
}

impl Default for SubjectBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The five request subjects under one root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSubjects {
    pub secrets_generate: String,
    pub profiles_lookup: String,
    pub images_build: String,
    pub registry_lookup: String,
    pub engine_submit: String,
}

impl StackSubjects {
    pub fn with_root(root: &str) -> Self {
        let subject = |c: Collaborator, o: Operation| {
            SubjectBuilder::new()
                .root(root)
                .collaborator(c)
                .operation(o)
                .build()
        };
        Self {
            secrets_generate: subject(Collaborator::Secrets, Operation::Generate),
            profiles_lookup: subject(Collaborator::Profiles, Operation::Lookup),
            images_build: subject(Collaborator::Images, Operation::Build),
            registry_lookup: subject(Collaborator::Registry, Operation::Lookup),
            engine_submit: subject(Collaborator::Engine, Operation::Submit),
        }
    }
}

impl Default for StackSubjects {
    fn default() -> Self {
        Self::with_root(STACK_ROOT)
    }
}
