// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network and cluster context supplied by the caller

use serde::{Deserialize, Serialize};
use std::fmt;

use super::invariants::ValidationError;

fn non_blank(value: String, field: &'static str) -> Result<String, ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty(field));
    }
    Ok(value)
}

/// Existing virtual network the stack is placed in
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkContext {
    pub vpc_id: String,
}

impl NetworkContext {
    pub fn new(vpc_id: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            vpc_id: non_blank(vpc_id.into(), "vpc id")?,
        })
    }
}

impl fmt::Display for NetworkContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.vpc_id)
    }
}

/// Existing compute cluster the service is scheduled on
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClusterContext {
    pub cluster_name: String,
}

impl ClusterContext {
    pub fn new(cluster_name: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            cluster_name: non_blank(cluster_name.into(), "cluster name")?,
        })
    }
}

impl fmt::Display for ClusterContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cluster_name)
    }
}
