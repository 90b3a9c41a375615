// Copyright (c) 2025 - Cowboy AI, Inc.
//! Static Replica Bounds for the Compute Service
//!
//! Only bounds are declared. No target-tracking metric is attached, so the
//! policy is a ceiling rather than feedback-driven scaling.

use serde::{Deserialize, Serialize};

use super::invariants::{validate_desired_count, validate_scaling_bounds, ValidationError};

/// Floor applied when the caller does not raise it
pub const IMPLICIT_MIN_CAPACITY: u32 = 1;

/// Replica-count bounds for one compute service
///
/// # Invariants
/// - 1 <= min_capacity <= max_capacity
///
/// # Examples
///
/// ```rust
/// use cim_environment_stack::domain::ScalingPolicy;
///
/// let policy = ScalingPolicy::new("LBFargate", 2).unwrap();
/// assert_eq!(policy.min_capacity, 1);
/// assert!(ScalingPolicy::new("LBFargate", 0).is_err());
/// assert!(ScalingPolicy::new("LBFargate", -1).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalingPolicy {
    pub logical_id: String,
    /// Logical id of the scaled service
    pub target: String,
    pub min_capacity: u32,
    pub max_capacity: u32,
}

impl ScalingPolicy {
    /// Bounds `[1, max_capacity]` for `target`
    pub fn new(target: impl Into<String>, max_capacity: i64) -> Result<Self, ValidationError> {
        Self::with_bounds(target, i64::from(IMPLICIT_MIN_CAPACITY), max_capacity)
    }

    /// Bounds `[min_capacity, max_capacity]` for `target`
    pub fn with_bounds(
        target: impl Into<String>,
        min_capacity: i64,
        max_capacity: i64,
    ) -> Result<Self, ValidationError> {
        validate_scaling_bounds(min_capacity, max_capacity)?;
        let invalid = || ValidationError::InvalidScalingBounds {
            min: min_capacity,
            max: max_capacity,
        };
        let target = target.into();
        Ok(Self {
            logical_id: format!("{}Scaling", target),
            min_capacity: u32::try_from(min_capacity).map_err(|_| invalid())?,
            max_capacity: u32::try_from(max_capacity).map_err(|_| invalid())?,
            target,
        })
    }

    /// Check a desired replica count against these bounds
    pub fn admits(&self, desired: u32) -> Result<(), ValidationError> {
        validate_desired_count(desired, self.min_capacity, self.max_capacity)
    }
}
