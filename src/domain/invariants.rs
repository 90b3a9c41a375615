// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Functions - Declaration Invariants
//!
//! Every check a declaration must pass before it can be handed to the
//! provisioning engine lives here. All functions are pure (no I/O, no
//! mutation) and return a detailed [`ValidationError`] on failure.
//!
//! # Invariant Categories
//!
//! 1. **Identifiers**: logical ids, usernames, database names, env keys
//! 2. **Capacity**: instance counts, scaling bounds, desired counts
//! 3. **Shapes**: Fargate CPU/memory combinations, ports

/// Validation result with detailed error information
pub type ValidationResult = Result<(), ValidationError>;

/// Validation error with context
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required field was empty
    #[error("{0} must not be empty")]
    Empty(&'static str),

    /// Logical id is not a valid identifier
    #[error("Invalid logical id: {0}")]
    InvalidLogicalId(String),

    /// Logical id declared twice in the same stack
    #[error("Duplicate logical id: {0}")]
    DuplicateLogicalId(String),

    /// Output or rule references an undeclared resource
    #[error("Reference to undeclared resource: {0}")]
    UnknownReference(String),

    /// Admin username rejected by the engine's naming rules
    #[error("Invalid admin username {username:?}: {reason}")]
    InvalidUsername { username: String, reason: String },

    /// Default database name rejected
    #[error("Invalid database name: {0}")]
    InvalidDatabaseName(String),

    /// Instance type is not `<class>.<size>`
    #[error("Invalid instance type: {0}")]
    InvalidInstanceType(String),

    /// Instance count outside the supported range
    #[error("Invalid instance count: {0} (must be 1-15)")]
    InvalidInstanceCount(i64),

    /// Datastore must never be reachable from public subnets
    #[error("Datastore cannot be placed in public subnets")]
    PublicDatastore,

    /// Port of zero
    #[error("Invalid port: {0}")]
    InvalidPort(u32),

    /// Host part of a socket address rejected
    #[error("Invalid host: {0:?}")]
    InvalidHost(String),

    /// URI scheme rejected
    #[error("Invalid connection scheme: {0:?}")]
    InvalidScheme(String),

    /// Character that cannot appear in a connection-string component
    #[error("Connection string component {component} contains reserved character {ch:?}")]
    ReservedCharacter { component: &'static str, ch: char },

    /// Secret policy would allow characters that break a connection string
    #[error("Secret generation policy allows connection-string delimiters")]
    UnsafeSecretPolicy,

    /// Secret length outside the supported range
    #[error("Invalid secret length: {0} (must be 8-128)")]
    InvalidSecretLength(u32),

    /// Fargate does not offer this CPU/memory combination
    #[error("Unsupported task shape: {cpu} CPU units with {memory_mib} MiB")]
    InvalidTaskShape { cpu: u32, memory_mib: u32 },

    /// Environment variable name rejected
    #[error("Invalid environment variable name: {0:?}")]
    InvalidEnvironmentKey(String),

    /// Scaling bounds inconsistent
    #[error("Invalid scaling bounds: min {min}, max {max} (need 1 <= min <= max)")]
    InvalidScalingBounds { min: i64, max: i64 },

    /// Desired count outside the scaling bounds
    #[error("Desired count {desired} outside scaling bounds {min}..={max}")]
    DesiredCountOutOfBounds { desired: u32, min: u32, max: u32 },

    /// Build directory must be absolute
    #[error("Build directory must be an absolute path: {0}")]
    RelativeBuildDirectory(String),
}

/// Maximum number of instances in a datastore cluster
pub const MAX_CLUSTER_INSTANCES: i64 = 15;

/// Maximum length of a default database name
pub const MAX_DATABASE_NAME_LENGTH: usize = 64;

/// Validate a logical id
///
/// # Rules
/// - Non-empty
/// - Starts with an ASCII letter
/// - ASCII alphanumerics only
pub fn validate_logical_id(id: &str) -> ValidationResult {
    let mut chars = id.chars();
    match chars.next() {
        None => Err(ValidationError::Empty("logical id")),
        Some(first) if !first.is_ascii_alphabetic() => {
            Err(ValidationError::InvalidLogicalId(id.to_string()))
        }
        Some(_) if !chars.all(|c| c.is_ascii_alphanumeric()) => {
            Err(ValidationError::InvalidLogicalId(id.to_string()))
        }
        Some(_) => Ok(()),
    }
}

/// Validate an admin username against an engine's length cap
///
/// # Rules
/// - Starts with a letter
/// - Alphanumeric only
/// - At most `max_len` characters
pub fn validate_admin_username(username: &str, max_len: usize) -> ValidationResult {
    let invalid = |reason: &str| ValidationError::InvalidUsername {
        username: username.to_string(),
        reason: reason.to_string(),
    };

    if username.is_empty() {
        return Err(ValidationError::Empty("admin username"));
    }
    if username.len() > max_len {
        return Err(invalid(&format!("longer than {} characters", max_len)));
    }
    if !username.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err(invalid("must start with a letter"));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(invalid("must be alphanumeric"));
    }
    Ok(())
}

/// Validate the default schema name created inside the cluster
pub fn validate_database_name(name: &str) -> ValidationResult {
    if name.is_empty() {
        return Err(ValidationError::Empty("default database name"));
    }
    let valid = name.len() <= MAX_DATABASE_NAME_LENGTH
        && name.starts_with(|c: char| c.is_ascii_alphabetic())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(ValidationError::InvalidDatabaseName(name.to_string()));
    }
    Ok(())
}

/// Validate a datastore instance count
pub fn validate_instance_count(count: i64) -> ValidationResult {
    if !(1..=MAX_CLUSTER_INSTANCES).contains(&count) {
        return Err(ValidationError::InvalidInstanceCount(count));
    }
    Ok(())
}

/// Validate a TCP port
pub fn validate_port(port: u32) -> ValidationResult {
    if port == 0 || port > u32::from(u16::MAX) {
        return Err(ValidationError::InvalidPort(port));
    }
    Ok(())
}

/// Validate an environment variable name (`[A-Za-z_][A-Za-z0-9_]*`)
pub fn validate_environment_key(key: &str) -> ValidationResult {
    let valid = key.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(ValidationError::InvalidEnvironmentKey(key.to_string()));
    }
    Ok(())
}

/// Validate scaling bounds
///
/// # Rules
/// - min >= 1 (the implicit minimum)
/// - max >= min
pub fn validate_scaling_bounds(min: i64, max: i64) -> ValidationResult {
    if min < 1 || max < min {
        return Err(ValidationError::InvalidScalingBounds { min, max });
    }
    Ok(())
}

/// Validate that a desired replica count lies within scaling bounds
pub fn validate_desired_count(desired: u32, min: u32, max: u32) -> ValidationResult {
    if desired < min || desired > max {
        return Err(ValidationError::DesiredCountOutOfBounds { desired, min, max });
    }
    Ok(())
}

/// Validate a Fargate CPU/memory combination
///
/// # Rules
/// - 256 CPU: 512, 1024 or 2048 MiB
/// - 512 CPU: 1024-4096 MiB in 1024 steps
/// - 1024 CPU: 2048-8192 MiB in 1024 steps
/// - 2048 CPU: 4096-16384 MiB in 1024 steps
/// - 4096 CPU: 8192-30720 MiB in 1024 steps
pub fn validate_task_shape(cpu: u32, memory_mib: u32) -> ValidationResult {
    let stepped = |lo: u32, hi: u32| (lo..=hi).contains(&memory_mib) && memory_mib % 1024 == 0;
    let valid = match cpu {
        256 => matches!(memory_mib, 512 | 1024 | 2048),
        512 => stepped(1024, 4096),
        1024 => stepped(2048, 8192),
        2048 => stepped(4096, 16384),
        4096 => stepped(8192, 30720),
        _ => false,
    };
    if !valid {
        return Err(ValidationError::InvalidTaskShape { cpu, memory_mib });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("DBCluster" ; "plain")]
    #[test_case("LBFargate2" ; "trailing digit")]
    #[test_case("S" ; "single letter")]
    fn test_valid_logical_ids(id: &str) {
        assert!(validate_logical_id(id).is_ok());
    }

    #[test_case("" ; "empty")]
    #[test_case("1Cluster" ; "leading digit")]
    #[test_case("DB-Cluster" ; "hyphen")]
    #[test_case("DB Cluster" ; "space")]
    fn test_invalid_logical_ids(id: &str) {
        assert!(validate_logical_id(id).is_err());
    }

    #[test]
    fn test_admin_username_rules() {
        assert!(validate_admin_username("RailsFooDBAdminU", 16).is_ok());
        assert!(validate_admin_username("RailsFooDBAdminUs", 16).is_err());
        assert!(validate_admin_username("9admin", 16).is_err());
        assert!(validate_admin_username("ad_min", 16).is_err());
        assert_eq!(
            validate_admin_username("", 16),
            Err(ValidationError::Empty("admin username"))
        );
    }

    #[test]
    fn test_database_name_rules() {
        assert!(validate_database_name("app_development").is_ok());
        assert!(validate_database_name("_app").is_err());
        assert!(validate_database_name("app-dev").is_err());
        assert!(validate_database_name(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_instance_count_range() {
        assert!(validate_instance_count(1).is_ok());
        assert!(validate_instance_count(15).is_ok());
        assert!(validate_instance_count(0).is_err());
        assert!(validate_instance_count(16).is_err());
        assert!(validate_instance_count(-2).is_err());
    }

    #[test]
    fn test_scaling_bounds() {
        assert!(validate_scaling_bounds(1, 1).is_ok());
        assert!(validate_scaling_bounds(1, 2).is_ok());
        assert_eq!(
            validate_scaling_bounds(1, 0),
            Err(ValidationError::InvalidScalingBounds { min: 1, max: 0 })
        );
        assert!(validate_scaling_bounds(1, -3).is_err());
        assert!(validate_scaling_bounds(0, 4).is_err());
        assert!(validate_scaling_bounds(3, 2).is_err());
    }

    #[test]
    fn test_desired_count_within_bounds() {
        assert!(validate_desired_count(1, 1, 2).is_ok());
        assert!(validate_desired_count(3, 1, 2).is_err());
        assert!(validate_desired_count(0, 1, 2).is_err());
    }

    #[test_case(256, 512 ; "smallest")]
    #[test_case(256, 2048 ; "small max")]
    #[test_case(512, 3072 ; "half vcpu")]
    #[test_case(4096, 30720 ; "largest")]
    fn test_valid_task_shapes(cpu: u32, memory: u32) {
        assert!(validate_task_shape(cpu, memory).is_ok());
    }

    #[test_case(256, 4096 ; "too much memory")]
    #[test_case(512, 512 ; "too little memory")]
    #[test_case(1024, 2500 ; "off step")]
    #[test_case(300, 1024 ; "unknown cpu")]
    fn test_invalid_task_shapes(cpu: u32, memory: u32) {
        assert!(validate_task_shape(cpu, memory).is_err());
    }

    #[test]
    fn test_environment_keys() {
        assert!(validate_environment_key("DATABASE_URL").is_ok());
        assert!(validate_environment_key("_PRIVATE").is_ok());
        assert!(validate_environment_key("1PORT").is_err());
        assert!(validate_environment_key("RAILS-ENV").is_err());
        assert!(validate_environment_key("").is_err());
    }

    #[test]
    fn test_ports() {
        assert!(validate_port(80).is_ok());
        assert!(validate_port(0).is_err());
        assert!(validate_port(70000).is_err());
    }
}
