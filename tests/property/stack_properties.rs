// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Composed Stacks
//!
//! Generates caller configurations and composes each one against the
//! in-memory reference collaborators.

use cim_environment_stack::domain::{DatabaseEngine, RemovalPolicy, SubnetPlacement};
use cim_environment_stack::{EnvironmentStack, StackConfig, StackResult};
use proptest::prelude::*;

use crate::fixtures::{reference_composer, stack_config};

/// Valid caller configurations around the reference deployment
fn config_strategy() -> impl Strategy<Value = StackConfig> {
    (
        prop::sample::select(vec![DatabaseEngine::AuroraMysql, DatabaseEngine::AuroraPostgresql]),
        "[A-Za-z][A-Za-z0-9]{0,15}",
        1u32..=15,
        prop::sample::select(vec![SubnetPlacement::Private, SubnetPlacement::Isolated]),
        prop::sample::select(vec![
            RemovalPolicy::Retain,
            RemovalPolicy::Snapshot,
            RemovalPolicy::Destroy,
        ]),
        1u16..=65535,
        1i64..=20,
    )
        .prop_flat_map(
            |(engine, username, instances, placement, removal, port, max)| {
                (1u32..=max as u32).prop_map(move |desired| {
                    let mut config = stack_config();
                    config.datastore.engine = engine;
                    config.credentials.username = username.clone();
                    config.datastore.instances = instances;
                    config.datastore.subnet_placement = placement;
                    config.datastore.removal_policy = removal;
                    config.service.container_port = port;
                    config.scaling.max_capacity = max;
                    config.service.desired_count = desired;
                    config
                })
            },
        )
}

fn compose(config: &StackConfig) -> StackResult<EnvironmentStack> {
    tokio_test::block_on(reference_composer().compose(config))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The service reaches the datastore; the datastore never reaches the service
    #[test]
    fn prop_ingress_is_asymmetric(config in config_strategy(), probe in 1u16..=65535) {
        let stack = compose(&config).expect("valid configuration composes");
        let cluster = stack.datastore().expect("datastore declared");
        let service = stack.compute_service().expect("service declared");

        prop_assert!(stack.permits_flow(
            &service.security_group,
            &cluster.security_group,
            config.datastore.engine.default_port(),
        ));
        prop_assert!(!stack.permits_flow(
            &cluster.security_group,
            &service.security_group,
            probe,
        ));
    }

    /// Equal configurations give byte-identical declarations
    #[test]
    fn prop_composition_is_deterministic(config in config_strategy()) {
        let first = compose(&config).expect("valid configuration composes");
        let second = compose(&config).expect("valid configuration composes");
        prop_assert_eq!(first.to_json().expect("serializable"), second.to_json().expect("serializable"));
    }

    /// Declared datastore values are carried through unchanged
    #[test]
    fn prop_datastore_values_preserved(config in config_strategy()) {
        let stack = compose(&config).expect("valid configuration composes");
        let cluster = stack.datastore().expect("datastore declared");

        prop_assert_eq!(cluster.instances, config.datastore.instances);
        prop_assert_eq!(cluster.removal_policy, config.datastore.removal_policy);
        prop_assert_eq!(cluster.subnet_placement, config.datastore.subnet_placement);
        prop_assert_eq!(&cluster.admin.username, &config.credentials.username);
        prop_assert_eq!(&cluster.default_database_name, &config.datastore.default_database_name);
    }

    /// The service's desired count always lies within its scaling bounds
    #[test]
    fn prop_desired_count_within_bounds(config in config_strategy()) {
        let stack = compose(&config).expect("valid configuration composes");
        let service = stack.compute_service().expect("service declared");
        let policy = stack.scaling_policy().expect("scaling declared");

        prop_assert!(policy.min_capacity <= service.desired_count);
        prop_assert!(service.desired_count <= policy.max_capacity);
        prop_assert_eq!(&policy.target, &service.logical_id);
    }

    /// A desired count above the maximum aborts composition
    #[test]
    fn prop_desired_count_above_maximum_rejected(max in 1i64..=10, excess in 1u32..=10) {
        let mut config = stack_config();
        config.scaling.max_capacity = max;
        config.service.desired_count = max as u32 + excess;
        prop_assert!(compose(&config).is_err());
    }
}
