// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! Value-object properties (image reference derivation, connection strings,
//! scaling bounds) and whole-stack properties (ingress asymmetry,
//! deterministic output).

mod stack_properties;
mod value_properties;
