// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stack Composition
//!
//! Turns a [`StackConfig`](crate::config::StackConfig) into an
//! [`EnvironmentStack`](crate::domain::EnvironmentStack) and optionally hands
//! it to a provisioning engine.
//!
//! # Architecture
//!
//! ```text
//! StackConfig
//!     ↓
//! resolve()   secret → profile → image build → repository name → registry
//!     ↓          (async, collaborators awaited one after another)
//! ResolvedInputs
//!     ↓
//! assemble()  pure; declares every resource in dependency order
//!     ↓
//! EnvironmentStack
//!     ↓
//! deploy()    one submission, no retries
//! ```
//!
//! Any error aborts the whole composition. Nothing reaches the provisioning
//! engine unless every step succeeded.

pub mod environment;

pub use environment::{ResolvedInputs, StackComposer};
