// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Plugin Gateway core
//!
//! Fronts hardware-management plugins behind a uniform resource API: keeps a
//! session per plugin, dispatches calls over HTTPS, recovers from expired
//! sessions and transient transport failures, rewrites addresses between the
//! federated (north-bound) and plugin-local (south-bound) spaces, and decrypts
//! the at-rest credentials needed to reach a device.
//!
//! # Architecture
//!
//! - **domain** - records, collaborator traits, errors, configuration, translation rules
//! - **application** - session broker, dispatcher, device communication facade
//! - **infrastructure** - RSA vault, token cache, reqwest transport, status probe, record stores

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
