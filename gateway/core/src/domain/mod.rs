// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Mod
//!
//! Provides the domain model of the plugin gateway.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Records, collaborator interfaces and rules shared by every layer

pub mod plugin;
pub mod target;
pub mod contact;
pub mod credentials;
pub mod session;
pub mod transport;
pub mod repository;
pub mod errors;
pub mod url_translation;
pub mod gateway_config;
