// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Transport
//!
//! Anti-corruption layer between the dispatcher and the HTTP stack.
//! Implementations live in `infrastructure::http_transport` and
//! `infrastructure::status_probe`.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Wire-level request/response and the transport/health-probe contracts

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use std::time::Duration;

use crate::domain::contact::{AuthMaterial, HttpMethod};
use crate::domain::plugin::Plugin;

/// Plugin status endpoint polled before a transport retry
pub const STATUS_PATH: &str = "/ODIM/v1/Status";

/// Fully built request, ready to go on the wire
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub url: String,
    pub method: HttpMethod,
    pub auth: AuthMaterial,
    pub body: Value,
    /// Per-attempt response wait; transport default when `None`
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub session_token: Option<String>,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200 || self.status == 201
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("connection to {url} failed: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("no response from {url} within the configured wait")]
    Timeout { url: String },

    #[error("failed to read response body from {url}: {reason}")]
    Body { url: String, reason: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    /// Connectivity failures are the only ones worth a health-gated retry
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Unreachable { .. } | Self::Timeout { .. })
    }
}

/// Sends one request to a plugin
#[async_trait]
pub trait PluginTransport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError>;
}

/// Decides whether a plugin is worth a second attempt
#[async_trait]
pub trait PluginHealthProbe: Send + Sync {
    async fn is_healthy(&self, plugin: &Plugin) -> bool;
}
