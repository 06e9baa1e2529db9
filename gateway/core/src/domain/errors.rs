// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Gateway errors
//!
//! Every failure a caller of the dispatcher or the device communication
//! facade can observe. Plugin-originated failures keep the plugin's status
//! code and body so callers can surface them unchanged.

use bytes::Bytes;

use crate::domain::credentials::VaultError;
use crate::domain::plugin::PluginId;
use crate::domain::repository::RepositoryError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    #[error("private key unavailable: {0}")]
    KeyUnavailable(String),

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("failed to fetch plugin data for {plugin_id}: {reason}")]
    AgentLookupFailed { plugin_id: String, reason: String },

    #[error("failed to fetch device details for {device_uuid}: {reason}")]
    DeviceLookupFailed { device_uuid: String, reason: String },

    #[error("{context}plugin {plugin_id} unreachable at {url}: {reason}")]
    PluginUnreachable {
        context: String,
        plugin_id: PluginId,
        url: String,
        reason: String,
    },

    #[error("{context}plugin {plugin_id} answered {url} with status {status}")]
    PluginRejected {
        context: String,
        plugin_id: PluginId,
        url: String,
        status: u16,
        body: Bytes,
    },

    #[error("{context}plugin {plugin_id} sent an unreadable body from {url}: {reason}")]
    MalformedResponse {
        context: String,
        plugin_id: PluginId,
        url: String,
        reason: String,
    },

    #[error("plugin {plugin_id} still answered {url} with status {status} after the session was refreshed")]
    AuthenticationExhausted {
        plugin_id: PluginId,
        url: String,
        status: u16,
        body: Bytes,
    },

    #[error("unable to create session with plugin {plugin_id}")]
    SessionUnavailable { plugin_id: PluginId },

    #[error("record store error: {0}")]
    Repository(#[from] RepositoryError),
}

impl GatewayError {
    /// Status code reported by the plugin, if the plugin answered at all
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::PluginRejected { status, .. } | Self::AuthenticationExhausted { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Body returned by the plugin alongside `upstream_status`
    pub fn upstream_body(&self) -> Option<&Bytes> {
        match self {
            Self::PluginRejected { body, .. } | Self::AuthenticationExhausted { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.upstream_status() == Some(401)
    }
}

impl From<VaultError> for GatewayError {
    fn from(err: VaultError) -> Self {
        match err {
            VaultError::KeyUnavailable(reason) => Self::KeyUnavailable(reason),
            VaultError::DecryptionFailed(reason) => Self::DecryptionFailed(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_details_only_for_plugin_answers() {
        let rejected = GatewayError::PluginRejected {
            context: "error while getting the details /redfish/v1/Systems/1: ".to_string(),
            plugin_id: PluginId::new("GRF"),
            url: "https://10.0.0.4:45001/redfish/v1/Systems/1".to_string(),
            status: 401,
            body: Bytes::from_static(b"{}"),
        };
        assert_eq!(rejected.upstream_status(), Some(401));
        assert!(rejected.is_unauthorized());
        assert!(rejected.to_string().starts_with("error while getting the details"));

        let unavailable = GatewayError::SessionUnavailable { plugin_id: PluginId::new("GRF") };
        assert_eq!(unavailable.upstream_status(), None);
        assert!(unavailable.upstream_body().is_none());
    }

    #[test]
    fn test_vault_errors_keep_their_kind() {
        let err: GatewayError = VaultError::DecryptionFailed("bad padding".to_string()).into();
        assert!(matches!(err, GatewayError::DecryptionFailed(_)));

        let err: GatewayError = VaultError::KeyUnavailable("no passphrase".to_string()).into();
        assert!(matches!(err, GatewayError::KeyUnavailable(_)));
    }
}
