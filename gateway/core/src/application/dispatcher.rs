// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Plugin Dispatcher
//!
//! Sends one `ContactRequest` to its plugin and classifies the outcome.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Build the wire request, send it, absorb one transport failure
//! - **Integration:** `ContactRequest` -> `UrlTranslator` -> `PluginTransport` -> `PluginResponse`
//!
//! # Retry policy
//!
//! A connectivity failure (refused connection, timeout) triggers the health
//! probe. If the plugin reports healthy the identical request is sent once
//! more. HTTP status codes are never retried here; a 401 is the facade's
//! concern.

use std::sync::Arc;

use crate::domain::contact::{ContactRequest, PluginResponse};
use crate::domain::errors::GatewayError;
use crate::domain::transport::{
    OutboundRequest, PluginHealthProbe, PluginTransport, TransportError, TransportResponse,
};
use crate::domain::url_translation::UrlTranslator;

pub struct PluginDispatcher {
    transport: Arc<dyn PluginTransport>,
    probe: Arc<dyn PluginHealthProbe>,
    translator: Arc<UrlTranslator>,
}

impl PluginDispatcher {
    pub fn new(
        transport: Arc<dyn PluginTransport>,
        probe: Arc<dyn PluginHealthProbe>,
        translator: Arc<UrlTranslator>,
    ) -> Self {
        Self {
            transport,
            probe,
            translator,
        }
    }

    fn build(&self, request: &ContactRequest) -> OutboundRequest {
        let path = self.translator.translate_to_south_bound(&request.oid);
        OutboundRequest {
            url: format!("{}{}", request.plugin.base_url(), path),
            method: request.method,
            auth: request.auth.clone(),
            body: request.payload.to_json(),
            timeout: None,
        }
    }

    /// Send `request`; `error_context` prefixes every error message
    pub async fn send(&self, request: &ContactRequest, error_context: &str) -> Result<PluginResponse, GatewayError> {
        let outbound = self.build(request);
        let url = outbound.url.clone();
        let plugin_id = &request.plugin.id;

        let response = match self.transport.send(outbound.clone()).await {
            Ok(response) => response,
            Err(first) => self.retry_if_healthy(request, outbound, first, error_context).await?,
        };

        if !response.is_success() {
            tracing::error!(
                plugin_id = %plugin_id,
                method = %request.method,
                url = %url,
                status = response.status,
                "{}plugin rejected the request",
                error_context
            );
            metrics::counter!("pgw_plugin_requests_total", "outcome" => "rejected").increment(1);
            return Err(GatewayError::PluginRejected {
                context: error_context.to_string(),
                plugin_id: plugin_id.clone(),
                url,
                status: response.status,
                body: response.body,
            });
        }

        let text = match std::str::from_utf8(&response.body) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(plugin_id = %plugin_id, url = %url, error = %e, "{}plugin body is not UTF-8", error_context);
                metrics::counter!("pgw_plugin_requests_total", "outcome" => "malformed").increment(1);
                return Err(GatewayError::MalformedResponse {
                    context: error_context.to_string(),
                    plugin_id: plugin_id.clone(),
                    url,
                    reason: e.to_string(),
                });
            }
        };

        metrics::counter!("pgw_plugin_requests_total", "outcome" => "success").increment(1);
        Ok(PluginResponse {
            status: response.status,
            body: self.translator.rewrite_body_north_bound(text),
            session_token: response.session_token,
        })
    }

    async fn retry_if_healthy(
        &self,
        request: &ContactRequest,
        outbound: OutboundRequest,
        first: TransportError,
        error_context: &str,
    ) -> Result<TransportResponse, GatewayError> {
        let plugin_id = &request.plugin.id;
        tracing::warn!(plugin_id = %plugin_id, url = %outbound.url, error = %first, "Plugin call failed");

        let unreachable = |err: &TransportError, url: &str| {
            metrics::counter!("pgw_plugin_requests_total", "outcome" => "unreachable").increment(1);
            GatewayError::PluginUnreachable {
                context: error_context.to_string(),
                plugin_id: plugin_id.clone(),
                url: url.to_string(),
                reason: err.to_string(),
            }
        };

        if !first.is_connectivity() || !self.probe.is_healthy(&request.plugin).await {
            tracing::error!(plugin_id = %plugin_id, url = %outbound.url, "{}{}", error_context, first);
            return Err(unreachable(&first, &outbound.url));
        }

        let url = outbound.url.clone();
        self.transport.send(outbound).await.map_err(|second| {
            tracing::error!(plugin_id = %plugin_id, url = %url, "{}{}", error_context, second);
            unreachable(&second, &url)
        })
    }
}
