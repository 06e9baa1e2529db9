// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Status Polling Probe
//!
//! Polls a plugin's status endpoint before the dispatcher spends its single
//! retry on it.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::domain::contact::{AuthMaterial, HttpMethod};
use crate::domain::gateway_config::PluginStatusPollingConfig;
use crate::domain::plugin::Plugin;
use crate::domain::transport::{OutboundRequest, PluginHealthProbe, PluginTransport, STATUS_PATH};

pub struct StatusPollingProbe {
    transport: Arc<dyn PluginTransport>,
    config: PluginStatusPollingConfig,
}

impl StatusPollingProbe {
    pub fn new(transport: Arc<dyn PluginTransport>, config: PluginStatusPollingConfig) -> Self {
        Self { transport, config }
    }

    async fn check_once(&self, plugin: &Plugin, url: &str) -> bool {
        let request = OutboundRequest {
            url: url.to_string(),
            method: HttpMethod::Get,
            auth: AuthMaterial::Basic(plugin.basic_credentials()),
            body: Value::Null,
            timeout: Some(self.config.response_timeout()),
        };

        match self.transport.send(request).await {
            Ok(response) if response.status == 200 => reports_available(&response.body),
            Ok(response) => {
                tracing::debug!(plugin_id = %plugin.id, status = response.status, "Plugin status check rejected");
                false
            }
            Err(e) => {
                tracing::debug!(plugin_id = %plugin.id, error = %e, "Plugin status check failed");
                false
            }
        }
    }
}

/// `Status.Available` must be absent or "yes"
fn reports_available(body: &[u8]) -> bool {
    let Ok(status) = serde_json::from_slice::<Value>(body) else {
        return true;
    };
    match status.pointer("/Status/Available").and_then(Value::as_str) {
        Some(available) => available.eq_ignore_ascii_case("yes"),
        None => true,
    }
}

#[async_trait]
impl PluginHealthProbe for StatusPollingProbe {
    async fn is_healthy(&self, plugin: &Plugin) -> bool {
        let url = format!("{}{}", plugin.base_url(), STATUS_PATH);
        let attempts = self.config.max_retry_attempt.max(1);

        for attempt in 1..=attempts {
            if self.check_once(plugin, &url).await {
                tracing::info!(plugin_id = %plugin.id, attempt, "Plugin is reachable");
                return true;
            }
            if attempt < attempts {
                tokio::time::sleep(self.config.retry_interval()).await;
            }
        }

        tracing::warn!(plugin_id = %plugin.id, attempts, "Plugin is not reachable");
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::plugin::{AuthType, PluginId};
    use crate::domain::transport::{TransportError, TransportResponse};
    use bytes::Bytes;
    use parking_lot::Mutex;
    use secrecy::SecretString;
    use std::time::Duration;

    /// Replays scripted replies, recording every request
    struct ScriptedTransport {
        replies: Mutex<Vec<Result<TransportResponse, TransportError>>>,
        seen: Mutex<Vec<OutboundRequest>>,
    }

    impl ScriptedTransport {
        fn new(mut replies: Vec<Result<TransportResponse, TransportError>>) -> Arc<Self> {
            replies.reverse();
            Arc::new(Self {
                replies: Mutex::new(replies),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl PluginTransport for ScriptedTransport {
        async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError> {
            let url = request.url.clone();
            self.seen.lock().push(request);
            self.replies
                .lock()
                .pop()
                .unwrap_or(Err(TransportError::Unreachable { url, reason: "script exhausted".to_string() }))
        }
    }

    fn ok(status: u16, body: &'static str) -> Result<TransportResponse, TransportError> {
        Ok(TransportResponse {
            status,
            session_token: None,
            body: Bytes::from_static(body.as_bytes()),
        })
    }

    fn refused() -> Result<TransportResponse, TransportError> {
        Err(TransportError::Unreachable {
            url: "https://10.0.0.4:45001/ODIM/v1/Status".to_string(),
            reason: "connection refused".to_string(),
        })
    }

    fn plugin() -> Plugin {
        Plugin {
            id: PluginId::new("GRF"),
            ip: "10.0.0.4".to_string(),
            port: "45001".to_string(),
            username: "admin".to_string(),
            password: SecretString::from("Plugin123"),
            plugin_type: "Compute".to_string(),
            preferred_auth_type: AuthType::XAuthToken,
        }
    }

    fn config(max_retry_attempt: u32) -> PluginStatusPollingConfig {
        PluginStatusPollingConfig {
            max_retry_attempt,
            retry_interval_ms: 1,
            response_timeout_secs: 1,
        }
    }

    #[tokio::test]
    async fn test_available_plugin_is_healthy() {
        let transport = ScriptedTransport::new(vec![ok(200, r#"{"Status":{"Available":"yes"}}"#)]);
        let probe = StatusPollingProbe::new(transport.clone(), config(3));

        assert!(probe.is_healthy(&plugin()).await);

        let seen = transport.seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].url, "https://10.0.0.4:45001/ODIM/v1/Status");
        assert!(seen[0].auth.basic().is_some());
        assert_eq!(seen[0].timeout, Some(Duration::from_secs(1)));
    }

    #[tokio::test]
    async fn test_recovers_within_attempts() {
        let transport = ScriptedTransport::new(vec![refused(), ok(503, ""), ok(200, "{}")]);
        let probe = StatusPollingProbe::new(transport.clone(), config(3));

        assert!(probe.is_healthy(&plugin()).await);
        assert_eq!(transport.seen.lock().len(), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let transport = ScriptedTransport::new(vec![refused(), refused(), refused(), ok(200, "{}")]);
        let probe = StatusPollingProbe::new(transport.clone(), config(2));

        assert!(!probe.is_healthy(&plugin()).await);
        assert_eq!(transport.seen.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_unavailable_status_is_unhealthy() {
        let transport = ScriptedTransport::new(vec![ok(200, r#"{"Status":{"Available":"no"}}"#)]);
        let probe = StatusPollingProbe::new(transport, config(1));

        assert!(!probe.is_healthy(&plugin()).await);
    }
}
