// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Session Broker
//!
//! Obtains and caches plugin session tokens.
//!
//! Failures never propagate: a plugin that cannot issue a session yields
//! `None` and the caller decides what that means for its request.

use secrecy::SecretString;
use std::sync::Arc;

use crate::application::dispatcher::PluginDispatcher;
use crate::domain::contact::{AuthMaterial, ContactPayload, ContactRequest, HttpMethod};
use crate::domain::plugin::Plugin;
use crate::domain::session::{PluginTokenCache, SESSION_PATH};

pub struct SessionBroker {
    dispatcher: Arc<PluginDispatcher>,
    cache: Arc<dyn PluginTokenCache>,
}

impl SessionBroker {
    pub fn new(dispatcher: Arc<PluginDispatcher>, cache: Arc<dyn PluginTokenCache>) -> Self {
        Self { dispatcher, cache }
    }

    /// Cached token for `plugin`, logging in on a miss
    pub async fn ensure_token(&self, plugin: &Plugin) -> Option<SecretString> {
        if let Some(token) = self.cache.get(&plugin.id) {
            return Some(token);
        }
        self.create_token(plugin).await
    }

    /// Fresh session for `plugin`, replacing any cached token
    pub async fn create_token(&self, plugin: &Plugin) -> Option<SecretString> {
        let request = ContactRequest::new(
            plugin.clone(),
            SESSION_PATH,
            HttpMethod::Post,
            AuthMaterial::SessionLogin,
            ContactPayload::Login(plugin.basic_credentials()),
        );

        let context = format!("error while creating the session with plugin {}: ", plugin.id);
        let response = match self.dispatcher.send(&request, &context).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(plugin_id = %plugin.id, error = %e, "Failed to create plugin session");
                return None;
            }
        };

        match response.session_token.filter(|token| !token.is_empty()) {
            Some(token) => {
                let token = SecretString::from(token);
                self.cache.set(&plugin.id, token.clone());
                tracing::debug!(plugin_id = %plugin.id, "Created plugin session");
                Some(token)
            }
            None => {
                tracing::error!(plugin_id = %plugin.id, "Plugin session reply carried no X-Auth-Token header");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::plugin::{AuthType, PluginId};
    use crate::domain::transport::{
        OutboundRequest, PluginHealthProbe, PluginTransport, TransportError, TransportResponse,
    };
    use crate::domain::url_translation::UrlTranslator;
    use crate::infrastructure::token_cache::InMemoryTokenCache;
    use async_trait::async_trait;
    use bytes::Bytes;
    use parking_lot::Mutex;
    use secrecy::ExposeSecret;

    /// Login endpoint issuing `token-<n>` on the n-th call
    struct LoginTransport {
        requests: Mutex<Vec<OutboundRequest>>,
        status: u16,
        with_header: bool,
    }

    impl LoginTransport {
        fn new(status: u16, with_header: bool) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                status,
                with_header,
            })
        }
    }

    #[async_trait]
    impl PluginTransport for LoginTransport {
        async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError> {
            let mut requests = self.requests.lock();
            requests.push(request);
            Ok(TransportResponse {
                status: self.status,
                session_token: self.with_header.then(|| format!("token-{}", requests.len())),
                body: Bytes::new(),
            })
        }
    }

    struct Healthy;

    #[async_trait]
    impl PluginHealthProbe for Healthy {
        async fn is_healthy(&self, _plugin: &Plugin) -> bool {
            true
        }
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

    fn broker(transport: Arc<LoginTransport>, cache: Arc<InMemoryTokenCache>) -> SessionBroker {
        let dispatcher = PluginDispatcher::new(transport, Arc::new(Healthy), Arc::new(UrlTranslator::default()));
        SessionBroker::new(Arc::new(dispatcher), cache)
    }

    #[tokio::test]
    async fn test_ensure_token_logs_in_once() {
        let transport = LoginTransport::new(201, true);
        let cache = Arc::new(InMemoryTokenCache::new());
        let broker = broker(transport.clone(), cache.clone());

        let first = broker.ensure_token(&plugin()).await.unwrap();
        let second = broker.ensure_token(&plugin()).await.unwrap();

        assert_eq!(first.expose_secret(), "token-1");
        assert_eq!(second.expose_secret(), "token-1");

        let requests = transport.requests.lock();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "https://10.0.0.4:45001/ODIM/v1/Sessions");
        assert_eq!(requests[0].body["Username"], "admin");
        assert_eq!(requests[0].body["Password"], "Plugin123");
        assert!(requests[0].auth.token().is_none());
        assert!(requests[0].auth.basic().is_none());
    }

    #[tokio::test]
    async fn test_create_token_overwrites_cache() {
        let transport = LoginTransport::new(201, true);
        let cache = Arc::new(InMemoryTokenCache::new());
        cache.set(&PluginId::new("GRF"), SecretString::from("stale"));
        let broker = broker(transport, cache.clone());

        let token = broker.create_token(&plugin()).await.unwrap();

        assert_eq!(token.expose_secret(), "token-1");
        assert_eq!(cache.get(&PluginId::new("GRF")).unwrap().expose_secret(), "token-1");
    }

    #[tokio::test]
    async fn test_rejected_login_yields_none() {
        let cache = Arc::new(InMemoryTokenCache::new());
        let broker = broker(LoginTransport::new(401, true), cache.clone());

        assert!(broker.ensure_token(&plugin()).await.is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_missing_header_yields_none() {
        let cache = Arc::new(InMemoryTokenCache::new());
        let broker = broker(LoginTransport::new(201, false), cache.clone());

        assert!(broker.create_token(&plugin()).await.is_none());
        assert!(cache.is_empty());
    }
}
