// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Plugin Gateway assembly
//!
//! Wires the services together from injected collaborators, or from a
//! loaded `GatewayConfigManifest` with the production adapters.

use anyhow::Context;
use secrecy::SecretString;
use std::sync::Arc;

use crate::application::device_communication::DeviceCommunicationService;
use crate::application::dispatcher::PluginDispatcher;
use crate::application::inventory::InventoryService;
use crate::application::session_broker::SessionBroker;
use crate::domain::credentials::CredentialDecryptor;
use crate::domain::gateway_config::GatewayConfigManifest;
use crate::domain::repository::RecordStore;
use crate::domain::session::PluginTokenCache;
use crate::domain::transport::{PluginHealthProbe, PluginTransport};
use crate::domain::url_translation::UrlTranslator;
use crate::infrastructure::credential_vault::RsaCredentialVault;
use crate::infrastructure::http_transport::ReqwestPluginTransport;
use crate::infrastructure::status_probe::StatusPollingProbe;
use crate::infrastructure::token_cache::InMemoryTokenCache;

pub struct PluginGateway {
    pub inventory: Arc<InventoryService>,
    pub dispatcher: Arc<PluginDispatcher>,
    pub sessions: Arc<SessionBroker>,
    pub devices: Arc<DeviceCommunicationService>,
}

impl PluginGateway {
    pub fn new(
        translator: UrlTranslator,
        store: Arc<dyn RecordStore>,
        decryptor: Arc<dyn CredentialDecryptor>,
        transport: Arc<dyn PluginTransport>,
        probe: Arc<dyn PluginHealthProbe>,
        token_cache: Arc<dyn PluginTokenCache>,
    ) -> Self {
        let inventory = Arc::new(InventoryService::new(store, decryptor));
        let dispatcher = Arc::new(PluginDispatcher::new(transport, probe, Arc::new(translator)));
        let sessions = Arc::new(SessionBroker::new(dispatcher.clone(), token_cache));
        let devices = Arc::new(DeviceCommunicationService::new(
            inventory.clone(),
            dispatcher.clone(),
            sessions.clone(),
        ));

        Self {
            inventory,
            dispatcher,
            sessions,
            devices,
        }
    }

    /// Production wiring: RSA vault, reqwest transport, status polling probe
    pub fn from_config(config: &GatewayConfigManifest, store: Arc<dyn RecordStore>) -> anyhow::Result<Self> {
        let spec = &config.spec;

        let vault = match &spec.key_cert.private_key_path {
            Some(path) => {
                let passphrase = spec
                    .key_cert
                    .resolve_passphrase()
                    .context("Failed to resolve private key passphrase")?
                    .map(SecretString::from);
                RsaCredentialVault::from_pem_file(path, passphrase.as_ref())
                    .with_context(|| format!("Failed to load private key {:?}", path))?
            }
            None => {
                tracing::warn!("No private key configured; credential decryption will fail");
                RsaCredentialVault::unavailable("no private key configured")
            }
        };

        let transport: Arc<dyn PluginTransport> = Arc::new(
            ReqwestPluginTransport::new(
                spec.http_client.request_timeout(),
                spec.key_cert.root_ca_certificate_path.as_deref(),
            )
            .context("Failed to build plugin HTTP client")?,
        );
        let probe = Arc::new(StatusPollingProbe::new(
            transport.clone(),
            spec.plugin_status_polling.clone(),
        ));

        tracing::info!(
            south_bound_rules = spec.url_translation.south_bound.len(),
            north_bound_rules = spec.url_translation.north_bound.len(),
            "Plugin gateway configured"
        );

        Ok(Self::new(
            UrlTranslator::new(spec.url_translation.clone()),
            store,
            Arc::new(vault),
            transport,
            probe,
            Arc::new(InMemoryTokenCache::new()),
        ))
    }
}
