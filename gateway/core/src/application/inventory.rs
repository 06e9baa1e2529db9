// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Inventory Service
//!
//! Resolves device and plugin records from the record store.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Record lookup, deserialization and plugin password decryption
//! - **Integration:** `RecordStore` + `CredentialDecryptor` -> `Target` / `Plugin`
//!
//! Records are read on every lookup; nothing is cached here.

use std::sync::Arc;

use crate::domain::credentials::{CredentialDecryptor, VaultError};
use crate::domain::errors::GatewayError;
use crate::domain::plugin::{Plugin, PluginId, PluginRecord};
use crate::domain::repository::{RecordStore, StoreTier, PLUGIN_TABLE, SYSTEM_TABLE};
use crate::domain::target::Target;

pub struct InventoryService {
    store: Arc<dyn RecordStore>,
    decryptor: Arc<dyn CredentialDecryptor>,
}

impl InventoryService {
    pub fn new(store: Arc<dyn RecordStore>, decryptor: Arc<dyn CredentialDecryptor>) -> Self {
        Self { store, decryptor }
    }

    pub fn decryptor(&self) -> &Arc<dyn CredentialDecryptor> {
        &self.decryptor
    }

    /// Device record for `device_uuid`
    pub async fn get_target(&self, device_uuid: &str) -> Result<Target, GatewayError> {
        let raw = self
            .store
            .read(StoreTier::OnDisk, SYSTEM_TABLE, device_uuid)
            .await
            .map_err(|e| GatewayError::DeviceLookupFailed {
                device_uuid: device_uuid.to_string(),
                reason: e.to_string(),
            })?;

        serde_json::from_str(&raw).map_err(|e| GatewayError::DeviceLookupFailed {
            device_uuid: device_uuid.to_string(),
            reason: format!("malformed device record: {}", e),
        })
    }

    /// Plugin record for `plugin_id` with its password decrypted
    pub async fn get_plugin(&self, plugin_id: &PluginId) -> Result<Plugin, GatewayError> {
        let raw = self
            .store
            .read(StoreTier::OnDisk, PLUGIN_TABLE, plugin_id.as_str())
            .await
            .map_err(|e| GatewayError::AgentLookupFailed {
                plugin_id: plugin_id.to_string(),
                reason: e.to_string(),
            })?;

        let record: PluginRecord = serde_json::from_str(&raw).map_err(|e| GatewayError::AgentLookupFailed {
            plugin_id: plugin_id.to_string(),
            reason: format!("malformed plugin record: {}", e),
        })?;

        let password = self.decryptor.decrypt(&record.password).map_err(|e| {
            tracing::error!(plugin_id = %plugin_id, error = %e, "Failed to decrypt plugin password");
            match e {
                VaultError::KeyUnavailable(reason) => {
                    GatewayError::KeyUnavailable(format!("plugin {}: {}", plugin_id, reason))
                }
                VaultError::DecryptionFailed(reason) => {
                    GatewayError::DecryptionFailed(format!("plugin {}: {}", plugin_id, reason))
                }
            }
        })?;

        Ok(Plugin::from_record(record, password))
    }

    /// Every registered plugin, resolved and decrypted
    pub async fn get_all_plugins(&self) -> Result<Vec<Plugin>, GatewayError> {
        let keys = self.store.get_all_keys(StoreTier::OnDisk, PLUGIN_TABLE).await?;
        let mut plugins = Vec::with_capacity(keys.len());
        for key in keys {
            plugins.push(self.get_plugin(&PluginId::new(key)).await?);
        }
        Ok(plugins)
    }

    /// UUIDs of every registered device
    pub async fn get_all_systems(&self) -> Result<Vec<String>, GatewayError> {
        Ok(self.store.get_all_keys(StoreTier::OnDisk, SYSTEM_TABLE).await?)
    }

    /// Keys of an InMemory-tier table
    pub async fn get_all_keys_from_table(&self, table: &str) -> Result<Vec<String>, GatewayError> {
        Ok(self.store.get_all_keys(StoreTier::InMemory, table).await?)
    }
}
