// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Record Store Implementations
//!
//! Infrastructure implementations of the `RecordStore` abstraction defined in
//! the domain layer.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Serve plugin and device records to the inventory service
//! - **Pattern:** Repository (DDD), Adapter (Hexagonal Architecture)
//!
//! # Available Implementations
//!
//! - **InMemoryRecordStore** - Thread-safe, two-tier, HashMap-backed storage.
//!   Seeded from an inventory YAML file for the CLI and used directly by tests.
//!
//! # Inventory seed format
//!
//! ```yaml
//! plugins:
//!   - ID: GRF
//!     IP: 10.0.0.4
//!     Port: "45001"
//!     Username: admin
//!     Password: <base64 RSA-OAEP ciphertext>
//!     PluginType: Compute
//!     PreferredAuthType: XAuthToken
//! systems:
//!   - DeviceUUID: 6d4a0a66-7efa-578e-83cf-44dc68d2874e
//!     PluginID: GRF
//!     ManagerAddress: 10.24.0.12
//!     UserName: root
//!     Password: <base64 RSA-OAEP ciphertext>
//! ```

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::domain::plugin::PluginRecord;
use crate::domain::repository::{RecordStore, RepositoryError, StoreTier, PLUGIN_TABLE, SYSTEM_TABLE};
use crate::domain::target::Target;

type Tables = HashMap<String, HashMap<String, String>>;

#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    on_disk: Arc<RwLock<Tables>>,
    in_memory: Arc<RwLock<Tables>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tier(&self, tier: StoreTier) -> &Arc<RwLock<Tables>> {
        match tier {
            StoreTier::OnDisk => &self.on_disk,
            StoreTier::InMemory => &self.in_memory,
        }
    }

    /// Store a raw value, replacing any previous one
    pub fn insert(&self, tier: StoreTier, table: &str, key: &str, value: impl Into<String>) {
        self.tier(tier)
            .write()
            .entry(table.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
    }

    pub fn insert_plugin(&self, record: &PluginRecord) -> Result<(), RepositoryError> {
        let value = serde_json::to_string(record).map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        self.insert(StoreTier::OnDisk, PLUGIN_TABLE, record.id.as_str(), value);
        Ok(())
    }

    pub fn insert_target(&self, target: &Target) -> Result<(), RepositoryError> {
        let value = serde_json::to_string(target).map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        self.insert(StoreTier::OnDisk, SYSTEM_TABLE, &target.device_uuid, value);
        Ok(())
    }

    /// Store seeded with every record listed in an inventory YAML file
    pub fn from_seed_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read inventory seed {:?}: {}", path, e))?;
        Self::from_seed_str(&content)
    }

    pub fn from_seed_str(content: &str) -> anyhow::Result<Self> {
        let seed: InventorySeed = serde_yaml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse inventory seed: {}", e))?;

        let store = Self::new();
        for plugin in &seed.plugins {
            store.insert_plugin(plugin)?;
        }
        for target in &seed.systems {
            store.insert_target(target)?;
        }

        tracing::info!(
            plugins = seed.plugins.len(),
            systems = seed.systems.len(),
            "Loaded inventory seed"
        );
        Ok(store)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct InventorySeed {
    #[serde(default)]
    plugins: Vec<PluginRecord>,
    #[serde(default)]
    systems: Vec<Target>,
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn read(&self, tier: StoreTier, table: &str, key: &str) -> Result<String, RepositoryError> {
        self.tier(tier)
            .read()
            .get(table)
            .and_then(|rows| rows.get(key))
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound {
                table: table.to_string(),
                key: key.to_string(),
            })
    }

    async fn get_all_keys(&self, tier: StoreTier, table: &str) -> Result<Vec<String>, RepositoryError> {
        let tables = self.tier(tier).read();
        let mut keys: Vec<String> = tables
            .get(table)
            .map(|rows| rows.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        Ok(keys)
    }
}
