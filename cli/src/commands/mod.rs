// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the pgw CLI

pub mod config;
pub mod device;
pub mod inventory;

pub use self::config::ConfigCommand;
pub use self::device::DeviceCommand;
pub use self::inventory::InventoryCommand;

use anyhow::{Context, Result};
use std::sync::Arc;

use plugin_gateway_core::application::PluginGateway;
use plugin_gateway_core::domain::gateway_config::GatewayConfigManifest;
use plugin_gateway_core::infrastructure::InMemoryRecordStore;

/// Gateway wired from configuration over the seeded in-memory store
pub(crate) fn build_gateway(config: &GatewayConfigManifest) -> Result<PluginGateway> {
    config.validate().context("Configuration validation failed")?;

    let store = match &config.spec.inventory_seed_path {
        Some(path) => InMemoryRecordStore::from_seed_file(path)?,
        None => {
            tracing::warn!("No inventory_seed_path configured; inventory is empty");
            InMemoryRecordStore::new()
        }
    };

    PluginGateway::from_config(config, Arc::new(store))
}
