// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Inventory commands
//!
//! Commands: plugins, systems

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use plugin_gateway_core::domain::gateway_config::GatewayConfigManifest;

use super::build_gateway;

#[derive(Subcommand)]
pub enum InventoryCommand {
    /// List registered plugins (passwords are decrypted to verify the key)
    Plugins,

    /// List registered device UUIDs
    Systems,
}

pub async fn handle_command(command: InventoryCommand, config: GatewayConfigManifest) -> Result<()> {
    let gateway = build_gateway(&config)?;

    match command {
        InventoryCommand::Plugins => {
            let plugins = gateway
                .inventory
                .get_all_plugins()
                .await
                .context("Failed to list plugins")?;

            println!("{}", "Plugins:".bold());
            for plugin in plugins {
                println!(
                    "  {} {} ({}, {})",
                    plugin.id.as_str().bold(),
                    plugin.base_url(),
                    plugin.plugin_type,
                    plugin.preferred_auth_type.as_str()
                );
            }
        }
        InventoryCommand::Systems => {
            let systems = gateway
                .inventory
                .get_all_systems()
                .await
                .context("Failed to list systems")?;

            println!("{}", "Systems:".bold());
            for uuid in systems {
                println!("  {}", uuid);
            }
        }
    }

    Ok(())
}
