// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Plugin Gateway CLI
//!
//! The `pgw` binary drives the plugin gateway from the command line.
//!
//! ## Commands
//!
//! - `pgw config show|validate` - Configuration management
//! - `pgw device get|action` - Read or act on a device through its plugin
//! - `pgw inventory plugins|systems` - List registered plugins and devices
//!
//! Device and inventory commands read records from the inventory seed file
//! named by `spec.inventory_seed_path`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use plugin_gateway_core::domain::gateway_config::GatewayConfigManifest;

mod commands;

use commands::{ConfigCommand, DeviceCommand, InventoryCommand};

/// Plugin Gateway - reach managed devices through their plugins
#[derive(Parser)]
#[command(name = "pgw")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(short, long, global = true, env = "PGW_CONFIG_PATH", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); defaults to the configured level
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Device resource operations
    #[command(name = "device")]
    Device {
        #[command(subcommand)]
        command: DeviceCommand,
    },

    /// Registered plugins and devices
    #[command(name = "inventory")]
    Inventory {
        #[command(subcommand)]
        command: InventoryCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = GatewayConfigManifest::load_or_default(cli.config.clone())
        .context("Failed to load configuration")?;

    let logging = &config.spec.observability.logging;
    init_logging(cli.log_level.as_deref().unwrap_or(&logging.level), &logging.format)?;

    match cli.command {
        Commands::Config { command } => commands::config::handle_command(command, cli.config).await,
        Commands::Device { command } => commands::device::handle_command(command, config).await,
        Commands::Inventory { command } => commands::inventory::handle_command(command, config).await,
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str, format: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if format.eq_ignore_ascii_case("json") {
        builder.json().init();
    } else {
        builder.compact().init();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_device_action() {
        let cli = Cli::try_parse_from([
            "pgw",
            "device",
            "action",
            "6d4a0a66-7efa-578e-83cf-44dc68d2874e",
            "1",
            "POST",
            "/redfish/v1/Systems/6d4a0a66-7efa-578e-83cf-44dc68d2874e.1/Actions/ComputerSystem.Reset",
            "--body",
            r#"{"ResetType":"On"}"#,
        ])
        .unwrap();

        match cli.command {
            Commands::Device {
                command: DeviceCommand::Action { method, body, .. },
            } => {
                assert_eq!(method, "POST");
                assert_eq!(body.as_deref(), Some(r#"{"ResetType":"On"}"#));
            }
            _ => panic!("expected device action"),
        }
    }
}
