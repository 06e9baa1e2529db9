// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use plugin_gateway_core::domain::gateway_config::GatewayConfigManifest;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
}

pub async fn handle_command(command: ConfigCommand, config_override: Option<PathBuf>) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let config = GatewayConfigManifest::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. PGW_CONFIG_PATH: {}",
            std::env::var("PGW_CONFIG_PATH")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./plugin-gateway.yaml");
        println!("  4. ~/.plugin-gateway/config.yaml");
        println!("  5. /etc/plugin-gateway/config.yaml");
        println!();
    }

    println!("{}", "Current configuration:".bold());
    println!();

    let spec = &config.spec;
    println!("{}", "URL Translation:".bold());
    for rule in &spec.url_translation.south_bound {
        println!("  south-bound {} → {}", rule.from, rule.to);
    }
    for rule in &spec.url_translation.north_bound {
        println!("  north-bound {} → {}", rule.from, rule.to);
    }
    println!();

    println!("{}", "Plugin Status Polling:".bold());
    println!("  Max attempts: {}", spec.plugin_status_polling.max_retry_attempt);
    println!("  Retry interval: {}ms", spec.plugin_status_polling.retry_interval_ms);
    println!("  Response timeout: {}s", spec.plugin_status_polling.response_timeout_secs);
    println!();

    println!("{}", "Key Material:".bold());
    println!(
        "  Private key: {}",
        spec.key_cert
            .private_key_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".to_string())
    );
    println!(
        "  Passphrase: {}",
        if spec.key_cert.private_key_passphrase.is_some() { "(set)" } else { "(none)" }
    );
    if let Some(ca) = &spec.key_cert.root_ca_certificate_path {
        println!("  Root CA: {}", ca.display());
    }
    println!();

    if let Some(seed) = &spec.inventory_seed_path {
        println!("{}", "Inventory:".bold());
        println!("  Seed file: {}", seed.display());
        println!();
    }

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = GatewayConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}
