// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Device commands
//!
//! Commands: get, action

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use plugin_gateway_core::application::ResourceInfoRequest;
use plugin_gateway_core::domain::contact::HttpMethod;
use plugin_gateway_core::domain::gateway_config::GatewayConfigManifest;

use super::build_gateway;

#[derive(Subcommand)]
pub enum DeviceCommand {
    /// Read a resource from a device
    Get {
        /// Device UUID
        uuid: String,

        /// Plugin-local system id the federated id refers to
        system_id: String,

        /// North-bound resource path (e.g. /redfish/v1/Systems/<uuid>.<id>)
        path: String,
    },

    /// Perform an action on a device
    Action {
        /// Device UUID
        uuid: String,

        /// Plugin-local system id the federated id refers to
        system_id: String,

        /// HTTP method (GET, POST, PUT, PATCH, DELETE)
        method: String,

        /// North-bound resource path
        path: String,

        /// JSON request body forwarded to the device
        #[arg(long)]
        body: Option<String>,
    },
}

pub async fn handle_command(command: DeviceCommand, config: GatewayConfigManifest) -> Result<()> {
    match command {
        DeviceCommand::Get { uuid, system_id, path } => get(&config, uuid, system_id, path).await,
        DeviceCommand::Action {
            uuid,
            system_id,
            method,
            path,
            body,
        } => action(&config, uuid, system_id, method, path, body).await,
    }
}

async fn get(config: &GatewayConfigManifest, uuid: String, system_id: String, path: String) -> Result<()> {
    let gateway = build_gateway(config)?;

    let data = gateway
        .devices
        .get_resource_info_from_device(ResourceInfoRequest::get(path, uuid, system_id))
        .await
        .context("Failed to get resource from device")?;

    let pretty = serde_json::from_str::<serde_json::Value>(&data)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .unwrap_or(data);
    println!("{}", pretty);

    Ok(())
}

async fn action(
    config: &GatewayConfigManifest,
    uuid: String,
    system_id: String,
    method: String,
    path: String,
    body: Option<String>,
) -> Result<()> {
    let http_method: HttpMethod = method.parse().map_err(anyhow::Error::msg)?;

    if let Some(body) = &body {
        serde_json::from_str::<serde_json::Value>(body).context("--body is not valid JSON")?;
    }

    let gateway = build_gateway(config)?;
    let response = gateway
        .devices
        .device_communication(ResourceInfoRequest {
            url: path,
            uuid,
            system_id,
            http_method,
            request_body: body.map(String::into_bytes),
            bmc_updated_creds: None,
        })
        .await;

    let status = format!("HTTP {}", response.status_code);
    if response.status_code < 300 {
        eprintln!("{}", status.green());
    } else {
        eprintln!("{}", status.red());
    }
    println!("{}", serde_json::to_string_pretty(&response.body)?);

    if response.status_code >= 400 {
        anyhow::bail!("Device action failed with status {}", response.status_code);
    }
    Ok(())
}
