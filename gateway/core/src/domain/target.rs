// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Target
//!
//! A managed device (BMC) reachable only through its owning plugin.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Persisted device record (`System` table)

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::domain::plugin::PluginId;

/// Device credentials and addressing as stored in the `System` table.
///
/// `password` is RSA-OAEP ciphertext and is decrypted per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    #[serde(rename = "ManagerAddress")]
    pub manager_address: String,

    #[serde(rename = "Password", with = "crate::domain::plugin::base64_bytes")]
    pub password: Vec<u8>,

    #[serde(rename = "UserName")]
    pub user_name: String,

    #[serde(rename = "PostBody", default, with = "crate::domain::plugin::base64_bytes")]
    pub post_body: Vec<u8>,

    #[serde(rename = "DeviceUUID")]
    pub device_uuid: String,

    #[serde(rename = "PluginID")]
    pub plugin_id: PluginId,

    #[serde(rename = "Location", default)]
    pub location: String,
}

/// Credentials changed on the BMC but not yet written back to the store.
#[derive(Debug, Clone)]
pub struct UpdatedBmcCredentials {
    pub user_name: String,
    pub updated_password: SecretString,
}
