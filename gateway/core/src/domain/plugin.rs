// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Plugin
//!
//! A plugin is an out-of-process management endpoint that speaks the
//! south-bound protocol on behalf of one or more devices.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Persisted plugin record and its resolved, decrypted form

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::contact::BasicCredentials;

/// Unique plugin identifier (e.g. "GRF", "ILO_v2.0.0")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginId(String);

impl PluginId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PluginId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// How the gateway authenticates resource calls against a plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthType {
    /// Plugin credentials on every call
    #[default]
    BasicAuth,
    /// Session token obtained through the login exchange
    XAuthToken,
}

impl AuthType {
    /// Interprets a stored preference. Anything other than `XAuthToken`
    /// (case-insensitive) means basic authentication.
    pub fn from_preference(value: &str) -> Self {
        if value.eq_ignore_ascii_case("XAuthToken") {
            Self::XAuthToken
        } else {
            Self::BasicAuth
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BasicAuth => "BasicAuth",
            Self::XAuthToken => "XAuthToken",
        }
    }
}

/// Plugin as persisted in the `Plugin` table.
///
/// `password` is RSA-OAEP ciphertext; JSON carries it base64-encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PluginRecord {
    #[serde(rename = "ID")]
    pub id: PluginId,

    #[serde(rename = "IP")]
    pub ip: String,

    pub port: String,

    pub username: String,

    #[serde(with = "base64_bytes")]
    pub password: Vec<u8>,

    #[serde(default)]
    pub plugin_type: String,

    #[serde(default)]
    pub preferred_auth_type: String,
}

/// Plugin resolved for a call: password already decrypted.
///
/// Immutable for the duration of a call and re-read from the store on the
/// next lookup.
#[derive(Debug, Clone)]
pub struct Plugin {
    pub id: PluginId,
    pub ip: String,
    pub port: String,
    pub username: String,
    pub password: SecretString,
    pub plugin_type: String,
    pub preferred_auth_type: AuthType,
}

impl Plugin {
    pub fn from_record(record: PluginRecord, password: SecretString) -> Self {
        Self {
            preferred_auth_type: AuthType::from_preference(&record.preferred_auth_type),
            id: record.id,
            ip: record.ip,
            port: record.port,
            username: record.username,
            password,
            plugin_type: record.plugin_type,
        }
    }

    /// `https://<ip>:<port>` root every plugin path is appended to
    pub fn base_url(&self) -> String {
        format!("https://{}:{}", self.ip, self.port)
    }

    pub fn basic_credentials(&self) -> BasicCredentials {
        BasicCredentials {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }

    pub fn uses_session_tokens(&self) -> bool {
        self.preferred_auth_type == AuthType::XAuthToken
    }
}

/// Byte strings stored the way the record store writes them: standard
/// base64, `null` meaning empty.
pub(crate) mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        match encoded {
            Some(value) => STANDARD.decode(value.trim()).map_err(serde::de::Error::custom),
            None => Ok(Vec::new()),
        }
    }
}
