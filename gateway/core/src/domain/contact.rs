// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Contact
//!
//! The ephemeral request/response pair of a single plugin call.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Contact request, auth material and payload shapes

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

use crate::domain::plugin::Plugin;

/// HTTP verbs the plugins understand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            other => Err(format!("unsupported HTTP method: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BasicCredentials {
    pub username: String,
    pub password: SecretString,
}

/// Authentication attached to an outbound call.
///
/// Resource calls carry exactly one of `XAuthToken` or `Basic`, chosen by the
/// plugin's preferred auth type. `SessionLogin` is reserved for the login
/// exchange itself, whose credentials travel in the payload.
#[derive(Debug, Clone)]
pub enum AuthMaterial {
    XAuthToken(SecretString),
    Basic(BasicCredentials),
    SessionLogin,
}

impl AuthMaterial {
    pub fn token(&self) -> Option<&SecretString> {
        match self {
            Self::XAuthToken(token) => Some(token),
            _ => None,
        }
    }

    pub fn basic(&self) -> Option<&BasicCredentials> {
        match self {
            Self::Basic(credentials) => Some(credentials),
            _ => None,
        }
    }
}

/// Device addressing forwarded to the plugin so it can reach the BMC
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub manager_address: String,
    pub user_name: String,
    pub password: SecretString,
    pub post_body: Option<Vec<u8>>,
}

/// Body of an outbound call
#[derive(Debug, Clone)]
pub enum ContactPayload {
    Device(DeviceInfo),
    Login(BasicCredentials),
}

impl ContactPayload {
    /// Wire JSON. Byte fields are base64 encoded the way plugins decode them.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Device(device) => {
                let mut body = json!({
                    "ManagerAddress": device.manager_address,
                    "UserName": device.user_name,
                    "Password": STANDARD.encode(device.password.expose_secret().as_bytes()),
                });
                if let Some(post_body) = &device.post_body {
                    body["PostBody"] = Value::String(STANDARD.encode(post_body));
                }
                body
            }
            Self::Login(credentials) => json!({
                "Username": credentials.username,
                "Password": credentials.password.expose_secret(),
            }),
        }
    }
}

/// One call to one plugin. Built fresh per call, never shared.
#[derive(Debug, Clone)]
pub struct ContactRequest {
    pub plugin: Plugin,
    /// Plugin-relative path, still in north-bound form
    pub oid: String,
    pub method: HttpMethod,
    pub auth: AuthMaterial,
    pub payload: ContactPayload,
}

impl ContactRequest {
    pub fn new(
        plugin: Plugin,
        oid: impl Into<String>,
        method: HttpMethod,
        auth: AuthMaterial,
        payload: ContactPayload,
    ) -> Self {
        Self {
            plugin,
            oid: oid.into(),
            method,
            auth,
            payload,
        }
    }

    /// Same call with different auth, used when a session is refreshed
    pub fn with_auth(&self, auth: AuthMaterial) -> Self {
        Self {
            auth,
            ..self.clone()
        }
    }
}

/// Successful plugin reply
#[derive(Debug, Clone)]
pub struct PluginResponse {
    pub status: u16,
    /// Body after north-bound translation
    pub body: String,
    /// `X-Auth-Token` header, present on login replies
    pub session_token: Option<String>,
}
