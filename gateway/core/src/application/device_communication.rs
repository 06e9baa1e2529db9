// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Device Communication Service
//!
//! Entry point for every call that must reach a managed device through the
//! plugin that owns it.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Resolve device and plugin, authenticate, dispatch, federate ids
//! - **Integration:** `ResourceInfoRequest` -> `InventoryService` -> `SessionBroker` -> `PluginDispatcher`
//!
//! # Identifier spaces
//!
//! North-bound callers address device resources as `<DeviceUUID>.<LocalID>`.
//! The UUID qualifier is stripped before dispatch and added back to every
//! `Systems`, `Managers` and `Chassis` link in the plugin's reply.
//!
//! # Authentication
//!
//! Token plugins get one refresh: a 401 creates a new session (bypassing
//! the cache) and the call is repeated once. Basic-auth plugins are never
//! retried on 401.

use regex::{Captures, Regex};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::{Arc, LazyLock};

use crate::application::dispatcher::PluginDispatcher;
use crate::application::inventory::InventoryService;
use crate::application::session_broker::SessionBroker;
use crate::domain::contact::{
    AuthMaterial, ContactPayload, ContactRequest, DeviceInfo, HttpMethod, PluginResponse,
};
use crate::domain::errors::GatewayError;
use crate::domain::target::UpdatedBmcCredentials;

pub const SUCCESS: &str = "Success";
pub const GENERAL_ERROR: &str = "Base.1.13.0.GeneralError";
pub const INTERNAL_ERROR: &str = "Base.1.13.0.InternalError";
pub const NO_VALID_SESSION: &str = "Base.1.13.0.NoValidSession";

static FEDERATED_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(/redfish/v1/(?:systems|managers|chassis)/)([^/"\s?#]*)"#)
        .expect("federated link pattern is valid")
});

/// A north-bound request for a device resource
#[derive(Debug, Clone)]
pub struct ResourceInfoRequest {
    /// North-bound resource path, possibly carrying `<uuid>.<system_id>`
    pub url: String,
    pub uuid: String,
    pub system_id: String,
    pub http_method: HttpMethod,
    pub request_body: Option<Vec<u8>>,
    pub bmc_updated_creds: Option<UpdatedBmcCredentials>,
}

impl ResourceInfoRequest {
    pub fn get(url: impl Into<String>, uuid: impl Into<String>, system_id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            uuid: uuid.into(),
            system_id: system_id.into(),
            http_method: HttpMethod::Get,
            request_body: None,
            bmc_updated_creds: None,
        }
    }

    /// Plugin-local path: `<uuid>.<system_id>` collapsed to `<system_id>`
    pub fn south_bound_oid(&self) -> String {
        if self.uuid.is_empty() {
            return self.url.clone();
        }
        self.url
            .replace(&format!("{}.{}", self.uuid, self.system_id), &self.system_id)
    }
}

/// Response envelope handed back to the north-bound caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceResponse {
    pub status_code: u16,
    pub status_message: String,
    pub body: Value,
}

impl DeviceResponse {
    pub fn success(body: Value) -> Self {
        Self {
            status_code: 200,
            status_message: SUCCESS.to_string(),
            body,
        }
    }

    /// Redfish error envelope with a single extended-info message
    pub fn general_error(status_code: u16, message_id: &str, message: impl Into<String>) -> Self {
        Self {
            status_code,
            status_message: message_id.to_string(),
            body: json!({
                "error": {
                    "code": GENERAL_ERROR,
                    "message": "An error has occurred. See ExtendedInfo for more information.",
                    "@Message.ExtendedInfo": [{
                        "@odata.type": "#Message.v1_1_2.Message",
                        "MessageId": message_id,
                        "Message": message.into(),
                    }],
                }
            }),
        }
    }

    fn from_error(err: &GatewayError) -> Self {
        match err {
            GatewayError::PluginRejected { status, body, .. }
            | GatewayError::AuthenticationExhausted { status, body, .. } => Self {
                status_code: *status,
                status_message: String::new(),
                body: serde_json::from_slice(body)
                    .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned())),
            },
            GatewayError::SessionUnavailable { .. } => Self::general_error(401, NO_VALID_SESSION, err.to_string()),
            _ => Self::general_error(500, INTERNAL_ERROR, err.to_string()),
        }
    }
}

/// Qualify every `Systems`/`Managers`/`Chassis` member link with `uuid`
pub fn federate_links(body: &str, uuid: &str) -> String {
    let qualifier = format!("{}.", uuid);
    FEDERATED_LINK
        .replace_all(body, |caps: &Captures| {
            let local_id = &caps[2];
            if local_id.is_empty() || local_id.starts_with(&qualifier) {
                caps[0].to_string()
            } else {
                format!("{}{}{}", &caps[1], qualifier, local_id)
            }
        })
        .into_owned()
}

pub struct DeviceCommunicationService {
    inventory: Arc<InventoryService>,
    dispatcher: Arc<PluginDispatcher>,
    sessions: Arc<SessionBroker>,
}

impl DeviceCommunicationService {
    pub fn new(
        inventory: Arc<InventoryService>,
        dispatcher: Arc<PluginDispatcher>,
        sessions: Arc<SessionBroker>,
    ) -> Self {
        Self {
            inventory,
            dispatcher,
            sessions,
        }
    }

    /// Perform an action on the device with the caller's method and body.
    ///
    /// Never fails: errors are folded into the response envelope, with a
    /// plugin's own status and body passed through unchanged.
    pub async fn device_communication(&self, req: ResourceInfoRequest) -> DeviceResponse {
        let oid = req.south_bound_oid();
        let context = format!("error while performing virtual media actions {}: ", oid);

        let response = match self.call(&req, req.http_method, req.request_body.clone(), &context).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(device_uuid = %req.uuid, oid = %oid, error = %e, "Device action failed");
                return DeviceResponse::from_error(&e);
            }
        };

        let data = federate_links(&response.body, &req.uuid);
        if data.trim().is_empty() {
            return DeviceResponse::success(Value::Null);
        }
        match serde_json::from_str(&data) {
            Ok(body) => {
                tracing::debug!(device_uuid = %req.uuid, oid = %oid, "Outgoing device communication response to northbound");
                DeviceResponse::success(body)
            }
            Err(e) => {
                tracing::error!(device_uuid = %req.uuid, oid = %oid, error = %e, "Plugin returned malformed JSON");
                DeviceResponse::general_error(500, INTERNAL_ERROR, e.to_string())
            }
        }
    }

    /// GET a device resource and return its federated JSON text
    pub async fn get_resource_info_from_device(&self, req: ResourceInfoRequest) -> Result<String, GatewayError> {
        let oid = req.south_bound_oid();
        let context = format!("error while getting the details {}: ", oid);

        let response = self
            .call(&req, HttpMethod::Get, None, &context)
            .await
            .inspect_err(|e| {
                tracing::error!(device_uuid = %req.uuid, oid = %oid, error = %e, "Failed to get data from plugin");
            })?;

        Ok(federate_links(&response.body, &req.uuid))
    }

    async fn call(
        &self,
        req: &ResourceInfoRequest,
        method: HttpMethod,
        post_body: Option<Vec<u8>>,
        context: &str,
    ) -> Result<PluginResponse, GatewayError> {
        let request = self.prepare(req, method, post_body).await?;
        self.send_with_refresh(request, context).await
    }

    async fn prepare(
        &self,
        req: &ResourceInfoRequest,
        method: HttpMethod,
        post_body: Option<Vec<u8>>,
    ) -> Result<ContactRequest, GatewayError> {
        let target = self.inventory.get_target(&req.uuid).await?;
        let plugin = self.inventory.get_plugin(&target.plugin_id).await?;

        let auth = if plugin.uses_session_tokens() {
            let token = self.sessions.ensure_token(&plugin).await.ok_or_else(|| {
                tracing::error!(plugin_id = %plugin.id, "Unable to create session with plugin");
                GatewayError::SessionUnavailable {
                    plugin_id: plugin.id.clone(),
                }
            })?;
            AuthMaterial::XAuthToken(token)
        } else {
            AuthMaterial::Basic(plugin.basic_credentials())
        };

        let stored_password = self.inventory.decryptor().decrypt(&target.password).map_err(|e| {
            tracing::error!(device_uuid = %req.uuid, error = %e, "Failed to decrypt device password");
            GatewayError::from(e)
        })?;
        let password = effective_password(&target.user_name, stored_password, req.bmc_updated_creds.as_ref());

        let device = DeviceInfo {
            manager_address: target.manager_address,
            user_name: target.user_name,
            password,
            post_body: post_body.filter(|body| !body.is_empty()),
        };

        Ok(ContactRequest::new(
            plugin,
            req.south_bound_oid(),
            method,
            auth,
            ContactPayload::Device(device),
        ))
    }

    async fn send_with_refresh(&self, request: ContactRequest, context: &str) -> Result<PluginResponse, GatewayError> {
        match self.dispatcher.send(&request, context).await {
            Err(e) if e.is_unauthorized() && request.plugin.uses_session_tokens() => {
                tracing::warn!(plugin_id = %request.plugin.id, oid = %request.oid, "Plugin session rejected, refreshing");
            }
            other => return other,
        }

        let token = self.sessions.create_token(&request.plugin).await.ok_or_else(|| {
            tracing::error!(plugin_id = %request.plugin.id, oid = %request.oid, "Session refresh failed");
            GatewayError::SessionUnavailable {
                plugin_id: request.plugin.id.clone(),
            }
        })?;

        let retry = request.with_auth(AuthMaterial::XAuthToken(token));
        match self.dispatcher.send(&retry, context).await {
            Err(GatewayError::PluginRejected {
                plugin_id,
                url,
                status: 401,
                body,
                ..
            }) => {
                tracing::error!(plugin_id = %plugin_id, url = %url, "Plugin rejected the refreshed session");
                Err(GatewayError::AuthenticationExhausted {
                    plugin_id,
                    url,
                    status: 401,
                    body,
                })
            }
            other => other,
        }
    }
}

/// Updated BMC password when it belongs to the stored user and differs
fn effective_password(
    user_name: &str,
    stored: SecretString,
    updated: Option<&UpdatedBmcCredentials>,
) -> SecretString {
    match updated {
        Some(creds)
            if creds.user_name == user_name
                && creds.updated_password.expose_secret() != stored.expose_secret() =>
        {
            creds.updated_password.clone()
        }
        _ => stored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UUID: &str = "6d4a0a66-7efa-578e-83cf-44dc68d2874e";

    #[test]
    fn test_federates_member_links() {
        let body = r#"{"@odata.id":"/redfish/v1/Systems/1","Managers":"/redfish/v1/managers/bmc","Chassis":"/redfish/v1/Chassis/c1/Power"}"#;
        let federated = federate_links(body, UUID);

        assert!(federated.contains(&format!("/redfish/v1/Systems/{UUID}.1\"")));
        assert!(federated.contains(&format!("/redfish/v1/managers/{UUID}.bmc\"")));
        assert!(federated.contains(&format!("/redfish/v1/Chassis/{UUID}.c1/Power")));
    }

    #[test]
    fn test_federation_is_idempotent() {
        let body = format!(r#"{{"@odata.id":"/redfish/v1/Systems/{UUID}.1"}}"#);
        assert_eq!(federate_links(&body, UUID), body);
    }

    #[test]
    fn test_collection_links_untouched() {
        let body = r#"{"@odata.id":"/redfish/v1/Systems/","Members":"/redfish/v1/Systems"}"#;
        assert_eq!(federate_links(body, UUID), body);
    }

    #[test]
    fn test_south_bound_oid_strips_qualifier() {
        let req = ResourceInfoRequest::get(format!("/redfish/v1/Systems/{UUID}.1/Bios"), UUID, "1");
        assert_eq!(req.south_bound_oid(), "/redfish/v1/Systems/1/Bios");
    }

    #[test]
    fn test_updated_bmc_password_for_same_user() {
        let updated = UpdatedBmcCredentials {
            user_name: "root".to_string(),
            updated_password: SecretString::from("new"),
        };

        let chosen = effective_password("root", SecretString::from("old"), Some(&updated));
        assert_eq!(chosen.expose_secret(), "new");

        let chosen = effective_password("admin", SecretString::from("old"), Some(&updated));
        assert_eq!(chosen.expose_secret(), "old");
    }

    #[test]
    fn test_general_error_envelope() {
        let response = DeviceResponse::general_error(401, NO_VALID_SESSION, "session refresh failed");
        assert_eq!(response.status_code, 401);
        assert_eq!(response.body["error"]["code"], GENERAL_ERROR);
        assert_eq!(response.body["error"]["@Message.ExtendedInfo"][0]["MessageId"], NO_VALID_SESSION);
    }

    #[test]
    fn test_rejection_passes_plugin_answer_through() {
        let err = GatewayError::PluginRejected {
            context: String::new(),
            plugin_id: "GRF".into(),
            url: "https://10.0.0.4:45001/ODIM/v1/Systems/1".to_string(),
            status: 409,
            body: bytes::Bytes::from_static(br#"{"error":"busy"}"#),
        };
        let response = DeviceResponse::from_error(&err);
        assert_eq!(response.status_code, 409);
        assert_eq!(response.body["error"], "busy");
    }
}
