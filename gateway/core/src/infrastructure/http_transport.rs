// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Reqwest Plugin Transport
//!
//! HTTPS client used for every plugin call.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Implements `PluginTransport` over `reqwest`
//! - **Integration:** `OutboundRequest` -> HTTPS -> `TransportResponse`
//!
//! Plugins present certificates issued by the deployment's own CA, so the
//! client trusts the configured root CA in addition to the built-in roots.

use async_trait::async_trait;
use reqwest::{Certificate, Client, Method};
use secrecy::ExposeSecret;
use std::path::Path;
use std::time::Duration;

use crate::domain::contact::{AuthMaterial, HttpMethod};
use crate::domain::session::AUTH_TOKEN_HEADER;
use crate::domain::transport::{OutboundRequest, PluginTransport, TransportError, TransportResponse};

pub struct ReqwestPluginTransport {
    client: Client,
}

impl ReqwestPluginTransport {
    /// Client with a default per-request timeout and optional extra root CA
    pub fn new(request_timeout: Duration, root_ca_path: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = Client::builder().timeout(request_timeout);

        if let Some(path) = root_ca_path {
            let pem = std::fs::read(path)
                .map_err(|e| anyhow::anyhow!("Failed to read root CA certificate {:?}: {}", path, e))?;
            let certificate = Certificate::from_pem(&pem)?;
            builder = builder.add_root_certificate(certificate);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn classify(url: &str, err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout { url: url.to_string() }
    } else if err.is_builder() {
        TransportError::InvalidRequest(err.to_string())
    } else {
        TransportError::Unreachable {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }
}

#[async_trait]
impl PluginTransport for ReqwestPluginTransport {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), &request.url);

        builder = match &request.auth {
            AuthMaterial::XAuthToken(token) => builder.header(AUTH_TOKEN_HEADER, token.expose_secret()),
            AuthMaterial::Basic(credentials) => {
                builder.basic_auth(&credentials.username, Some(credentials.password.expose_secret()))
            }
            AuthMaterial::SessionLogin => builder,
        };

        if !request.body.is_null() {
            builder = builder.json(&request.body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        tracing::debug!(method = %request.method, url = %request.url, "Sending plugin request");

        let response = builder.send().await.map_err(|e| classify(&request.url, e))?;

        let status = response.status().as_u16();
        let session_token = response
            .headers()
            .get(AUTH_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout { url: request.url.clone() }
            } else {
                TransportError::Body {
                    url: request.url.clone(),
                    reason: e.to_string(),
                }
            }
        })?;

        Ok(TransportResponse {
            status,
            session_token,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contact::BasicCredentials;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use mockito::Matcher;
    use secrecy::SecretString;
    use serde_json::json;

    fn transport() -> ReqwestPluginTransport {
        ReqwestPluginTransport::new(Duration::from_secs(5), None).unwrap()
    }

    #[tokio::test]
    async fn test_token_auth_sends_only_the_token_header() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ODIM/v1/Systems/1")
            .match_header("x-auth-token", "session-abc")
            .match_header("authorization", Matcher::Missing)
            .match_body(Matcher::Json(json!({"ManagerAddress": "10.0.0.9"})))
            .with_status(200)
            .with_body(r#"{"Id":"1"}"#)
            .create_async()
            .await;

        let response = transport()
            .send(OutboundRequest {
                url: format!("{}/ODIM/v1/Systems/1", server.url()),
                method: HttpMethod::Get,
                auth: AuthMaterial::XAuthToken(SecretString::from("session-abc")),
                body: json!({"ManagerAddress": "10.0.0.9"}),
                timeout: None,
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status, 200);
        assert_eq!(&response.body[..], br#"{"Id":"1"}"#);
    }

    #[tokio::test]
    async fn test_basic_auth_sends_no_token_header() {
        let mut server = mockito::Server::new_async().await;
        let expected = format!("Basic {}", STANDARD.encode("admin:Plugin123"));
        let mock = server
            .mock("PATCH", "/ODIM/v1/Systems/1")
            .match_header("authorization", expected.as_str())
            .match_header("x-auth-token", Matcher::Missing)
            .with_status(204)
            .create_async()
            .await;

        let response = transport()
            .send(OutboundRequest {
                url: format!("{}/ODIM/v1/Systems/1", server.url()),
                method: HttpMethod::Patch,
                auth: AuthMaterial::Basic(BasicCredentials {
                    username: "admin".to_string(),
                    password: SecretString::from("Plugin123"),
                }),
                body: json!({}),
                timeout: None,
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status, 204);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_login_reply_exposes_session_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/ODIM/v1/Sessions")
            .match_header("authorization", Matcher::Missing)
            .match_body(Matcher::Json(json!({"Username": "admin", "Password": "Plugin123"})))
            .with_status(201)
            .with_header("X-Auth-Token", "fresh-token")
            .create_async()
            .await;

        let response = transport()
            .send(OutboundRequest {
                url: format!("{}/ODIM/v1/Sessions", server.url()),
                method: HttpMethod::Post,
                auth: AuthMaterial::SessionLogin,
                body: json!({"Username": "admin", "Password": "Plugin123"}),
                timeout: None,
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(response.is_success());
        assert_eq!(response.session_token.as_deref(), Some("fresh-token"));
    }

    #[tokio::test]
    async fn test_closed_port_is_unreachable() {
        // Port 9 (discard) is not served in the test environment
        let result = transport()
            .send(OutboundRequest {
                url: "http://127.0.0.1:9/ODIM/v1/Status".to_string(),
                method: HttpMethod::Get,
                auth: AuthMaterial::SessionLogin,
                body: serde_json::Value::Null,
                timeout: Some(Duration::from_secs(2)),
            })
            .await;

        let err = result.unwrap_err();
        assert!(err.is_connectivity(), "unexpected error: {err}");
    }
}
