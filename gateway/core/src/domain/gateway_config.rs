// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Gateway Configuration Types
//
// Defines the configuration schema for a plugin gateway node:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - URL translation rules for both directions
// - Plugin status polling used to gate transport retries
// - Key material for the credential vault and the plugin CA
// - HTTP client and observability settings

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::url_translation::UrlTranslationConfig;

pub const API_VERSION: &str = "plugin-gateway/v1";
pub const KIND: &str = "GatewayConfig";

/// Top-level Kubernetes-style gateway configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfigManifest {
    /// API version (must be "plugin-gateway/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "GatewayConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    pub spec: GatewayConfigSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Human-readable gateway name
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfigSpec {
    #[serde(default)]
    pub url_translation: UrlTranslationConfig,

    #[serde(default)]
    pub plugin_status_polling: PluginStatusPollingConfig,

    #[serde(default)]
    pub key_cert: KeyCertConfig,

    #[serde(default)]
    pub http_client: HttpClientConfig,

    /// YAML file seeding the in-memory record store (CLI use)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory_seed_path: Option<PathBuf>,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginStatusPollingConfig {
    /// Status checks before a plugin is declared unreachable
    #[serde(default = "default_max_retry_attempt")]
    pub max_retry_attempt: u32,

    /// Delay between status checks in milliseconds
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,

    /// Response wait for a single status check in seconds
    #[serde(default = "default_response_timeout_secs")]
    pub response_timeout_secs: u64,
}

impl PluginStatusPollingConfig {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_secs(self.response_timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyCertConfig {
    /// PEM file holding the PKCS#1 RSA private key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key_path: Option<PathBuf>,

    /// Passphrase of an encrypted key (supports "env:VAR_NAME")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key_passphrase: Option<String>,

    /// CA bundle trusted for plugin HTTPS endpoints
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_ca_certificate_path: Option<PathBuf>,
}

impl KeyCertConfig {
    /// Resolve the key passphrase (supports "env:VAR_NAME" syntax)
    pub fn resolve_passphrase(&self) -> anyhow::Result<Option<String>> {
        match &self.private_key_passphrase {
            Some(value) => match value.strip_prefix("env:") {
                Some(var_name) => std::env::var(var_name)
                    .map(Some)
                    .map_err(|_| anyhow::anyhow!("Environment variable not set: {}", var_name)),
                None => Ok(Some(value.clone())),
            },
            None => Ok(None),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpClientConfig {
    /// Response wait for a single plugin call in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl HttpClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "trace")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format ("json" or "text")
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_max_retry_attempt() -> u32 {
    3
}

fn default_retry_interval_ms() -> u64 {
    1000
}

fn default_response_timeout_secs() -> u64 {
    3
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for PluginStatusPollingConfig {
    fn default() -> Self {
        Self {
            max_retry_attempt: default_max_retry_attempt(),
            retry_interval_ms: default_retry_interval_ms(),
            response_timeout_secs: default_response_timeout_secs(),
        }
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for GatewayConfigManifest {
    fn default() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: "plugin-gateway".to_string(),
                version: Some("1.0.0".to_string()),
                labels: None,
            },
            spec: GatewayConfigSpec::default(),
        }
    }
}

impl GatewayConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Discover configuration file using precedence order
    /// 1. PGW_CONFIG_PATH environment variable
    /// 2. ./plugin-gateway.yaml (working directory)
    /// 3. ~/.plugin-gateway/config.yaml (user home)
    /// 4. /etc/plugin-gateway/config.yaml (system, Unix)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("PGW_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./plugin-gateway.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".plugin-gateway").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        let system_config = PathBuf::from("/etc/plugin-gateway/config.yaml");
        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit CLI path fails if missing or invalid
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("PGW_LOG_LEVEL") {
            tracing::info!("Environment override: PGW_LOG_LEVEL={}", level);
            self.spec.observability.logging.level = level;
        }

        if let Ok(val) = std::env::var("PGW_PLUGIN_STATUS_MAX_RETRY") {
            match val.parse::<u32>() {
                Ok(attempts) => {
                    tracing::info!("Environment override: PGW_PLUGIN_STATUS_MAX_RETRY={}", attempts);
                    self.spec.plugin_status_polling.max_retry_attempt = attempts;
                }
                Err(_) => {
                    tracing::warn!(
                        "Invalid value for PGW_PLUGIN_STATUS_MAX_RETRY: '{}'. Expected a number. Ignoring.",
                        val
                    );
                }
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!("Invalid apiVersion: '{}'. Must be '{}'", self.api_version, API_VERSION);
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        let translation = &self.spec.url_translation;
        for (direction, rules) in [("south_bound", &translation.south_bound), ("north_bound", &translation.north_bound)] {
            for rule in rules {
                if rule.from.is_empty() {
                    anyhow::bail!("url_translation.{} rule with empty 'from' prefix", direction);
                }
            }
        }

        if self.spec.plugin_status_polling.response_timeout_secs == 0 {
            anyhow::bail!("plugin_status_polling.response_timeout_secs must be greater than zero");
        }

        if self.spec.http_client.request_timeout_secs == 0 {
            anyhow::bail!("http_client.request_timeout_secs must be greater than zero");
        }

        Ok(())
    }
}
