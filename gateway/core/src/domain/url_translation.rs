// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! URL translation
//!
//! Rewrites addresses between the north-bound (federated) space and the
//! south-bound (plugin-local) space using ordered literal-prefix rules.
//!
//! Paths are rewritten by the first rule, in list order, whose `from` is a
//! prefix of the path. Response bodies are rewritten by applying every
//! north-bound rule in list order to all occurrences in the body.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Stateless, configuration-driven address rewriting

use serde::{Deserialize, Serialize};

/// One literal substitution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRule {
    pub from: String,
    pub to: String,
}

impl TranslationRule {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Rules for both directions, each kept in configured order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlTranslationConfig {
    /// Applied to outgoing request paths
    #[serde(default)]
    pub south_bound: Vec<TranslationRule>,

    /// Applied to incoming addresses and response bodies
    #[serde(default)]
    pub north_bound: Vec<TranslationRule>,
}

/// Outcome of translating a single address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    Rewritten(String),
    /// No rule matched; the address passes through unchanged
    Noop(String),
}

impl Translation {
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::Noop(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Rewritten(address) | Self::Noop(address) => address,
        }
    }

    pub fn into_address(self) -> String {
        match self {
            Self::Rewritten(address) | Self::Noop(address) => address,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UrlTranslator {
    config: UrlTranslationConfig,
}

impl UrlTranslator {
    pub fn new(config: UrlTranslationConfig) -> Self {
        Self { config }
    }

    /// North-bound address -> plugin-local address
    pub fn to_south_bound(&self, address: &str) -> Translation {
        translate_prefix(&self.config.south_bound, address)
    }

    /// Plugin-local address -> north-bound address
    pub fn to_north_bound(&self, address: &str) -> Translation {
        translate_prefix(&self.config.north_bound, address)
    }

    /// South-bound form of `url`, unchanged when no rule matches
    pub fn translate_to_south_bound(&self, url: &str) -> String {
        self.to_south_bound(url).into_address()
    }

    /// Rewrites every plugin-local address embedded in a response body
    pub fn rewrite_body_north_bound(&self, body: &str) -> String {
        self.config
            .north_bound
            .iter()
            .filter(|rule| !rule.from.is_empty())
            .fold(body.to_string(), |data, rule| data.replace(&rule.from, &rule.to))
    }
}

fn translate_prefix(rules: &[TranslationRule], address: &str) -> Translation {
    rules
        .iter()
        .filter(|rule| !rule.from.is_empty())
        .find_map(|rule| {
            address
                .strip_prefix(rule.from.as_str())
                .map(|rest| Translation::Rewritten(format!("{}{}", rule.to, rest)))
        })
        .unwrap_or_else(|| Translation::Noop(address.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn odim_translator() -> UrlTranslator {
        UrlTranslator::new(UrlTranslationConfig {
            south_bound: vec![TranslationRule::new("/redfish/v1/", "/ODIM/v1/")],
            north_bound: vec![TranslationRule::new("/ODIM/v1/", "/redfish/v1/")],
        })
    }

    #[test]
    fn test_south_bound_rewrites_prefix_only() {
        let translator = odim_translator();
        let translated = translator.to_south_bound("/redfish/v1/Systems/1/redfish/v1/");
        assert_eq!(translated, Translation::Rewritten("/ODIM/v1/Systems/1/redfish/v1/".to_string()));
    }

    #[test]
    fn test_unmatched_address_is_noop() {
        let translator = odim_translator();
        let translated = translator.to_south_bound("/other/v1/Systems");
        assert!(translated.is_noop());
        assert_eq!(translated.as_str(), "/other/v1/Systems");
    }

    #[test]
    fn test_round_trip_for_configured_prefix() {
        let translator = odim_translator();
        for address in [
            "/redfish/v1/Systems/1",
            "/redfish/v1/Managers/1/VirtualMedia/CD",
            "/redfish/v1/",
        ] {
            let south = translator.to_south_bound(address);
            assert!(!south.is_noop());
            let north = translator.to_north_bound(south.as_str());
            assert_eq!(north.as_str(), address);
        }
    }

    #[test]
    fn test_rules_apply_in_list_order() {
        let translator = UrlTranslator::new(UrlTranslationConfig {
            south_bound: vec![
                TranslationRule::new("/redfish/", "/short/"),
                TranslationRule::new("/redfish/v1/", "/long/"),
            ],
            north_bound: vec![],
        });
        assert_eq!(translator.translate_to_south_bound("/redfish/v1/Systems"), "/short/v1/Systems");
    }

    #[test]
    fn test_body_rewrites_every_occurrence() {
        let translator = odim_translator();
        let body = r#"{"@odata.id":"/ODIM/v1/Systems/1","Links":{"ManagedBy":[{"@odata.id":"/ODIM/v1/Managers/1"}]}}"#;
        let rewritten = translator.rewrite_body_north_bound(body);
        assert!(!rewritten.contains("/ODIM/v1/"));
        assert!(rewritten.contains("/redfish/v1/Systems/1"));
        assert!(rewritten.contains("/redfish/v1/Managers/1"));
    }

    #[test]
    fn test_empty_configuration_passes_through() {
        let translator = UrlTranslator::default();
        assert!(translator.to_south_bound("/redfish/v1/Systems").is_noop());
        assert_eq!(translator.rewrite_body_north_bound("{}"), "{}");
    }
}
