// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Plugin sessions
//!
//! Session tokens have no expiry known to the gateway. A token is trusted
//! until a plugin answers 401, at which point a new one is created and the
//! cached entry overwritten. Entries are never deleted.

use secrecy::SecretString;

use crate::domain::plugin::PluginId;

/// Fixed login path on every plugin
pub const SESSION_PATH: &str = "/ODIM/v1/Sessions";

/// Header carrying the session token in both directions
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Holds at most one live token per plugin.
///
/// `get` and `set` must be atomic with respect to each other. They are
/// synchronous: implementations lock only around the map operation.
pub trait PluginTokenCache: Send + Sync {
    fn get(&self, plugin_id: &PluginId) -> Option<SecretString>;

    fn set(&self, plugin_id: &PluginId, token: SecretString);
}
