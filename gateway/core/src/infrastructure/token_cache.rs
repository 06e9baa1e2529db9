// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! In-memory plugin session token cache.

use parking_lot::Mutex;
use secrecy::SecretString;
use std::collections::HashMap;

use crate::domain::plugin::PluginId;
use crate::domain::session::PluginTokenCache;

#[derive(Default)]
pub struct InMemoryTokenCache {
    tokens: Mutex<HashMap<PluginId, SecretString>>,
}

impl InMemoryTokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tokens.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.lock().is_empty()
    }
}

impl PluginTokenCache for InMemoryTokenCache {
    fn get(&self, plugin_id: &PluginId) -> Option<SecretString> {
        self.tokens.lock().get(plugin_id).cloned()
    }

    fn set(&self, plugin_id: &PluginId, token: SecretString) {
        self.tokens.lock().insert(plugin_id.clone(), token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::sync::Arc;

    #[test]
    fn test_set_overwrites_previous_token() {
        let cache = InMemoryTokenCache::new();
        let grf = PluginId::new("GRF");

        assert!(cache.get(&grf).is_none());
        cache.set(&grf, SecretString::from("first"));
        cache.set(&grf, SecretString::from("second"));

        assert_eq!(cache.get(&grf).unwrap().expose_secret(), "second");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_writers_leave_one_token() {
        let cache = Arc::new(InMemoryTokenCache::new());
        let grf = PluginId::new("GRF");

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                let grf = grf.clone();
                std::thread::spawn(move || cache.set(&grf, SecretString::from(format!("token-{i}"))))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let token = cache.get(&grf).unwrap();
        assert!(token.expose_secret().starts_with("token-"));
        assert_eq!(cache.len(), 1);
    }
}
