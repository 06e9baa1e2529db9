// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Record Store Interface
//!
//! The gateway only reads plugin and device records; it never owns their
//! consistency. Records live in a keyed store with two tiers:
//!
//! | Tier | Holds |
//! |------|-------|
//! | `OnDisk` | Durable records (`Plugin`, `System`) |
//! | `InMemory` | Volatile, fast-changing data |
//!
//! Implementations live in `crate::infrastructure::repositories`.

use async_trait::async_trait;

/// Table holding plugin records, keyed by plugin id
pub const PLUGIN_TABLE: &str = "Plugin";

/// Table holding device records, keyed by device UUID
pub const SYSTEM_TABLE: &str = "System";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreTier {
    OnDisk,
    InMemory,
}

/// Keyed record lookup
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Raw stored value of `key` in `table`
    async fn read(&self, tier: StoreTier, table: &str, key: &str) -> Result<String, RepositoryError>;

    /// Every key present in `table`
    async fn get_all_keys(&self, tier: StoreTier, table: &str) -> Result<Vec<String>, RepositoryError>;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum RepositoryError {
    #[error("no data with key {key} found in table {table}")]
    NotFound { table: String, key: String },

    #[error("store connection failed: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
