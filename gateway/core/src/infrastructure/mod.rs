// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod credential_vault;
pub mod http_transport;
pub mod repositories;
pub mod status_probe;
pub mod token_cache;

pub use credential_vault::RsaCredentialVault;
pub use http_transport::ReqwestPluginTransport;
pub use repositories::InMemoryRecordStore;
pub use status_probe::StatusPollingProbe;
pub use token_cache::InMemoryTokenCache;
