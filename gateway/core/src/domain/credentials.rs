// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Credentials
//!
//! Domain interface for recovering plaintext passwords from at-rest
//! ciphertext. Implemented by `infrastructure::credential_vault`.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Decryption contract and its failure kinds

use secrecy::SecretString;

/// Decrypts device and plugin passwords.
///
/// Implementations are pure after construction and safe to share between
/// concurrent calls without locking.
pub trait CredentialDecryptor: Send + Sync {
    fn decrypt(&self, ciphertext: &[u8]) -> Result<SecretString, VaultError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VaultError {
    /// The private key could not be loaded or unwrapped
    #[error("private key unavailable: {0}")]
    KeyUnavailable(String),

    /// Ciphertext was not produced with the matching key and padding
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),
}
