//! Key pair and account name generation.
//!
//! # Security
//! - Private key material is zeroized on drop and redacted from `Debug`
//! - Nothing in this module logs key material

use alloy::primitives::keccak256;
use alloy::signers::local::PrivateKeySigner;
use rand::Rng;
use serde::Serialize;
use zeroize::Zeroize;

use crate::blockchain::types::{ChainError, ChainResult};
use crate::blockchain::wallet::{encode_private_key, encode_public_key};

/// Characters a generated account name is drawn from.
pub const ACCOUNT_NAME_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz12345";

/// Longest account name the chain accepts.
pub const MAX_ACCOUNT_NAME_LEN: usize = 12;

/// Default length of generated names.
pub const DEFAULT_ACCOUNT_NAME_LEN: usize = 12;

/// A private key and the public key derived from it.
///
/// Only ever built from a signer, so the two always match.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct KeyPair {
    private_key: String,
    public_key: String,
}

impl KeyPair {
    fn from_signer(signer: &PrivateKeySigner) -> Self {
        Self {
            private_key: encode_private_key(signer),
            public_key: encode_public_key(signer),
        }
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Encoded private key.
    ///
    /// # Warning
    /// Handle with care - this exposes the raw secret key.
    pub fn private_key(&self) -> &str {
        &self.private_key
    }
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Generate a fresh random key pair.
///
/// Entropy gathering runs on the blocking pool so concurrent callers
/// never stall the async scheduler.
pub async fn generate_key_pair() -> ChainResult<KeyPair> {
    tokio::task::spawn_blocking(|| KeyPair::from_signer(&PrivateKeySigner::random()))
        .await
        .map_err(|e| ChainError::Config(format!("Key generation task failed: {}", e)))
}

/// Derive a key pair deterministically from `secret`.
///
/// The same secret always yields the same pair.
pub fn derive_key_pair(secret: &[u8]) -> ChainResult<KeyPair> {
    let mut seed = keccak256(secret);
    // keccak output is out of the curve's scalar range with negligible
    // probability; rehash until it fits.
    for _ in 0..16 {
        if let Ok(signer) = PrivateKeySigner::from_bytes(&seed) {
            return Ok(KeyPair::from_signer(&signer));
        }
        seed = keccak256(seed);
    }
    Err(ChainError::InvalidArgument(
        "secret does not derive a valid key".to_string(),
    ))
}

/// Random account name of `length` characters from `ACCOUNT_NAME_CHARSET`.
///
/// Uniqueness is not checked here; the chain rejects a taken name.
pub fn generate_account_name(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| ACCOUNT_NAME_CHARSET[rng.gen_range(0..ACCOUNT_NAME_CHARSET.len())] as char)
        .collect()
}

/// Like `generate_account_name`, but rejects lengths the chain would
/// never accept (`1..=MAX_ACCOUNT_NAME_LEN`).
pub fn try_generate_account_name(length: usize) -> ChainResult<String> {
    if length == 0 || length > MAX_ACCOUNT_NAME_LEN {
        return Err(ChainError::InvalidArgument(format!(
            "account name length must be within 1..={}, got {}",
            MAX_ACCOUNT_NAME_LEN, length
        )));
    }
    Ok(generate_account_name(length))
}
