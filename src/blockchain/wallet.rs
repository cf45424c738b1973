//! Signing credential and the signing-service seam.
//!
//! # Security
//! - The credential is loaded ONLY from an explicit string or the
//!   `CHAIN_SIGNING_KEY` environment variable
//! - Keys are never logged or serialized
//!
//! Keys are secp256k1. Public keys are rendered as `PUB_K1_<hex sec1>`,
//! private keys as `PVT_K1_<hex>` and signatures as `SIG_K1_<hex r||s||v>`.

use std::future::Future;

use alloy::primitives::{hex, keccak256, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;

use crate::blockchain::types::{ChainError, ChainResult};

/// Environment variable name for the signing key.
pub const SIGNING_KEY_ENV_VAR: &str = "CHAIN_SIGNING_KEY";

pub const PUBLIC_KEY_PREFIX: &str = "PUB_K1_";
pub const PRIVATE_KEY_PREFIX: &str = "PVT_K1_";
pub const SIGNATURE_PREFIX: &str = "SIG_K1_";

/// Something able to sign transaction digests on behalf of the client.
pub trait SignatureProvider: Send + Sync {
    /// Public key matching the signatures produced.
    fn public_key(&self) -> &str;

    /// Sign a 32-byte digest, returning the encoded signature.
    fn sign_digest(&self, digest: B256) -> impl Future<Output = ChainResult<String>> + Send;
}

/// Render the public key of `signer`.
pub fn encode_public_key(signer: &PrivateKeySigner) -> String {
    let point = signer.credential().verifying_key().to_encoded_point(true);
    format!("{}{}", PUBLIC_KEY_PREFIX, hex::encode(point.as_bytes()))
}

/// Render the private key of `signer`. Callers own the returned secret.
pub fn encode_private_key(signer: &PrivateKeySigner) -> String {
    format!("{}{}", PRIVATE_KEY_PREFIX, hex::encode(signer.to_bytes()))
}

/// Parse a private key given as `PVT_K1_<hex>`, `0x<hex>` or bare hex.
pub fn decode_private_key(encoded: &str) -> ChainResult<PrivateKeySigner> {
    let trimmed = encoded.trim();
    let key_hex = trimmed
        .strip_prefix(PRIVATE_KEY_PREFIX)
        .or_else(|| trimmed.strip_prefix("0x"))
        .unwrap_or(trimmed);

    key_hex
        .parse()
        .map_err(|e| ChainError::Config(format!("Invalid private key format: {}", e)))
}

/// Digest a transaction is signed over: `keccak256(chain_id || payload)`.
///
/// A chain id that is not hex is mixed in as raw bytes.
pub fn signing_digest(chain_id: &str, payload: &[u8]) -> B256 {
    let mut data = hex::decode(chain_id).unwrap_or_else(|_| chain_id.as_bytes().to_vec());
    data.extend_from_slice(payload);
    keccak256(&data)
}

/// Local in-process signer holding one private key.
#[derive(Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
    public_key: String,
}

impl Wallet {
    /// Create a wallet from an encoded private key.
    ///
    /// # Security
    /// The private key is parsed and stored in memory. It is never logged.
    pub fn from_private_key(encoded: &str) -> ChainResult<Self> {
        let signer = decode_private_key(encoded)?;
        let public_key = encode_public_key(&signer);

        tracing::info!(public_key = %public_key, "Signing credential loaded");

        Ok(Self { signer, public_key })
    }

    /// Load the wallet from `CHAIN_SIGNING_KEY`.
    pub fn from_env() -> ChainResult<Self> {
        let private_key = std::env::var(SIGNING_KEY_ENV_VAR).map_err(|_| {
            ChainError::Config(format!("Environment variable {} not set", SIGNING_KEY_ENV_VAR))
        })?;

        Self::from_private_key(&private_key)
    }
}

impl SignatureProvider for Wallet {
    fn public_key(&self) -> &str {
        &self.public_key
    }

    async fn sign_digest(&self, digest: B256) -> ChainResult<String> {
        let signature = self
            .signer
            .sign_hash(&digest)
            .await
            .map_err(|e| ChainError::Config(format!("Signing failed: {}", e)))?;
        Ok(format!("{}{}", SIGNATURE_PREFIX, hex::encode(signature.as_bytes())))
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}
