// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Loading of the process-wide signing key.
//!
//! The key is read once at startup from `PRIVATE_KEY`. Both raw hex
//! (with or without `0x`) and PEM (SEC1 or PKCS#8) encodings are accepted.

use alloy::{network::EthereumWallet, signers::local::PrivateKeySigner};
use k256::SecretKey;

/// Errors that can occur while loading the signing key.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("Invalid hex private key: {0}")]
    InvalidHex(String),

    #[error("Invalid PEM private key: {0}")]
    InvalidPem(String),

    #[error("Invalid private key: {0}")]
    InvalidKey(String),
}

/// Create a signer from the configured key material.
///
/// Input starting with `-----BEGIN` is parsed as PEM, anything else as hex.
/// Surrounding whitespace is ignored.
///
/// # Arguments
/// * `raw` - The `PRIVATE_KEY` value
///
/// # Returns
/// * `Ok(PrivateKeySigner)` - Signer for the server account
/// * `Err(KeyError)` - If the key cannot be decoded or is not a valid
///   secp256k1 scalar
pub fn load_signer(raw: &str) -> Result<PrivateKeySigner, KeyError> {
    let raw = raw.trim();
    if raw.starts_with("-----BEGIN") {
        signer_from_pem(raw.as_bytes())
    } else {
        signer_from_hex(raw)
    }
}

/// Create a signer from a hex-encoded private key.
///
/// # Arguments
/// * `private_key_hex` - 32-byte key as hex, with or without `0x`
///
/// # Returns
/// * `Ok(PrivateKeySigner)` - The signer
/// * `Err(KeyError::InvalidHex)` - If the text is not hex
/// * `Err(KeyError::InvalidKey)` - If the bytes are not a valid key
pub fn signer_from_hex(private_key_hex: &str) -> Result<PrivateKeySigner, KeyError> {
    // alloy's hex decoding strips an optional 0x prefix
    let key_bytes =
        alloy::hex::decode(private_key_hex).map_err(|e| KeyError::InvalidHex(e.to_string()))?;

    PrivateKeySigner::from_slice(&key_bytes).map_err(|e| KeyError::InvalidKey(e.to_string()))
}

/// Create a signer from a PEM-encoded private key.
///
/// SEC1 (`EC PRIVATE KEY`) is tried first, then PKCS#8 (`PRIVATE KEY`).
///
/// # Arguments
/// * `pem_bytes` - The PEM-encoded private key bytes
///
/// # Returns
/// * `Ok(PrivateKeySigner)` - The signer
/// * `Err(KeyError::InvalidPem)` - If PEM or DER parsing fails
pub fn signer_from_pem(pem_bytes: &[u8]) -> Result<PrivateKeySigner, KeyError> {
    let pem_str = std::str::from_utf8(pem_bytes)
        .map_err(|e| KeyError::InvalidPem(format!("Invalid UTF-8: {}", e)))?;

    let pem = pem::parse(pem_str).map_err(|e| KeyError::InvalidPem(e.to_string()))?;

    let secret_key = SecretKey::from_sec1_der(pem.contents())
        .or_else(|_| {
            use k256::pkcs8::DecodePrivateKey;
            SecretKey::from_pkcs8_der(pem.contents())
        })
        .map_err(|e| KeyError::InvalidPem(format!("Invalid key format: {}", e)))?;

    signer_from_hex(&alloy::hex::encode(secret_key.to_bytes()))
}

/// Create an Ethereum wallet from a signer.
pub fn wallet_from_signer(signer: PrivateKeySigner) -> EthereumWallet {
    EthereumWallet::from(signer)
}
