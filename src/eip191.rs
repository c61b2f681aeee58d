//! Ethereum personal-message signing primitives (EIP-191 version `0x45`).
//!
//! Wallets sign `keccak256("\x19Ethereum Signed Message:\n" || len || message)`
//! and return a 65-byte `r || s || v` signature, hex encoded with a `0x`
//! prefix, where `v` is `27 + recovery_id`. Addresses are the last 20 bytes of
//! the Keccak-256 hash of the uncompressed public key, rendered with the
//! EIP-55 mixed-case checksum.

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};

use crate::error::BackendError;

/// Prefix prepended to every personal message before hashing.
pub const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Length in bytes of an encoded recoverable signature.
pub const SIGNATURE_LEN: usize = 65;

/// Keccak-256 hash.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash a message the way `personal_sign` does.
pub fn hash_message(message: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(PERSONAL_MESSAGE_PREFIX.as_bytes());
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message);
    hasher.finalize().into()
}

/// Derive the checksummed address that belongs to a public key.
pub fn address_from_verifying_key(key: &VerifyingKey) -> String {
    let point = key.to_encoded_point(false);
    // Skip the 0x04 SEC1 tag.
    let (_, coordinates) = point.as_bytes().split_at(1);
    let hash = keccak256(coordinates);
    let (_, address) = hash.split_at(12);
    checksum_bytes(address)
}

/// Derive the checksummed address that belongs to a private key.
pub fn address_from_signing_key(key: &SigningKey) -> String {
    address_from_verifying_key(key.verifying_key())
}

/// Re-encode a hex address with the EIP-55 checksum.
///
/// # Errors
///
/// Returns [`BackendError::InvalidKey`] if `address` is not 20 hex-encoded bytes.
pub fn to_checksum_address(address: &str) -> Result<String, BackendError> {
    let digits = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .unwrap_or(address);
    let bytes = hex::decode(digits)
        .map_err(|e| BackendError::InvalidKey(format!("invalid address {address}: {e}")))?;
    if bytes.len() != 20 {
        return Err(BackendError::InvalidKey(format!(
            "invalid address {address}: expected 20 bytes, got {}",
            bytes.len()
        )));
    }
    Ok(checksum_bytes(&bytes))
}

fn checksum_bytes(address: &[u8]) -> String {
    let lower = hex::encode(address);
    let hash = keccak256(lower.as_bytes());
    let mut out = String::with_capacity(2 + lower.len());
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let byte = hash.get(i / 2).copied().unwrap_or_default();
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Sign `message` as a personal message and return the `0x`-prefixed hex signature.
///
/// # Errors
///
/// Returns [`BackendError::Signature`] if the signing primitive fails.
pub fn sign_message(key: &SigningKey, message: &[u8]) -> Result<String, BackendError> {
    let digest = hash_message(message);
    let (signature, recovery_id) = key
        .sign_prehash_recoverable(&digest)
        .map_err(|e| BackendError::Signature(e.to_string()))?;

    let mut bytes = Vec::with_capacity(SIGNATURE_LEN);
    bytes.extend_from_slice(&signature.to_bytes());
    bytes.push(27 + recovery_id.to_byte());
    Ok(format!("0x{}", hex::encode(bytes)))
}

/// Recover the checksummed address that produced `signature` over `message`.
///
/// Accepts `v` as either `27`/`28` or the raw recovery id `0`/`1`.
///
/// # Errors
///
/// Returns [`BackendError::Signature`] if the signature is malformed or does
/// not recover to a valid public key.
pub fn recover_address(message: &[u8], signature: &str) -> Result<String, BackendError> {
    let digits = signature.strip_prefix("0x").unwrap_or(signature);
    let bytes = hex::decode(digits)
        .map_err(|e| BackendError::Signature(format!("invalid signature hex: {e}")))?;
    if bytes.len() != SIGNATURE_LEN {
        return Err(BackendError::Signature(format!(
            "expected {SIGNATURE_LEN} signature bytes, got {}",
            bytes.len()
        )));
    }
    let (rs, v) = bytes.split_at(64);
    let v = v.first().copied().unwrap_or_default();
    let v = if v >= 27 { v - 27 } else { v };

    let mut recovery_id = RecoveryId::from_byte(v)
        .ok_or_else(|| BackendError::Signature(format!("invalid recovery id {v}")))?;
    let mut signature =
        Signature::from_slice(rs).map_err(|e| BackendError::Signature(e.to_string()))?;

    // Wallets may hand out high-s signatures; flip to the canonical form.
    if let Some(normalized) = signature.normalize_s() {
        signature = normalized;
        recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced());
    }

    let key = VerifyingKey::recover_from_prehash(&hash_message(message), &signature, recovery_id)
        .map_err(|e| BackendError::Signature(e.to_string()))?;
    Ok(address_from_verifying_key(&key))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;

    const KNOWN_KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
    const KNOWN_ADDRESS: &str = "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23";

    fn known_key() -> SigningKey {
        SigningKey::from_slice(&hex::decode(KNOWN_KEY).unwrap()).unwrap()
    }

    #[test]
    fn hash_message_matches_published_vector() {
        let digest = hash_message(b"Hello World");
        assert_eq!(
            hex::encode(digest),
            "a1de988600a42c4b4ab089b619297c17d53cffae5d5120d82d8a92d0bb3b78f2"
        );
    }

    #[test]
    fn address_from_known_key() {
        assert_eq!(address_from_signing_key(&known_key()), KNOWN_ADDRESS);
    }

    #[test]
    fn checksum_is_case_insensitive_on_input() {
        let lower = KNOWN_ADDRESS.to_ascii_lowercase();
        assert_eq!(to_checksum_address(&lower).unwrap(), KNOWN_ADDRESS);
        let upper = format!("0x{}", &KNOWN_ADDRESS[2..].to_ascii_uppercase());
        assert_eq!(to_checksum_address(&upper).unwrap(), KNOWN_ADDRESS);
    }

    #[test]
    fn checksum_rejects_wrong_length() {
        assert!(matches!(
            to_checksum_address("0x1234"),
            Err(BackendError::InvalidKey(_))
        ));
        assert!(to_checksum_address("0xzz").is_err());
    }

    #[test]
    fn signature_recovers_signer_address() {
        let key = known_key();
        let signature = sign_message(&key, b"Connected successfully").unwrap();
        assert!(signature.starts_with("0x"));
        assert_eq!(signature.len(), 2 + SIGNATURE_LEN * 2);

        let recovered = recover_address(b"Connected successfully", &signature).unwrap();
        assert_eq!(recovered, KNOWN_ADDRESS);
    }

    #[test]
    fn signature_over_other_message_recovers_other_address() {
        let signature = sign_message(&known_key(), b"one message").unwrap();
        let recovered = recover_address(b"another message", &signature).unwrap();
        assert_ne!(recovered, KNOWN_ADDRESS);
    }

    #[test]
    fn recover_accepts_raw_recovery_id() {
        let signature = sign_message(&known_key(), b"raw v").unwrap();
        let mut bytes = hex::decode(&signature[2..]).unwrap();
        bytes[64] -= 27;
        let raw = hex::encode(bytes);
        assert_eq!(recover_address(b"raw v", &raw).unwrap(), KNOWN_ADDRESS);
    }

    #[test]
    fn recover_rejects_truncated_signature() {
        let err = recover_address(b"x", "0xdeadbeef").unwrap_err();
        assert!(matches!(err, BackendError::Signature(_)));
    }
}
