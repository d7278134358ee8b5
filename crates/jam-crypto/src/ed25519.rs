//! ed25519 signing for audit announcements
//!
//! secret keys are the 32-byte seed half of an expanded key. verification
//! distinguishes backend failures (malformed keys) from a well-formed
//! signature that simply does not verify: the former is an error, the
//! latter `Ok(false)`.

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};

use crate::{CryptoError, Result};

pub const SIGNATURE_LEN: usize = 64;
pub const SECRET_LEN: usize = 32;
pub const PUBLIC_LEN: usize = 32;

/// public key for a 32-byte seed
pub fn public_from_seed(seed: &[u8; SECRET_LEN]) -> [u8; PUBLIC_LEN] {
    SigningKey::from_bytes(seed).verifying_key().to_bytes()
}

/// sign a message with a 32-byte seed
pub fn sign(seed: &[u8; SECRET_LEN], message: &[u8]) -> [u8; SIGNATURE_LEN] {
    SigningKey::from_bytes(seed).sign(message).to_bytes()
}

/// verify a signature. malformed public keys are a [`CryptoError`];
/// a cryptographically wrong signature is `Ok(false)`.
pub fn verify(
    public: &[u8; PUBLIC_LEN],
    message: &[u8],
    signature: &[u8; SIGNATURE_LEN],
) -> Result<bool> {
    let key = VerifyingKey::from_bytes(public)
        .map_err(|e| CryptoError::CryptoFailure(format!("bad ed25519 public key: {e}")))?;
    let signature = Signature::from_bytes(signature);
    Ok(key.verify_strict(message, &signature).is_ok())
}
