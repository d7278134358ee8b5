//! deterministic key derivation
//!
//! validator key pairs are derived from 32-byte seeds; the helpers here
//! keep seed handling in one place so services and tests agree on the
//! derivation.

use jam_codec::blake2b_hash;

use crate::bandersnatch::BandersnatchSecret;
use crate::ed25519;

/// an ed25519 seed with its derived public key
#[derive(Clone)]
pub struct Ed25519KeyPair {
    pub seed: [u8; 32],
    pub public: [u8; 32],
}

impl Ed25519KeyPair {
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let public = ed25519::public_from_seed(&seed);
        Self { seed, public }
    }
}

/// a bandersnatch seed with its derived public key
#[derive(Clone)]
pub struct BandersnatchKeyPair {
    pub seed: [u8; 32],
    pub public: [u8; 32],
}

impl BandersnatchKeyPair {
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let public = BandersnatchSecret::from_seed(&seed).public_bytes();
        Self { seed, public }
    }
}

/// both halves of a validator's signing identity
#[derive(Clone)]
pub struct ValidatorKeyPair {
    pub ed25519: Ed25519KeyPair,
    pub bandersnatch: BandersnatchKeyPair,
}

impl ValidatorKeyPair {
    /// derive both key pairs from a common 32-byte seed, domain separated
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            ed25519: Ed25519KeyPair::from_seed(derive_seed(b"ed25519", &seed)),
            bandersnatch: BandersnatchKeyPair::from_seed(derive_seed(b"bandersnatch", &seed)),
        }
    }
}

/// blake2b(label || seed), used to fan one master seed out per scheme
pub fn derive_seed(label: &[u8], seed: &[u8; 32]) -> [u8; 32] {
    let mut preimage = Vec::with_capacity(label.len() + 32);
    preimage.extend_from_slice(label);
    preimage.extend_from_slice(seed);
    blake2b_hash(&preimage)
}

/// well-known test seed for validator `index` (seed bytes all `index`),
/// matching the convention of the jam test vectors
pub fn test_validator_seed(index: u8) -> [u8; 32] {
    [index; 32]
}
