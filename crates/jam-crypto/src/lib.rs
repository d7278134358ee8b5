//! cryptographic substrate: bandersnatch IETF/ring VRFs and ed25519
//!
//! the four VRF roles are capability traits so the pipelines stay
//! backend-agnostic: production wires the ark-vrf bandersnatch suite,
//! tests may inject the deterministic fakes from [`mock`].
//!
//! signature framing is fixed and fail-closed: IETF signatures are exactly
//! 96 bytes (output point then proof), ring signatures exactly 784 bytes
//! (gamma, pedersen proof, ring proof), ring roots exactly 144 bytes.

pub mod bandersnatch;
pub mod context;
pub mod ed25519;
pub mod keys;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use bandersnatch::{
    BandersnatchIetfVerifier, BandersnatchRingProver, BandersnatchSecret, RingVrfBackend,
};
pub use keys::{BandersnatchKeyPair, Ed25519KeyPair, ValidatorKeyPair};
pub use traits::{IetfVrfProver, IetfVrfVerifier, RingVrfProver, RingVrfVerifier};

use jam_codec::Hash;
use thiserror::Error;

/// serialized IETF VRF signature: output point (32) then proof (64)
pub const IETF_SIGNATURE_LEN: usize = 96;
/// serialized ring VRF signature: gamma (32), pedersen (160), ring proof (592)
pub const RING_SIGNATURE_LEN: usize = 784;
/// serialized ring commitment (epoch root)
pub const RING_ROOT_LEN: usize = 144;

#[derive(Debug, Clone, Error)]
pub enum CryptoError {
    #[error("invalid length for {what}: expected {expected}, got {got}")]
    InvalidLength {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("crypto backend failure: {0}")]
    CryptoFailure(String),

    #[error("bad signature batch")]
    BadSignatureBatch,

    #[error("malformed hex input: {0}")]
    InvalidHex(String),
}

pub type Result<T> = core::result::Result<T, CryptoError>;

/// a serialized IETF VRF signature, output point first
#[derive(Clone, PartialEq, Eq)]
pub struct IetfSignature(pub [u8; IETF_SIGNATURE_LEN]);

impl IetfSignature {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; IETF_SIGNATURE_LEN] =
            bytes.try_into().map_err(|_| CryptoError::InvalidLength {
                what: "ietf signature",
                expected: IETF_SIGNATURE_LEN,
                got: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    /// the compressed VRF output point
    pub fn gamma(&self) -> &[u8] {
        &self.0[..32]
    }

    pub fn as_bytes(&self) -> &[u8; IETF_SIGNATURE_LEN] {
        &self.0
    }
}

impl core::fmt::Debug for IetfSignature {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "IetfSignature(0x{})", hex::encode(&self.0[..8]))
    }
}

/// a serialized ring VRF signature, gamma first
#[derive(Clone, PartialEq, Eq)]
pub struct RingSignature(pub [u8; RING_SIGNATURE_LEN]);

impl RingSignature {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; RING_SIGNATURE_LEN] =
            bytes.try_into().map_err(|_| CryptoError::InvalidLength {
                what: "ring signature",
                expected: RING_SIGNATURE_LEN,
                got: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    /// the compressed VRF output point
    pub fn gamma(&self) -> &[u8] {
        &self.0[..32]
    }

    pub fn as_bytes(&self) -> &[u8; RING_SIGNATURE_LEN] {
        &self.0
    }
}

impl core::fmt::Debug for RingSignature {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "RingSignature(0x{})", hex::encode(&self.0[..8]))
    }
}

/// serialized ring commitment over an epoch's bandersnatch keys
#[derive(Clone, PartialEq, Eq)]
pub struct RingRoot(pub [u8; RING_ROOT_LEN]);

impl RingRoot {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; RING_ROOT_LEN] =
            bytes.try_into().map_err(|_| CryptoError::InvalidLength {
                what: "ring root",
                expected: RING_ROOT_LEN,
                got: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; RING_ROOT_LEN] {
        &self.0
    }
}

impl core::fmt::Debug for RingRoot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "RingRoot(0x{})", hex::encode(&self.0[..8]))
    }
}

/// sort bandersnatch keys lexicographically by their serialized bytes.
/// prover and verifier must assemble the ring in this order.
pub fn sort_ring_keys(keys: &[[u8; 32]]) -> Vec<[u8; 32]> {
    let mut sorted = keys.to_vec();
    sorted.sort_unstable();
    sorted
}

/// index of `key` in the lexicographically sorted ring
pub fn sorted_ring_index(keys: &[[u8; 32]], key: &[u8; 32]) -> Option<usize> {
    let sorted = sort_ring_keys(keys);
    sorted.iter().position(|k| k == key)
}

/// parse a 32-byte value from hex, with or without a 0x prefix
pub fn parse_hash_hex(s: &str) -> Result<Hash> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(stripped).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| CryptoError::InvalidLength {
            what: "hex hash",
            expected: 32,
            got: bytes.len(),
        })
}
