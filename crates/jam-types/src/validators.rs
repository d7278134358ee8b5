//! Validator key records and ordered validator sets

use jam_codec::Result;
use serde::{Deserialize, Serialize};
use serde_big_array::BigArray;

/// The four key components registered for a validator. Immutable within an
/// epoch; a blacklisted validator has every component zeroed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorKeys {
    pub ed25519: [u8; 32],
    pub bandersnatch: [u8; 32],
    #[serde(with = "BigArray")]
    pub bls: [u8; 144],
    #[serde(with = "BigArray")]
    pub metadata: [u8; 128],
}

impl ValidatorKeys {
    /// The canonical zero record substituted for offenders
    pub fn zeroed() -> Self {
        Self {
            ed25519: [0u8; 32],
            bandersnatch: [0u8; 32],
            bls: [0u8; 144],
            metadata: [0u8; 128],
        }
    }

    pub fn is_zeroed(&self) -> bool {
        self.ed25519 == [0u8; 32]
            && self.bandersnatch == [0u8; 32]
            && self.bls == [0u8; 144]
            && self.metadata == [0u8; 128]
    }

    /// Fixed 336-byte encoding: the four components in declaration order
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(336);
        out.extend_from_slice(&self.ed25519);
        out.extend_from_slice(&self.bandersnatch);
        out.extend_from_slice(&self.bls);
        out.extend_from_slice(&self.metadata);
        Ok(out)
    }
}

impl core::fmt::Debug for ValidatorKeys {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ValidatorKeys")
            .field("ed25519", &hex::encode(self.ed25519))
            .field("bandersnatch", &hex::encode(self.bandersnatch))
            .finish_non_exhaustive()
    }
}

/// An ordered validator set. Ordering is part of the protocol: index order
/// here is the index order used for announcement lookups, and the ring is
/// re-sorted lexicographically only at the VRF boundary.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSet(pub Vec<ValidatorKeys>);

impl ValidatorSet {
    pub fn new(keys: Vec<ValidatorKeys>) -> Self {
        Self(keys)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ValidatorKeys> {
        self.0.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidatorKeys> {
        self.0.iter()
    }

    /// Bandersnatch keys in set order
    pub fn bandersnatch_keys(&self) -> Vec<[u8; 32]> {
        self.0.iter().map(|k| k.bandersnatch).collect()
    }

    /// Ed25519 keys in set order
    pub fn ed25519_keys(&self) -> Vec<[u8; 32]> {
        self.0.iter().map(|k| k.ed25519).collect()
    }

    /// Index of the validator holding this ed25519 key
    pub fn index_of_ed25519(&self, key: &[u8; 32]) -> Option<usize> {
        self.0.iter().position(|k| &k.ed25519 == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(tag: u8) -> ValidatorKeys {
        ValidatorKeys {
            ed25519: [tag; 32],
            bandersnatch: [tag.wrapping_add(1); 32],
            bls: [tag; 144],
            metadata: [tag; 128],
        }
    }

    #[test]
    fn encoding_is_fixed_width() {
        let enc = keys(3).encode().unwrap();
        assert_eq!(enc.len(), 336);
        assert_eq!(&enc[..32], &[3u8; 32]);
        assert_eq!(&enc[32..64], &[4u8; 32]);
    }

    #[test]
    fn zeroed_detection() {
        assert!(ValidatorKeys::zeroed().is_zeroed());
        assert!(!keys(1).is_zeroed());
    }

    #[test]
    fn set_lookups() {
        let set = ValidatorSet::new(vec![keys(1), keys(2)]);
        assert_eq!(set.index_of_ed25519(&[2u8; 32]), Some(1));
        assert_eq!(set.index_of_ed25519(&[9u8; 32]), None);
        assert_eq!(set.bandersnatch_keys()[0], [2u8; 32]);
    }
}
