//! The four-slot entropy pool
//!
//! `eta[0]` accumulates every block; the tail rotates once per epoch so
//! that `eta[3]` is always the oldest sealed entropy.

use jam_codec::{blake2b_hash, Hash};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntropyPool {
    pub eta: [Hash; 4],
}

impl EntropyPool {
    pub fn new(eta: [Hash; 4]) -> Self {
        Self { eta }
    }

    /// Fold a block's VRF output seed into the accumulator:
    /// `eta0' = blake2b(eta0 || vrf_output)`
    pub fn accumulate(&mut self, vrf_output: &Hash) {
        let mut preimage = [0u8; 64];
        preimage[..32].copy_from_slice(&self.eta[0]);
        preimage[32..].copy_from_slice(vrf_output);
        self.eta[0] = blake2b_hash(&preimage);
    }

    /// Epoch rotation: the accumulator value is sealed into `eta1` and the
    /// tail shifts down. `eta0` itself keeps accumulating in-block.
    pub fn rotate(&mut self) {
        self.eta[3] = self.eta[2];
        self.eta[2] = self.eta[1];
        self.eta[1] = self.eta[0];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulation_matches_definition() {
        let mut pool = EntropyPool::new([[1u8; 32], [2u8; 32], [3u8; 32], [4u8; 32]]);
        let vrf_output = [9u8; 32];
        let mut preimage = Vec::new();
        preimage.extend_from_slice(&[1u8; 32]);
        preimage.extend_from_slice(&vrf_output);
        let expected = blake2b_hash(&preimage);

        pool.accumulate(&vrf_output);
        assert_eq!(pool.eta[0], expected);
        assert_eq!(pool.eta[1], [2u8; 32]);
    }

    #[test]
    fn rotation_shifts_tail() {
        let mut pool = EntropyPool::new([[1u8; 32], [2u8; 32], [3u8; 32], [4u8; 32]]);
        pool.rotate();
        assert_eq!(pool.eta, [[1u8; 32], [1u8; 32], [2u8; 32], [3u8; 32]]);
    }
}
