//! entropy-driven fisher-yates shuffle
//!
//! the draw schedule is deterministic: position i swaps with
//! `u32_le(blake2b(entropy || i as 4-byte le)[..4]) mod (i+1)`, walking i
//! from the end of the sequence down to 1. prover and verifier replay the
//! identical permutation from the same 32-byte entropy.

use jam_codec::{blake2b_hash, Hash};

/// shuffle `items` in place under the given entropy.
pub fn jam_shuffle_in_place<T>(items: &mut [T], entropy: &Hash) {
    if items.len() < 2 {
        return;
    }
    for i in (1..items.len()).rev() {
        let q = draw(entropy, i as u32);
        let j = (q as usize) % (i + 1);
        items.swap(i, j);
    }
}

/// shuffle a copy of `items` under the given entropy.
pub fn jam_shuffle<T: Clone>(items: &[T], entropy: &Hash) -> Vec<T> {
    let mut out = items.to_vec();
    jam_shuffle_in_place(&mut out, entropy);
    out
}

/// rotate a sequence right by `offset` positions (modulo its length).
pub fn rotate_right<T>(items: &mut [T], offset: usize) {
    if items.is_empty() {
        return;
    }
    let len = items.len();
    items.rotate_right(offset % len);
}

fn draw(entropy: &Hash, index: u32) -> u32 {
    let mut preimage = [0u8; 36];
    preimage[..32].copy_from_slice(entropy);
    preimage[32..].copy_from_slice(&index.to_le_bytes());
    let digest = blake2b_hash(&preimage);
    u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]])
}
