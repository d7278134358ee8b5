//! blake2b-256 hashing and the level-flattened binary tree
//!
//! `blake_many` leaf-hashes every item, then pair-hashes level by level up
//! to the root, duplicating the last node of an odd level. the result is
//! the concatenation of all levels from leaves to root, which callers hash
//! once more for the extrinsic commitment.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

/// 32-byte blake2b-256 digest
pub type Hash = [u8; 32];

/// the hash of nothing, by convention
pub const ZERO_HASH: Hash = [0u8; 32];

type Blake2b256 = Blake2b<U32>;

/// blake2b-256 of a byte string
pub fn blake2b_hash(bytes: &[u8]) -> Hash {
    let mut hasher = Blake2b256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

fn hash_pair(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Blake2b256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// leaf-hash each item and fold pairwise to the root, returning every level
/// flattened leaves-first. the empty sequence yields the single zero hash;
/// a single item yields just its leaf hash.
pub fn blake_many<T: AsRef<[u8]>>(items: &[T]) -> Vec<Hash> {
    if items.is_empty() {
        return vec![ZERO_HASH];
    }

    let mut level: Vec<Hash> = items.iter().map(|i| blake2b_hash(i.as_ref())).collect();
    let mut out = level.clone();

    while level.len() > 1 {
        let mut next = Vec::with_capacity((level.len() + 1) / 2);
        for pair in level.chunks(2) {
            let left = &pair[0];
            let right = pair.get(1).unwrap_or(left);
            next.push(hash_pair(left, right));
        }
        out.extend_from_slice(&next);
        level = next;
    }

    out
}

/// the root of a `blake_many` tree is its final entry
pub fn blake_many_root(tree: &[Hash]) -> Hash {
    *tree.last().expect("blake_many never returns an empty tree")
}
