//! seal-key sequences and seal VRF inputs
//!
//! a full accumulator seals the next epoch outside-in; anything less falls
//! back to a deterministic draw over the active validators' ed25519 keys.

use jam_codec::{blake2b_hash, Hash};
use jam_crypto::context;
use jam_types::{SafroleTicket, ValidatorSet};

use crate::Result;

/// per-slot sealing material for one epoch: winning ticket ids, or
/// fallback keys when the lottery under-filled
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SealKeys {
    Tickets(Vec<Hash>),
    Fallback(Vec<Hash>),
}

impl SealKeys {
    /// the sealing value for a slot phase within the epoch
    pub fn get(&self, slot_phase: usize) -> Option<&Hash> {
        match self {
            SealKeys::Tickets(ids) => ids.get(slot_phase),
            SealKeys::Fallback(keys) => keys.get(slot_phase),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, SealKeys::Fallback(_))
    }

    pub fn len(&self) -> usize {
        match self {
            SealKeys::Tickets(ids) => ids.len(),
            SealKeys::Fallback(keys) => keys.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// the outside-in seal ordering: last, first, new-last, new-first, until
/// the accumulator is drained
pub fn outside_in(tickets: &[SafroleTicket]) -> Vec<Hash> {
    let mut front = 0usize;
    let mut back = tickets.len();
    let mut out = Vec::with_capacity(tickets.len());
    let mut take_back = true;
    while front < back {
        if take_back {
            back -= 1;
            out.push(tickets[back].id);
        } else {
            out.push(tickets[front].id);
            front += 1;
        }
        take_back = !take_back;
    }
    out
}

/// fallback sealing `F(eta, validators)`: slot `i` is sealed by the
/// ed25519 key of the validator at
/// `u32_le(blake2b(eta || i as 4-byte le)[..4]) mod |validators|`
pub fn fallback_seal_keys(
    eta: &Hash,
    validators: &ValidatorSet,
    epoch_length: usize,
) -> Result<Vec<Hash>> {
    let mut out = Vec::with_capacity(epoch_length);
    for slot in 0..epoch_length {
        let mut preimage = [0u8; 36];
        preimage[..32].copy_from_slice(eta);
        preimage[32..].copy_from_slice(&(slot as u32).to_le_bytes());
        let digest = blake2b_hash(&preimage);
        let draw = u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]);
        let index = draw as usize % validators.len().max(1);
        let key = validators
            .get(index)
            .map(|k| k.ed25519)
            .unwrap_or([0u8; 32]);
        out.push(key);
    }
    Ok(out)
}

/// VRF input for sealing a ticket slot: the seal context, the epoch's
/// sealing entropy, and the winning ticket's entry index
pub fn ticket_seal_input(eta3: &Hash, attempt: u8) -> Vec<u8> {
    let mut input = Vec::with_capacity(context::TICKET_SEAL.len() + 33);
    input.extend_from_slice(context::TICKET_SEAL);
    input.extend_from_slice(eta3);
    input.push(attempt);
    input
}

/// VRF input for sealing a fallback slot
pub fn fallback_seal_input(eta3: &Hash) -> Vec<u8> {
    let mut input = Vec::with_capacity(context::FALLBACK_SEAL.len() + 32);
    input.extend_from_slice(context::FALLBACK_SEAL);
    input.extend_from_slice(eta3);
    input
}

/// VRF input for the per-block entropy contribution
pub fn entropy_input(eta3: &Hash) -> Vec<u8> {
    let mut input = Vec::with_capacity(context::ENTROPY.len() + 32);
    input.extend_from_slice(context::ENTROPY);
    input.extend_from_slice(eta3);
    input
}
