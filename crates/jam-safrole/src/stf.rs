//! the safrole state-transition function
//!
//! pure per-block function: no i/o, no clocks, no global state. slot
//! progression is whatever the caller feeds in, and every draw is a
//! deterministic function of the entropy pool and the validator sets.

use std::collections::BTreeSet;

use tracing::{debug, info};

use jam_codec::Hash;
use jam_crypto::traits::RingVrfVerifier;
use jam_crypto::{sort_ring_keys, RingRoot};
use jam_types::{EntropyPool, SafroleTicket, TicketEnvelope, TimeSlot, ValidatorKeys, ValidatorSet};

use crate::seal::{fallback_seal_keys, outside_in, SealKeys};
use crate::tickets::{verify_ticket, TicketAccumulator};
use crate::{Result, SafroleError};

/// chain parameters the transition depends on
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SafroleParams {
    pub epoch_length: u64,
    pub epoch_tail_start: u64,
    pub max_extrinsics_per_slot: usize,
    pub max_ticket_entries: u32,
}

/// the safrole portion of chain state
#[derive(Clone, Debug)]
pub struct SafroleState {
    pub current_slot: TimeSlot,
    /// next epoch's validators (the ring the epoch root commits to)
    pub pending: ValidatorSet,
    /// this epoch's validators
    pub active: ValidatorSet,
    /// last epoch's validators
    pub previous: ValidatorSet,
    /// the queued set an epoch transition will promote through the filter
    pub staging: ValidatorSet,
    pub epoch_root: RingRoot,
    pub seal_keys: SealKeys,
    pub accumulator: TicketAccumulator,
    pub entropy: EntropyPool,
}

/// one block's worth of input
#[derive(Clone, Debug)]
pub struct SafroleInput {
    pub slot: TimeSlot,
    /// the block seal's VRF output seed
    pub entropy: Hash,
    pub extrinsics: Vec<TicketEnvelope>,
    /// ed25519 keys with a proven offence
    pub offenders: BTreeSet<[u8; 32]>,
}

/// header marker announcing the next epoch's ring
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EpochMark {
    pub entropy: Hash,
    pub tickets_entropy: Hash,
    /// (bandersnatch, ed25519) per pending validator, set order
    pub validators: Vec<([u8; 32], [u8; 32])>,
}

#[derive(Debug)]
pub struct SafroleOutput {
    pub state: SafroleState,
    /// tickets accepted from this block's extrinsics, ascending by id
    pub tickets: Vec<SafroleTicket>,
    pub epoch_mark: Option<EpochMark>,
    /// seal sequence announced when the block crosses into the epoch tail
    pub winners_mark: Option<Vec<Hash>>,
    /// per-extrinsic rejections; the transition itself still succeeds
    pub errors: Vec<SafroleError>,
}

/// the blacklist filter: offenders keep their slot but lose their keys
fn blacklist_filter(staging: &ValidatorSet, offenders: &BTreeSet<[u8; 32]>) -> ValidatorSet {
    ValidatorSet::new(
        staging
            .iter()
            .map(|keys| {
                if offenders.contains(&keys.ed25519) {
                    ValidatorKeys::zeroed()
                } else {
                    keys.clone()
                }
            })
            .collect(),
    )
}

/// apply one block to the safrole state
pub fn transition<V: RingVrfVerifier>(
    verifier: &V,
    params: &SafroleParams,
    state: &SafroleState,
    input: &SafroleInput,
) -> Result<SafroleOutput> {
    if input.slot <= state.current_slot {
        return Err(SafroleError::InvalidSlot {
            input: input.slot,
            current: state.current_slot,
        });
    }
    if input.extrinsics.len() > params.max_extrinsics_per_slot {
        return Err(SafroleError::TooManyExtrinsics {
            got: input.extrinsics.len(),
            limit: params.max_extrinsics_per_slot,
        });
    }

    let epoch = state.current_slot / params.epoch_length;
    let next_epoch = input.slot / params.epoch_length;
    let next_phase = input.slot % params.epoch_length;

    let mut next = state.clone();
    let mut epoch_mark = None;
    let mut winners_mark = None;

    if next_epoch > epoch {
        // key rotation through the blacklist filter
        let incoming = blacklist_filter(&state.staging, &input.offenders);
        next.previous = state.active.clone();
        next.active = state.pending.clone();
        next.pending = incoming;

        let ring = sort_ring_keys(&next.pending.bandersnatch_keys());
        next.epoch_root = verifier.ring_root(&ring)?;

        // seal sequence for the new epoch: a full lottery seals
        // outside-in, anything less falls back to the active keys
        next.entropy.rotate();
        next.seal_keys = if state.accumulator.is_full(params.epoch_length as usize) {
            SealKeys::Tickets(outside_in(state.accumulator.tickets()))
        } else {
            SealKeys::Fallback(fallback_seal_keys(
                &next.entropy.eta[2],
                &next.active,
                params.epoch_length as usize,
            )?)
        };
        next.accumulator = TicketAccumulator::new();

        epoch_mark = Some(EpochMark {
            entropy: state.entropy.eta[0],
            tickets_entropy: state.entropy.eta[1],
            validators: next
                .pending
                .iter()
                .map(|k| (k.bandersnatch, k.ed25519))
                .collect(),
        });

        info!(
            epoch = next_epoch,
            fallback = next.seal_keys.is_fallback(),
            "epoch transition"
        );
    } else {
        // winners marker on crossing into the epoch tail with a decided
        // lottery
        let prev_phase = state.current_slot % params.epoch_length;
        if prev_phase < params.epoch_tail_start
            && next_phase >= params.epoch_tail_start
            && state.accumulator.is_full(params.epoch_length as usize)
        {
            winners_mark = Some(outside_in(state.accumulator.tickets()));
        }
    }

    next.entropy.accumulate(&input.entropy);

    // ticket extrinsics verify against the pending ring and the
    // post-rotation eta2
    let ring_keys = next.pending.bandersnatch_keys();
    let mut accepted = Vec::new();
    let mut errors = Vec::new();
    for envelope in &input.extrinsics {
        if envelope.entry_index >= params.max_ticket_entries {
            errors.push(SafroleError::InvalidEntryIndex {
                got: envelope.entry_index,
                limit: params.max_ticket_entries,
            });
            continue;
        }
        match verify_ticket(verifier, &ring_keys, &next.entropy.eta[2], envelope) {
            Ok(ticket) => accepted.push(ticket),
            Err(err) => errors.push(err),
        }
    }

    next.accumulator
        .merge(accepted.clone(), params.epoch_length as usize)?;
    accepted.sort_by(|a, b| a.id.cmp(&b.id));

    debug!(
        slot = input.slot,
        accepted = accepted.len(),
        rejected = errors.len(),
        accumulator = next.accumulator.len(),
        "safrole transition"
    );

    next.current_slot = input.slot;
    Ok(SafroleOutput {
        state: next,
        tickets: accepted,
        epoch_mark,
        winners_mark,
        errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jam_codec::blake2b_hash;
    use jam_crypto::mock::{mock_ring_public, MockRingProver, MockRingVerifier};
    use jam_crypto::traits::RingVrfProver as _;
    use jam_crypto::RingRoot;
    use crate::tickets::ticket_seal_context_verify;

    fn params() -> SafroleParams {
        SafroleParams {
            epoch_length: 6,
            epoch_tail_start: 4,
            max_extrinsics_per_slot: 10,
            max_ticket_entries: 1000,
        }
    }

    fn validator(tag: u8) -> ValidatorKeys {
        ValidatorKeys {
            ed25519: [tag; 32],
            bandersnatch: mock_ring_public(&[tag; 32]),
            bls: [0u8; 144],
            metadata: [0u8; 128],
        }
    }

    fn set(tags: &[u8]) -> ValidatorSet {
        ValidatorSet::new(tags.iter().map(|t| validator(*t)).collect())
    }

    fn state() -> SafroleState {
        SafroleState {
            current_slot: 0,
            pending: set(&[0, 1, 2]),
            active: set(&[3, 4, 5]),
            previous: set(&[6, 7, 8]),
            staging: set(&[9, 10, 11]),
            epoch_root: RingRoot([0u8; 144]),
            seal_keys: SealKeys::Fallback(vec![]),
            accumulator: TicketAccumulator::new(),
            entropy: EntropyPool::new([[1u8; 32], [2u8; 32], [3u8; 32], [4u8; 32]]),
        }
    }

    fn envelope(state: &SafroleState, seed_tag: u8, entry_index: u32) -> TicketEnvelope {
        let prover = MockRingProver::from_seed(&[seed_tag; 32]);
        let ring = sort_ring_keys(&state.pending.bandersnatch_keys());
        let idx = ring
            .iter()
            .position(|k| *k == mock_ring_public(&[seed_tag; 32]))
            .unwrap();
        let ctx = ticket_seal_context_verify(&state.entropy.eta[2], entry_index).unwrap();
        TicketEnvelope {
            entry_index,
            signature: prover.ring_prove(&ctx, &[], &ring, idx).unwrap(),
        }
    }

    #[test]
    fn stale_slot_is_rejected() {
        let state = state();
        let input = SafroleInput {
            slot: 0,
            entropy: [0u8; 32],
            extrinsics: vec![],
            offenders: BTreeSet::new(),
        };
        assert!(matches!(
            transition(&MockRingVerifier, &params(), &state, &input),
            Err(SafroleError::InvalidSlot { .. })
        ));
    }

    #[test]
    fn extrinsic_limit_is_enforced() {
        let state = state();
        let envelopes: Vec<_> = (0..11).map(|i| envelope(&state, 0, i)).collect();
        let input = SafroleInput {
            slot: 1,
            entropy: [0u8; 32],
            extrinsics: envelopes,
            offenders: BTreeSet::new(),
        };
        assert!(matches!(
            transition(&MockRingVerifier, &params(), &state, &input),
            Err(SafroleError::TooManyExtrinsics { got: 11, limit: 10 })
        ));
    }

    #[test]
    fn regular_slot_accepts_tickets_sorted() {
        let state = state();
        let input = SafroleInput {
            slot: 1,
            entropy: [9u8; 32],
            extrinsics: vec![envelope(&state, 0, 0), envelope(&state, 1, 1)],
            offenders: BTreeSet::new(),
        };
        let output = transition(&MockRingVerifier, &params(), &state, &input).unwrap();
        assert!(output.errors.is_empty());
        assert_eq!(output.tickets.len(), 2);
        assert!(output.tickets[0].id < output.tickets[1].id);
        assert_eq!(output.state.accumulator.len(), 2);
        assert!(output.epoch_mark.is_none());
    }

    #[test]
    fn entropy_accumulates_per_definition() {
        let state = state();
        let input = SafroleInput {
            slot: 1,
            entropy: [9u8; 32],
            extrinsics: vec![],
            offenders: BTreeSet::new(),
        };
        let output = transition(&MockRingVerifier, &params(), &state, &input).unwrap();

        let mut preimage = Vec::new();
        preimage.extend_from_slice(&[1u8; 32]);
        preimage.extend_from_slice(&[9u8; 32]);
        assert_eq!(output.state.entropy.eta[0], blake2b_hash(&preimage));
        // tail untouched outside an epoch change
        assert_eq!(output.state.entropy.eta[1], [2u8; 32]);
    }

    #[test]
    fn epoch_rotation_promotes_sets_and_filters_offenders() {
        let state = state();
        let mut offenders = BTreeSet::new();
        offenders.insert([10u8; 32]); // staging validator 10 offends

        let input = SafroleInput {
            slot: 6, // epoch 1
            entropy: [9u8; 32],
            extrinsics: vec![],
            offenders,
        };
        let output = transition(&MockRingVerifier, &params(), &state, &input).unwrap();
        let next = &output.state;

        assert_eq!(next.active, state.pending);
        assert_eq!(next.previous, state.active);
        assert_eq!(next.pending.len(), 3);
        assert_eq!(next.pending.get(0).unwrap(), &validator(9));
        assert!(next.pending.get(1).unwrap().is_zeroed());
        assert_eq!(next.pending.get(2).unwrap(), &validator(11));

        // entropy tail rotated, then eta0 accumulated
        assert_eq!(next.entropy.eta[1], [1u8; 32]);
        assert_eq!(next.entropy.eta[2], [2u8; 32]);
        assert_eq!(next.entropy.eta[3], [3u8; 32]);

        // lottery was empty: fallback sealing over the new active set
        assert!(next.seal_keys.is_fallback());
        assert_eq!(next.seal_keys.len(), 6);
        assert_eq!(next.accumulator.len(), 0);

        let mark = output.epoch_mark.expect("transition emits an epoch mark");
        assert_eq!(mark.entropy, [1u8; 32]);
        assert_eq!(mark.tickets_entropy, [2u8; 32]);
        assert_eq!(mark.validators.len(), 3);
        assert_eq!(mark.validators[0].0, mock_ring_public(&[9u8; 32]));
        assert_eq!(mark.validators[1], ([0u8; 32], [0u8; 32]));
    }

    #[test]
    fn full_accumulator_seals_outside_in() {
        let mut state = state();
        // fill the lottery for epoch 0
        let tickets: Vec<SafroleTicket> = (0u8..6)
            .map(|i| SafroleTicket {
                id: [i; 32],
                entry_index: 0,
                proof: jam_crypto::RingSignature([0u8; 784]),
            })
            .collect();
        state.accumulator.merge(tickets, 6).unwrap();
        state.current_slot = 5;

        let input = SafroleInput {
            slot: 6,
            entropy: [9u8; 32],
            extrinsics: vec![],
            offenders: BTreeSet::new(),
        };
        let output = transition(&MockRingVerifier, &params(), &state, &input).unwrap();
        match &output.state.seal_keys {
            SealKeys::Tickets(ids) => {
                let bytes: Vec<u8> = ids.iter().map(|h| h[0]).collect();
                assert_eq!(bytes, vec![5, 0, 4, 1, 3, 2]);
            }
            SealKeys::Fallback(_) => panic!("expected ticket sealing"),
        }
    }

    #[test]
    fn winners_mark_on_tail_crossing() {
        let mut state = state();
        let tickets: Vec<SafroleTicket> = (0u8..6)
            .map(|i| SafroleTicket {
                id: [i; 32],
                entry_index: 0,
                proof: jam_crypto::RingSignature([0u8; 784]),
            })
            .collect();
        state.accumulator.merge(tickets, 6).unwrap();
        state.current_slot = 2;

        let input = SafroleInput {
            slot: 4, // tail starts at phase 4
            entropy: [9u8; 32],
            extrinsics: vec![],
            offenders: BTreeSet::new(),
        };
        let output = transition(&MockRingVerifier, &params(), &state, &input).unwrap();
        let winners = output.winners_mark.expect("tail crossing emits winners");
        assert_eq!(winners.len(), 6);
        assert!(output.epoch_mark.is_none());
    }

    #[test]
    fn out_of_range_entry_index_is_soft_rejected() {
        let state = state();
        let mut bad = envelope(&state, 0, 0);
        bad.entry_index = 1000;
        let good = envelope(&state, 1, 1);

        let input = SafroleInput {
            slot: 1,
            entropy: [9u8; 32],
            extrinsics: vec![bad, good],
            offenders: BTreeSet::new(),
        };
        let output = transition(&MockRingVerifier, &params(), &state, &input).unwrap();
        assert_eq!(output.tickets.len(), 1);
        assert_eq!(output.errors.len(), 1);
        assert!(matches!(
            output.errors[0],
            SafroleError::InvalidEntryIndex { got: 1000, .. }
        ));
    }

    #[test]
    fn duplicate_ticket_fails_the_transition() {
        let state = state();
        let input = SafroleInput {
            slot: 1,
            entropy: [9u8; 32],
            extrinsics: vec![envelope(&state, 0, 0), envelope(&state, 0, 0)],
            offenders: BTreeSet::new(),
        };
        assert!(matches!(
            transition(&MockRingVerifier, &params(), &state, &input),
            Err(SafroleError::DuplicateTicket)
        ));
    }
}
