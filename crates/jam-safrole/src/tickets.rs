//! ticket generation, verification and accumulation
//!
//! the ring-VRF input at generation is `jam_ticket_seal || eta2 || entry
//! index as 4 bytes little-endian`; verification rebuilds it with the entry
//! index as a single byte. both shapes are load-bearing wire behaviour and
//! must not be unified.

use tracing::debug;

use jam_codec::{encode_fixed_le, Hash};
use jam_crypto::traits::{RingVrfProver, RingVrfVerifier};
use jam_crypto::{context, sort_ring_keys};
use jam_types::{SafroleTicket, TicketEnvelope, ValidatorIndex};

use crate::{Result, SafroleError};

/// generation-side ring-VRF input: entry index as 4 bytes little-endian
pub fn ticket_seal_context_gen(eta2: &Hash, entry_index: u32) -> Result<Vec<u8>> {
    let mut ctx = Vec::with_capacity(context::TICKET_SEAL.len() + 32 + 4);
    ctx.extend_from_slice(context::TICKET_SEAL);
    ctx.extend_from_slice(eta2);
    ctx.extend_from_slice(&encode_fixed_le(entry_index as u64, 4)?);
    Ok(ctx)
}

/// verification-side ring-VRF input: entry index as a single byte
pub fn ticket_seal_context_verify(eta2: &Hash, entry_index: u32) -> Result<Vec<u8>> {
    let mut ctx = Vec::with_capacity(context::TICKET_SEAL.len() + 32 + 1);
    ctx.extend_from_slice(context::TICKET_SEAL);
    ctx.extend_from_slice(eta2);
    ctx.extend_from_slice(&encode_fixed_le(entry_index as u64, 1)?);
    Ok(ctx)
}

/// generate this validator's tickets for the coming epoch, sorted
/// ascending by id. fails on a duplicate id, which would mean a broken
/// backend.
pub fn generate_tickets<P: RingVrfProver>(
    prover: &P,
    own_bandersnatch: &[u8; 32],
    ring_keys: &[[u8; 32]],
    eta2: &Hash,
    tickets_per_validator: u32,
) -> Result<Vec<SafroleTicket>> {
    let sorted = sort_ring_keys(ring_keys);
    let prover_index = sorted
        .iter()
        .position(|k| k == own_bandersnatch)
        .ok_or(SafroleError::ProverNotInRing)?;

    let mut tickets = Vec::with_capacity(tickets_per_validator as usize);
    for entry_index in 0..tickets_per_validator {
        let ctx = ticket_seal_context_gen(eta2, entry_index)?;
        let proof = prover.ring_prove(&ctx, &[], &sorted, prover_index)?;
        let id = prover.vrf_output(&proof)?;
        tickets.push(SafroleTicket {
            id,
            entry_index,
            proof,
        });
    }

    tickets.sort_by(|a, b| a.id.cmp(&b.id));
    if tickets.windows(2).any(|w| w[0].id == w[1].id) {
        return Err(SafroleError::DuplicateTicket);
    }

    debug!(count = tickets.len(), "generated safrole tickets");
    Ok(tickets)
}

/// verify a ticket envelope against the ring and return the accepted
/// ticket. a proof the ring rejects is [`SafroleError::BadSignatureBatch`].
pub fn verify_ticket<V: RingVrfVerifier>(
    verifier: &V,
    ring_keys: &[[u8; 32]],
    eta2: &Hash,
    envelope: &TicketEnvelope,
) -> Result<SafroleTicket> {
    let sorted = sort_ring_keys(ring_keys);
    let ctx = ticket_seal_context_verify(eta2, envelope.entry_index)?;

    match verifier.ring_verify(&sorted, &ctx, &[], &envelope.signature) {
        Ok(true) => {}
        Ok(false) => return Err(SafroleError::BadSignatureBatch),
        Err(_) => return Err(SafroleError::BadSignatureBatch),
    }

    let id = verifier.vrf_output(&envelope.signature)?;
    Ok(SafroleTicket {
        id,
        entry_index: envelope.entry_index,
        proof: envelope.signature.clone(),
    })
}

/// the per-epoch ticket store: strictly ascending by id, capped, duplicate
/// free. mutation happens only through the transition function.
#[derive(Clone, Debug, Default)]
pub struct TicketAccumulator {
    tickets: Vec<SafroleTicket>,
}

impl TicketAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tickets(&self) -> &[SafroleTicket] {
        &self.tickets
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    pub fn is_full(&self, epoch_length: usize) -> bool {
        self.tickets.len() == epoch_length
    }

    /// ids in accumulator order
    pub fn ids(&self) -> Vec<Hash> {
        self.tickets.iter().map(|t| t.id).collect()
    }

    /// merge new tickets, keep the lowest `cap` ids, reject duplicates
    pub fn merge(&mut self, incoming: Vec<SafroleTicket>, cap: usize) -> Result<()> {
        self.tickets.extend(incoming);
        self.tickets.sort_by(|a, b| a.id.cmp(&b.id));
        if self.tickets.windows(2).any(|w| w[0].id == w[1].id) {
            return Err(SafroleError::DuplicateTicket);
        }
        self.tickets.truncate(cap);
        Ok(())
    }
}

/// which validator may proxy a ticket submission (JAMNP-S): the last four
/// bytes of the id, big-endian, modulo the active-validator count
pub fn proxy_validator_index(ticket_id: &Hash, num_validators: usize) -> ValidatorIndex {
    let tail = u32::from_be_bytes([ticket_id[28], ticket_id[29], ticket_id[30], ticket_id[31]]);
    (tail as usize % num_validators) as ValidatorIndex
}
