//! safrole: the block-author lottery and its state transitions
//!
//! validators submit anonymous ring-VRF tickets during an epoch; at the
//! epoch boundary the accumulated tickets (or a deterministic fallback over
//! the active keys) become the seal sequence that assigns authoring rights
//! slot by slot. the transition function is pure: given a state and a
//! block's input it returns the successor state plus the header markers.

pub mod guarantor;
pub mod seal;
pub mod stf;
pub mod tickets;

pub use guarantor::{assign_guarantors, validators_for_core, GuarantorAssignment};
pub use seal::{
    entropy_input, fallback_seal_input, fallback_seal_keys, outside_in, ticket_seal_input,
    SealKeys,
};
pub use stf::{EpochMark, SafroleInput, SafroleOutput, SafroleParams, SafroleState};
pub use tickets::{
    generate_tickets, proxy_validator_index, ticket_seal_context_gen,
    ticket_seal_context_verify, verify_ticket, TicketAccumulator,
};

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum SafroleError {
    #[error("slot {input} does not advance current slot {current}")]
    InvalidSlot { input: u64, current: u64 },

    #[error("{got} ticket extrinsics exceed the per-slot limit of {limit}")]
    TooManyExtrinsics { got: usize, limit: usize },

    #[error("entry index {got} outside the permitted {limit} entries")]
    InvalidEntryIndex { got: u32, limit: u32 },

    #[error("duplicate ticket id")]
    DuplicateTicket,

    #[error("bad signature batch")]
    BadSignatureBatch,

    #[error("prover's bandersnatch key is not in the ring")]
    ProverNotInRing,

    #[error(transparent)]
    Crypto(#[from] jam_crypto::CryptoError),

    #[error(transparent)]
    Codec(#[from] jam_codec::CodecError),
}

pub type Result<T> = core::result::Result<T, SafroleError>;
