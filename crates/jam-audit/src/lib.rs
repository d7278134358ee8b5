//! audit pipeline: who audits what, and how they prove it
//!
//! tranche 0 is a deterministic shuffle of the cores seeded by the block
//! author's VRF output; later tranches add auditors in proportion to the
//! no-shows of the previous round. every selection is accompanied by IETF
//! VRF evidence and an ed25519 announcement, both verifiable by any peer.

pub mod announce;
pub mod evidence;
pub mod selector;

pub use announce::{announcement_message, sign_announcement, verify_announcement, AuditAnnouncement};
pub use evidence::{
    sign_tranche0, sign_tranche_n, tranche0_context, tranche_n_context, verify_tranche0,
    verify_tranche_n, AuditEvidence,
};
pub use selector::{
    select_tranche0, select_tranche_n, verify_tranche0_selection, verify_tranche_n_selection,
    NoShowTally, Tranche0Selection, TrancheNSelection,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("no work reports supplied")]
    EmptyInput,

    #[error("validator index {0} out of range")]
    UnknownValidator(u16),

    #[error("claimed selection does not match recomputation")]
    SelectionMismatch,

    #[error("audit evidence failed verification for core {0}")]
    InvalidEvidence(u32),

    #[error("per-core inputs of mismatched length")]
    InputLengthMismatch,

    #[error(transparent)]
    Crypto(#[from] jam_crypto::CryptoError),

    #[error(transparent)]
    Codec(#[from] jam_codec::CodecError),
}

pub type Result<T> = core::result::Result<T, AuditError>;
