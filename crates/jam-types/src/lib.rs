//! Core protocol types shared by the audit and Safrole pipelines
//!
//! Every type here encodes deterministically through the Gray Paper codec;
//! the structures themselves stay immutable once built. Nothing in this
//! crate performs cryptography beyond hashing.

pub mod body;
pub mod entropy;
pub mod report;
pub mod ticket;
pub mod validators;

pub use body::{extrinsic_hash, AvailAssurance, BlockBody, Dispute, Preimage, ReportGuarantee};
pub use entropy::EntropyPool;
pub use report::{RefineContext, WorkExecResult, WorkPackageSpec, WorkReport, WorkResult};
pub use ticket::{SafroleTicket, TicketEnvelope};
pub use validators::{ValidatorKeys, ValidatorSet};

pub use jam_codec::Hash;

/// index into the validator set
pub type ValidatorIndex = u16;

/// index of a work core
pub type CoreIndex = u32;

/// absolute slot number since genesis
pub type TimeSlot = u64;

/// audit tranche number; tranche 0 is the initial selection
pub type Tranche = u64;
