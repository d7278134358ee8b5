//! Orchestration layer: service seams plus the pipeline driver
//!
//! The orchestrator owns the Safrole state; every other input arrives
//! through read-only service traits so embedders decide where validator
//! sets, entropy and work reports actually come from. Lifecycle is
//! synchronous: the core performs no I/O of its own.

pub mod orchestrator;
pub mod params;
pub mod services;

pub use orchestrator::Orchestrator;
pub use params::ProtocolParams;
pub use services::{
    ConfigService, EntropyService, InMemoryEntropyService, InMemoryKeyPairService,
    InMemoryValidatorSetManager, InMemoryWorkReportService, KeyPairService, ValidatorSetManager,
    WorkReportService,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("orchestrator not initialized")]
    NotInitialized,

    #[error("local ed25519 key is not in the active validator set")]
    LocalValidatorUnknown,

    #[error(transparent)]
    Audit(#[from] jam_audit::AuditError),

    #[error(transparent)]
    Safrole(#[from] jam_safrole::SafroleError),

    #[error(transparent)]
    Crypto(#[from] jam_crypto::CryptoError),

    #[error(transparent)]
    Codec(#[from] jam_codec::CodecError),
}

pub type Result<T> = core::result::Result<T, CoreError>;
