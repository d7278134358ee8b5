//! Protocol parameter sets
//!
//! Two presets mirror the chain configurations the conformance vectors
//! use: `tiny` for six-validator test networks and `full` for mainnet
//! dimensions. Everything is plain data so embedders can load their own
//! from configuration.

use serde::{Deserialize, Serialize};

use crate::services::ConfigService;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolParams {
    /// number of work cores
    pub num_cores: u32,
    /// validator count per set
    pub num_validators: usize,
    /// slots per epoch
    pub epoch_length: u64,
    /// phase within the epoch where the lottery closes
    pub epoch_tail_start: u64,
    /// ticket entries each validator may submit per epoch
    pub tickets_per_validator: u32,
    /// guarantor rotation period in slots
    pub rotation_period: u64,
    /// cores audited at tranche 0
    pub max_audit_cores: usize,
    /// bias divisor for the tranche-n inclusion test
    pub audit_bias_factor: u64,
    /// ticket extrinsics accepted per block
    pub max_extrinsics_per_slot: usize,
    /// upper bound on ticket entry indices
    pub max_ticket_entries: u32,
}

impl ProtocolParams {
    /// six validators, two cores, twelve-slot epochs
    pub fn tiny() -> Self {
        Self {
            num_cores: 2,
            num_validators: 6,
            epoch_length: 12,
            epoch_tail_start: 10,
            tickets_per_validator: 3,
            rotation_period: 4,
            max_audit_cores: 10,
            audit_bias_factor: 2,
            max_extrinsics_per_slot: 10,
            max_ticket_entries: 1000,
        }
    }

    /// mainnet dimensions
    pub fn full() -> Self {
        Self {
            num_cores: 341,
            num_validators: 1023,
            epoch_length: 600,
            epoch_tail_start: 500,
            tickets_per_validator: 2,
            rotation_period: 10,
            max_audit_cores: 10,
            audit_bias_factor: 2,
            max_extrinsics_per_slot: 10,
            max_ticket_entries: 1000,
        }
    }

    /// the safrole-facing subset
    pub fn safrole(&self) -> jam_safrole::SafroleParams {
        jam_safrole::SafroleParams {
            epoch_length: self.epoch_length,
            epoch_tail_start: self.epoch_tail_start,
            max_extrinsics_per_slot: self.max_extrinsics_per_slot,
            max_ticket_entries: self.max_ticket_entries,
        }
    }
}

impl ConfigService for ProtocolParams {
    fn num_cores(&self) -> u32 {
        self.num_cores
    }

    fn num_validators(&self) -> usize {
        self.num_validators
    }

    fn epoch_length(&self) -> u64 {
        self.epoch_length
    }

    fn epoch_tail_start(&self) -> u64 {
        self.epoch_tail_start
    }

    fn tickets_per_validator(&self) -> u32 {
        self.tickets_per_validator
    }

    fn rotation_period(&self) -> u64 {
        self.rotation_period
    }

    fn max_audit_cores(&self) -> usize {
        self.max_audit_cores
    }

    fn audit_bias_factor(&self) -> u64 {
        self.audit_bias_factor
    }

    fn max_extrinsics_per_slot(&self) -> usize {
        self.max_extrinsics_per_slot
    }

    fn max_ticket_entries(&self) -> u32 {
        self.max_ticket_entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_consistent() {
        for params in [ProtocolParams::tiny(), ProtocolParams::full()] {
            assert!(params.epoch_tail_start < params.epoch_length);
            assert!(params.rotation_period <= params.epoch_length);
            assert!(params.num_validators >= params.num_cores as usize);
        }
    }

    #[test]
    fn safrole_projection() {
        let params = ProtocolParams::tiny();
        let safrole = params.safrole();
        assert_eq!(safrole.epoch_length, 12);
        assert_eq!(safrole.max_ticket_entries, 1000);
    }
}
