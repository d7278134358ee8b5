//! Read-only service seams
//!
//! The core never owns configuration, keys, entropy or work reports; it
//! consumes them through these traits. The in-memory implementations back
//! the tests and give embedders a reference shape.

use jam_codec::Hash;
use jam_crypto::keys::ValidatorKeyPair;
use jam_crypto::parse_hash_hex;
use jam_types::{EntropyPool, ValidatorSet, WorkReport};

use crate::Result;

/// protocol constants, fixed for the life of the process
pub trait ConfigService: Send + Sync {
    fn num_cores(&self) -> u32;
    fn num_validators(&self) -> usize;
    fn epoch_length(&self) -> u64;
    fn epoch_tail_start(&self) -> u64;
    fn tickets_per_validator(&self) -> u32;
    fn rotation_period(&self) -> u64;
    fn max_audit_cores(&self) -> usize;
    fn audit_bias_factor(&self) -> u64;
    fn max_extrinsics_per_slot(&self) -> usize;
    fn max_ticket_entries(&self) -> u32;
}

/// the current validator sets, index-ordered
pub trait ValidatorSetManager: Send + Sync {
    fn active_validators(&self) -> ValidatorSet;

    /// bandersnatch keys in set order
    fn active_validator_keys(&self) -> Vec<[u8; 32]> {
        self.active_validators().bandersnatch_keys()
    }

    /// (ed25519, bandersnatch) for one validator
    fn validator_at_index(&self, index: usize) -> Option<([u8; 32], [u8; 32])> {
        self.active_validators()
            .get(index)
            .map(|k| (k.ed25519, k.bandersnatch))
    }

    /// index lookup by hex-encoded ed25519 key; malformed hex is an error
    fn validator_index(&self, ed25519_hex: &str) -> Result<Option<usize>> {
        let key = parse_hash_hex(ed25519_hex)?;
        Ok(self.active_validators().index_of_ed25519(&key))
    }
}

/// this node's signing identity
pub trait KeyPairService: Send + Sync {
    fn local_key_pair(&self) -> ValidatorKeyPair;
}

/// the entropy pool as of the latest block
pub trait EntropyService: Send + Sync {
    fn pool(&self) -> EntropyPool;

    fn entropy0(&self) -> Hash {
        self.pool().eta[0]
    }
    fn entropy1(&self) -> Hash {
        self.pool().eta[1]
    }
    fn entropy2(&self) -> Hash {
        self.pool().eta[2]
    }
    fn entropy3(&self) -> Hash {
        self.pool().eta[3]
    }

    /// alias for the in-block accumulator
    fn entropy_accumulator(&self) -> Hash {
        self.entropy0()
    }
}

/// work reports made available this block, by core
pub trait WorkReportService: Send + Sync {
    fn work_report_for_core(&self, core: u64) -> Option<WorkReport>;
}

// ---------------------------------------------------------------------------
// in-memory reference implementations
// ---------------------------------------------------------------------------

pub struct InMemoryValidatorSetManager {
    pub validators: ValidatorSet,
}

impl ValidatorSetManager for InMemoryValidatorSetManager {
    fn active_validators(&self) -> ValidatorSet {
        self.validators.clone()
    }
}

pub struct InMemoryKeyPairService {
    pub pair: ValidatorKeyPair,
}

impl KeyPairService for InMemoryKeyPairService {
    fn local_key_pair(&self) -> ValidatorKeyPair {
        self.pair.clone()
    }
}

pub struct InMemoryEntropyService {
    pub entropy: EntropyPool,
}

impl EntropyService for InMemoryEntropyService {
    fn pool(&self) -> EntropyPool {
        self.entropy.clone()
    }
}

pub struct InMemoryWorkReportService {
    /// `reports[c]` is the report available on core `c`, if any
    pub reports: Vec<Option<WorkReport>>,
}

impl WorkReportService for InMemoryWorkReportService {
    fn work_report_for_core(&self, core: u64) -> Option<WorkReport> {
        self.reports.get(core as usize).cloned().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jam_types::ValidatorKeys;

    #[test]
    fn validator_index_by_hex() {
        let manager = InMemoryValidatorSetManager {
            validators: ValidatorSet::new(vec![ValidatorKeys {
                ed25519: [0xAB; 32],
                bandersnatch: [1u8; 32],
                bls: [0u8; 144],
                metadata: [0u8; 128],
            }]),
        };

        let hex_key = format!("0x{}", "ab".repeat(32));
        assert_eq!(manager.validator_index(&hex_key).unwrap(), Some(0));
        assert_eq!(
            manager.validator_index(&format!("0x{}", "cd".repeat(32))).unwrap(),
            None
        );
        assert!(manager.validator_index("0xnothex").is_err());
    }

    #[test]
    fn entropy_accessors_agree_with_pool() {
        let service = InMemoryEntropyService {
            entropy: EntropyPool::new([[0u8; 32], [1u8; 32], [2u8; 32], [3u8; 32]]),
        };
        assert_eq!(service.entropy2(), [2u8; 32]);
        assert_eq!(service.entropy_accumulator(), service.entropy0());
    }
}
