//! guarantor-to-core assignment
//!
//! validators start on cores in index proportion, are shuffled under the
//! epochal entropy, and the whole sequence rotates as wall-clock periods
//! elapse within the epoch.

use jam_codec::Hash;
use jam_shuffle::{jam_shuffle_in_place, rotate_right};
use jam_types::{CoreIndex, ValidatorIndex};

/// the per-validator core assignment for one rotation period
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuarantorAssignment {
    /// `cores[i]` is the core validator `i` guarantees
    pub cores: Vec<CoreIndex>,
    pub rotation_offset: u64,
}

/// compute the assignment for `num_validators` over `num_cores` at
/// `current_time`, rotating every `rotation_period` slots
pub fn assign_guarantors(
    entropy: &Hash,
    num_cores: u32,
    num_validators: usize,
    current_time: u64,
    epoch_length: u64,
    rotation_period: u64,
) -> GuarantorAssignment {
    let mut cores: Vec<CoreIndex> = (0..num_validators)
        .map(|i| ((num_cores as u64 * i as u64) / num_validators as u64) as CoreIndex)
        .collect();

    jam_shuffle_in_place(&mut cores, entropy);

    let rotation_offset = (current_time % epoch_length) / rotation_period;
    rotate_right(&mut cores, rotation_offset as usize);

    GuarantorAssignment {
        cores,
        rotation_offset,
    }
}

/// the validators assigned to one core
pub fn validators_for_core(
    assignment: &GuarantorAssignment,
    core: CoreIndex,
) -> Vec<ValidatorIndex> {
    assignment
        .cores
        .iter()
        .enumerate()
        .filter(|(_, c)| **c == core)
        .map(|(i, _)| i as ValidatorIndex)
        .collect()
}
