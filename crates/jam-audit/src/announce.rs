//! ed25519 audit announcements
//!
//! the signed message is `jam_announce` followed by the tranche as 8 bytes
//! little-endian, the (core index, report hash) pairs in submission order,
//! and the header hash. verification resolves the public key through the
//! validator set; a wrong-but-well-formed signature is `Ok(false)`.

use jam_codec::{encode_fixed_le, Hash};
use jam_crypto::{context, ed25519, IetfSignature};
use jam_types::{CoreIndex, Tranche, ValidatorIndex, ValidatorSet};

use crate::{AuditError, Result};

/// a validator's declared intent to audit a set of work reports
#[derive(Clone, Debug)]
pub struct AuditAnnouncement {
    pub header_hash: Hash,
    pub tranche: Tranche,
    pub validator_index: ValidatorIndex,
    pub work_reports: Vec<(CoreIndex, Hash)>,
    pub signature: [u8; 64],
    pub evidence: IetfSignature,
}

impl AuditAnnouncement {
    /// `0x`-prefixed hex of the 64-byte signature
    pub fn signature_hex(&self) -> String {
        format!("0x{}", hex::encode(self.signature))
    }
}

/// the byte string the announcement signature covers
pub fn announcement_message(
    tranche: Tranche,
    work_reports: &[(CoreIndex, Hash)],
    header_hash: &Hash,
) -> Result<Vec<u8>> {
    let mut message = Vec::with_capacity(context::ANNOUNCE.len() + 8 + work_reports.len() * 36 + 32);
    message.extend_from_slice(context::ANNOUNCE);
    message.extend_from_slice(&encode_fixed_le(tranche, 8)?);
    for (core_index, report_hash) in work_reports {
        message.extend_from_slice(&encode_fixed_le(*core_index as u64, 4)?);
        message.extend_from_slice(report_hash);
    }
    message.extend_from_slice(header_hash);
    Ok(message)
}

/// sign an announcement over a non-empty report set
pub fn sign_announcement(
    seed: &[u8; 32],
    validator_index: ValidatorIndex,
    header_hash: &Hash,
    tranche: Tranche,
    work_reports: &[(CoreIndex, Hash)],
    evidence: IetfSignature,
) -> Result<AuditAnnouncement> {
    if work_reports.is_empty() {
        return Err(AuditError::EmptyInput);
    }
    let message = announcement_message(tranche, work_reports, header_hash)?;
    let signature = ed25519::sign(seed, &message);
    Ok(AuditAnnouncement {
        header_hash: *header_hash,
        tranche,
        validator_index,
        work_reports: work_reports.to_vec(),
        signature,
        evidence,
    })
}

/// verify an announcement against the validator set it names
pub fn verify_announcement(
    validators: &ValidatorSet,
    announcement: &AuditAnnouncement,
) -> Result<bool> {
    let keys = validators
        .get(announcement.validator_index as usize)
        .ok_or(AuditError::UnknownValidator(announcement.validator_index))?;
    let message = announcement_message(
        announcement.tranche,
        &announcement.work_reports,
        &announcement.header_hash,
    )?;
    Ok(ed25519::verify(&keys.ed25519, &message, &announcement.signature)?)
}
