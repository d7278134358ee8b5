//! Work reports and their deterministic encoding
//!
//! The pipelines treat a report as an opaque hashable value: it is encoded
//! once, hashed with blake2b, and the hash is what selection and
//! announcements commit to.

use jam_codec::{
    blake2b_hash, encode_fixed_le, encode_natural, encode_sequence, Hash, Result,
};

/// Specification of the work package a report was built from
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkPackageSpec {
    pub hash: Hash,
    pub length: u32,
    pub erasure_root: Hash,
    pub exports_root: Hash,
    pub exports_count: u16,
}

impl WorkPackageSpec {
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(102);
        out.extend_from_slice(&self.hash);
        out.extend_from_slice(&encode_fixed_le(self.length as u64, 4)?);
        out.extend_from_slice(&self.erasure_root);
        out.extend_from_slice(&self.exports_root);
        out.extend_from_slice(&encode_fixed_le(self.exports_count as u64, 2)?);
        Ok(out)
    }
}

/// Anchor block context the report was refined against
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefineContext {
    pub anchor: Hash,
    pub state_root: Hash,
    pub beefy_root: Hash,
    pub lookup_anchor: Hash,
    pub lookup_anchor_slot: u32,
    pub prerequisites: Vec<Hash>,
}

impl RefineContext {
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.anchor);
        out.extend_from_slice(&self.state_root);
        out.extend_from_slice(&self.beefy_root);
        out.extend_from_slice(&self.lookup_anchor);
        out.extend_from_slice(&encode_fixed_le(self.lookup_anchor_slot as u64, 4)?);
        out.extend_from_slice(&encode_sequence(&self.prerequisites, |h| {
            Ok(h.to_vec())
        })?);
        Ok(out)
    }
}

/// Outcome of executing one work item
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkExecResult {
    Ok(Vec<u8>),
    OutOfGas,
    Panic,
    BadCode,
    CodeOversize,
}

impl WorkExecResult {
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(match self {
            WorkExecResult::Ok(blob) => {
                let mut out = vec![0x00];
                out.extend_from_slice(&encode_natural(blob.len() as u64));
                out.extend_from_slice(blob);
                out
            }
            WorkExecResult::OutOfGas => vec![0x01],
            WorkExecResult::Panic => vec![0x02],
            WorkExecResult::BadCode => vec![0x03],
            WorkExecResult::CodeOversize => vec![0x04],
        })
    }
}

/// One refined work item inside a report
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkResult {
    pub service_id: u32,
    pub code_hash: Hash,
    pub payload_hash: Hash,
    pub accumulate_gas: u64,
    pub result: WorkExecResult,
}

impl WorkResult {
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        out.extend_from_slice(&encode_fixed_le(self.service_id as u64, 4)?);
        out.extend_from_slice(&self.code_hash);
        out.extend_from_slice(&self.payload_hash);
        out.extend_from_slice(&encode_fixed_le(self.accumulate_gas, 8)?);
        out.extend_from_slice(&self.result.encode()?);
        Ok(out)
    }
}

/// A work report made available on a core
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkReport {
    pub package_spec: WorkPackageSpec,
    pub context: RefineContext,
    pub core_index: u32,
    pub authorizer_hash: Hash,
    pub auth_gas_used: u64,
    pub auth_output: Vec<u8>,
    pub segment_root_lookup: Vec<(Hash, Hash)>,
    pub results: Vec<WorkResult>,
}

impl WorkReport {
    /// Deterministic encoding: fields in declaration order, sequences
    /// length-prefixed, the segment lookup sorted by key
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.package_spec.encode()?);
        out.extend_from_slice(&self.context.encode()?);
        out.extend_from_slice(&encode_fixed_le(self.core_index as u64, 4)?);
        out.extend_from_slice(&self.authorizer_hash);
        out.extend_from_slice(&encode_fixed_le(self.auth_gas_used, 8)?);
        out.extend_from_slice(&encode_natural(self.auth_output.len() as u64));
        out.extend_from_slice(&self.auth_output);

        let pairs: Vec<(Vec<u8>, Vec<u8>)> = self
            .segment_root_lookup
            .iter()
            .map(|(k, v)| (k.to_vec(), v.to_vec()))
            .collect();
        out.extend_from_slice(&jam_codec::encode_dictionary(&pairs)?);

        out.extend_from_slice(&encode_sequence(&self.results, |r| r.encode())?);
        Ok(out)
    }

    /// blake2b of the encoding; what selections and announcements carry
    pub fn hash(&self) -> Result<Hash> {
        Ok(blake2b_hash(&self.encode()?))
    }
}
