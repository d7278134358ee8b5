//! Block-body extrinsic components and the extrinsic-hash commitment
//!
//! The header commits to the body through a two-stage hash: the five
//! component encodings are leaf-hashed into the level-flattened tree, and
//! the concatenated tree is hashed once more.

use jam_codec::{
    blake2b_hash, blake_many, encode_fixed_le, encode_natural, encode_sequence, Hash, Result,
};

use crate::report::WorkReport;
use crate::ticket::TicketEnvelope;
use crate::ValidatorIndex;

/// A preimage supplied for a service's lookup request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Preimage {
    pub requester: u32,
    pub blob: Vec<u8>,
}

impl Preimage {
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut out = encode_fixed_le(self.requester as u64, 4)?;
        out.extend_from_slice(&encode_natural(self.blob.len() as u64));
        out.extend_from_slice(&self.blob);
        Ok(out)
    }
}

/// A guaranteed work report with its guarantor credentials
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportGuarantee {
    pub report: WorkReport,
    pub slot: u64,
    /// (validator index, ed25519 signature) per guarantor, submission order
    pub credentials: Vec<(ValidatorIndex, [u8; 64])>,
}

impl ReportGuarantee {
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut out = self.report.encode()?;
        out.extend_from_slice(&encode_fixed_le(self.slot, 4)?);
        out.extend_from_slice(&encode_sequence(&self.credentials, |(index, sig)| {
            let mut buf = encode_fixed_le(*index as u64, 2)?;
            buf.extend_from_slice(sig);
            Ok(buf)
        })?);
        Ok(out)
    }
}

/// An availability assurance over the pending reports
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AvailAssurance {
    pub anchor: Hash,
    pub bitfield: Vec<u8>,
    pub validator_index: ValidatorIndex,
    pub signature: [u8; 64],
}

impl AvailAssurance {
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut out = self.anchor.to_vec();
        out.extend_from_slice(&self.bitfield);
        out.extend_from_slice(&encode_fixed_le(self.validator_index as u64, 2)?);
        out.extend_from_slice(&self.signature);
        Ok(out)
    }
}

/// A single judgement vote inside a verdict
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Judgement {
    pub vote: bool,
    pub index: ValidatorIndex,
    pub signature: [u8; 64],
}

/// A dispute verdict with its judgement votes and offender evidence
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dispute {
    pub target: Hash,
    pub age: u32,
    pub votes: Vec<Judgement>,
}

impl Dispute {
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut out = self.target.to_vec();
        out.extend_from_slice(&encode_fixed_le(self.age as u64, 4)?);
        out.extend_from_slice(&encode_sequence(&self.votes, |j| {
            let mut buf = vec![u8::from(j.vote)];
            buf.extend_from_slice(&encode_fixed_le(j.index as u64, 2)?);
            buf.extend_from_slice(&j.signature);
            Ok(buf)
        })?);
        Ok(out)
    }
}

/// The five extrinsic components of a block body
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockBody {
    pub tickets: Vec<TicketEnvelope>,
    pub preimages: Vec<Preimage>,
    pub guarantees: Vec<ReportGuarantee>,
    pub assurances: Vec<AvailAssurance>,
    pub disputes: Vec<Dispute>,
}

impl BlockBody {
    /// The five component encodings, in commitment order
    pub fn component_encodings(&self) -> Result<[Vec<u8>; 5]> {
        Ok([
            encode_sequence(&self.tickets, |t| t.encode())?,
            encode_sequence(&self.preimages, |p| p.encode())?,
            encode_sequence(&self.guarantees, |g| g.encode())?,
            encode_sequence(&self.assurances, |a| a.encode())?,
            encode_sequence(&self.disputes, |d| d.encode())?,
        ])
    }
}

/// `H_extrinsichash`: blake2b over the concatenated `blake_many` tree of
/// the five component encodings
pub fn extrinsic_hash(body: &BlockBody) -> Result<Hash> {
    let components = body.component_encodings()?;
    let tree = blake_many(&components);
    let mut concat = Vec::with_capacity(tree.len() * 32);
    for node in &tree {
        concat.extend_from_slice(node);
    }
    Ok(blake2b_hash(&concat))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_report;

    fn sample_body() -> BlockBody {
        BlockBody {
            tickets: vec![],
            preimages: vec![Preimage {
                requester: 1,
                blob: vec![0xAB, 0xCD],
            }],
            guarantees: vec![ReportGuarantee {
                report: sample_report(0),
                slot: 12,
                credentials: vec![(0, [1u8; 64])],
            }],
            assurances: vec![],
            disputes: vec![],
        }
    }

    #[test]
    fn commitment_is_deterministic() {
        assert_eq!(
            extrinsic_hash(&sample_body()).unwrap(),
            extrinsic_hash(&sample_body()).unwrap()
        );
    }

    #[test]
    fn commitment_sees_every_component() {
        let base = extrinsic_hash(&sample_body()).unwrap();

        let mut changed = sample_body();
        changed.preimages[0].blob.push(0xEE);
        assert_ne!(extrinsic_hash(&changed).unwrap(), base);

        let mut changed = sample_body();
        changed.disputes.push(Dispute {
            target: [7u8; 32],
            age: 1,
            votes: vec![],
        });
        assert_ne!(extrinsic_hash(&changed).unwrap(), base);
    }

    #[test]
    fn empty_body_still_commits() {
        // five empty sequences still hash: the tree has 5 leaves
        let hash = extrinsic_hash(&BlockBody::default()).unwrap();
        assert_ne!(hash, [0u8; 32]);
    }
}
