//! IETF VRF audit evidence
//!
//! tranche 0 signs over the block author's VRF output alone; tranche n > 0
//! additionally binds the work report hash and the tranche number, so each
//! report gets independent evidence. the VRF aux data is empty in both
//! shapes.

use jam_codec::{encode_fixed_le, Hash};
use jam_crypto::traits::{IetfVrfProver, IetfVrfVerifier};
use jam_crypto::{context, IetfSignature};
use jam_types::WorkReport;

use crate::Result;

/// evidence that a validator ran the audit VRF: the signature plus its
/// 32-byte output seed, which drives the tranche-0 shuffle and the
/// tranche-n inclusion test
#[derive(Clone, Debug)]
pub struct AuditEvidence {
    pub signature: IetfSignature,
    pub vrf_output: Hash,
}

/// tranche-0 VRF context: `$jam_audit` followed by the block VRF output
pub fn tranche0_context(block_vrf_output: &Hash) -> Vec<u8> {
    let mut ctx = Vec::with_capacity(context::AUDIT.len() + 32);
    ctx.extend_from_slice(context::AUDIT);
    ctx.extend_from_slice(block_vrf_output);
    ctx
}

/// tranche-n VRF context: tranche-0 context extended with the report hash
/// and the tranche number as 8 bytes little-endian
pub fn tranche_n_context(
    block_vrf_output: &Hash,
    report: &WorkReport,
    tranche: u64,
) -> Result<Vec<u8>> {
    let mut ctx = tranche0_context(block_vrf_output);
    ctx.extend_from_slice(&report.hash()?);
    ctx.extend_from_slice(&encode_fixed_le(tranche, 8)?);
    Ok(ctx)
}

pub fn sign_tranche0<P: IetfVrfProver>(
    prover: &P,
    block_vrf_output: &Hash,
) -> Result<AuditEvidence> {
    let signature = prover.prove(&tranche0_context(block_vrf_output), &[])?;
    let vrf_output = prover.vrf_output(&signature)?;
    Ok(AuditEvidence {
        signature,
        vrf_output,
    })
}

pub fn verify_tranche0<V: IetfVrfVerifier>(
    verifier: &V,
    public: &[u8; 32],
    signature: &IetfSignature,
    block_vrf_output: &Hash,
) -> Result<bool> {
    Ok(verifier.verify(public, &tranche0_context(block_vrf_output), signature, &[])?)
}

pub fn sign_tranche_n<P: IetfVrfProver>(
    prover: &P,
    block_vrf_output: &Hash,
    report: &WorkReport,
    tranche: u64,
) -> Result<AuditEvidence> {
    let ctx = tranche_n_context(block_vrf_output, report, tranche)?;
    let signature = prover.prove(&ctx, &[])?;
    let vrf_output = prover.vrf_output(&signature)?;
    Ok(AuditEvidence {
        signature,
        vrf_output,
    })
}

pub fn verify_tranche_n<V: IetfVrfVerifier>(
    verifier: &V,
    public: &[u8; 32],
    signature: &IetfSignature,
    block_vrf_output: &Hash,
    report: &WorkReport,
    tranche: u64,
) -> Result<bool> {
    let ctx = tranche_n_context(block_vrf_output, report, tranche)?;
    Ok(verifier.verify(public, &ctx, signature, &[])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jam_crypto::mock::{MockIetfProver, MockIetfVerifier};
    use jam_crypto::traits::IetfVrfProver as _;
    use jam_types::{RefineContext, WorkExecResult, WorkPackageSpec, WorkResult};

    fn report() -> WorkReport {
        WorkReport {
            package_spec: WorkPackageSpec {
                hash: [1u8; 32],
                length: 1,
                erasure_root: [2u8; 32],
                exports_root: [3u8; 32],
                exports_count: 0,
            },
            context: RefineContext {
                anchor: [4u8; 32],
                state_root: [5u8; 32],
                beefy_root: [6u8; 32],
                lookup_anchor: [7u8; 32],
                lookup_anchor_slot: 0,
                prerequisites: vec![],
            },
            core_index: 0,
            authorizer_hash: [8u8; 32],
            auth_gas_used: 0,
            auth_output: vec![],
            segment_root_lookup: vec![],
            results: vec![WorkResult {
                service_id: 0,
                code_hash: [9u8; 32],
                payload_hash: [10u8; 32],
                accumulate_gas: 0,
                result: WorkExecResult::Ok(vec![]),
            }],
        }
    }

    #[test]
    fn context_carries_the_audit_prefix() {
        let ctx = tranche0_context(&[3u8; 32]);
        assert!(ctx.starts_with(b"$jam_audit"));
        assert_eq!(ctx.len(), 10 + 32);
    }

    #[test]
    fn tranche0_round_trip() {
        let prover = MockIetfProver::from_seed(&[1u8; 32]);
        let verifier = MockIetfVerifier;
        let block_vrf_output = [3u8; 32];

        let evidence = sign_tranche0(&prover, &block_vrf_output).unwrap();
        assert_eq!(evidence.signature.as_bytes().len(), 96);
        assert_eq!(evidence.vrf_output.len(), 32);
        assert!(verify_tranche0(
            &verifier,
            &prover.public(),
            &evidence.signature,
            &block_vrf_output
        )
        .unwrap());
    }

    #[test]
    fn tranche_n_round_trip_and_independence() {
        let prover = MockIetfProver::from_seed(&[1u8; 32]);
        let verifier = MockIetfVerifier;
        let block_vrf_output = [3u8; 32];
        let w = report();

        let e1 = sign_tranche_n(&prover, &block_vrf_output, &w, 1).unwrap();
        assert!(verify_tranche_n(&verifier, &prover.public(), &e1.signature, &block_vrf_output, &w, 1).unwrap());

        // evidence is bound to the tranche number
        assert!(!verify_tranche_n(&verifier, &prover.public(), &e1.signature, &block_vrf_output, &w, 2).unwrap());

        let e2 = sign_tranche_n(&prover, &block_vrf_output, &w, 2).unwrap();
        assert_ne!(e1.vrf_output, e2.vrf_output);
    }

    #[test]
    fn outputs_are_deterministic() {
        let prover = MockIetfProver::from_seed(&[1u8; 32]);
        let a = sign_tranche0(&prover, &[3u8; 32]).unwrap();
        let b = sign_tranche0(&prover, &[3u8; 32]).unwrap();
        assert_eq!(a.vrf_output, b.vrf_output);

        let other = sign_tranche0(&MockIetfProver::from_seed(&[2u8; 32]), &[3u8; 32]).unwrap();
        assert_ne!(a.vrf_output, other.vrf_output);
    }
}
