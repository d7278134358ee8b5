//! audit tranche selection
//!
//! tranche 0: shuffle the (core, report) pairs under the auditor's VRF
//! output seed and take the first ten cores that actually carry a report.
//! tranche n > 0: per surviving report, draw a byte from fresh evidence and
//! admit the core when the previous round's no-shows outweigh the biased
//! threshold; cores with a negative judgment are always admitted.

use std::collections::BTreeSet;

use tracing::debug;

use jam_codec::Hash;
use jam_crypto::traits::{IetfVrfProver, IetfVrfVerifier};
use jam_shuffle::jam_shuffle;
use jam_types::{CoreIndex, Tranche, ValidatorIndex, WorkReport};

use crate::evidence::{sign_tranche_n, tranche_n_context, AuditEvidence};
use crate::{AuditError, Result};

/// the tranche-0 outcome: the shuffled core sequence and the capped
/// selection drawn from it
#[derive(Clone, Debug)]
pub struct Tranche0Selection {
    pub selected_cores: Vec<CoreIndex>,
    pub shuffled_sequence: Vec<(CoreIndex, Option<Hash>)>,
    pub vrf_output: Hash,
}

/// announcement/judgment bookkeeping for one core, carried between
/// tranches. sorted sets keep iteration deterministic.
#[derive(Clone, Debug, Default)]
pub struct NoShowTally {
    /// validators who announced intent in the previous tranche
    pub prev_announcers: BTreeSet<ValidatorIndex>,
    /// validators who have since submitted a positive judgment
    pub positive_judgers: BTreeSet<ValidatorIndex>,
    /// a negative judgment has been seen for this core
    pub negative_judgment: bool,
}

impl NoShowTally {
    /// announced in the previous tranche but not yet judged positively
    pub fn no_shows(&self) -> usize {
        self.prev_announcers
            .difference(&self.positive_judgers)
            .count()
    }
}

/// the tranche-n outcome with the per-report evidence that drove it
#[derive(Clone, Debug)]
pub struct TrancheNSelection {
    pub tranche: Tranche,
    pub selected_cores: Vec<CoreIndex>,
    pub evidence: Vec<(CoreIndex, AuditEvidence)>,
}

fn report_hashes(reports: &[Option<WorkReport>]) -> Result<Vec<(CoreIndex, Option<Hash>)>> {
    reports
        .iter()
        .enumerate()
        .map(|(core, report)| {
            let hash = match report {
                Some(r) => Some(r.hash()?),
                None => None,
            };
            Ok((core as CoreIndex, hash))
        })
        .collect()
}

/// tranche-0 selection under the auditor's evidence output seed
pub fn select_tranche0(
    reports: &[Option<WorkReport>],
    evidence_output: &Hash,
    max_audit_cores: usize,
) -> Result<Tranche0Selection> {
    let pairs = report_hashes(reports)?;
    let shuffled = jam_shuffle(&pairs, evidence_output);

    let selected_cores: Vec<CoreIndex> = shuffled
        .iter()
        .filter(|(_, hash)| hash.is_some())
        .take(max_audit_cores)
        .map(|(core, _)| *core)
        .collect();

    debug!(
        cores = reports.len(),
        selected = selected_cores.len(),
        "tranche-0 selection"
    );

    Ok(Tranche0Selection {
        selected_cores,
        shuffled_sequence: shuffled,
        vrf_output: *evidence_output,
    })
}

/// recompute a tranche-0 selection and demand multiset equality by core
pub fn verify_tranche0_selection(
    claimed_cores: &[CoreIndex],
    reports: &[Option<WorkReport>],
    evidence_output: &Hash,
    max_audit_cores: usize,
) -> Result<()> {
    let recomputed = select_tranche0(reports, evidence_output, max_audit_cores)?;
    let mut claimed = claimed_cores.to_vec();
    let mut expected = recomputed.selected_cores;
    claimed.sort_unstable();
    expected.sort_unstable();
    if claimed != expected {
        return Err(AuditError::SelectionMismatch);
    }
    Ok(())
}

/// the biased inclusion test: admit when `(V/(256*F) * b)/256 < m`,
/// evaluated as the exact cross multiplication `V*b < m*65536*F`
fn admits(num_validators: usize, bias_factor: u64, draw: u8, no_shows: usize) -> bool {
    (num_validators as u128) * (draw as u128)
        < (no_shows as u128) * 65_536 * (bias_factor as u128)
}

/// tranche-n selection: fresh evidence per surviving report, inclusion by
/// no-show pressure, negative judgments always audited
pub fn select_tranche_n<P: IetfVrfProver>(
    prover: &P,
    block_vrf_output: &Hash,
    tranche: Tranche,
    reports: &[Option<WorkReport>],
    tallies: &[NoShowTally],
    num_validators: usize,
    bias_factor: u64,
) -> Result<TrancheNSelection> {
    if reports.len() != tallies.len() {
        return Err(AuditError::InputLengthMismatch);
    }

    let mut selected_cores = Vec::new();
    let mut evidence = Vec::new();

    for (core, (report, tally)) in reports.iter().zip(tallies).enumerate() {
        let Some(report) = report else { continue };
        let core = core as CoreIndex;

        let report_evidence = sign_tranche_n(prover, block_vrf_output, report, tranche)?;
        let draw = report_evidence.vrf_output[0];
        let no_shows = tally.no_shows();

        let include =
            tally.negative_judgment || admits(num_validators, bias_factor, draw, no_shows);
        debug!(core, draw, no_shows, include, "tranche-n test");

        if include {
            selected_cores.push(core);
        }
        evidence.push((core, report_evidence));
    }

    Ok(TrancheNSelection {
        tranche,
        selected_cores,
        evidence,
    })
}

/// verify a claimed tranche-n selection: check every piece of evidence,
/// re-run the inclusion test from the recomputed VRF outputs, and demand
/// the same core set
pub fn verify_tranche_n_selection<V: IetfVrfVerifier>(
    verifier: &V,
    public: &[u8; 32],
    claimed: &TrancheNSelection,
    block_vrf_output: &Hash,
    reports: &[Option<WorkReport>],
    tallies: &[NoShowTally],
    num_validators: usize,
    bias_factor: u64,
) -> Result<()> {
    if reports.len() != tallies.len() {
        return Err(AuditError::InputLengthMismatch);
    }

    let mut expected = Vec::new();
    for (core, (report, tally)) in reports.iter().zip(tallies).enumerate() {
        let Some(report) = report else { continue };
        let core = core as CoreIndex;

        let (_, report_evidence) = claimed
            .evidence
            .iter()
            .find(|(c, _)| *c == core)
            .ok_or(AuditError::SelectionMismatch)?;

        let ctx = tranche_n_context(block_vrf_output, report, claimed.tranche)?;
        if !verifier.verify(public, &ctx, &report_evidence.signature, &[])? {
            return Err(AuditError::InvalidEvidence(core));
        }

        // trust only the recomputed output, not the claimed seed
        let draw = verifier.vrf_output(&report_evidence.signature)?[0];
        if tally.negative_judgment || admits(num_validators, bias_factor, draw, tally.no_shows()) {
            expected.push(core);
        }
    }

    let mut claimed_cores = claimed.selected_cores.clone();
    claimed_cores.sort_unstable();
    expected.sort_unstable();
    if claimed_cores != expected {
        return Err(AuditError::SelectionMismatch);
    }
    Ok(())
}
