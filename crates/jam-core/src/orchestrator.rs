//! The pipeline driver
//!
//! Owns the Safrole state and wires the services to the audit and ticket
//! machinery. Lifecycle collapses to synchronous hooks: `init` snapshots
//! the services into an initial state, `start`/`stop` only gate the
//! producing entry points.

use std::sync::Arc;

use tracing::{debug, info};

use jam_audit::{
    select_tranche0, select_tranche_n, sign_announcement, sign_tranche0, AuditAnnouncement,
    NoShowTally, Tranche0Selection, TrancheNSelection,
};
use jam_codec::Hash;
use jam_crypto::traits::{IetfVrfProver, RingVrfProver, RingVrfVerifier};
use jam_crypto::sort_ring_keys;
use jam_safrole::{
    assign_guarantors, fallback_seal_keys, generate_tickets, stf, GuarantorAssignment, SealKeys,
    SafroleInput, SafroleOutput, SafroleState, TicketAccumulator,
};
use jam_types::{extrinsic_hash, BlockBody, SafroleTicket, ValidatorIndex, WorkReport};

use crate::services::{
    ConfigService, EntropyService, KeyPairService, ValidatorSetManager, WorkReportService,
};
use crate::{CoreError, Result};

pub struct Orchestrator<IP, RP, RV> {
    config: Arc<dyn ConfigService>,
    validators: Arc<dyn ValidatorSetManager>,
    keys: Arc<dyn KeyPairService>,
    entropy: Arc<dyn EntropyService>,
    reports: Arc<dyn WorkReportService>,
    ietf_prover: IP,
    ring_prover: RP,
    ring_verifier: RV,
    state: Option<SafroleState>,
    running: bool,
}

impl<IP, RP, RV> Orchestrator<IP, RP, RV>
where
    IP: IetfVrfProver,
    RP: RingVrfProver,
    RV: RingVrfVerifier,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Arc<dyn ConfigService>,
        validators: Arc<dyn ValidatorSetManager>,
        keys: Arc<dyn KeyPairService>,
        entropy: Arc<dyn EntropyService>,
        reports: Arc<dyn WorkReportService>,
        ietf_prover: IP,
        ring_prover: RP,
        ring_verifier: RV,
    ) -> Self {
        Self {
            config,
            validators,
            keys,
            entropy,
            reports,
            ietf_prover,
            ring_prover,
            ring_verifier,
            state: None,
            running: false,
        }
    }

    /// snapshot the services into the initial Safrole state
    pub fn init(&mut self) -> Result<()> {
        let active = self.validators.active_validators();
        let ring = sort_ring_keys(&active.bandersnatch_keys());
        let epoch_root = self.ring_verifier.ring_root(&ring)?;
        let entropy = self.entropy.pool();
        let seal_keys = SealKeys::Fallback(
            fallback_seal_keys(&entropy.eta[2], &active, self.config.epoch_length() as usize)
                .map_err(CoreError::Safrole)?,
        );

        self.state = Some(SafroleState {
            current_slot: 0,
            pending: active.clone(),
            active: active.clone(),
            previous: active.clone(),
            staging: active,
            epoch_root,
            seal_keys,
            accumulator: TicketAccumulator::new(),
            entropy,
        });
        info!("orchestrator initialized");
        Ok(())
    }

    pub fn start(&mut self) {
        self.running = true;
        info!("orchestrator started");
    }

    pub fn stop(&mut self) {
        self.running = false;
        info!("orchestrator stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn state(&self) -> Result<&SafroleState> {
        self.state.as_ref().ok_or(CoreError::NotInitialized)
    }

    /// this node's index in the active set
    pub fn local_validator_index(&self) -> Result<ValidatorIndex> {
        let local = self.keys.local_key_pair();
        self.validators
            .active_validators()
            .index_of_ed25519(&local.ed25519.public)
            .map(|i| i as ValidatorIndex)
            .ok_or(CoreError::LocalValidatorUnknown)
    }

    /// the per-core report view for this block
    fn collect_reports(&self) -> Vec<Option<WorkReport>> {
        (0..self.config.num_cores() as u64)
            .map(|core| self.reports.work_report_for_core(core))
            .collect()
    }

    /// run the tranche-0 selection and announce it
    pub fn audit_tranche0(
        &self,
        header_hash: &Hash,
        block_vrf_output: &Hash,
    ) -> Result<(Tranche0Selection, AuditAnnouncement)> {
        let evidence = sign_tranche0(&self.ietf_prover, block_vrf_output)?;
        let reports = self.collect_reports();
        let selection =
            select_tranche0(&reports, &evidence.vrf_output, self.config.max_audit_cores())?;

        let work_reports: Vec<(u32, Hash)> = selection
            .shuffled_sequence
            .iter()
            .filter(|(core, _)| selection.selected_cores.contains(core))
            .filter_map(|(core, hash)| hash.map(|h| (*core, h)))
            .collect();

        let local = self.keys.local_key_pair();
        let announcement = sign_announcement(
            &local.ed25519.seed,
            self.local_validator_index()?,
            header_hash,
            0,
            &work_reports,
            evidence.signature.clone(),
        )?;

        debug!(cores = ?selection.selected_cores, "tranche-0 audit announced");
        Ok((selection, announcement))
    }

    /// run a tranche-n selection; announce it when anything was selected
    pub fn audit_tranche_n(
        &self,
        header_hash: &Hash,
        block_vrf_output: &Hash,
        tranche: u64,
        tallies: &[NoShowTally],
    ) -> Result<(TrancheNSelection, Option<AuditAnnouncement>)> {
        let reports = self.collect_reports();
        let selection = select_tranche_n(
            &self.ietf_prover,
            block_vrf_output,
            tranche,
            &reports,
            tallies,
            self.config.num_validators(),
            self.config.audit_bias_factor(),
        )?;

        if selection.selected_cores.is_empty() {
            return Ok((selection, None));
        }

        let work_reports: Vec<(u32, Hash)> = selection
            .selected_cores
            .iter()
            .filter_map(|core| {
                let report = reports.get(*core as usize)?.as_ref()?;
                Some((*core, report.hash().ok()?))
            })
            .collect();

        // any selected core's evidence doubles as the announcement evidence
        let evidence = selection.evidence[0].1.signature.clone();
        let local = self.keys.local_key_pair();
        let announcement = sign_announcement(
            &local.ed25519.seed,
            self.local_validator_index()?,
            header_hash,
            tranche,
            &work_reports,
            evidence,
        )?;
        Ok((selection, Some(announcement)))
    }

    /// generate this validator's tickets for the coming epoch
    pub fn generate_epoch_tickets(&self) -> Result<Vec<SafroleTicket>> {
        let local = self.keys.local_key_pair();
        let tickets = generate_tickets(
            &self.ring_prover,
            &local.bandersnatch.public,
            &self.validators.active_validator_keys(),
            &self.entropy.entropy2(),
            self.config.tickets_per_validator(),
        )?;
        Ok(tickets)
    }

    /// apply one block's input to the Safrole state
    pub fn apply_block(&mut self, input: &SafroleInput) -> Result<SafroleOutput> {
        let params = SafroleParamsView::from(self.config.as_ref());
        let state = self.state.as_ref().ok_or(CoreError::NotInitialized)?;
        let output = stf::transition(&self.ring_verifier, &params.0, state, input)?;
        self.state = Some(output.state.clone());
        Ok(output)
    }

    /// the guarantor assignment at `current_time`, driven by eta2
    pub fn guarantor_assignment(&self, current_time: u64) -> GuarantorAssignment {
        assign_guarantors(
            &self.entropy.entropy2(),
            self.config.num_cores(),
            self.config.num_validators(),
            current_time,
            self.config.epoch_length(),
            self.config.rotation_period(),
        )
    }

    /// commit to a block body's extrinsics
    pub fn commit_extrinsics(&self, body: &BlockBody) -> Result<Hash> {
        Ok(extrinsic_hash(body)?)
    }
}

/// adapter from the config service to the safrole parameter struct
struct SafroleParamsView(jam_safrole::SafroleParams);

impl From<&dyn ConfigService> for SafroleParamsView {
    fn from(config: &dyn ConfigService) -> Self {
        Self(jam_safrole::SafroleParams {
            epoch_length: config.epoch_length(),
            epoch_tail_start: config.epoch_tail_start(),
            max_extrinsics_per_slot: config.max_extrinsics_per_slot(),
            max_ticket_entries: config.max_ticket_entries(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use jam_crypto::keys::{BandersnatchKeyPair, Ed25519KeyPair, ValidatorKeyPair};
    use jam_crypto::mock::{mock_ring_public, MockIetfProver, MockRingProver, MockRingVerifier};
    use jam_audit::verify_announcement;
    use jam_types::{
        EntropyPool, Preimage, RefineContext, ValidatorKeys, ValidatorSet, WorkExecResult,
        WorkPackageSpec, WorkResult,
    };

    use crate::params::ProtocolParams;
    use crate::services::{
        InMemoryEntropyService, InMemoryKeyPairService, InMemoryValidatorSetManager,
        InMemoryWorkReportService,
    };

    fn report(core_index: u32) -> WorkReport {
        WorkReport {
            package_spec: WorkPackageSpec {
                hash: [core_index as u8; 32],
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
            core_index,
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

    /// validators whose bandersnatch halves live in the mock ring
    fn validator_pair(tag: u8) -> ValidatorKeyPair {
        ValidatorKeyPair {
            ed25519: Ed25519KeyPair::from_seed([tag; 32]),
            bandersnatch: BandersnatchKeyPair {
                seed: [tag; 32],
                public: mock_ring_public(&[tag; 32]),
            },
        }
    }

    fn orchestrator(
        local_tag: u8,
    ) -> Orchestrator<MockIetfProver, MockRingProver, MockRingVerifier> {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let pairs: Vec<ValidatorKeyPair> = (0u8..6).map(validator_pair).collect();
        let validators = ValidatorSet::new(
            pairs
                .iter()
                .map(|p| ValidatorKeys {
                    ed25519: p.ed25519.public,
                    bandersnatch: p.bandersnatch.public,
                    bls: [0u8; 144],
                    metadata: [0u8; 128],
                })
                .collect(),
        );

        Orchestrator::new(
            Arc::new(ProtocolParams::tiny()),
            Arc::new(InMemoryValidatorSetManager { validators }),
            Arc::new(InMemoryKeyPairService {
                pair: validator_pair(local_tag),
            }),
            Arc::new(InMemoryEntropyService {
                entropy: EntropyPool::new([[1u8; 32], [2u8; 32], [3u8; 32], [4u8; 32]]),
            }),
            Arc::new(InMemoryWorkReportService {
                reports: vec![Some(report(0)), Some(report(1))],
            }),
            MockIetfProver::from_seed(&[local_tag; 32]),
            MockRingProver::from_seed(&[local_tag; 32]),
            MockRingVerifier,
        )
    }

    #[test]
    fn lifecycle_hooks() {
        let mut orch = orchestrator(0);
        assert!(orch.state().is_err());
        orch.init().unwrap();
        assert!(orch.state().is_ok());
        assert!(!orch.is_running());
        orch.start();
        assert!(orch.is_running());
        orch.stop();
        assert!(!orch.is_running());
    }

    #[test]
    fn tranche0_selection_and_announcement() {
        let mut orch = orchestrator(0);
        orch.init().unwrap();

        let header_hash = [0xAB; 32];
        let block_vrf_output = [3u8; 32];
        let (selection, announcement) =
            orch.audit_tranche0(&header_hash, &block_vrf_output).unwrap();

        // two cores, both carrying reports, cap of ten: both selected
        assert_eq!(selection.selected_cores.len(), 2);
        assert_eq!(announcement.work_reports.len(), 2);
        assert_eq!(announcement.tranche, 0);

        let validators = orch.validators.active_validators();
        assert!(verify_announcement(&validators, &announcement).unwrap());
    }

    #[test]
    fn tranche_n_announces_only_under_pressure() {
        let mut orch = orchestrator(0);
        orch.init().unwrap();

        let quiet = vec![NoShowTally::default(), NoShowTally::default()];
        let (selection, announcement) = orch
            .audit_tranche_n(&[0xAB; 32], &[3u8; 32], 1, &quiet)
            .unwrap();
        assert!(selection.selected_cores.is_empty());
        assert!(announcement.is_none());

        let mut pressured = vec![NoShowTally::default(), NoShowTally::default()];
        pressured[1].prev_announcers.insert(4);
        let (selection, announcement) = orch
            .audit_tranche_n(&[0xAB; 32], &[3u8; 32], 1, &pressured)
            .unwrap();
        assert_eq!(selection.selected_cores, vec![1]);
        let announcement = announcement.unwrap();
        assert_eq!(announcement.work_reports.len(), 1);

        let validators = orch.validators.active_validators();
        assert!(verify_announcement(&validators, &announcement).unwrap());
    }

    #[test]
    fn epoch_tickets_are_sorted_and_bounded() {
        let mut orch = orchestrator(2);
        orch.init().unwrap();

        let tickets = orch.generate_epoch_tickets().unwrap();
        assert_eq!(tickets.len(), 3);
        assert!(tickets.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[test]
    fn apply_block_advances_state() {
        let mut orch = orchestrator(0);
        orch.init().unwrap();

        let input = SafroleInput {
            slot: 1,
            entropy: [9u8; 32],
            extrinsics: vec![],
            offenders: BTreeSet::new(),
        };
        let output = orch.apply_block(&input).unwrap();
        assert!(output.errors.is_empty());
        assert_eq!(orch.state().unwrap().current_slot, 1);

        // replaying the same slot is rejected
        assert!(matches!(
            orch.apply_block(&input),
            Err(CoreError::Safrole(
                jam_safrole::SafroleError::InvalidSlot { .. }
            ))
        ));
    }

    #[test]
    fn guarantor_assignment_is_complete() {
        let mut orch = orchestrator(0);
        orch.init().unwrap();
        let assignment = orch.guarantor_assignment(5);
        assert_eq!(assignment.cores.len(), 6);
        assert!(assignment.cores.iter().all(|c| *c < 2));
    }

    #[test]
    fn extrinsic_commitment_is_stable() {
        let mut orch = orchestrator(0);
        orch.init().unwrap();
        let body = BlockBody {
            preimages: vec![Preimage {
                requester: 1,
                blob: vec![1, 2, 3],
            }],
            ..Default::default()
        };
        assert_eq!(
            orch.commit_extrinsics(&body).unwrap(),
            orch.commit_extrinsics(&body).unwrap()
        );
    }
}
