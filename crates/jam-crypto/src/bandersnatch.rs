//! ark-vrf bandersnatch backend
//!
//! IETF signatures serialize as output point (32) then proof (64); ring
//! signatures as gamma (32), pedersen proof (160), ring proof (592). the
//! ring SRS is supplied by the embedder: pass the zcash srs bytes (or a
//! file path) when constructing [`RingVrfBackend`]. ring proof parameters
//! are cached per ring size; callers invalidate the cache when the key set
//! changes at an epoch boundary.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use ark_vrf::reexports::ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_vrf::suites::bandersnatch::{
    AffinePoint, IetfProof, Input, Output, PcsParams, Public, RingProof, RingProofParams, Secret,
};

use crate::traits::{IetfVrfProver, IetfVrfVerifier, RingVrfProver, RingVrfVerifier};
use crate::{
    CryptoError, IetfSignature, Result, RingRoot, RingSignature, IETF_SIGNATURE_LEN,
    RING_ROOT_LEN, RING_SIGNATURE_LEN,
};
use jam_codec::Hash;

fn vrf_input(data: &[u8]) -> Result<Input> {
    Input::new(data).ok_or_else(|| CryptoError::CryptoFailure("vrf input rejected".into()))
}

/// first 32 bytes of the VRF output-point hash ("banderout")
fn output_seed(gamma: &[u8]) -> Result<Hash> {
    let affine = AffinePoint::deserialize_compressed(gamma)
        .map_err(|e| CryptoError::CryptoFailure(format!("bad gamma point: {e}")))?;
    let output = Output::from(affine);
    let digest = output.hash();
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&digest[..32]);
    Ok(seed)
}

fn parse_ring(keys: &[[u8; 32]]) -> Vec<AffinePoint> {
    // keys that fail to parse (e.g. the zeroed keys of blacklisted
    // validators) occupy the ring as the padding point, keeping indices
    // aligned between prover and verifier
    keys.iter()
        .map(|k| {
            AffinePoint::deserialize_compressed(&k[..])
                .unwrap_or_else(|_| RingProofParams::padding_point())
        })
        .collect()
}

/// a bandersnatch secret acting as the IETF prover
pub struct BandersnatchSecret {
    secret: Secret,
}

impl BandersnatchSecret {
    /// derive from a 32-byte seed
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            secret: Secret::from_seed(seed),
        }
    }

    /// serialized compressed public key
    pub fn public_bytes(&self) -> [u8; 32] {
        let mut buf = Vec::with_capacity(32);
        self.secret
            .public()
            .0
            .serialize_compressed(&mut buf)
            .expect("compressed point serialization is infallible");
        let mut out = [0u8; 32];
        out.copy_from_slice(&buf);
        out
    }
}

impl IetfVrfProver for BandersnatchSecret {
    fn public(&self) -> [u8; 32] {
        self.public_bytes()
    }

    fn prove(&self, input: &[u8], aux: &[u8]) -> Result<IetfSignature> {
        use ark_vrf::ietf::Prover as _;

        let input = vrf_input(input)?;
        let output = self.secret.output(input);
        let proof = self.secret.prove(input, output, aux);

        let mut buf = Vec::with_capacity(IETF_SIGNATURE_LEN);
        output
            .serialize_compressed(&mut buf)
            .map_err(|e| CryptoError::CryptoFailure(format!("output serialization: {e}")))?;
        proof
            .serialize_compressed(&mut buf)
            .map_err(|e| CryptoError::CryptoFailure(format!("proof serialization: {e}")))?;
        IetfSignature::from_bytes(&buf)
    }

    fn vrf_output(&self, signature: &IetfSignature) -> Result<Hash> {
        output_seed(signature.gamma())
    }
}

/// stateless IETF verifier
#[derive(Clone, Copy, Default)]
pub struct BandersnatchIetfVerifier;

impl IetfVrfVerifier for BandersnatchIetfVerifier {
    fn verify(
        &self,
        public: &[u8; 32],
        input: &[u8],
        signature: &IetfSignature,
        aux: &[u8],
    ) -> Result<bool> {
        use ark_vrf::ietf::Verifier as _;

        let public = Public::deserialize_compressed(&public[..])
            .map_err(|e| CryptoError::CryptoFailure(format!("bad public key: {e}")))?;
        let input = vrf_input(input)?;
        let affine = match AffinePoint::deserialize_compressed(signature.gamma()) {
            Ok(p) => p,
            // a gamma that is not a curve point can never verify
            Err(_) => return Ok(false),
        };
        let output = Output::from(affine);
        let proof = match IetfProof::deserialize_compressed(&signature.as_bytes()[32..]) {
            Ok(p) => p,
            Err(_) => return Ok(false),
        };

        Ok(public.verify(input, output, aux, &proof).is_ok())
    }

    fn vrf_output(&self, signature: &IetfSignature) -> Result<Hash> {
        output_seed(signature.gamma())
    }
}

/// ring VRF backend holding the SRS and per-ring-size proof parameters
pub struct RingVrfBackend {
    pcs: PcsParams,
    params: Mutex<BTreeMap<usize, RingProofParams>>,
}

impl RingVrfBackend {
    /// build from the uncompressed zcash SRS bytes
    pub fn from_srs_bytes(bytes: &[u8]) -> Result<Self> {
        let pcs = PcsParams::deserialize_uncompressed(bytes)
            .map_err(|e| CryptoError::CryptoFailure(format!("bad srs: {e}")))?;
        Ok(Self {
            pcs,
            params: Mutex::new(BTreeMap::new()),
        })
    }

    /// build from an SRS file on disk
    pub fn from_srs_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())
            .map_err(|e| CryptoError::CryptoFailure(format!("srs unreadable: {e}")))?;
        Self::from_srs_bytes(&bytes)
    }

    /// drop cached ring parameters; call when the epoch's key set rotates
    pub fn clear_cache(&self) {
        self.params.lock().expect("params lock poisoned").clear();
    }

    fn params_for(&self, ring_size: usize) -> Result<RingProofParams> {
        let mut cache = self.params.lock().expect("params lock poisoned");
        if let Some(params) = cache.get(&ring_size) {
            return Ok(params.clone());
        }
        let params = RingProofParams::from_pcs_params(ring_size, self.pcs.clone())
            .map_err(|e| CryptoError::CryptoFailure(format!("ring params: {e:?}")))?;
        cache.insert(ring_size, params.clone());
        Ok(params)
    }

    /// verify against a previously computed ring root instead of the key
    /// set itself; cheaper when the commitment is already in state
    pub fn ring_verify_with_root(
        &self,
        root: &RingRoot,
        ring_size: usize,
        input: &[u8],
        aux: &[u8],
        signature: &RingSignature,
    ) -> Result<bool> {
        use ark_vrf::ring::Verifier as _;
        use ark_vrf::suites::bandersnatch::RingCommitment;

        let commitment = RingCommitment::deserialize_compressed(&root.as_bytes()[..])
            .map_err(|e| CryptoError::CryptoFailure(format!("bad ring root: {e}")))?;
        let params = self.params_for(ring_size)?;
        let verifier_key = params.verifier_key_from_commitment(commitment);
        let verifier = params.verifier(verifier_key);

        let (input, output, proof) = match Self::parse_signature(input, signature)? {
            Some(parts) => parts,
            None => return Ok(false),
        };
        Ok(Public::verify(input, output, aux, &proof, &verifier).is_ok())
    }

    #[allow(clippy::type_complexity)]
    fn parse_signature(
        input: &[u8],
        signature: &RingSignature,
    ) -> Result<Option<(Input, Output, RingProof)>> {
        let input = vrf_input(input)?;
        let affine = match AffinePoint::deserialize_compressed(signature.gamma()) {
            Ok(p) => p,
            Err(_) => return Ok(None),
        };
        let output = Output::from(affine);
        let proof = match RingProof::deserialize_compressed(&signature.as_bytes()[32..]) {
            Ok(p) => p,
            Err(_) => return Ok(None),
        };
        Ok(Some((input, output, proof)))
    }
}

impl RingVrfVerifier for RingVrfBackend {
    fn ring_verify(
        &self,
        ring: &[[u8; 32]],
        input: &[u8],
        aux: &[u8],
        signature: &RingSignature,
    ) -> Result<bool> {
        use ark_vrf::ring::Verifier as _;

        let pts = parse_ring(ring);
        let params = self.params_for(pts.len())?;
        let verifier_key = params.verifier_key(&pts);
        let verifier = params.verifier(verifier_key);

        let (input, output, proof) = match Self::parse_signature(input, signature)? {
            Some(parts) => parts,
            None => return Ok(false),
        };
        Ok(Public::verify(input, output, aux, &proof, &verifier).is_ok())
    }

    fn ring_root(&self, ring: &[[u8; 32]]) -> Result<RingRoot> {
        let pts = parse_ring(ring);
        let params = self.params_for(pts.len())?;
        let verifier_key = params.verifier_key(&pts);
        let commitment = verifier_key.commitment();

        let mut buf = Vec::with_capacity(RING_ROOT_LEN);
        commitment
            .serialize_compressed(&mut buf)
            .map_err(|e| CryptoError::CryptoFailure(format!("commitment serialization: {e}")))?;
        RingRoot::from_bytes(&buf)
    }

    fn vrf_output(&self, signature: &RingSignature) -> Result<Hash> {
        output_seed(signature.gamma())
    }
}

/// ring prover: a bandersnatch secret plus a handle on the shared backend
pub struct BandersnatchRingProver {
    backend: Arc<RingVrfBackend>,
    secret: Secret,
}

impl BandersnatchRingProver {
    pub fn new(backend: Arc<RingVrfBackend>, seed: &[u8; 32]) -> Self {
        Self {
            backend,
            secret: Secret::from_seed(seed),
        }
    }
}

impl RingVrfProver for BandersnatchRingProver {
    fn ring_prove(
        &self,
        input: &[u8],
        aux: &[u8],
        ring: &[[u8; 32]],
        prover_index: usize,
    ) -> Result<RingSignature> {
        use ark_vrf::ring::Prover as _;

        if prover_index >= ring.len() {
            return Err(CryptoError::CryptoFailure(format!(
                "prover index {prover_index} outside ring of {}",
                ring.len()
            )));
        }

        let pts = parse_ring(ring);
        let params = self.backend.params_for(pts.len())?;
        let prover_key = params.prover_key(&pts);
        let prover = params.prover(prover_key, prover_index);

        let input = vrf_input(input)?;
        let output = self.secret.output(input);
        let proof = self.secret.prove(input, output, aux, &prover);

        let mut buf = Vec::with_capacity(RING_SIGNATURE_LEN);
        output
            .serialize_compressed(&mut buf)
            .map_err(|e| CryptoError::CryptoFailure(format!("output serialization: {e}")))?;
        proof
            .serialize_compressed(&mut buf)
            .map_err(|e| CryptoError::CryptoFailure(format!("proof serialization: {e}")))?;
        RingSignature::from_bytes(&buf)
    }

    fn vrf_output(&self, signature: &RingSignature) -> Result<Hash> {
        output_seed(signature.gamma())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{IetfVrfProver as _, IetfVrfVerifier as _};

    #[test]
    fn ietf_round_trip() {
        let prover = BandersnatchSecret::from_seed(&[1u8; 32]);
        let verifier = BandersnatchIetfVerifier;
        let public = prover.public_bytes();

        let signature = prover.prove(b"vrf input", b"aux").unwrap();
        assert_eq!(signature.as_bytes().len(), IETF_SIGNATURE_LEN);
        assert!(verifier.verify(&public, b"vrf input", &signature, b"aux").unwrap());
    }

    #[test]
    fn ietf_rejects_wrong_input_and_aux() {
        let prover = BandersnatchSecret::from_seed(&[1u8; 32]);
        let verifier = BandersnatchIetfVerifier;
        let public = prover.public_bytes();
        let signature = prover.prove(b"vrf input", b"aux").unwrap();

        assert!(!verifier.verify(&public, b"other input", &signature, b"aux").unwrap());
        assert!(!verifier.verify(&public, b"vrf input", &signature, b"other").unwrap());

        let mut tampered = signature.clone();
        tampered.0[40] ^= 0x01;
        assert!(!verifier.verify(&public, b"vrf input", &tampered, b"aux").unwrap());
    }

    #[test]
    fn output_seed_is_aux_independent() {
        let prover = BandersnatchSecret::from_seed(&[1u8; 32]);
        let a = prover.prove(b"vrf input", b"aux-1").unwrap();
        let b = prover.prove(b"vrf input", b"aux-2").unwrap();
        assert_eq!(prover.vrf_output(&a).unwrap(), prover.vrf_output(&b).unwrap());

        let c = prover.prove(b"different", b"aux-1").unwrap();
        assert_ne!(prover.vrf_output(&a).unwrap(), prover.vrf_output(&c).unwrap());
    }

    #[test]
    fn distinct_seeds_distinct_outputs() {
        let a = BandersnatchSecret::from_seed(&[1u8; 32]);
        let b = BandersnatchSecret::from_seed(&[2u8; 32]);
        assert_ne!(a.public_bytes(), b.public_bytes());

        let sig_a = a.prove(b"vrf input", b"").unwrap();
        let sig_b = b.prove(b"vrf input", b"").unwrap();
        assert_ne!(a.vrf_output(&sig_a).unwrap(), b.vrf_output(&sig_b).unwrap());
    }

    #[test]
    fn garbage_srs_is_rejected() {
        assert!(matches!(
            RingVrfBackend::from_srs_bytes(&[0u8; 64]),
            Err(CryptoError::CryptoFailure(_))
        ));
    }
}
