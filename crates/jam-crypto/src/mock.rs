//! deterministic fake backends for tests
//!
//! these reproduce the shapes and determinism of the real VRFs (fixed
//! signature framing, aux-independent outputs, anonymous ring checks)
//! without any curve arithmetic, so downstream crates can exercise the
//! pipelines without the ring SRS. they are trivially forgeable and must
//! never leave test wiring.

use jam_codec::{blake2b_hash, Hash};

use crate::traits::{IetfVrfProver, IetfVrfVerifier, RingVrfProver, RingVrfVerifier};
use crate::{
    IetfSignature, Result, RingRoot, RingSignature, IETF_SIGNATURE_LEN, RING_ROOT_LEN,
    RING_SIGNATURE_LEN,
};

fn tagged(tag: &[u8], parts: &[&[u8]]) -> Hash {
    let mut preimage = tag.to_vec();
    for part in parts {
        preimage.extend_from_slice(part);
    }
    blake2b_hash(&preimage)
}

/// hash chain expansion to an arbitrary length
fn expand(seed: Hash, len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len + 32);
    let mut block = seed;
    while out.len() < len {
        out.extend_from_slice(&block);
        block = blake2b_hash(&block);
    }
    out.truncate(len);
    out
}

fn mock_output(gamma: &[u8]) -> Hash {
    tagged(b"mock-vrf-out", &[gamma])
}

/// fake IETF prover keyed by a 32-byte seed
pub struct MockIetfProver {
    public: [u8; 32],
}

impl MockIetfProver {
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            public: mock_ietf_public(seed),
        }
    }
}

/// the public key the fake prover for `seed` will present
pub fn mock_ietf_public(seed: &[u8; 32]) -> [u8; 32] {
    tagged(b"mock-ietf-pk", &[seed])
}

fn ietf_signature_for(public: &[u8; 32], input: &[u8], aux: &[u8]) -> IetfSignature {
    let gamma = tagged(b"mock-ietf-gamma", &[public, input]);
    let proof = expand(tagged(b"mock-ietf-proof", &[public, input, aux, &gamma]), 64);
    let mut bytes = [0u8; IETF_SIGNATURE_LEN];
    bytes[..32].copy_from_slice(&gamma);
    bytes[32..].copy_from_slice(&proof);
    IetfSignature(bytes)
}

impl IetfVrfProver for MockIetfProver {
    fn public(&self) -> [u8; 32] {
        self.public
    }

    fn prove(&self, input: &[u8], aux: &[u8]) -> Result<IetfSignature> {
        Ok(ietf_signature_for(&self.public, input, aux))
    }

    fn vrf_output(&self, signature: &IetfSignature) -> Result<Hash> {
        Ok(mock_output(signature.gamma()))
    }
}

/// fake IETF verifier: recomputes the expected signature and compares
#[derive(Clone, Copy, Default)]
pub struct MockIetfVerifier;

impl IetfVrfVerifier for MockIetfVerifier {
    fn verify(
        &self,
        public: &[u8; 32],
        input: &[u8],
        signature: &IetfSignature,
        aux: &[u8],
    ) -> Result<bool> {
        Ok(ietf_signature_for(public, input, aux) == *signature)
    }

    fn vrf_output(&self, signature: &IetfSignature) -> Result<Hash> {
        Ok(mock_output(signature.gamma()))
    }
}

fn ring_digest(ring: &[[u8; 32]]) -> Hash {
    let mut preimage = Vec::with_capacity(ring.len() * 32);
    for key in ring {
        preimage.extend_from_slice(key);
    }
    blake2b_hash(&preimage)
}

fn ring_proof_for(ring: &[[u8; 32]], input: &[u8], aux: &[u8], gamma: &Hash) -> Vec<u8> {
    let digest = ring_digest(ring);
    expand(
        tagged(b"mock-ring-proof", &[&digest, input, aux, gamma]),
        RING_SIGNATURE_LEN - 32,
    )
}

/// fake ring prover keyed by a 32-byte seed
pub struct MockRingProver {
    public: [u8; 32],
}

impl MockRingProver {
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            public: mock_ring_public(seed),
        }
    }
}

/// the ring key the fake prover for `seed` occupies
pub fn mock_ring_public(seed: &[u8; 32]) -> [u8; 32] {
    tagged(b"mock-ring-pk", &[seed])
}

impl RingVrfProver for MockRingProver {
    fn ring_prove(
        &self,
        input: &[u8],
        aux: &[u8],
        ring: &[[u8; 32]],
        prover_index: usize,
    ) -> Result<RingSignature> {
        use crate::CryptoError;

        let member = ring.get(prover_index).ok_or_else(|| {
            CryptoError::CryptoFailure(format!(
                "prover index {prover_index} outside ring of {}",
                ring.len()
            ))
        })?;
        if member != &self.public {
            return Err(CryptoError::CryptoFailure(
                "prover index does not hold this key".into(),
            ));
        }
        // gamma binds the member key and input only, so the output stays
        // stable across aux -- same as the real VRF
        let gamma = tagged(b"mock-ring-gamma", &[&self.public, input]);
        let proof = ring_proof_for(ring, input, aux, &gamma);

        let mut bytes = [0u8; RING_SIGNATURE_LEN];
        bytes[..32].copy_from_slice(&gamma);
        bytes[32..].copy_from_slice(&proof);
        Ok(RingSignature(bytes))
    }

    fn vrf_output(&self, signature: &RingSignature) -> Result<Hash> {
        Ok(mock_output(signature.gamma()))
    }
}

/// fake anonymous ring verifier
#[derive(Clone, Copy, Default)]
pub struct MockRingVerifier;

impl RingVrfVerifier for MockRingVerifier {
    fn ring_verify(
        &self,
        ring: &[[u8; 32]],
        input: &[u8],
        aux: &[u8],
        signature: &RingSignature,
    ) -> Result<bool> {
        let mut gamma = [0u8; 32];
        gamma.copy_from_slice(signature.gamma());
        let expected = ring_proof_for(ring, input, aux, &gamma);
        Ok(signature.as_bytes()[32..] == expected[..])
    }

    fn ring_root(&self, ring: &[[u8; 32]]) -> Result<RingRoot> {
        let bytes = expand(tagged(b"mock-ring-root", &[&ring_digest(ring)]), RING_ROOT_LEN);
        RingRoot::from_bytes(&bytes)
    }

    fn vrf_output(&self, signature: &RingSignature) -> Result<Hash> {
        Ok(mock_output(signature.gamma()))
    }
}
