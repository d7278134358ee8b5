//! capability traits for the VRF roles
//!
//! pipelines are generic over these so the bandersnatch backend can be
//! swapped for deterministic fakes in tests. `vrf_output` is the 32-byte
//! seed derived from a signature's gamma point ("banderout"): the first 32
//! bytes of the output-point hash, never the raw point bytes.

use crate::{IetfSignature, Result, RingRoot, RingSignature};
use jam_codec::Hash;

pub trait IetfVrfProver {
    /// the prover's serialized public key
    fn public(&self) -> [u8; 32];

    /// produce an IETF VRF signature over `input` with additional data `aux`
    fn prove(&self, input: &[u8], aux: &[u8]) -> Result<IetfSignature>;

    /// derive the 32-byte VRF output seed from a signature
    fn vrf_output(&self, signature: &IetfSignature) -> Result<Hash>;
}

pub trait IetfVrfVerifier {
    /// check an IETF VRF signature. a well-formed but wrong signature is
    /// `Ok(false)`; backend failures are errors, never `false`.
    fn verify(
        &self,
        public: &[u8; 32],
        input: &[u8],
        signature: &IetfSignature,
        aux: &[u8],
    ) -> Result<bool>;

    /// derive the 32-byte VRF output seed from a signature
    fn vrf_output(&self, signature: &IetfSignature) -> Result<Hash>;
}

pub trait RingVrfProver {
    /// produce an anonymous ring VRF signature. `ring` must already be in
    /// the canonical (lexicographic) order shared with verifiers and
    /// `prover_index` must point into it.
    fn ring_prove(
        &self,
        input: &[u8],
        aux: &[u8],
        ring: &[[u8; 32]],
        prover_index: usize,
    ) -> Result<RingSignature>;

    /// derive the 32-byte VRF output seed from a signature
    fn vrf_output(&self, signature: &RingSignature) -> Result<Hash>;
}

pub trait RingVrfVerifier {
    /// check an anonymous ring VRF signature against the ordered ring.
    /// no prover index is required.
    fn ring_verify(
        &self,
        ring: &[[u8; 32]],
        input: &[u8],
        aux: &[u8],
        signature: &RingSignature,
    ) -> Result<bool>;

    /// commitment to the ordered ring (the epoch root)
    fn ring_root(&self, ring: &[[u8; 32]]) -> Result<RingRoot>;

    /// derive the 32-byte VRF output seed from a signature
    fn vrf_output(&self, signature: &RingSignature) -> Result<Hash>;
}
