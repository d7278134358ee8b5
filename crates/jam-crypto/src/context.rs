//! VRF and signing context strings
//!
//! the audit context keeps its `$` prefix while the remaining contexts do
//! not; this matches the observed wire behaviour of deployed nodes, so each
//! constant is fixed per call site and never normalized.

/// audit-evidence VRF context prefix (tranche 0 and tranche N)
pub const AUDIT: &[u8] = b"$jam_audit";

/// ed25519 announcement message prefix
pub const ANNOUNCE: &[u8] = b"jam_announce";

/// safrole ticket seal VRF context prefix
pub const TICKET_SEAL: &[u8] = b"jam_ticket_seal";

/// fallback seal VRF context prefix
pub const FALLBACK_SEAL: &[u8] = b"jam_fallback_seal";

/// per-block entropy VRF context prefix
pub const ENTROPY: &[u8] = b"jam_entropy";
