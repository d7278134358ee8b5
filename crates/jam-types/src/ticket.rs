//! Safrole tickets and their extrinsic envelope

use jam_codec::{encode_fixed_le, take, Hash};
use jam_crypto::{RingSignature, RING_SIGNATURE_LEN};

/// A sealed lottery ticket: the VRF output seed as id, the ring proof as
/// evidence. `id` is always the output seed of `proof`'s gamma point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SafroleTicket {
    pub id: Hash,
    pub entry_index: u32,
    pub proof: RingSignature,
}

/// Wire form of a ticket inside the ticket extrinsic: the entry index as a
/// single byte followed by the 784-byte ring signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TicketEnvelope {
    pub entry_index: u32,
    pub signature: RingSignature,
}

impl TicketEnvelope {
    pub fn encode(&self) -> jam_codec::Result<Vec<u8>> {
        let mut out = Vec::with_capacity(1 + RING_SIGNATURE_LEN);
        out.extend_from_slice(&encode_fixed_le(self.entry_index as u64, 1)?);
        out.extend_from_slice(self.signature.as_bytes());
        Ok(out)
    }

    pub fn decode(bytes: &[u8]) -> jam_codec::Result<(Self, &[u8])> {
        let (entry, rest) = jam_codec::decode_fixed_le(bytes, 1)?;
        let (sig, rest) = take(rest, RING_SIGNATURE_LEN)?;
        let mut buf = [0u8; RING_SIGNATURE_LEN];
        buf.copy_from_slice(sig);
        Ok((
            Self {
                entry_index: entry as u32,
                signature: RingSignature(buf),
            },
            rest,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_round_trip() {
        let envelope = TicketEnvelope {
            entry_index: 2,
            signature: RingSignature([0x5Au8; RING_SIGNATURE_LEN]),
        };
        let enc = envelope.encode().unwrap();
        assert_eq!(enc.len(), 1 + RING_SIGNATURE_LEN);
        let (decoded, rest) = TicketEnvelope::decode(&enc).unwrap();
        assert_eq!(decoded, envelope);
        assert!(rest.is_empty());
    }

    #[test]
    fn envelope_decode_underflow() {
        assert!(TicketEnvelope::decode(&[0x01; 100]).is_err());
    }

    #[test]
    fn entry_index_must_fit_one_byte() {
        let envelope = TicketEnvelope {
            entry_index: 300,
            signature: RingSignature([0u8; RING_SIGNATURE_LEN]),
        };
        assert!(envelope.encode().is_err());
    }
}
