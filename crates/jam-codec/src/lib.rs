//! gray paper serialization codec
//!
//! little-endian throughout. naturals use the self-delimiting 1-9 byte
//! varint, sequences are length-prefixed with a natural, optionals carry a
//! one-byte discriminator, dictionaries are sorted by key bytes.
//!
//! hashing is blake2b-256; `blake_many` builds the level-flattened binary
//! tree used for the extrinsic commitment.

pub mod hash;
pub mod natural;

pub use hash::{blake2b_hash, blake_many, Hash, ZERO_HASH};
pub use natural::{decode_natural, encode_natural};

use thiserror::Error;

/// codec failures. decoders never truncate silently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("insufficient bytes: needed {needed}, have {have}")]
    InsufficientBytes { needed: usize, have: usize },

    #[error("value {value} does not fit in {width} bytes")]
    Overflow { value: u64, width: usize },

    #[error("invalid discriminator byte {0:#04x}")]
    InvalidDiscriminator(u8),
}

pub type Result<T> = core::result::Result<T, CodecError>;

/// encode `n` as exactly `width` little-endian bytes, `width` in 1..=8.
/// fails if the value does not fit.
pub fn encode_fixed_le(n: u64, width: usize) -> Result<Vec<u8>> {
    assert!(width >= 1 && width <= 8, "fixed width must be 1..=8");
    if width < 8 && n >= 1u64 << (8 * width) {
        return Err(CodecError::Overflow { value: n, width });
    }
    Ok(n.to_le_bytes()[..width].to_vec())
}

/// decode `width` little-endian bytes into a u64, returning the remainder.
pub fn decode_fixed_le(bytes: &[u8], width: usize) -> Result<(u64, &[u8])> {
    assert!(width >= 1 && width <= 8, "fixed width must be 1..=8");
    let (head, rest) = take(bytes, width)?;
    let mut buf = [0u8; 8];
    buf[..width].copy_from_slice(head);
    Ok((u64::from_le_bytes(buf), rest))
}

/// split off the first `n` bytes or fail.
pub fn take(bytes: &[u8], n: usize) -> Result<(&[u8], &[u8])> {
    if bytes.len() < n {
        return Err(CodecError::InsufficientBytes {
            needed: n,
            have: bytes.len(),
        });
    }
    Ok(bytes.split_at(n))
}

/// length-prefixed sequence: natural(len) followed by each encoded item.
pub fn encode_sequence<T, F>(items: &[T], mut enc: F) -> Result<Vec<u8>>
where
    F: FnMut(&T) -> Result<Vec<u8>>,
{
    let mut out = encode_natural(items.len() as u64);
    for item in items {
        out.extend_from_slice(&enc(item)?);
    }
    Ok(out)
}

/// optional: 0x00 for none, 0x01 followed by the encoded value for some.
pub fn encode_maybe<T, F>(value: Option<&T>, mut enc: F) -> Result<Vec<u8>>
where
    F: FnMut(&T) -> Result<Vec<u8>>,
{
    match value {
        None => Ok(vec![0x00]),
        Some(v) => {
            let mut out = vec![0x01];
            out.extend_from_slice(&enc(v)?);
            Ok(out)
        }
    }
}

/// decode a length-prefixed sequence with a per-item decoder that returns
/// the item and the remaining bytes
pub fn decode_sequence<'a, T, F>(bytes: &'a [u8], mut dec: F) -> Result<(Vec<T>, &'a [u8])>
where
    F: FnMut(&'a [u8]) -> Result<(T, &'a [u8])>,
{
    let (len, mut rest) = decode_natural(bytes)?;
    let mut items = Vec::with_capacity(len.min(1024) as usize);
    for _ in 0..len {
        let (item, tail) = dec(rest)?;
        items.push(item);
        rest = tail;
    }
    Ok((items, rest))
}

/// decode an optional with a one-byte discriminator
pub fn decode_maybe<'a, T, F>(bytes: &'a [u8], mut dec: F) -> Result<(Option<T>, &'a [u8])>
where
    F: FnMut(&'a [u8]) -> Result<(T, &'a [u8])>,
{
    let (head, rest) = take(bytes, 1)?;
    match head[0] {
        0x00 => Ok((None, rest)),
        0x01 => {
            let (value, rest) = dec(rest)?;
            Ok((Some(value), rest))
        }
        other => Err(CodecError::InvalidDiscriminator(other)),
    }
}

/// dictionary: pairs sorted lexicographically by key bytes, length-prefixed.
/// callers are responsible for fixed-width keys where the format demands it.
pub fn encode_dictionary(pairs: &[(Vec<u8>, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut sorted: Vec<&(Vec<u8>, Vec<u8>)> = pairs.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    let mut out = encode_natural(pairs.len() as u64);
    for (key, value) in sorted {
        out.extend_from_slice(key);
        out.extend_from_slice(value);
    }
    Ok(out)
}
