//! self-delimiting natural-number varint
//!
//! a value below 2^7 is a single byte. otherwise the first byte carries `l`
//! leading one bits plus the high bits of the value, followed by `l` bytes
//! little-endian. values at or above 2^63 use the 0xff prefix and a full
//! 8-byte little-endian tail, so every natural fits in at most 9 bytes.

use crate::{take, CodecError, Result};

/// encode a natural number into its 1-9 byte varint form.
pub fn encode_natural(n: u64) -> Vec<u8> {
    if n == 0 {
        return vec![0x00];
    }
    for l in 0..8usize {
        if n < 1u64 << (7 * (l + 1)) {
            let prefix = (256u64 - (1u64 << (8 - l))) as u8;
            let high = (n >> (8 * l)) as u8;
            let mut out = Vec::with_capacity(l + 1);
            out.push(prefix + high);
            out.extend_from_slice(&n.to_le_bytes()[..l]);
            return out;
        }
    }
    let mut out = Vec::with_capacity(9);
    out.push(0xFF);
    out.extend_from_slice(&n.to_le_bytes());
    out
}

/// decode a varint natural, returning the value and the remaining bytes.
pub fn decode_natural(bytes: &[u8]) -> Result<(u64, &[u8])> {
    let (head, rest) = take(bytes, 1)?;
    let prefix = head[0];
    let l = prefix.leading_ones() as usize;
    if l == 0 {
        return Ok((prefix as u64, rest));
    }
    if l == 8 {
        let (tail, rest) = take(rest, 8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(tail);
        return Ok((u64::from_le_bytes(buf), rest));
    }
    let (tail, rest) = take(rest, l)?;
    let mut buf = [0u8; 8];
    buf[..l].copy_from_slice(tail);
    let low = u64::from_le_bytes(buf);
    let high = (prefix as u64) - (256 - (1u64 << (8 - l)));
    Ok(((high << (8 * l)) | low, rest))
}
