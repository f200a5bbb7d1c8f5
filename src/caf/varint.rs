// Packet table variable-length integers
//
// Values are split into 7-bit groups, most significant group first. Every byte
// but the last has its high bit set.

use crate::utils::io::ByteCursor;
use crate::{Error, Result};

/// Longest encoding of a u64
pub const MAX_VARINT_LEN: usize = 10;

/// Number of bytes `value` encodes to
pub fn encoded_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}

/// Append the encoding of `value` to `out`
pub fn encode(value: u64, out: &mut Vec<u8>) {
    let len = encoded_len(value);
    for i in (0..len).rev() {
        let group = ((value >> (7 * i)) & 0x7f) as u8;
        if i > 0 {
            out.push(group | 0x80);
        } else {
            out.push(group);
        }
    }
}

/// Decode one value from the cursor
pub fn decode(cursor: &mut ByteCursor<'_>) -> Result<u64> {
    let mut value: u64 = 0;
    for _ in 0..MAX_VARINT_LEN {
        let byte = cursor.read_u8()?;
        if value > (u64::MAX >> 7) {
            return Err(Error::MalformedChunk {
                chunk_type: super::CHUNK_PACKET_TABLE,
                reason: "packet size overflows 64 bits".to_string(),
            });
        }
        value = (value << 7) | u64::from(byte & 0x7f);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(Error::MalformedChunk {
        chunk_type: super::CHUNK_PACKET_TABLE,
        reason: format!("packet size longer than {} bytes", MAX_VARINT_LEN),
    })
}
