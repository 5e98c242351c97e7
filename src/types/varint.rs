use crate::types::{MAX_VARINT_LEN, error::DatabaseError};

/// Read a big-endian varint, returning `(value, bytes_consumed)`.
///
/// Each of the first eight bytes carries 7 bits and uses its high bit as a
/// continuation flag. A ninth byte, if reached, contributes all 8 bits.
pub fn read_varint(buf: &[u8]) -> Result<(u64, usize), DatabaseError> {
    if buf.is_empty() {
        return Err(DatabaseError::MalformedVarint {
            reason: "empty input".to_string(),
        });
    }

    let mut value: u64 = 0;
    for (i, &byte) in buf.iter().enumerate().take(MAX_VARINT_LEN - 1) {
        value = (value << 7) | u64::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }

    match buf.get(MAX_VARINT_LEN - 1) {
        Some(&last) => Ok(((value << 8) | u64::from(last), MAX_VARINT_LEN)),
        None => Err(DatabaseError::MalformedVarint {
            reason: format!("input ended after {} bytes without a terminating byte", buf.len()),
        }),
    }
}

/// Number of bytes the minimal encoding of `value` occupies.
pub const fn varint_len(value: u64) -> usize {
    if value <= 0x7F {
        1
    } else if value <= 0x3FFF {
        2
    } else if value <= 0x001F_FFFF {
        3
    } else if value <= 0x0FFF_FFFF {
        4
    } else if value <= 0x07_FFFF_FFFF {
        5
    } else if value <= 0x03FF_FFFF_FFFF {
        6
    } else if value <= 0x01_FFFF_FFFF_FFFF {
        7
    } else if value <= 0xFF_FFFF_FFFF_FFFF {
        8
    } else {
        9
    }
}

/// Append the minimal varint encoding of `value` to `buffer`.
pub fn write_varint(buffer: &mut Vec<u8>, value: u64) -> usize {
    let len = varint_len(value);
    let mut encoded = [0u8; MAX_VARINT_LEN];

    if len == MAX_VARINT_LEN {
        encoded[8] = value as u8;
        let mut rest = value >> 8;
        for slot in encoded[..8].iter_mut().rev() {
            *slot = (rest as u8 & 0x7F) | 0x80;
            rest >>= 7;
        }
    } else {
        let mut rest = value;
        for i in (0..len).rev() {
            let continuation = if i == len - 1 { 0 } else { 0x80 };
            encoded[i] = (rest as u8 & 0x7F) | continuation;
            rest >>= 7;
        }
    }

    buffer.extend_from_slice(&encoded[..len]);
    len
}
