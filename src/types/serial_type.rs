use serde::{Deserialize, Serialize};

use crate::types::error::DatabaseError;

/// Storage class tag preceding each field of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SerialType {
    Null,
    Int8,
    Int16,
    Int24,
    Int32,
    Int48,
    Int64,
    Float64,
    Zero,
    One,
    Blob(usize),
    Text(usize),
}

impl SerialType {
    pub fn from_u64(code: u64) -> Result<Self, DatabaseError> {
        match code {
            0 => Ok(SerialType::Null),
            1 => Ok(SerialType::Int8),
            2 => Ok(SerialType::Int16),
            3 => Ok(SerialType::Int24),
            4 => Ok(SerialType::Int32),
            5 => Ok(SerialType::Int48),
            6 => Ok(SerialType::Int64),
            7 => Ok(SerialType::Float64),
            8 => Ok(SerialType::Zero),
            9 => Ok(SerialType::One),
            // 10 and 11 are reserved for internal use and never appear in table rows
            10 | 11 => Err(DatabaseError::UnsupportedSerialType(code)),
            n if n % 2 == 0 => Ok(SerialType::Blob(Self::length(n, 12)?)),
            n => Ok(SerialType::Text(Self::length(n, 13)?)),
        }
    }

    fn length(code: u64, base: u64) -> Result<usize, DatabaseError> {
        usize::try_from((code - base) / 2).map_err(|_| DatabaseError::UnsupportedSerialType(code))
    }

    pub fn as_u64(&self) -> u64 {
        match self {
            SerialType::Null => 0,
            SerialType::Int8 => 1,
            SerialType::Int16 => 2,
            SerialType::Int24 => 3,
            SerialType::Int32 => 4,
            SerialType::Int48 => 5,
            SerialType::Int64 => 6,
            SerialType::Float64 => 7,
            SerialType::Zero => 8,
            SerialType::One => 9,
            SerialType::Blob(len) => *len as u64 * 2 + 12,
            SerialType::Text(len) => *len as u64 * 2 + 13,
        }
    }

    /// Number of body bytes the field occupies.
    pub fn size(&self) -> usize {
        match self {
            SerialType::Null | SerialType::Zero | SerialType::One => 0,
            SerialType::Int8 => 1,
            SerialType::Int16 => 2,
            SerialType::Int24 => 3,
            SerialType::Int32 => 4,
            SerialType::Int48 => 6,
            SerialType::Int64 | SerialType::Float64 => 8,
            SerialType::Blob(len) | SerialType::Text(len) => *len,
        }
    }

    /// Smallest integer serial type able to hold `value`.
    pub fn for_integer(value: i64) -> Self {
        match value {
            0 => SerialType::Zero,
            1 => SerialType::One,
            v if (-128..=127).contains(&v) => SerialType::Int8,
            v if (-32_768..=32_767).contains(&v) => SerialType::Int16,
            v if (-8_388_608..=8_388_607).contains(&v) => SerialType::Int24,
            v if (i32::MIN as i64..=i32::MAX as i64).contains(&v) => SerialType::Int32,
            v if (-(1i64 << 47)..(1i64 << 47)).contains(&v) => SerialType::Int48,
            _ => SerialType::Int64,
        }
    }
}
