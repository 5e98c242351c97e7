//! Record format: a header of serial-type varints followed by a body holding
//! each field's bytes in the same order.
//!
//! ```text
//! ┌────────────┬──────────┬─────┬──────────┬─────────┬─────┬─────────┐
//! │ header len │ serial 0 │ ... │ serial N │ field 0 │ ... │ field N │
//! └────────────┴──────────┴─────┴──────────┴─────────┴─────┴─────────┘
//!  <──────────────── header ────────────────><──────── body ─────────>
//! ```

use crate::types::{
    error::DatabaseError,
    serial_type::SerialType,
    value::Value,
    varint::{read_varint, varint_len, write_varint},
};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordHeader {
    pub header_size: usize,
    pub serial_types: Vec<SerialType>,
}

impl RecordHeader {
    /// Parse the serial-type stream. `bytes` must be exactly the header,
    /// including its leading size varint.
    pub fn parse(bytes: &[u8]) -> Result<Self, DatabaseError> {
        let (declared, mut cursor) = read_varint(bytes)?;
        if declared != bytes.len() as u64 {
            return Err(DatabaseError::TruncatedRecord {
                reason: format!(
                    "header declares {} bytes but {} were supplied",
                    declared,
                    bytes.len()
                ),
            });
        }

        let mut serial_types = Vec::new();
        while cursor < bytes.len() {
            let (code, consumed) = read_varint(&bytes[cursor..])?;
            serial_types.push(SerialType::from_u64(code)?);
            cursor += consumed;
        }

        Ok(Self {
            header_size: bytes.len(),
            serial_types,
        })
    }

    /// Total body length implied by the serial types.
    pub fn body_size(&self) -> usize {
        self.serial_types.iter().map(SerialType::size).sum()
    }
}

/// Decode a record's fields in header order.
pub fn decode_record(header: &[u8], body: &[u8]) -> Result<Vec<Value>, DatabaseError> {
    let header = RecordHeader::parse(header)?;
    let mut values = Vec::with_capacity(header.serial_types.len());
    let mut cursor = 0;

    for serial_type in &header.serial_types {
        let width = serial_type.size();
        let field = body
            .get(cursor..cursor + width)
            .ok_or_else(|| DatabaseError::TruncatedRecord {
                reason: format!(
                    "field of {} bytes at body offset {} overruns a {} byte body",
                    width,
                    cursor,
                    body.len()
                ),
            })?;
        values.push(decode_field(*serial_type, field));
        cursor += width;
    }

    if cursor != body.len() {
        return Err(DatabaseError::PayloadNotConsumed {
            consumed: cursor,
            declared: body.len(),
        });
    }

    Ok(values)
}

fn decode_field(serial_type: SerialType, field: &[u8]) -> Value {
    match serial_type {
        SerialType::Null => Value::Null,
        SerialType::Int8
        | SerialType::Int16
        | SerialType::Int24
        | SerialType::Int32
        | SerialType::Int48
        | SerialType::Int64 => Value::Integer(read_signed_be(field)),
        SerialType::Float64 => {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(field);
            Value::Real(f64::from_be_bytes(raw))
        }
        SerialType::Zero => Value::Integer(0),
        SerialType::One => Value::Integer(1),
        SerialType::Blob(_) => Value::Blob(field.to_vec()),
        SerialType::Text(_) => Value::Text(String::from_utf8_lossy(field).into_owned()),
    }
}

/// Sign-extend a big-endian two's complement integer of 1 to 8 bytes.
fn read_signed_be(field: &[u8]) -> i64 {
    let fill = if field.first().is_some_and(|b| b & 0x80 != 0) {
        0xFF
    } else {
        0x00
    };
    let mut raw = [fill; 8];
    raw[8 - field.len()..].copy_from_slice(field);
    i64::from_be_bytes(raw)
}

/// Encode `values` as a complete record payload (header followed by body).
pub fn encode_record(values: &[Value]) -> Vec<u8> {
    let mut serial_bytes = Vec::new();
    let mut body = Vec::new();

    for value in values {
        let serial_type = match value {
            Value::Null => SerialType::Null,
            Value::Integer(i) => SerialType::for_integer(*i),
            Value::Real(_) => SerialType::Float64,
            Value::Text(s) => SerialType::Text(s.len()),
            Value::Blob(b) => SerialType::Blob(b.len()),
        };
        write_varint(&mut serial_bytes, serial_type.as_u64());

        match value {
            Value::Integer(i) => {
                let width = serial_type.size();
                body.extend_from_slice(&i.to_be_bytes()[8 - width..]);
            }
            Value::Real(r) => body.extend_from_slice(&r.to_be_bytes()),
            Value::Text(s) => body.extend_from_slice(s.as_bytes()),
            Value::Blob(b) => body.extend_from_slice(b),
            Value::Null => {}
        }
    }

    // The size prefix counts itself, so its own width can push it over a boundary
    let mut header_size = serial_bytes.len() + 1;
    while varint_len(header_size as u64) + serial_bytes.len() != header_size {
        header_size = varint_len(header_size as u64) + serial_bytes.len();
    }

    let mut payload = Vec::with_capacity(header_size + body.len());
    write_varint(&mut payload, header_size as u64);
    payload.extend_from_slice(&serial_bytes);
    payload.extend_from_slice(&body);
    payload
}
