use pindai::types::{
    error::DatabaseError,
    varint::{read_varint, varint_len, write_varint},
};

#[test]
fn test_single_byte_varint() {
    assert_eq!(read_varint(&[0x00]).unwrap(), (0, 1));
    assert_eq!(read_varint(&[0x7F]).unwrap(), (127, 1));
    // Trailing bytes are left alone
    assert_eq!(read_varint(&[0x05, 0xFF, 0xFF]).unwrap(), (5, 1));
}

#[test]
fn test_multi_byte_varint() {
    assert_eq!(read_varint(&[0x81, 0x00]).unwrap(), (128, 2));
    assert_eq!(read_varint(&[0xFF, 0x7F]).unwrap(), (16_383, 2));
    assert_eq!(read_varint(&[0x81, 0x80, 0x00]).unwrap(), (16_384, 3));
}

#[test]
fn test_ninth_byte_uses_all_eight_bits() {
    let bytes = [0xFF; 9];
    assert_eq!(read_varint(&bytes).unwrap(), (u64::MAX, 9));

    let mut bytes = [0x80; 9];
    bytes[8] = 0xFF;
    assert_eq!(read_varint(&bytes).unwrap(), (0xFF, 9));
}

#[test]
fn test_empty_input_is_malformed() {
    assert!(matches!(
        read_varint(&[]),
        Err(DatabaseError::MalformedVarint { .. })
    ));
}

#[test]
fn test_unterminated_input_is_malformed() {
    assert!(matches!(
        read_varint(&[0x80, 0x80]),
        Err(DatabaseError::MalformedVarint { .. })
    ));
    assert!(matches!(
        read_varint(&[0xFF; 8]),
        Err(DatabaseError::MalformedVarint { .. })
    ));
}

#[test]
fn test_encoding_is_minimal_and_decodes_back() {
    let cases: &[(u64, usize)] = &[
        (0, 1),
        (127, 1),
        (128, 2),
        (16_383, 2),
        (16_384, 3),
        (0x001F_FFFF, 3),
        (0x0FFF_FFFF, 4),
        (0x07_FFFF_FFFF, 5),
        (0xFF_FFFF_FFFF_FFFF, 8),
        (0x0100_0000_0000_0000, 9),
        (u64::MAX, 9),
    ];

    for &(value, expected_len) in cases {
        let mut buffer = Vec::new();
        let written = write_varint(&mut buffer, value);
        assert_eq!(written, expected_len, "length of {}", value);
        assert_eq!(varint_len(value), expected_len);
        assert_eq!(read_varint(&buffer).unwrap(), (value, expected_len));
    }
}

#[test]
fn test_negative_rowid_encodes_as_nine_bytes() {
    let mut buffer = Vec::new();
    write_varint(&mut buffer, -1i64 as u64);
    assert_eq!(buffer.len(), 9);
    let (value, _) = read_varint(&buffer).unwrap();
    assert_eq!(value as i64, -1);
}
