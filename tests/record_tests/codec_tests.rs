//! Record Codec Tests
//!
//! These tests verify:
//! - The exact on-disk layout
//! - Decoding back-to-back records from one stream
//! - Clean end of stream vs. truncated records

use std::io::Cursor;

use chromodb::error::ChromoError;
use chromodb::record::{decode, encode, encoded_len, Record, HEADER_SIZE};

// =============================================================================
// Encoding Tests
// =============================================================================

#[test]
fn test_encode_layout() {
    let bytes = encode(b"name", b"alex").unwrap();

    assert_eq!(bytes.len(), HEADER_SIZE + 8);
    assert_eq!(&bytes[0..4], &4u32.to_le_bytes());
    assert_eq!(&bytes[4..8], &4u32.to_le_bytes());
    assert_eq!(&bytes[8..12], b"name");
    assert_eq!(&bytes[12..16], b"alex");
}

#[test]
fn test_encode_empty_key_and_value() {
    let bytes = encode(b"", b"").unwrap();

    assert_eq!(bytes.as_ref(), &[0u8; HEADER_SIZE]);
    assert_eq!(encoded_len(0, 0), HEADER_SIZE as u64);
}

#[test]
fn test_record_encoded_len_matches_encode() {
    let record = Record::new("key", vec![7u8; 300]);
    let bytes = encode(&record.key, &record.value).unwrap();

    assert_eq!(record.encoded_len(), bytes.len() as u64);
}

// =============================================================================
// Decoding Tests
// =============================================================================

#[test]
fn test_decode_single_record() {
    let bytes = encode(b"k", b"value with spaces").unwrap();
    let mut cursor = Cursor::new(bytes.to_vec());

    let record = decode(&mut cursor).unwrap();

    assert_eq!(record, Record::new("k", "value with spaces"));
}

#[test]
fn test_decode_back_to_back_records() {
    let mut stream = Vec::new();
    stream.extend_from_slice(&encode(b"a", b"1").unwrap());
    stream.extend_from_slice(&encode(b"bb", b"").unwrap());
    stream.extend_from_slice(&encode(b"ccc", b"333").unwrap());
    let mut cursor = Cursor::new(stream);

    assert_eq!(decode(&mut cursor).unwrap(), Record::new("a", "1"));
    assert_eq!(decode(&mut cursor).unwrap(), Record::new("bb", ""));
    assert_eq!(decode(&mut cursor).unwrap(), Record::new("ccc", "333"));
    assert!(matches!(decode(&mut cursor), Err(ChromoError::EndOfFile)));
}

#[test]
fn test_decode_binary_payload() {
    let value: Vec<u8> = (0..=255u8).collect();
    let bytes = encode(b"\x00\xff", &value).unwrap();
    let mut cursor = Cursor::new(bytes.to_vec());

    let record = decode(&mut cursor).unwrap();

    assert_eq!(record.key, b"\x00\xff");
    assert_eq!(record.value, value);
}

// =============================================================================
// End of Stream / Truncation Tests
// =============================================================================

#[test]
fn test_decode_empty_stream_is_end_of_file() {
    let mut cursor = Cursor::new(Vec::<u8>::new());

    assert!(matches!(decode(&mut cursor), Err(ChromoError::EndOfFile)));
}

#[test]
fn test_decode_truncated_body() {
    let bytes = encode(b"key", b"value").unwrap();
    let cut = bytes.len() - 2;
    let mut cursor = Cursor::new(bytes[..cut].to_vec());

    match decode(&mut cursor) {
        Err(ChromoError::Truncated { expected, found }) => {
            assert_eq!(expected, 8);
            assert_eq!(found, 6);
        }
        other => panic!("Expected Truncated, got {:?}", other),
    }
}

#[test]
fn test_decode_header_only_is_truncated() {
    let bytes = encode(b"key", b"value").unwrap();
    let mut cursor = Cursor::new(bytes[..HEADER_SIZE].to_vec());

    assert!(matches!(
        decode(&mut cursor),
        Err(ChromoError::Truncated { .. })
    ));
}
