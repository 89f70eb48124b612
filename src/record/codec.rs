//! Record codec
//!
//! Encoding and decoding of single records. No I/O beyond a byte sink/source.

use std::io::{ErrorKind, Read};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::Record;
use crate::error::{ChromoError, Result};

/// Header size: key_len (4) + value_len (4)
pub const HEADER_SIZE: usize = 8;

/// Size of a record with the given key and value lengths
pub fn encoded_len(key_len: usize, value_len: usize) -> u64 {
    HEADER_SIZE as u64 + key_len as u64 + value_len as u64
}

/// Encode a key-value pair
///
/// Format: key_len (4) + value_len (4) + key + value
pub fn encode(key: &[u8], value: &[u8]) -> Result<Bytes> {
    let key_len = length_field(key.len(), "key")?;
    let value_len = length_field(value.len(), "value")?;

    let mut buf = BytesMut::with_capacity(HEADER_SIZE + key.len() + value.len());
    buf.put_u32_le(key_len);
    buf.put_u32_le(value_len);
    buf.put_slice(key);
    buf.put_slice(value);

    Ok(buf.freeze())
}

/// Decode one record from a reader
///
/// Returns `EndOfFile` if the reader is exhausted before the first header
/// byte, `Truncated` if it ends anywhere after that.
pub fn decode<R: Read>(reader: &mut R) -> Result<Record> {
    let mut header = [0u8; HEADER_SIZE];
    let read = read_fully(reader, &mut header)?;
    if read == 0 {
        return Err(ChromoError::EndOfFile);
    }
    if read < HEADER_SIZE {
        return Err(ChromoError::Truncated {
            expected: HEADER_SIZE as u64,
            found: read as u64,
        });
    }

    let mut cursor = &header[..];
    let key_len = cursor.get_u32_le() as usize;
    let value_len = cursor.get_u32_le() as usize;

    let body_len = key_len as u64 + value_len as u64;
    let mut body = Vec::new();
    let found = reader.by_ref().take(body_len).read_to_end(&mut body)? as u64;
    if found < body_len {
        return Err(ChromoError::Truncated {
            expected: body_len,
            found,
        });
    }

    let value = body.split_off(key_len);
    Ok(Record { key: body, value })
}

fn length_field(len: usize, what: &str) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        ChromoError::InvalidInput(format!(
            "{} of {} bytes exceeds the 32-bit length field",
            what, len
        ))
    })
}

/// Like `read_exact`, but reports how many bytes were read before EOF
fn read_fully<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
