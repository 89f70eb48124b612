//! Record Module
//!
//! The unit of the data log: one immutable key-value pair.
//!
//! ## Responsibilities
//! - Encode a key-value pair into the on-disk layout
//! - Decode a record from any byte source
//! - Tell a clean end of log apart from a truncated record
//!
//! ## Record Format
//! ```text
//! ┌──────────────┬────────────────┬─────────┬───────────┐
//! │ KeyLen (4)   │ ValueLen (4)   │   Key   │   Value   │
//! └──────────────┴────────────────┴─────────┴───────────┘
//! ```
//! Lengths are little-endian `u32`. There is no header, magic or checksum;
//! records sit back to back from offset 0.

mod codec;

pub use codec::{decode, encode, encoded_len, HEADER_SIZE};

/// A single key-value record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl Record {
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Size of this record once encoded
    pub fn encoded_len(&self) -> u64 {
        encoded_len(self.key.len(), self.value.len())
    }
}
