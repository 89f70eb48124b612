//! Index
//!
//! Ordered mapping from key to the data log offset of its latest record.
//!
//! The authoritative copy lives in memory (`BTreeMap`) and is rehydrated
//! from the index file on open. Every mutation is applied to the file first,
//! using the entry's exact byte span, and only then to the in-memory table,
//! so the file is always a complete, sorted snapshot.
//!
//! ## Entry Format
//! ```text
//! ┌──────────────┬─────────┬──────────────┐
//! │ KeyLen (4)   │   Key   │  Offset (8)  │
//! └──────────────┴─────────┴──────────────┘
//! ```
//! `KeyLen` is a little-endian `u32`, `Offset` a little-endian `i64`.
//! Entries are variable width; positions are always derived from each
//! entry's own key length.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::ops::Bound;
use std::path::{Path, PathBuf};

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{ChromoError, Result};

/// Size of the key length prefix
const KEY_LEN_SIZE: u64 = 4;

/// Size of the offset field
const OFFSET_SIZE: u64 = 8;

/// On-disk size of an entry with a key of `key_len` bytes
pub fn entry_size(key_len: usize) -> u64 {
    KEY_LEN_SIZE + key_len as u64 + OFFSET_SIZE
}

/// Sorted key → offset index backed by a flat file
pub struct Index {
    /// Path of the index file
    path: PathBuf,
    /// Read/write handle
    file: File,
    /// In-memory table, sorted by key bytes
    entries: BTreeMap<Vec<u8>, u64>,
    /// Current length of the index file
    file_len: u64,
}

impl Index {
    /// Open or create an index file and load every entry
    pub fn open(path: &Path) -> Result<Self> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let mut data = Vec::new();
        file.read_to_end(&mut data)?;

        let entries = Self::decode_entries(&data)?;

        tracing::debug!(
            path = %path.display(),
            entries = entries.len(),
            bytes = data.len(),
            "loaded index"
        );

        Ok(Self {
            path: path.to_path_buf(),
            file,
            entries,
            file_len: data.len() as u64,
        })
    }

    /// Look up the offset of `key`
    pub fn find(&self, key: &[u8]) -> Option<u64> {
        self.entries.get(key).copied()
    }

    /// Insert a new entry, or retarget an existing one
    ///
    /// New keys shift every following entry one entry-size later in the
    /// file, then the new entry is written at its sorted position.
    pub fn insert(&mut self, key: &[u8], offset: u64) -> Result<()> {
        if self.entries.contains_key(key) {
            return self.update(key, offset);
        }

        let position = self.position_of(key);
        let offset_field = Self::offset_field(offset)?;

        let mut buf = BytesMut::new();
        Self::encode_entry(&mut buf, key, offset_field)?;
        for (k, off) in self.successors(key) {
            Self::encode_entry(&mut buf, k, *off as i64)?;
        }

        self.file.seek(SeekFrom::Start(position))?;
        self.file.write_all(&buf)?;

        self.file_len += entry_size(key.len());
        self.entries.insert(key.to_vec(), offset);
        Ok(())
    }

    /// Overwrite the offset of an existing entry in place
    ///
    /// Only the 8-byte offset field changes, so the entry keeps its size and
    /// no other entry moves.
    pub fn update(&mut self, key: &[u8], offset: u64) -> Result<()> {
        if !self.entries.contains_key(key) {
            return Err(ChromoError::KeyNotFound);
        }

        let position = self.position_of(key) + KEY_LEN_SIZE + key.len() as u64;
        let offset_field = Self::offset_field(offset)?;

        self.file.seek(SeekFrom::Start(position))?;
        self.file.write_all(&offset_field.to_le_bytes())?;

        self.entries.insert(key.to_vec(), offset);
        Ok(())
    }

    /// Remove an entry, returning its offset if it existed
    ///
    /// Every following entry shifts one entry-size earlier and the file is
    /// truncated by that size.
    pub fn remove(&mut self, key: &[u8]) -> Result<Option<u64>> {
        if !self.entries.contains_key(key) {
            return Ok(None);
        }

        let position = self.position_of(key);

        let mut buf = BytesMut::new();
        for (k, off) in self.successors(key) {
            Self::encode_entry(&mut buf, k, *off as i64)?;
        }

        let new_len = self.file_len - entry_size(key.len());
        self.file.seek(SeekFrom::Start(position))?;
        self.file.write_all(&buf)?;
        self.file.set_len(new_len)?;

        self.file_len = new_len;
        Ok(self.entries.remove(key))
    }

    /// Iterate entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], u64)> + '_ {
        self.entries.iter().map(|(k, off)| (k.as_slice(), *off))
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current length of the index file in bytes
    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush OS buffers to stable storage
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_data()?;
        Ok(())
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Byte position where `key`'s entry starts (or would start)
    fn position_of(&self, key: &[u8]) -> u64 {
        self.entries
            .range::<[u8], _>((Bound::Unbounded, Bound::Excluded(key)))
            .map(|(k, _)| entry_size(k.len()))
            .sum()
    }

    /// Entries strictly after `key`
    fn successors<'a>(
        &'a self,
        key: &'a [u8],
    ) -> impl Iterator<Item = (&'a Vec<u8>, &'a u64)> + 'a {
        self.entries
            .range::<[u8], _>((Bound::Excluded(key), Bound::Unbounded))
    }

    fn offset_field(offset: u64) -> Result<i64> {
        i64::try_from(offset).map_err(|_| {
            ChromoError::InvalidInput(format!("offset {} does not fit an index entry", offset))
        })
    }

    fn encode_entry(buf: &mut BytesMut, key: &[u8], offset: i64) -> Result<()> {
        let key_len = u32::try_from(key.len()).map_err(|_| {
            ChromoError::InvalidInput(format!(
                "key of {} bytes exceeds the 32-bit length field",
                key.len()
            ))
        })?;

        buf.reserve(entry_size(key.len()) as usize);
        buf.put_u32_le(key_len);
        buf.put_slice(key);
        buf.put_i64_le(offset);
        Ok(())
    }

    /// Parse a whole index file, checking order and uniqueness
    fn decode_entries(data: &[u8]) -> Result<BTreeMap<Vec<u8>, u64>> {
        let mut entries: BTreeMap<Vec<u8>, u64> = BTreeMap::new();
        let mut buf = data;

        while buf.has_remaining() {
            if (buf.remaining() as u64) < KEY_LEN_SIZE {
                return Err(ChromoError::Truncated {
                    expected: KEY_LEN_SIZE,
                    found: buf.remaining() as u64,
                });
            }
            let key_len = buf.get_u32_le() as usize;

            let needed = key_len as u64 + OFFSET_SIZE;
            if (buf.remaining() as u64) < needed {
                return Err(ChromoError::Truncated {
                    expected: needed,
                    found: buf.remaining() as u64,
                });
            }
            let key = buf[..key_len].to_vec();
            buf.advance(key_len);
            let offset = buf.get_i64_le();

            if offset < 0 {
                return Err(ChromoError::CorruptIndex(format!(
                    "negative offset {} for key {:?}",
                    offset,
                    String::from_utf8_lossy(&key)
                )));
            }

            if let Some((last, _)) = entries.last_key_value() {
                if key.as_slice() <= last.as_slice() {
                    return Err(ChromoError::CorruptIndex(format!(
                        "key {:?} is out of order or duplicated",
                        String::from_utf8_lossy(&key)
                    )));
                }
            }

            entries.insert(key, offset as u64);
        }

        Ok(entries)
    }
}
