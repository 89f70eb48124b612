//! Data Log
//!
//! Append-only sequence of encoded records. Offsets into it are the durable
//! handles the index stores.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{ChromoError, Result};
use crate::record::{self, Record};

/// Append-only record log
///
/// Records are never rewritten. An update appends a new record and the
/// index is retargeted; the old bytes stay behind as unreachable garbage.
pub struct DataLog {
    /// Path of the log file
    path: PathBuf,
    /// Read/write handle
    file: File,
    /// Offset of the next append (always the current end of file)
    next_offset: u64,
}

impl DataLog {
    /// Open or create the data log
    ///
    /// `next_offset` is rehydrated from the current file length.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let next_offset = file.metadata()?.len();

        tracing::debug!(path = %path.display(), next_offset, "opened data log");

        Ok(Self {
            path: path.to_path_buf(),
            file,
            next_offset,
        })
    }

    /// Append an encoded record, returning the offset it starts at
    pub fn append(&mut self, record_bytes: &[u8]) -> Result<u64> {
        let offset = self.next_offset;

        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(record_bytes)?;

        self.next_offset = offset + record_bytes.len() as u64;
        Ok(offset)
    }

    /// Read the record starting at `offset`
    ///
    /// Any decode failure means the caller's offset does not point at a
    /// complete record and is reported as `CorruptRecord`.
    pub fn read_at(&mut self, offset: u64) -> Result<Record> {
        if offset >= self.next_offset {
            return Err(ChromoError::CorruptRecord {
                offset,
                reason: format!("offset is past the end of the log ({})", self.next_offset),
            });
        }

        self.file.seek(SeekFrom::Start(offset))?;
        let mut reader = BufReader::new(&mut self.file);

        match record::decode(&mut reader) {
            Ok(record) => Ok(record),
            Err(ChromoError::Io(e)) => Err(ChromoError::Io(e)),
            Err(e) => Err(ChromoError::CorruptRecord {
                offset,
                reason: e.to_string(),
            }),
        }
    }

    /// Iterate every record from the start of the log
    ///
    /// Includes superseded and deleted records; there is no way to tell them
    /// apart without the index.
    pub fn scan(&mut self) -> Result<DataLogIter<'_>> {
        self.file.seek(SeekFrom::Start(0))?;
        let end = self.next_offset;
        Ok(DataLogIter {
            reader: BufReader::new(&mut self.file),
            position: 0,
            end,
            done: false,
        })
    }

    /// Flush OS buffers to stable storage
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_data()?;
        Ok(())
    }

    /// Current size of the log in bytes
    pub fn len(&self) -> u64 {
        self.next_offset
    }

    pub fn is_empty(&self) -> bool {
        self.next_offset == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Iterator over `(offset, record)` pairs in log order
pub struct DataLogIter<'a> {
    reader: BufReader<&'a mut File>,
    position: u64,
    end: u64,
    done: bool,
}

impl Iterator for DataLogIter<'_> {
    type Item = Result<(u64, Record)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.position >= self.end {
            return None;
        }

        match record::decode(&mut self.reader) {
            Ok(record) => {
                let offset = self.position;
                self.position += record.encoded_len();
                Some(Ok((offset, record)))
            }
            Err(ChromoError::EndOfFile) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
