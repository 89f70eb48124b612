//! Engine Module
//!
//! The storage engine that composes the data log and the index.
//!
//! ## Responsibilities
//! - Own both file handles for the engine's lifetime
//! - Keep every index entry pointing at a complete record
//! - Apply the sync policy
//! - Release both files on close (or drop)

use std::fs;
use std::path::Path;

use crate::config::{Config, SyncStrategy};
use crate::error::{ChromoError, Result};
use crate::record;
use crate::storage::{DataLog, Index};

/// The main storage engine
///
/// ## Concurrency Model
///
/// The engine is **not** internally synchronized: every operation takes
/// `&mut self`. Callers that share it across threads wrap it in a
/// [`TransactionGate`](crate::gate::TransactionGate), which serializes the
/// whole store to one in-flight operation.
///
/// ## Write Ordering
///
/// `put` appends the record to the data log before touching the index, so a
/// crash between the two leaves the index pointing at the previous record
/// rather than at a half-written one.
pub struct Engine {
    state: EngineState,

    /// When to fsync both files
    sync_strategy: SyncStrategy,

    /// Mutations since the last sync
    unsynced_writes: usize,
}

enum EngineState {
    Open(Files),
    Closed,
}

struct Files {
    log: DataLog,
    index: Index,
}

impl Engine {
    /// Open or create an engine over the given data and index files
    pub fn open(data_path: impl AsRef<Path>, index_path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(data_path, index_path, SyncStrategy::default())
    }

    /// Open with the paths and sync policy from a config
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::open_with(&config.data_path, &config.index_path, config.sync_strategy)
    }

    /// Open with an explicit sync policy
    ///
    /// On startup:
    /// 1. Create parent directories if needed
    /// 2. Open/create the data log (next offset = file length)
    /// 3. Open/create the index and load it into memory
    pub fn open_with(
        data_path: impl AsRef<Path>,
        index_path: impl AsRef<Path>,
        sync_strategy: SyncStrategy,
    ) -> Result<Self> {
        let data_path = data_path.as_ref();
        let index_path = index_path.as_ref();

        for path in [data_path, index_path] {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
        }

        let log = DataLog::open(data_path)?;
        let index = Index::open(index_path)?;

        tracing::info!(
            data = %data_path.display(),
            index = %index_path.display(),
            keys = index.len(),
            log_bytes = log.len(),
            "engine opened"
        );

        Ok(Self {
            state: EngineState::Open(Files { log, index }),
            sync_strategy,
            unsynced_writes: 0,
        })
    }

    /// Store a value, replacing any previous value for the key
    ///
    /// Steps:
    /// 1. Encode the record (rejects oversized input before any I/O)
    /// 2. Append it to the data log
    /// 3. Install or retarget the index entry
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        let bytes = record::encode(key, value)?;

        let files = self.files_mut()?;
        let offset = files.log.append(&bytes)?;
        files.index.insert(key, offset)?;

        tracing::trace!(key_len = key.len(), value_len = value.len(), offset, "put");

        self.after_write()
    }

    /// Get the latest value for a key
    pub fn get(&mut self, key: &[u8]) -> Result<Vec<u8>> {
        let files = self.files_mut()?;

        let offset = files.index.find(key).ok_or(ChromoError::KeyNotFound)?;
        let record = files.log.read_at(offset)?;

        if record.key != key {
            return Err(ChromoError::CorruptRecord {
                offset,
                reason: "record key does not match index entry".to_string(),
            });
        }

        Ok(record.value)
    }

    /// Delete a key
    ///
    /// Only the index entry is removed; the record stays in the log.
    pub fn delete(&mut self, key: &[u8]) -> Result<()> {
        let files = self.files_mut()?;

        if files.index.remove(key)?.is_none() {
            return Err(ChromoError::KeyNotFound);
        }

        tracing::trace!(key_len = key.len(), "delete");

        self.after_write()
    }

    /// Close the engine
    ///
    /// Syncs and releases both files. Closing a closed engine is a no-op.
    pub fn close(&mut self) -> Result<()> {
        let state = std::mem::replace(&mut self.state, EngineState::Closed);

        if let EngineState::Open(mut files) = state {
            // Handles drop (and close) at the end of this block on every path.
            files.log.sync()?;
            files.index.sync()?;
            self.unsynced_writes = 0;

            tracing::info!(
                keys = files.index.len(),
                log_bytes = files.log.len(),
                "engine closed"
            );
        }

        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    pub fn is_open(&self) -> bool {
        matches!(self.state, EngineState::Open(_))
    }

    /// Number of live keys
    pub fn len(&self) -> Result<usize> {
        Ok(self.files()?.index.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.files()?.index.is_empty())
    }

    /// Live keys in index order
    pub fn keys(&self) -> Result<Vec<Vec<u8>>> {
        Ok(self
            .files()?
            .index
            .iter()
            .map(|(key, _)| key.to_vec())
            .collect())
    }

    /// Read-only view of the index
    pub fn index(&self) -> Result<&Index> {
        Ok(&self.files()?.index)
    }

    /// Mutable access to the data log (for auditing log contents)
    pub fn data_log(&mut self) -> Result<&mut DataLog> {
        Ok(&mut self.files_mut()?.log)
    }

    /// Size of the data log in bytes
    pub fn data_len(&self) -> Result<u64> {
        Ok(self.files()?.log.len())
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn files(&self) -> Result<&Files> {
        match &self.state {
            EngineState::Open(files) => Ok(files),
            EngineState::Closed => Err(ChromoError::EngineClosed),
        }
    }

    fn files_mut(&mut self) -> Result<&mut Files> {
        match &mut self.state {
            EngineState::Open(files) => Ok(files),
            EngineState::Closed => Err(ChromoError::EngineClosed),
        }
    }

    /// Count a mutation and sync if the policy says so
    fn after_write(&mut self) -> Result<()> {
        self.unsynced_writes += 1;

        let due = match self.sync_strategy {
            SyncStrategy::EveryWrite => true,
            SyncStrategy::EveryNWrites { count } => self.unsynced_writes >= count,
        };

        if due {
            let files = self.files_mut()?;
            files.log.sync()?;
            files.index.sync()?;
            self.unsynced_writes = 0;
        }

        Ok(())
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!("Failed to close engine cleanly: {}", e);
        }
    }
}
