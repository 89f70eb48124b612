//! Command Dispatcher
//!
//! Runs parsed commands against the engine under the transaction gate.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::Result;
use crate::gate::TransactionGate;
use crate::monitor::{DiskUsage, FsDiskUsage, MemoryMonitor};

use super::{Command, Response};

/// Routes command lines to the engine and the monitors
///
/// Shared by every connection (and the shell). Cloning is cheap.
#[derive(Clone)]
pub struct Dispatcher {
    gate: Arc<TransactionGate<Engine>>,
    memory: Arc<dyn MemoryMonitor>,
    disk: Arc<dyn DiskUsage>,
    data_path: PathBuf,
    index_path: PathBuf,
}

impl Dispatcher {
    /// Create a dispatcher over a gated engine
    ///
    /// `DISK` reports the sizes of the files named in `config`.
    pub fn new(
        gate: Arc<TransactionGate<Engine>>,
        config: &Config,
        memory: Arc<dyn MemoryMonitor>,
    ) -> Self {
        Self {
            gate,
            memory,
            disk: Arc::new(FsDiskUsage),
            data_path: config.data_path.clone(),
            index_path: config.index_path.clone(),
        }
    }

    /// Replace the disk usage source
    pub fn with_disk_usage(mut self, disk: Arc<dyn DiskUsage>) -> Self {
        self.disk = disk;
        self
    }

    /// Parse and execute one line, rendering errors as responses
    pub fn execute_line(&self, line: &[u8]) -> Response {
        let response = Response::from_result(self.execute(line));
        tracing::trace!(status = ?response.status, "command executed");
        response
    }

    /// Parse and execute one line
    pub fn execute(&self, line: &[u8]) -> Result<Response> {
        let command = Command::parse(line)?;
        self.execute_command(command)
    }

    /// Execute a parsed command
    ///
    /// PUT, GET and DEL hold the gate for the whole engine call. MEM and DISK
    /// never touch the engine and never wait on the gate.
    pub fn execute_command(&self, command: Command) -> Result<Response> {
        match command {
            Command::Mem => Ok(Response::ok(format!(
                "Current memory usage: {} bytes",
                self.memory.current_bytes()
            ))),
            Command::Disk => {
                let total = self
                    .disk
                    .total(&[self.data_path.as_path(), self.index_path.as_path()])?;
                Ok(Response::ok(format!("DISK USAGE: {} bytes", total)))
            }
            Command::Put { key, value } => {
                self.in_transaction(|engine| engine.put(&key, &value))?;
                Ok(Response::ok("PUT SUCCESS"))
            }
            Command::Get { key } => {
                let value = self.in_transaction(|engine| engine.get(&key))?;
                Ok(Response::ok(value))
            }
            Command::Delete { key } => {
                self.in_transaction(|engine| engine.delete(&key))?;
                Ok(Response::ok("DEL SUCCESS"))
            }
        }
    }

    /// The gate this dispatcher serializes through
    pub fn gate(&self) -> &Arc<TransactionGate<Engine>> {
        &self.gate
    }

    /// Run `op` with the gate held, committing on success and rolling back
    /// on failure
    fn in_transaction<T>(&self, op: impl FnOnce(&mut Engine) -> Result<T>) -> Result<T> {
        let mut txn = self.gate.start_transaction();
        match op(&mut *txn) {
            Ok(value) => {
                txn.commit();
                Ok(value)
            }
            Err(e) => {
                txn.rollback();
                Err(e)
            }
        }
    }
}
