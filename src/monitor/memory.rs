//! Process memory sampling and limit enforcement

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use sysinfo::{Pid, System};

use super::MemoryMonitor;
use crate::error::{ChromoError, Result};

/// Samples this process's resident memory
///
/// `current_bytes` returns the most recent sample; the background thread
/// started by [`spawn`](Self::spawn) refreshes it on an interval.
pub struct ProcessMemoryMonitor {
    pid: Pid,
    system: Mutex<System>,
    current: AtomicU64,
    /// Ceiling in bytes; 0 disables enforcement
    limit: u64,
}

impl ProcessMemoryMonitor {
    /// Create a monitor and take a first sample
    pub fn new(limit: u64) -> Result<Self> {
        let pid = sysinfo::get_current_pid()
            .map_err(|e| ChromoError::Config(format!("cannot determine current pid: {}", e)))?;

        let monitor = Self {
            pid,
            system: Mutex::new(System::new()),
            current: AtomicU64::new(0),
            limit,
        };
        monitor.sample();
        Ok(monitor)
    }

    /// Refresh and return resident memory in bytes
    pub fn sample(&self) -> u64 {
        let mut system = self.system.lock();
        system.refresh_process(self.pid);
        let bytes = system
            .process(self.pid)
            .map(|process| process.memory())
            .unwrap_or(0);

        self.current.store(bytes, Ordering::Relaxed);
        bytes
    }

    /// Sample once and compare against the limit
    pub fn check(&self) -> Result<u64> {
        let usage = self.sample();
        check_limit(usage, self.limit)?;
        Ok(usage)
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Start the polling thread
    ///
    /// A breach is fatal to the whole process: it is logged and the process
    /// exits with status 1.
    pub fn spawn(self: &Arc<Self>, interval: Duration) -> Result<thread::JoinHandle<()>> {
        let monitor = Arc::clone(self);

        let handle = thread::Builder::new()
            .name("memory-monitor".to_string())
            .spawn(move || loop {
                thread::sleep(interval);
                match monitor.check() {
                    Ok(usage) => tracing::trace!(usage, "memory sample"),
                    Err(e) => {
                        tracing::error!("{}. Exiting...", e);
                        std::process::exit(1);
                    }
                }
            })?;

        Ok(handle)
    }
}

impl MemoryMonitor for ProcessMemoryMonitor {
    fn current_bytes(&self) -> u64 {
        self.current.load(Ordering::Relaxed)
    }
}

/// Fail if `usage` exceeds a non-zero `limit`
pub fn check_limit(usage: u64, limit: u64) -> Result<()> {
    if limit > 0 && usage > limit {
        return Err(ChromoError::MemoryLimitExceeded { usage, limit });
    }
    Ok(())
}
