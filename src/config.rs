//! Configuration for ChromoDB
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{ChromoError, Result};
use crate::network::Credentials;

/// Main configuration for a ChromoDB instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Append-only record log
    pub data_path: PathBuf,

    /// Sorted key → offset index
    pub index_path: PathBuf,

    /// How often both files are fsynced
    pub sync_strategy: SyncStrategy,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Username/password every remote client must present
    pub credentials: Option<Credentials>,

    /// Upgrade every accepted connection to TLS when set
    pub tls: Option<TlsConfig>,

    // -------------------------------------------------------------------------
    // Resource Configuration
    // -------------------------------------------------------------------------
    /// Resident memory ceiling in bytes; exceeding it terminates the process
    pub memory_limit: u64,

    /// How often resident memory is sampled (milliseconds)
    pub memory_poll_interval_ms: u64,
}

/// Sync strategy: how often to fsync the data log and index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// fsync after every mutation (safest, slowest)
    EveryWrite,

    /// fsync after N mutations (balanced durability/performance)
    EveryNWrites { count: usize },
}

impl Default for SyncStrategy {
    fn default() -> Self {
        SyncStrategy::EveryNWrites { count: 100 }
    }
}

/// PEM locations for the TLS listener
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// How the process serves commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Local line shell on stdin, no authentication
    Shell,

    /// TCP/TLS listener with authentication
    Network,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("chromo.db"),
            index_path: PathBuf::from("chromo.idx"),
            sync_strategy: SyncStrategy::default(),
            listen_addr: "0.0.0.0:7676".to_string(),
            max_connections: 1024,
            credentials: None,
            tls: None,
            memory_limit: 750 * 1024 * 1024, // 750 MB
            memory_poll_interval_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that the configuration is usable for the given mode
    ///
    /// Network mode needs non-empty credentials; TLS needs both PEM paths.
    pub fn validate(&self, mode: RunMode) -> Result<()> {
        if mode == RunMode::Network {
            match &self.credentials {
                Some(creds) if !creds.username.is_empty() && !creds.password.is_empty() => {}
                _ => {
                    return Err(ChromoError::Config(
                        "username and password are required when the database is networked"
                            .to_string(),
                    ))
                }
            }

            if let Some(tls) = &self.tls {
                if tls.cert_path.as_os_str().is_empty() || tls.key_path.as_os_str().is_empty() {
                    return Err(ChromoError::Config(
                        "TLS requires both a certificate (--cert) and a key (--key)".to_string(),
                    ));
                }
            }
        }

        if self.max_connections == 0 {
            return Err(ChromoError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }

        if let SyncStrategy::EveryNWrites { count: 0 } = self.sync_strategy {
            return Err(ChromoError::Config(
                "sync interval must be at least 1 write".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data log path
    pub fn data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_path = path.into();
        self
    }

    /// Set the index file path
    pub fn index_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.index_path = path.into();
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the credentials remote clients must present
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.credentials = Some(Credentials::new(username, password));
        self
    }

    /// Enable TLS with the given certificate and key
    pub fn tls(mut self, cert_path: impl Into<PathBuf>, key_path: impl Into<PathBuf>) -> Self {
        self.config.tls = Some(TlsConfig {
            cert_path: cert_path.into(),
            key_path: key_path.into(),
        });
        self
    }

    /// Set the memory limit (in bytes)
    pub fn memory_limit(mut self, bytes: u64) -> Self {
        self.config.memory_limit = bytes;
        self
    }

    /// Set the memory sampling interval (in milliseconds)
    pub fn memory_poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.memory_poll_interval_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
