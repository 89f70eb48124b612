//! # ChromoDB
//!
//! A disk-resident key-value store with:
//! - An append-only data log (records are never rewritten in place)
//! - A sorted key → offset index persisted entry by entry
//! - One process-wide transaction gate serializing all storage operations
//! - A line-oriented TCP protocol with authentication and optional TLS
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              TCP/TLS Server            Local Shell          │
//! │        (thread per connection)        (stdin, no auth)      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ one text line per command
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  Command Dispatcher                         │
//! │          MEM / DISK ──► monitors (no gate)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ PUT / GET / DEL
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  Transaction Gate                           │
//! │            (single exclusive lock, no undo)                 │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!                ┌──────▼──────┐
//!                │   Engine    │
//!                └──┬───────┬──┘
//!                   │       │
//!                   ▼       ▼
//!          ┌──────────┐   ┌─────────┐
//!          │ Data Log │   │  Index  │
//!          │ (append) │   │ (sorted)│
//!          └──────────┘   └─────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod storage;
pub mod engine;
pub mod gate;
pub mod monitor;
pub mod protocol;
pub mod network;
pub mod shell;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ChromoError, Result};
pub use config::Config;
pub use engine::Engine;
pub use gate::{Transaction, TransactionGate};
pub use protocol::Dispatcher;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of ChromoDB
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
