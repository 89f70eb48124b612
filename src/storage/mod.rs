//! Storage Module
//!
//! The two cooperating files behind the engine.
//!
//! ## Responsibilities
//! - `DataLog`: append-only record log; offsets are durable record handles
//! - `Index`: sorted key → offset table, persisted entry by entry
//!
//! ## Files
//! ```text
//!   chromo.db   [rec 0][rec 1][rec 2 (garbage)][rec 3] ...   (append only)
//!                  ▲              ▲                 ▲
//!   chromo.idx  ["a"→0]      ["b"→off1]        ["c"→off3]     (sorted by key)
//! ```
//! Neither file has a header or magic number.

mod data_log;
mod index;

pub use data_log::{DataLog, DataLogIter};
pub use index::{entry_size, Index};
