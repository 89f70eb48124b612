//! Protocol Module
//!
//! The text command grammar shared by the network server and the shell.
//!
//! ## Grammar
//! ```text
//! MEM                  → Current memory usage: <n> bytes
//! DISK                 → DISK USAGE: <n> bytes
//! PUT->key->value      → PUT SUCCESS
//! GET->key             → <value>
//! DEL->key             → DEL SUCCESS
//! ```
//! Verbs are case-insensitive. Fields are separated by `->` and trimmed;
//! there is no escaping. Every response is one line ending in CRLF; errors
//! are rendered as their message text.

mod command;
mod dispatcher;
mod response;

pub use command::{Command, CommandType, DELIMITER};
pub(crate) use command::trim;
pub use dispatcher::Dispatcher;
pub use response::{Response, Status, LINE_ENDING};
