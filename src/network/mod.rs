//! Network Module
//!
//! TCP/TLS server and client handling.
//!
//! ## Architecture
//! - Single acceptor loop (non-blocking accept with backoff)
//! - One thread per connection
//! - Auth line first, then one command line → one response line
//! - Commands routed through the shared `Dispatcher`
//!
//! ## Session
//! ```text
//! C: base64(user "\0" pass)\r\n
//! S: AUTH OK\r\n                 (or "Invalid authentication. Bye!\r\n" + close)
//! C: PUT->k->v\r\n
//! S: PUT SUCCESS\r\n
//! ```

mod auth;
mod client;
mod connection;
mod registry;
mod server;
pub mod tls;

pub use auth::{Credentials, AUTH_OK, AUTH_REJECTED};
pub use client::Client;
pub use connection::Connection;
pub use registry::{ConnectionRegistry, Registration};
pub use server::{Server, ShutdownHandle};
