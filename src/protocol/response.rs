//! Response definitions
//!
//! Represents responses to clients.

use crate::error::{ChromoError, Result};

/// Line terminator for every response
pub const LINE_ENDING: &[u8] = b"\r\n";

/// Response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    NotFound,
    Error,
}

/// A response to send to a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Result bytes (value for GET, message otherwise)
    pub payload: Vec<u8>,
}

impl Response {
    /// Create an OK response
    pub fn ok(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            status: Status::Ok,
            payload: payload.into(),
        }
    }

    /// Create a NOT_FOUND response
    pub fn not_found() -> Self {
        Self {
            status: Status::NotFound,
            payload: ChromoError::KeyNotFound.to_string().into_bytes(),
        }
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Self {
            status: Status::Error,
            payload: message.as_bytes().to_vec(),
        }
    }

    /// Render a dispatcher result
    pub fn from_result(result: Result<Response>) -> Self {
        match result {
            Ok(response) => response,
            Err(ChromoError::KeyNotFound) => Response::not_found(),
            Err(e) => Response::error(&e.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    /// Payload followed by CRLF
    pub fn to_line(&self) -> Vec<u8> {
        let mut line = Vec::with_capacity(self.payload.len() + LINE_ENDING.len());
        line.extend_from_slice(&self.payload);
        line.extend_from_slice(LINE_ENDING);
        line
    }
}
