//! Connection authentication
//!
//! The first line a client sends is `base64(username + "\0" + password)`.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{ChromoError, Result};

/// Reply sent after a successful handshake
pub const AUTH_OK: &[u8] = b"AUTH OK\r\n";

/// Reply sent before closing an unauthenticated connection
pub const AUTH_REJECTED: &[u8] = b"Invalid authentication. Bye!\r\n";

/// Username/password pair
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// The auth line a client sends, without line terminator
    pub fn encode(&self) -> String {
        let mut raw = Vec::with_capacity(self.username.len() + 1 + self.password.len());
        raw.extend_from_slice(self.username.as_bytes());
        raw.push(0);
        raw.extend_from_slice(self.password.as_bytes());
        STANDARD.encode(raw)
    }

    /// Check a received auth line against these credentials
    ///
    /// Surrounding whitespace (including CR/LF) is ignored. Anything that is
    /// not valid base64, lacks the NUL separator, or does not match fails
    /// with `AuthFailed`.
    pub fn verify(&self, line: &[u8]) -> Result<()> {
        let text = std::str::from_utf8(line)
            .map_err(|_| ChromoError::AuthFailed)?
            .trim();

        let decoded = STANDARD
            .decode(text)
            .map_err(|_| ChromoError::AuthFailed)?;

        let split = decoded
            .iter()
            .position(|&b| b == 0)
            .ok_or(ChromoError::AuthFailed)?;
        let (username, password) = (&decoded[..split], &decoded[split + 1..]);

        if username != self.username.as_bytes() || password != self.password.as_bytes() {
            return Err(ChromoError::AuthFailed);
        }

        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}
