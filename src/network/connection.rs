//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{self, BufRead, BufReader, Read, Write};

use crate::error::{ChromoError, Result};
use crate::protocol::{Dispatcher, Response};

use super::auth::{Credentials, AUTH_OK, AUTH_REJECTED};

/// Handles a single client connection
///
/// Generic over the transport so plain TCP and TLS streams share one code
/// path.
pub struct Connection<S: Read + Write> {
    /// Buffered stream; writes go through `get_mut`
    reader: BufReader<S>,

    /// Shared command dispatcher
    dispatcher: Dispatcher,

    /// Credentials the client must present
    credentials: Credentials,

    /// Peer address for logging
    peer_addr: String,
}

impl<S: Read + Write> Connection<S> {
    /// Create a new connection handler
    pub fn new(
        stream: S,
        dispatcher: Dispatcher,
        credentials: Credentials,
        peer_addr: impl Into<String>,
    ) -> Self {
        Self {
            reader: BufReader::new(stream),
            dispatcher,
            credentials,
            peer_addr: peer_addr.into(),
        }
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Authenticates, then reads command lines in a loop and sends one
    /// response line per command. Returns when the client disconnects.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        match self.authenticate() {
            Ok(true) => {}
            Ok(false) => return Ok(()),
            Err(e) => return self.finish(e),
        }

        loop {
            let line = match self.read_line() {
                Ok(Some(line)) => line,
                Ok(None) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Err(e) => return self.finish(e),
            };

            tracing::trace!(
                "Received command from {}: {:?}",
                self.peer_addr,
                String::from_utf8_lossy(&line)
            );

            let response = self.dispatcher.execute_line(&line);

            if let Err(e) = self.send_response(&response) {
                return self.finish(e);
            }
        }
    }

    /// Read and check the auth line
    ///
    /// `Ok(false)` means the client left before sending one.
    fn authenticate(&mut self) -> Result<bool> {
        let line = match self.read_line()? {
            Some(line) => line,
            None => return Ok(false),
        };

        if let Err(e) = self.credentials.verify(&line) {
            tracing::warn!("Authentication failed for {}", self.peer_addr);
            let _ = self.write_all(AUTH_REJECTED);
            return Err(e);
        }

        self.write_all(AUTH_OK)?;
        tracing::debug!("Client {} authenticated", self.peer_addr);
        Ok(true)
    }

    /// Read one LF-terminated line, without its CRLF/LF
    ///
    /// Returns `None` at end of stream. A final line with no terminator is
    /// discarded.
    fn read_line(&mut self) -> Result<Option<Vec<u8>>> {
        let mut line = Vec::new();
        let read = self.reader.read_until(b'\n', &mut line)?;
        if read == 0 {
            return Ok(None);
        }

        if line.last() != Some(&b'\n') {
            tracing::debug!(
                "Discarding unterminated line from {} ({} bytes)",
                self.peer_addr,
                line.len()
            );
            return Ok(None);
        }

        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    /// Send a response to the client
    fn send_response(&mut self, response: &Response) -> Result<()> {
        self.write_all(&response.to_line())
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        let stream = self.reader.get_mut();
        stream.write_all(bytes)?;
        stream.flush()?;
        Ok(())
    }

    /// Map a connection-ending error: peers going away are not failures
    fn finish(&self, err: ChromoError) -> Result<()> {
        if let ChromoError::Io(ref io_err) = err {
            if is_disconnect(io_err) {
                tracing::debug!("Client {} went away: {}", self.peer_addr, io_err);
                return Ok(());
            }
        }
        tracing::warn!("Connection {} ended with error: {}", self.peer_addr, err);
        Err(err)
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

fn is_disconnect(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::NotConnected
    )
}
