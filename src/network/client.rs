//! TCP Client
//!
//! Minimal blocking client for the line protocol (plain TCP).

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};

use crate::error::{ChromoError, Result};
use crate::protocol::LINE_ENDING;

use super::auth::{Credentials, AUTH_OK};

/// An authenticated connection to a ChromoDB server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl Client {
    /// Connect and authenticate
    ///
    /// Fails with `AuthFailed` if the server does not answer `AUTH OK`.
    pub fn connect(addr: impl ToSocketAddrs, credentials: &Credentials) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;

        let mut client = Self {
            reader: BufReader::new(stream.try_clone()?),
            writer: stream,
        };

        client.send_line(credentials.encode().as_bytes())?;
        let reply = client.read_line()?;
        if reply.as_slice() != &AUTH_OK[..AUTH_OK.len() - LINE_ENDING.len()] {
            return Err(ChromoError::AuthFailed);
        }

        Ok(client)
    }

    /// Send one command line and return the response line
    pub fn execute(&mut self, line: &[u8]) -> Result<Vec<u8>> {
        self.send_line(line)?;
        self.read_line()
    }

    /// `execute` for UTF-8 commands and responses
    pub fn execute_str(&mut self, line: &str) -> Result<String> {
        let response = self.execute(line.as_bytes())?;
        Ok(String::from_utf8_lossy(&response).into_owned())
    }

    fn send_line(&mut self, line: &[u8]) -> Result<()> {
        self.writer.write_all(line)?;
        self.writer.write_all(LINE_ENDING)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Read one CRLF-terminated line; EOF before the terminator is an error
    fn read_line(&mut self) -> Result<Vec<u8>> {
        let mut line = Vec::new();
        self.reader.read_until(b'\n', &mut line)?;

        if line.last() != Some(&b'\n') {
            return Err(ChromoError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "server closed the connection",
            )));
        }

        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Ok(line)
    }
}
