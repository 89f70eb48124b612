//! TLS transport
//!
//! Loads a PEM certificate chain and private key, and upgrades accepted
//! sockets before the first application byte.

use std::fs::File;
use std::io::{BufReader, Cursor};
use std::net::TcpStream;
use std::path::Path;
use std::sync::Arc;

use rustls::{Certificate, PrivateKey, ServerConfig, ServerConnection, StreamOwned};
use rustls_pemfile::{certs, ec_private_keys, pkcs8_private_keys, rsa_private_keys};

use crate::error::{ChromoError, Result};

/// An encrypted duplex stream over an accepted socket
pub type TlsStream = StreamOwned<ServerConnection, TcpStream>;

/// Build a server config from PEM files
pub fn load_server_config(
    cert_path: impl AsRef<Path>,
    key_path: impl AsRef<Path>,
) -> Result<Arc<ServerConfig>> {
    let chain = load_cert_chain(cert_path.as_ref())?;
    if chain.is_empty() {
        return Err(ChromoError::Tls(format!(
            "no certificates found in {}",
            cert_path.as_ref().display()
        )));
    }
    let key = load_private_key(key_path.as_ref())?;

    let config = ServerConfig::builder()
        .with_safe_defaults()
        .with_no_client_auth()
        .with_single_cert(chain, key)?;

    Ok(Arc::new(config))
}

/// Complete the server handshake and wrap the socket
pub fn accept(config: &Arc<ServerConfig>, mut stream: TcpStream) -> Result<TlsStream> {
    let mut conn = ServerConnection::new(Arc::clone(config))?;
    while conn.is_handshaking() {
        conn.complete_io(&mut stream)?;
    }
    Ok(StreamOwned::new(conn, stream))
}

fn load_cert_chain(path: &Path) -> Result<Vec<Certificate>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let chain = certs(&mut reader)
        .map_err(|e| ChromoError::Tls(format!("invalid certificate chain: {}", e)))?;
    Ok(chain.into_iter().map(Certificate).collect())
}

/// Accepts PKCS#8, RSA (PKCS#1) and SEC1 EC keys, first match wins
fn load_private_key(path: &Path) -> Result<PrivateKey> {
    let pem = std::fs::read(path)?;

    let parsers: [fn(&mut dyn std::io::BufRead) -> std::io::Result<Vec<Vec<u8>>>; 3] =
        [pkcs8_private_keys, rsa_private_keys, ec_private_keys];

    for parse in parsers {
        let mut reader = Cursor::new(&pem);
        let keys = parse(&mut reader)
            .map_err(|e| ChromoError::Tls(format!("invalid private key: {}", e)))?;
        if let Some(key) = keys.into_iter().next() {
            return Ok(PrivateKey(key));
        }
    }

    Err(ChromoError::Tls(format!(
        "no private key found in {}",
        path.display()
    )))
}
