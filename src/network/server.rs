//! TCP Server
//!
//! Accepts connections and runs each on its own thread.

use std::io::{self, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rustls::ServerConfig;

use crate::config::{Config, RunMode};
use crate::error::{ChromoError, Result};
use crate::protocol::Dispatcher;

use super::auth::Credentials;
use super::connection::Connection;
use super::registry::ConnectionRegistry;
use super::tls;

/// Pause between accept attempts when no client is waiting
const ACCEPT_BACKOFF: Duration = Duration::from_millis(25);

/// Reply sent to connections over the limit
const TOO_MANY_CONNECTIONS: &[u8] = b"too many connections\r\n";

/// TCP/TLS server for ChromoDB
///
/// ## Shutdown barrier
///
/// Once [`ShutdownHandle::shutdown`] is called, `run` stops accepting,
/// shuts down every live socket, and joins every connection thread before
/// returning. Only then is it safe to close the engine.
pub struct Server {
    listener: TcpListener,
    dispatcher: Dispatcher,
    credentials: Credentials,
    tls: Option<Arc<ServerConfig>>,
    max_connections: usize,
    shutdown: Arc<AtomicBool>,
    registry: Arc<ConnectionRegistry>,
}

/// Signals a running server to stop
#[derive(Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

impl Server {
    /// Bind the listener described by `config`
    ///
    /// Fails if the config is not valid for network mode or the TLS
    /// certificate/key cannot be loaded.
    pub fn bind(config: &Config, dispatcher: Dispatcher) -> Result<Self> {
        config.validate(RunMode::Network)?;

        let credentials = config
            .credentials
            .clone()
            .ok_or_else(|| ChromoError::Config("credentials are required".to_string()))?;

        let tls = match &config.tls {
            Some(tls) => Some(tls::load_server_config(&tls.cert_path, &tls.key_path)?),
            None => None,
        };

        let listener = TcpListener::bind(&config.listen_addr)?;
        listener.set_nonblocking(true)?;

        tracing::info!(
            addr = %listener.local_addr()?,
            tls = tls.is_some(),
            "TCP/TLS listener is listening"
        );

        Ok(Self {
            listener,
            dispatcher,
            credentials,
            tls,
            max_connections: config.max_connections,
            shutdown: Arc::new(AtomicBool::new(false)),
            registry: Arc::new(ConnectionRegistry::new()),
        })
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle that stops `run` from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
        }
    }

    /// Number of live connections
    pub fn active_connections(&self) -> usize {
        self.registry.len()
    }

    /// Accept connections until shut down (blocking)
    pub fn run(&self) -> Result<()> {
        let mut workers: Vec<thread::JoinHandle<()>> = Vec::new();

        while !self.shutdown.load(Ordering::SeqCst) {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    if let Some(worker) = self.spawn_connection(stream, addr) {
                        workers.push(worker);
                    }
                    workers.retain(|worker| !worker.is_finished());
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_BACKOFF);
                }
                Err(e) => {
                    tracing::warn!("Error accepting connection: {}", e);
                    thread::sleep(ACCEPT_BACKOFF);
                }
            }
        }

        tracing::info!(
            connections = self.registry.len(),
            "TCP/TLS listener is shutting down"
        );

        self.registry.close_all();
        for worker in workers {
            if worker.join().is_err() {
                tracing::warn!("Connection thread panicked");
            }
        }

        tracing::info!("TCP/TLS listener stopped");
        Ok(())
    }

    /// Register and start a thread for one accepted socket
    fn spawn_connection(
        &self,
        mut stream: TcpStream,
        addr: SocketAddr,
    ) -> Option<thread::JoinHandle<()>> {
        if let Err(e) = stream.set_nonblocking(false) {
            tracing::warn!("Failed to configure socket for {}: {}", addr, e);
            return None;
        }

        let registration = match self
            .registry
            .try_register(addr, &stream, self.max_connections)
        {
            Ok(Some(registration)) => registration,
            Ok(None) => {
                tracing::warn!(
                    "Rejecting {}: too many connections (limit {})",
                    addr,
                    self.max_connections
                );
                let _ = stream.write_all(TOO_MANY_CONNECTIONS);
                return None;
            }
            Err(e) => {
                tracing::warn!("Failed to register {}: {}", addr, e);
                return None;
            }
        };

        let dispatcher = self.dispatcher.clone();
        let credentials = self.credentials.clone();
        let tls = self.tls.clone();

        let spawned = thread::Builder::new()
            .name(format!("conn-{}", addr))
            .spawn(move || {
                let _registration = registration;
                if let Err(e) = serve(stream, addr, tls, dispatcher, credentials) {
                    tracing::debug!("Connection {} closed: {}", addr, e);
                }
            });

        match spawned {
            Ok(worker) => Some(worker),
            Err(e) => {
                tracing::error!("Failed to spawn connection thread for {}: {}", addr, e);
                None
            }
        }
    }
}

/// Run one connection to completion on the current thread
fn serve(
    stream: TcpStream,
    addr: SocketAddr,
    tls: Option<Arc<ServerConfig>>,
    dispatcher: Dispatcher,
    credentials: Credentials,
) -> Result<()> {
    stream.set_nodelay(true)?;

    match tls {
        Some(config) => {
            let stream = tls::accept(&config, stream)?;
            Connection::new(stream, dispatcher, credentials, addr.to_string()).handle()
        }
        None => Connection::new(stream, dispatcher, credentials, addr.to_string()).handle(),
    }
}
