//! Connection registry
//!
//! Tracks live sockets so shutdown can unblock their reads. Guarded by its
//! own lock, never the transaction gate, so bookkeeping does not queue
//! behind storage operations.

use std::collections::HashMap;
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;

/// Live connections keyed by a per-server id
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: Mutex<HashMap<u64, (SocketAddr, TcpStream)>>,
    next_id: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a socket unless `limit` connections are already live
    ///
    /// The returned registration removes the entry when dropped.
    pub fn try_register(
        self: &Arc<Self>,
        addr: SocketAddr,
        stream: &TcpStream,
        limit: usize,
    ) -> Result<Option<Registration>> {
        let mut connections = self.connections.lock();
        if connections.len() >= limit {
            return Ok(None);
        }

        let handle = stream.try_clone()?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        connections.insert(id, (addr, handle));

        Ok(Some(Registration {
            registry: Arc::clone(self),
            id,
        }))
    }

    /// Number of live connections
    pub fn len(&self) -> usize {
        self.connections.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.lock().is_empty()
    }

    /// Peer addresses of live connections
    pub fn peers(&self) -> Vec<SocketAddr> {
        self.connections.lock().values().map(|(addr, _)| *addr).collect()
    }

    /// Shut down every registered socket
    ///
    /// Blocked reads on those sockets return immediately. Entries stay until
    /// their owning threads drop their registrations.
    pub fn close_all(&self) {
        let connections = self.connections.lock();
        for (addr, stream) in connections.values() {
            if let Err(e) = stream.shutdown(Shutdown::Both) {
                tracing::debug!("Shutdown of {} failed: {}", addr, e);
            }
        }
    }

    fn deregister(&self, id: u64) {
        self.connections.lock().remove(&id);
    }
}

/// Keeps a connection registered for as long as it is alive
pub struct Registration {
    registry: Arc<ConnectionRegistry>,
    id: u64,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.deregister(self.id);
    }
}
