//! Registry for multiplexed transports keyed by socket identifier.
//!
//! The foreign engine addresses sockets by plain integers. The registry
//! owns the id-to-transport mapping and lets the callback layer route
//! every operation by id alone.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           SocketRegistry                │
//! │  ┌─────────────────────────────────┐    │
//! │  │ SocketId=1 → Transport 1        │    │
//! │  │ SocketId=2 → Transport 2        │    │
//! │  │ SocketId=3 → Transport 3        │    │
//! │  └─────────────────────────────────┘    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! Operations on unknown ids degrade to the same sentinels a dead
//! transport produces; they never panic. See ARCHITECTURE.md Section 4.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{debug, info, trace};

use crate::error::{Error, Result};
use crate::identifiers::SocketId;
use crate::transport::Transport;

// ============================================================================
// SocketRegistry
// ============================================================================

/// Maps socket identifiers to their transports.
///
/// Thread-safe, supports concurrent access from the engine callbacks and
/// the owning application. Each instance is independent; dropping the
/// registry ends the bridged connections it still holds.
///
/// # Example
///
/// ```ignore
/// let registry = SocketRegistry::new();
///
/// let transport = Arc::new(Transport::new(options)?);
/// transport.connect().await?;
/// let socket_id = registry.register(transport)?;
///
/// // Later, routed purely by id:
/// registry.send(socket_id, data);
/// let inbound = registry.receive(socket_id);
/// registry.unregister(socket_id);
/// ```
pub struct SocketRegistry {
    /// Active transports by socket ID.
    transports: RwLock<FxHashMap<SocketId, Arc<Transport>>>,
}

// ============================================================================
// SocketRegistry - Constructor
// ============================================================================

impl SocketRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            transports: RwLock::new(FxHashMap::default()),
        }
    }
}

impl Default for SocketRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SocketRegistry - Registration
// ============================================================================

impl SocketRegistry {
    /// Registers a transport under its own socket identifier.
    ///
    /// Returns the id the engine should carry. Identifiers come from a
    /// monotonic source, so a collision means two registrations of the
    /// same transport; the second is rejected rather than silently
    /// replacing the first.
    ///
    /// # Errors
    ///
    /// - [`Error::SocketIdInUse`] if the id is already registered
    pub fn register(&self, transport: Arc<Transport>) -> Result<SocketId> {
        let socket_id = transport.id();

        {
            let mut transports = self.transports.write();
            if transports.contains_key(&socket_id) {
                return Err(Error::socket_id_in_use(socket_id));
            }
            transports.insert(socket_id, transport);
        }

        debug!(socket_id = %socket_id, "Transport registered");
        Ok(socket_id)
    }

    /// Removes a transport and closes it.
    ///
    /// Unknown ids are a no-op; a double unregister is harmless.
    pub fn unregister(&self, socket_id: SocketId) {
        let removed = {
            let mut transports = self.transports.write();
            transports.remove(&socket_id)
        };

        if let Some(transport) = removed {
            transport.close();
            debug!(socket_id = %socket_id, "Transport unregistered");
        }
    }

    /// Looks up a transport by id.
    #[must_use]
    pub fn get(&self, socket_id: SocketId) -> Option<Arc<Transport>> {
        self.transports.read().get(&socket_id).cloned()
    }

    /// Returns `true` if the id is currently registered.
    #[inline]
    #[must_use]
    pub fn contains(&self, socket_id: SocketId) -> bool {
        self.transports.read().contains_key(&socket_id)
    }

    /// Returns the number of registered transports.
    #[inline]
    #[must_use]
    pub fn socket_count(&self) -> usize {
        self.transports.read().len()
    }
}

// ============================================================================
// SocketRegistry - Routed Operations
// ============================================================================

impl SocketRegistry {
    /// Sends on the transport registered under `socket_id`.
    ///
    /// Returns `false` for an unknown id, exactly as a registered but
    /// disconnected transport would.
    pub fn send(&self, socket_id: SocketId, data: impl Into<Vec<u8>>) -> bool {
        match self.get(socket_id) {
            Some(transport) => transport.send(data),
            None => {
                trace!(socket_id = %socket_id, "send to unknown socket id");
                false
            }
        }
    }

    /// Polls the transport registered under `socket_id` for inbound data.
    ///
    /// Returns `None` for an unknown id.
    pub fn receive(&self, socket_id: SocketId) -> Option<Vec<u8>> {
        match self.get(socket_id) {
            Some(transport) => transport.receive(),
            None => {
                trace!(socket_id = %socket_id, "receive from unknown socket id");
                None
            }
        }
    }

    /// Returns `true` if the id maps to a currently connected transport.
    #[must_use]
    pub fn is_connected(&self, socket_id: SocketId) -> bool {
        self.get(socket_id)
            .is_some_and(|transport| transport.is_connected())
    }
}

// ============================================================================
// SocketRegistry - Lifecycle
// ============================================================================

impl SocketRegistry {
    /// Closes and removes every registered transport.
    pub fn shutdown(&self) {
        let transports: Vec<_> = {
            let mut map = self.transports.write();
            map.drain().collect()
        };

        for (socket_id, transport) in &transports {
            transport.close();
            debug!(socket_id = %socket_id, "Transport closed during shutdown");
        }

        info!(count = transports.len(), "SocketRegistry shut down");
    }
}

impl Drop for SocketRegistry {
    fn drop(&mut self) {
        // Handles still held elsewhere keep their Arc; the connections
        // themselves are torn down.
        for transport in self.transports.get_mut().values() {
            transport.close();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use tokio::net::TcpListener;

    use crate::transport::TransportOptions;

    fn unconnected_transport() -> Arc<Transport> {
        Arc::new(Transport::new(TransportOptions::new("ws://127.0.0.1:1/")).expect("transport"))
    }

    #[test]
    fn test_register_and_get() {
        let registry = SocketRegistry::new();
        let transport = unconnected_transport();

        let socket_id = registry.register(Arc::clone(&transport)).expect("register");
        assert_eq!(socket_id, transport.id());
        assert!(registry.contains(socket_id));
        assert_eq!(registry.socket_count(), 1);
        assert!(registry.get(socket_id).is_some());
    }

    #[test]
    fn test_register_rejects_duplicate_id() {
        let registry = SocketRegistry::new();
        let transport = unconnected_transport();

        registry.register(Arc::clone(&transport)).expect("first");
        let err = registry.register(transport).unwrap_err();
        assert!(matches!(err, Error::SocketIdInUse { .. }));
        assert_eq!(registry.socket_count(), 1);
    }

    #[test]
    fn test_unregister_closes_transport() {
        let registry = SocketRegistry::new();
        let transport = unconnected_transport();
        let socket_id = registry.register(Arc::clone(&transport)).expect("register");

        registry.unregister(socket_id);
        assert!(!registry.contains(socket_id));
        assert_eq!(registry.socket_count(), 0);
        assert_eq!(
            transport.state(),
            crate::transport::TransportState::Closed
        );
    }

    #[test]
    fn test_unregister_unknown_id_is_noop() {
        let registry = SocketRegistry::new();
        let socket_id = SocketId::next();

        // Must not panic, must not disturb other entries.
        registry.unregister(socket_id);
        assert_eq!(registry.socket_count(), 0);
    }

    #[test]
    fn test_unknown_id_sentinels() {
        let registry = SocketRegistry::new();
        let socket_id = SocketId::next();

        assert!(!registry.send(socket_id, vec![1, 2, 3]));
        assert!(registry.receive(socket_id).is_none());
        assert!(!registry.is_connected(socket_id));
    }

    #[test]
    fn test_operations_after_unregister_degrade_gracefully() {
        let registry = SocketRegistry::new();
        let transport = unconnected_transport();
        let socket_id = registry.register(transport).expect("register");
        registry.unregister(socket_id);

        assert!(!registry.send(socket_id, vec![1]));
        assert!(registry.receive(socket_id).is_none());
        assert!(!registry.is_connected(socket_id));
    }

    #[test]
    fn test_shutdown_closes_everything() {
        let registry = SocketRegistry::new();
        let a = unconnected_transport();
        let b = unconnected_transport();
        registry.register(Arc::clone(&a)).expect("a");
        registry.register(Arc::clone(&b)).expect("b");

        registry.shutdown();

        assert_eq!(registry.socket_count(), 0);
        assert_eq!(a.state(), crate::transport::TransportState::Closed);
        assert_eq!(b.state(), crate::transport::TransportState::Closed);
    }

    #[test]
    fn test_each_registry_is_independent() {
        let first = SocketRegistry::new();
        let second = SocketRegistry::new();
        let transport = unconnected_transport();
        let socket_id = first.register(transport).expect("register");

        assert!(first.contains(socket_id));
        assert!(!second.contains(socket_id));
    }

    #[tokio::test]
    async fn test_routed_send_and_receive_through_live_transport() {
        // Echo server accepting a single connection.
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            let mut ws = tokio_tungstenite::accept_async(stream)
                .await
                .expect("ws upgrade");
            while let Some(Ok(message)) = ws.next().await {
                if message.is_binary() && ws.send(message).await.is_err() {
                    break;
                }
            }
        });

        let registry = SocketRegistry::new();
        let transport = Arc::new(
            Transport::new(TransportOptions::new(format!("ws://{addr}"))).expect("transport"),
        );
        transport.connect().await.expect("connect");
        let socket_id = registry.register(transport).expect("register");

        assert!(registry.is_connected(socket_id));
        assert!(registry.send(socket_id, vec![0x10, 0x20]));

        let mut echoed = None;
        for _ in 0..200 {
            echoed = registry.receive(socket_id);
            if echoed.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(echoed, Some(vec![0x10, 0x20]));

        registry.unregister(socket_id);
        assert!(!registry.is_connected(socket_id));
    }
}
