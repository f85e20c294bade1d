//! SSH-over-WebSocket socket bridge for a sandboxed protocol engine.
//!
//! This library lets a pre-compiled SSH engine, running in a sandbox
//! with no raw network access, talk to real hosts through WebSocket
//! connections. The engine assumes classic pollable sockets: it calls a
//! send and a receive function with a buffer and a length and expects an
//! immediate numeric answer. WebSockets instead deliver everything as
//! asynchronous events. The bridge sits between the two models.
//!
//! # Architecture
//!
//! Three layers, each owning one translation:
//!
//! - **[`Transport`]**: one WebSocket connection behind a non-blocking
//!   surface. Inbound frames buffer in a FIFO queue; `receive()` polls
//!   it and never blocks.
//! - **[`SocketRegistry`]**: integer socket ids to transports, because
//!   an id is all the engine can carry across its boundary.
//! - **Callback adapter** ([`engine::callbacks`]): the two functions the
//!   engine actually calls, copying between the engine's linear memory
//!   and the registry and answering in the engine's numeric dialect.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use ssh2_ws_bridge::{Result, SocketRegistry, Transport, TransportOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let registry = Arc::new(SocketRegistry::new());
//!
//!     // One bridged socket to an SSH endpoint behind a WS gateway
//!     let transport = Arc::new(Transport::new(
//!         TransportOptions::new("ws://127.0.0.1:8022/ssh").with_protocol("binary"),
//!     )?);
//!     transport.connect().await?;
//!     let socket_id = registry.register(transport)?;
//!
//!     // The engine's callbacks now move data purely by id
//!     registry.send(socket_id, b"SSH-2.0-client\r\n".to_vec());
//!     while let Some(inbound) = registry.receive(socket_id) {
//!         println!("{} bytes in", inbound.len());
//!     }
//!
//!     registry.unregister(socket_id);
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`engine`] | Engine boundary: callbacks, codes, handles, surface |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe socket id wrapper |
//! | [`transport`] | WebSocket transports and the socket registry |

// ============================================================================
// Modules
// ============================================================================

/// Boundary with the sandboxed SSH engine.
///
/// The socket callbacks in [`engine::callbacks`] are the only functions
/// the engine calls; the rest of the module types the engine's own
/// surface and result codes.
pub mod engine;

/// Error types and result aliases.
///
/// Fallible operations return the crate-wide [`Result<T>`].
pub mod error;

/// Type-safe socket identifiers.
///
/// The newtype keeps raw engine integers and live socket ids apart at
/// compile time.
pub mod identifiers;

/// WebSocket transport layer.
///
/// Single-connection transports, their I/O tasks, and the id-keyed
/// registry.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Engine boundary types
pub use engine::{EngineCallbacks, EngineMemory, ErrorCode, bridge_recv, bridge_send};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::SocketId;

// Transport types
pub use transport::{SocketRegistry, Transport, TransportOptions, TransportState};
