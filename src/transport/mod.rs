//! WebSocket transport layer.
//!
//! This module carries the byte streams the sandboxed engine works with
//! over real WebSocket connections, and presents them through the
//! polling, never-blocking surface the engine's socket callbacks need.
//!
//! See ARCHITECTURE.md Section 3 for the transport specification.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐                          ┌─────────────────┐
//! │  Engine (WASM)   │                          │  SSH host /     │
//! │                  │        WebSocket         │  WS gateway     │
//! │  send/recv       │◄────────────────────────►│                 │
//! │  callbacks       │       ws://host:port     │                 │
//! └──────────────────┘                          └─────────────────┘
//!          ▲
//!          │ socket id (i32)
//!          ▼
//!   SocketRegistry → Transport → I/O task
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `Transport::new` - Validate options, mint a `SocketId`
//! 2. `Transport::connect` - Dial, race the timeout, settle exactly once
//! 3. `SocketRegistry::register` - Publish the transport under its id
//! 4. `send` / `receive` - Non-blocking polling from the engine callbacks
//! 5. `unregister` / `close` - Terminal teardown, buffered data discarded
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `options` | Endpoint URL, subprotocols, timeout, queue bound |
//! | `socket` | Single-connection state machine and I/O task |
//! | `registry` | Socket-id keyed multiplexer |

// ============================================================================
// Submodules
// ============================================================================

/// Transport configuration.
pub mod options;

/// Socket-id keyed transport registry.
pub mod registry;

/// Single WebSocket transport and its I/O task.
pub mod socket;

// ============================================================================
// Re-exports
// ============================================================================

pub use options::TransportOptions;
pub use registry::SocketRegistry;
pub use socket::{Transport, TransportState};
