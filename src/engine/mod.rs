//! Boundary with the sandboxed SSH engine.
//!
//! The engine runs pre-compiled in a sandbox with no network access of
//! its own. Everything it knows about the outside world goes through the
//! two socket callbacks in [`callbacks`], which copy between the
//! engine's linear memory and the transports in a
//! [`SocketRegistry`](crate::transport::SocketRegistry).
//!
//! See ARCHITECTURE.md Section 5 for the callback contract.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `api` | Typed trait over the engine's exported surface |
//! | `callbacks` | The send/recv callbacks the engine drives |
//! | `codes` | The engine's numeric result codes |
//! | `handles` | Opaque non-zero handles to engine objects |
//! | `memory` | Bounds-checked access to engine linear memory |
//! | `types` | Value types crossing the boundary |

// ============================================================================
// Submodules
// ============================================================================

/// Typed engine surface.
pub mod api;

/// Socket callbacks driven by the engine.
pub mod callbacks;

/// Engine result codes.
pub mod codes;

/// Opaque engine object handles.
pub mod handles;

/// Engine linear memory access.
pub mod memory;

/// Boundary value types.
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use api::{Engine, InteractiveResponder, TraceHandler};
pub use callbacks::{EngineCallbacks, RecvCallback, SendCallback, bridge_recv, bridge_send};
pub use codes::ErrorCode;
pub use handles::{
    ChannelHandle, KnownHostsHandle, ListenerHandle, SessionHandle, SftpFileHandle, SftpHandle,
};
pub use memory::EngineMemory;
pub use types::{
    ChannelType, Credentials, HostKey, InteractivePrompt, KnownHostCheck, KnownHostEntry,
    PtyOptions, SftpAttributes,
};
