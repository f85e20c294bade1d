//! The socket callbacks the foreign engine drives.
//!
//! The engine expects two C-shaped functions: one that sends from a
//! buffer in its linear memory and one that fills such a buffer with
//! received data. Both must return immediately with a byte count, `0`
//! for "nothing right now", or a negative code from
//! [`ErrorCode`](crate::engine::ErrorCode). There is no error channel
//! other than that return value.
//!
//! See ARCHITECTURE.md Section 5 for the full contract.
//!
//! # Return Values
//!
//! | Outcome | `bridge_send` | `bridge_recv` |
//! |---------|---------------|---------------|
//! | Bytes moved | length accepted | bytes copied |
//! | Nothing to do | `EAGAIN` (-37) | `0` |
//! | Unknown or dead socket | `EAGAIN` (-37) | `0` |
//! | Engine buffer out of range | `SOCKET_SEND` (-7) | `SOCKET_RECV` (-43) |
//!
//! A would-block answer tells the engine to re-poll; the fault codes are
//! fatal for the engine's view of the socket.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{trace, warn};

use crate::engine::codes::ErrorCode;
use crate::engine::memory::EngineMemory;
use crate::identifiers::SocketId;
use crate::transport::SocketRegistry;

// ============================================================================
// Callback types
// ============================================================================

/// Send callback: `(socket_id, buffer_offset, length) -> result`.
pub type SendCallback = Box<dyn FnMut(i32, u32, u32) -> i32 + Send>;

/// Receive callback: `(socket_id, buffer_offset, length) -> result`.
pub type RecvCallback = Box<dyn FnMut(i32, u32, u32) -> i32 + Send>;

// ============================================================================
// bridge_send
// ============================================================================

/// Handles the engine's send callback.
///
/// Copies `length` bytes at `buffer` out of the engine's memory and
/// hands them to the transport registered under `socket`. The whole
/// buffer is accepted or nothing is; there is no partial send.
///
/// Returns `length` on success, [`ErrorCode::Eagain`] when the socket is
/// unknown, not connected, or refused the handoff, and
/// [`ErrorCode::SocketSend`] when the described buffer does not fit in
/// the engine's memory.
pub fn bridge_send(
    registry: &SocketRegistry,
    memory: &dyn EngineMemory,
    socket: i32,
    buffer: u32,
    length: u32,
) -> i32 {
    if length == 0 {
        return 0;
    }
    let Ok(accepted) = i32::try_from(length) else {
        warn!(socket, length, "send length not representable");
        return ErrorCode::SocketSend.as_raw();
    };

    let Some(data) = memory.read_bytes(buffer, length) else {
        warn!(socket, buffer, length, "send buffer outside engine memory");
        return ErrorCode::SocketSend.as_raw();
    };

    let Some(socket_id) = SocketId::from_raw(socket) else {
        trace!(socket, "send on invalid socket id");
        return ErrorCode::Eagain.as_raw();
    };

    if registry.send(socket_id, data) {
        trace!(socket_id = %socket_id, length, "engine send accepted");
        accepted
    } else {
        trace!(socket_id = %socket_id, "engine send would block");
        ErrorCode::Eagain.as_raw()
    }
}

// ============================================================================
// bridge_recv
// ============================================================================

/// Handles the engine's receive callback.
///
/// Polls the transport registered under `socket` and copies the oldest
/// buffered message into the engine's memory at `buffer`, up to
/// `length` bytes. A message longer than `length` is truncated and the
/// remainder discarded; the engine is expected to size its buffer to the
/// transport's framing, so this is logged as misuse.
///
/// Returns the copied byte count, `0` when no data is buffered (the
/// engine's cue to re-poll) or when the socket is unknown, and
/// [`ErrorCode::SocketRecv`] when the described buffer does not fit in
/// the engine's memory. In the fault case the popped message is gone,
/// which is moot: the engine treats the code as fatal for the socket.
pub fn bridge_recv(
    registry: &SocketRegistry,
    memory: &mut dyn EngineMemory,
    socket: i32,
    buffer: u32,
    length: u32,
) -> i32 {
    if length == 0 {
        return 0;
    }
    if i32::try_from(length).is_err() {
        warn!(socket, length, "recv length not representable");
        return ErrorCode::SocketRecv.as_raw();
    }

    let Some(socket_id) = SocketId::from_raw(socket) else {
        trace!(socket, "recv on invalid socket id");
        return 0;
    };

    let Some(data) = registry.receive(socket_id) else {
        return 0;
    };

    let copy_len = data.len().min(length as usize);
    if copy_len < data.len() {
        warn!(
            socket_id = %socket_id,
            message_len = data.len(),
            buffer_len = length,
            discarded = data.len() - copy_len,
            "inbound message truncated to engine buffer"
        );
    }

    if !memory.write_bytes(buffer, &data[..copy_len]) {
        warn!(socket_id = %socket_id, buffer, length, "recv buffer outside engine memory");
        return ErrorCode::SocketRecv.as_raw();
    }

    trace!(socket_id = %socket_id, copied = copy_len, "engine recv filled");
    copy_len as i32
}

// ============================================================================
// EngineCallbacks
// ============================================================================

/// The callback pair, bound to a registry and a memory.
///
/// This is what gets installed into the engine at instantiation time.
/// The closures capture the registry and the engine memory, so the
/// embedding only needs to forward the three raw integers.
///
/// # Example
///
/// ```ignore
/// let callbacks = EngineCallbacks::for_registry(registry, memory);
/// module.install_send(callbacks.send);
/// module.install_recv(callbacks.recv);
/// ```
pub struct EngineCallbacks {
    /// Installed as the engine's custom send function.
    pub send: SendCallback,
    /// Installed as the engine's custom receive function.
    pub recv: RecvCallback,
}

impl EngineCallbacks {
    /// Binds the callback pair to `registry` routing and `memory` copies.
    #[must_use]
    pub fn for_registry<M>(registry: Arc<SocketRegistry>, memory: Arc<Mutex<M>>) -> Self
    where
        M: EngineMemory + Send + 'static,
    {
        let send_registry = Arc::clone(&registry);
        let send_memory = Arc::clone(&memory);

        Self {
            send: Box::new(move |socket, buffer, length| {
                bridge_send(&send_registry, &*send_memory.lock(), socket, buffer, length)
            }),
            recv: Box::new(move |socket, buffer, length| {
                bridge_recv(&registry, &mut *memory.lock(), socket, buffer, length)
            }),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
