//! Type-safe socket identifiers.
//!
//! The foreign engine never holds a reference to a transport. It only
//! carries a small integer "socket descriptor" and passes it back through
//! the send/recv callbacks. [`SocketId`] is the typed form of that integer.
//!
//! See ARCHITECTURE.md Section 4.1 for the identifier scheme.
//!
//! # Identifier Scheme
//!
//! Identifiers are drawn from a process-wide monotonic counter starting at
//! 1, so they are unique for the lifetime of the process and never zero.
//! Zero and negative values are reserved as invalid: the engine-facing
//! callbacks receive the descriptor as a signed integer and must be able
//! to reject garbage without panicking.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU32, Ordering};

// ============================================================================
// SocketId
// ============================================================================

/// Identifier for one registered [`Transport`](crate::transport::Transport).
///
/// This is the only thing the foreign engine ever sees of a transport.
/// Internally a non-zero `u32`; on the callback boundary it travels as the
/// engine's signed socket descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SocketId(NonZeroU32);

/// Next socket identifier to hand out. Starts at 1; 0 is reserved.
static NEXT_SOCKET_ID: AtomicU32 = AtomicU32::new(1);

impl SocketId {
    /// Returns the next process-unique socket identifier.
    ///
    /// Monotonically increasing, so two live transports can never share an
    /// identifier. Wrap-around after `u32::MAX` allocations is not handled;
    /// that is ~4 billion transports in one process.
    #[must_use]
    pub fn next() -> Self {
        let raw = NEXT_SOCKET_ID.fetch_add(1, Ordering::Relaxed);
        // fetch_add starting from 1 never yields 0 before wrap-around.
        Self(NonZeroU32::new(raw).unwrap_or(NonZeroU32::MIN))
    }

    /// Creates a socket identifier from a raw `u32`.
    ///
    /// Returns `None` for 0, which is not a valid identifier.
    #[inline]
    #[must_use]
    pub fn from_u32(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    /// Creates a socket identifier from the engine's signed descriptor.
    ///
    /// The engine passes the descriptor as a C `int`; zero and negative
    /// values map to `None` so the callbacks can degrade them to the
    /// dead-socket sentinels instead of panicking.
    #[inline]
    #[must_use]
    pub fn from_raw(raw: i32) -> Option<Self> {
        u32::try_from(raw).ok().and_then(Self::from_u32)
    }

    /// Returns the identifier as a `u32`.
    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0.get()
    }

    /// Returns the identifier as the engine's signed descriptor.
    #[inline]
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0.get() as i32
    }
}

impl fmt::Display for SocketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
