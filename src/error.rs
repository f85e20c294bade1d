//! Error types for the socket bridge.
//!
//! Everything a Rust caller can fail at lives in one enum here.
//! Error policy follows ARCHITECTURE.md Section 6.
//!
//! # Usage
//!
//! Fallible operations return the crate-wide [`Result<T>`]:
//!
//! ```ignore
//! use ssh2_ws_bridge::{Result, Transport, TransportOptions};
//!
//! async fn example() -> Result<()> {
//!     let transport = Transport::new(TransportOptions::new("ws://127.0.0.1:9000"))?;
//!     transport.connect().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::Url`] |
//! | Connection | [`Error::ConnectionTimeout`], [`Error::ConnectionClosed`] |
//! | Lifecycle | [`Error::InvalidTransportState`], [`Error::SocketIdInUse`] |
//! | External | [`Error::WebSocket`] |
//!
//! # What is NOT an error
//!
//! The foreign engine's polling loop has no channel for exceptions, so
//! everything that loop already tolerates is reported as a value, never as
//! an `Err`: `send` on a dead socket is `false`, `receive` with nothing
//! buffered is `None`, and an unknown socket identifier behaves exactly
//! like a closed transport. Only `connect()` and registration return
//! `Result`.

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::identifiers::SocketId;
use crate::transport::TransportState;

// ============================================================================
// Result Alias
// ============================================================================

/// Alias for `Result` with the crate [`enum@Error`].
///
/// Everything fallible in the crate returns this.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// The crate-wide error type.
///
/// Variants carry the state, identifier, or timeout that triggered them.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when transport options are invalid (bad URL scheme,
    /// malformed subprotocol token, zero-sized queue bound).
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Connection attempt timed out.
    ///
    /// The configured connect timeout elapsed before any terminal event
    /// from the underlying connection. Distinct from [`Error::WebSocket`]
    /// so callers can tell "never reachable" from "reachable but failed".
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// How long the dial was allowed to run, in milliseconds.
        timeout_ms: u64,
    },

    /// Connection closed while an operation was in flight.
    ///
    /// Returned by `connect()` when a concurrent `close()` settled the
    /// transport first; the late dial outcome is discarded.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Lifecycle Errors
    // ========================================================================
    /// Transport is not in a state that permits the operation.
    ///
    /// `connect()` is only legal from `Disconnected`; a second call, or a
    /// call on a closed transport, returns this.
    #[error("Transport cannot connect from state {state}")]
    InvalidTransportState {
        /// The state the transport was actually in.
        state: TransportState,
    },

    /// A transport with this socket identifier is already registered.
    ///
    /// Registration never overwrites an existing entry; a collision is
    /// rejected instead.
    #[error("Socket id {socket_id} is already registered")]
    SocketIdInUse {
        /// The colliding identifier.
        socket_id: SocketId,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// URL parse error.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// WebSocket protocol error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a connection timeout error.
    #[inline]
    pub fn connection_timeout(timeout_ms: u64) -> Self {
        Self::ConnectionTimeout { timeout_ms }
    }

    /// Creates an invalid transport state error.
    #[inline]
    pub fn invalid_transport_state(state: TransportState) -> Self {
        Self::InvalidTransportState { state }
    }

    /// Creates a socket id collision error.
    #[inline]
    pub fn socket_id_in_use(socket_id: SocketId) -> Self {
        Self::SocketIdInUse { socket_id }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ConnectionTimeout { .. })
    }

    /// Returns `true` if this is a connection-level error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::ConnectionTimeout { .. } | Self::ConnectionClosed | Self::WebSocket(_)
        )
    }

    /// Returns `true` if this error is recoverable by retrying the
    /// connection attempt.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ConnectionTimeout { .. } | Self::WebSocket(_))
    }
}

// ============================================================================
// Tests
// ============================================================================
