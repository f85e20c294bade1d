//! WebSocket transport with a pollable, non-blocking surface.
//!
//! This module wraps one asynchronous WebSocket connection behind the
//! synchronous poll contract the foreign engine expects: `send` and
//! `receive` always return immediately, and an empty inbound queue means
//! "try again later", never an error.
//!
//! See ARCHITECTURE.md Section 3 for the transport specification.
//!
//! # State Machine
//!
//! ```text
//!                     connect()            open
//!   Disconnected ───────────────► Connecting ────► Connected
//!        │                            │                │
//!        │ close()            error / │ timeout        │ close() / close
//!        │                    close() │                │ event / error
//!        ▼                            ▼                ▼
//!      Closed ◄───────────────────────┴────────────► Closed   (terminal)
//! ```
//!
//! # I/O Task
//!
//! `connect()` spawns a tokio task that exclusively owns the split
//! WebSocket stream and handles:
//!
//! - Outbound buffers from `send()` (handed over through an unbounded
//!   channel, so `send()` itself never suspends)
//! - Inbound binary frames, pushed to the FIFO queue that `receive()`
//!   drains
//! - Close and error events, which settle the transport into `Closed`
//!
//! When the inbound queue is bounded and full, the task stops polling the
//! read half and retries on a short tick; backpressure reaches the peer
//! through TCP instead of dropping frames.

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::SocketId;

use super::TransportOptions;

// ============================================================================
// Constants
// ============================================================================

/// Retry tick while a bounded inbound queue is full.
const QUEUE_FULL_BACKOFF: Duration = Duration::from_millis(10);

// ============================================================================
// Types
// ============================================================================

/// Write half of the WebSocket stream, owned by the I/O task.
type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Read half of the WebSocket stream, owned by the I/O task.
type WsSource = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

// ============================================================================
// TransportState
// ============================================================================

/// Lifecycle state of a [`Transport`].
///
/// `Closed` is terminal: no transition ever leaves it, and all operations
/// on a closed transport return failure sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportState {
    /// Constructed, no connection attempt yet.
    Disconnected,
    /// `connect()` is in flight and has not settled.
    Connecting,
    /// The underlying connection is open.
    Connected,
    /// Torn down, locally or by the peer. Terminal.
    Closed,
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

// ============================================================================
// InboundQueue
// ============================================================================

/// FIFO queue of inbound binary messages, optionally bounded.
struct InboundQueue {
    /// Buffered messages in arrival order.
    messages: Mutex<VecDeque<Vec<u8>>>,
    /// Maximum buffered messages; `None` is unbounded.
    bound: Option<usize>,
}

impl InboundQueue {
    fn new(bound: Option<usize>) -> Self {
        Self {
            messages: Mutex::new(VecDeque::new()),
            bound,
        }
    }

    /// Appends a message. Returns `false` if the bound is reached; the
    /// caller is expected to have checked [`InboundQueue::has_capacity`]
    /// first, so a `false` here means a frame would have been lost.
    fn push(&self, message: Vec<u8>) -> bool {
        let mut messages = self.messages.lock();
        if let Some(bound) = self.bound
            && messages.len() >= bound
        {
            return false;
        }
        messages.push_back(message);
        true
    }

    /// Pops the oldest message, if any.
    fn pop(&self) -> Option<Vec<u8>> {
        self.messages.lock().pop_front()
    }

    /// Returns `true` if another message can be queued right now.
    fn has_capacity(&self) -> bool {
        match self.bound {
            Some(bound) => self.messages.lock().len() < bound,
            None => true,
        }
    }

    fn len(&self) -> usize {
        self.messages.lock().len()
    }

    fn clear(&self) {
        self.messages.lock().clear();
    }
}

// ============================================================================
// Shared
// ============================================================================

/// State shared between the [`Transport`] handle and its I/O task.
struct Shared {
    /// Current lifecycle state; every transition goes through this lock.
    state: Mutex<TransportState>,
    /// Inbound message queue drained by `receive()`.
    inbound: InboundQueue,
    /// Handoff channel to the I/O task; present only while Connected.
    outbound: Mutex<Option<mpsc::UnboundedSender<Vec<u8>>>>,
}

impl Shared {
    fn new(queue_bound: Option<usize>) -> Self {
        Self {
            state: Mutex::new(TransportState::Disconnected),
            inbound: InboundQueue::new(queue_bound),
            outbound: Mutex::new(None),
        }
    }

    fn state(&self) -> TransportState {
        *self.state.lock()
    }

    /// `Disconnected -> Connecting`, rejecting every other starting state.
    fn begin_connect(&self) -> Result<()> {
        let mut state = self.state.lock();
        match *state {
            TransportState::Disconnected => {
                *state = TransportState::Connecting;
                Ok(())
            }
            other => Err(Error::invalid_transport_state(other)),
        }
    }

    /// Reverts `Connecting` to `Disconnected` when the attempt failed
    /// before anything was dialed. No-op if a concurrent close already
    /// settled the state.
    fn abort_connect(&self) {
        let mut state = self.state.lock();
        if *state == TransportState::Connecting {
            *state = TransportState::Disconnected;
        }
    }

    /// The single-settle guard: moves `Connecting` to `target` and reports
    /// whether this call won the settle race. A terminal event that loses
    /// the race observes `false` and must discard its outcome.
    fn settle(&self, target: TransportState) -> bool {
        let mut state = self.state.lock();
        if *state == TransportState::Connecting {
            *state = target;
            true
        } else {
            false
        }
    }

    /// Forces `Closed`, drops the outbound channel (terminating the I/O
    /// task), and discards buffered inbound messages. Idempotent; returns
    /// whether the state actually changed.
    fn force_closed(&self) -> bool {
        let changed = {
            let mut state = self.state.lock();
            if *state == TransportState::Closed {
                false
            } else {
                *state = TransportState::Closed;
                true
            }
        };
        let sender = self.outbound.lock().take();
        drop(sender);
        self.inbound.clear();
        changed
    }
}

// ============================================================================
// Transport
// ============================================================================

/// One bridged WebSocket connection.
///
/// Owns the underlying connection exclusively; everything else in the
/// process refers to it only through its [`SocketId`]. All operations
/// except [`Transport::connect`] are synchronous and return immediately.
///
/// # Example
///
/// ```ignore
/// let transport = Transport::new(TransportOptions::new("ws://127.0.0.1:8022"))?;
/// transport.connect().await?;
///
/// transport.send([0x53, 0x53, 0x48]);     // whole buffer or failure
/// while let Some(message) = transport.receive() {
///     // in arrival order
/// }
/// ```
pub struct Transport {
    /// Process-unique identifier the foreign engine carries.
    id: SocketId,
    /// Endpoint and behavior configuration.
    options: TransportOptions,
    /// State shared with the I/O task.
    shared: Arc<Shared>,
}

impl Transport {
    /// Creates a transport for the given options.
    ///
    /// Validates the endpoint URL and subprotocols up front so that a
    /// misconfiguration fails here, before any connection attempt exists.
    ///
    /// # Errors
    ///
    /// - [`Error::Url`] / [`Error::Config`] for an invalid endpoint or
    ///   subprotocol list
    pub fn new(options: TransportOptions) -> Result<Self> {
        options.validate()?;
        let id = SocketId::next();
        let queue_bound = options.max_queued_messages;

        debug!(socket_id = %id, url = %options.url, "Transport created");

        Ok(Self {
            id,
            options,
            shared: Arc::new(Shared::new(queue_bound)),
        })
    }

    /// Returns this transport's socket identifier.
    #[inline]
    #[must_use]
    pub fn id(&self) -> SocketId {
        self.id
    }

    /// Returns the current lifecycle state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> TransportState {
        self.shared.state()
    }

    /// Returns `true` if the transport is currently connected.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state() == TransportState::Connected
    }

    /// Returns the number of inbound messages waiting in the queue.
    #[inline]
    #[must_use]
    pub fn queued_messages(&self) -> usize {
        self.shared.inbound.len()
    }

    /// Establishes the WebSocket connection.
    ///
    /// Suspends until exactly one terminal event settles the attempt: the
    /// connection opens, the connection fails, or the configured timeout
    /// elapses. Whatever settles first wins; the loser's later signal is
    /// discarded. This is the only suspending operation on the transport.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidTransportState`] if called from any state other
    ///   than `Disconnected`
    /// - [`Error::WebSocket`] if the underlying connection reported an
    ///   error before opening
    /// - [`Error::ConnectionTimeout`] if the timeout elapsed first
    /// - [`Error::ConnectionClosed`] if a concurrent `close()` settled the
    ///   attempt
    pub async fn connect(&self) -> Result<()> {
        self.shared.begin_connect()?;

        let request = match self.build_request() {
            Ok(request) => request,
            Err(e) => {
                // Nothing was dialed yet; the transport stays usable.
                self.shared.abort_connect();
                return Err(e);
            }
        };

        debug!(socket_id = %self.id, url = %self.options.url, "Connecting");

        let dial = connect_async(request);
        let outcome = match self.options.connect_timeout {
            Some(limit) => match timeout(limit, dial).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    let timeout_ms = limit.as_millis() as u64;
                    if self.shared.settle(TransportState::Closed) {
                        warn!(socket_id = %self.id, timeout_ms, "Connect timed out");
                        return Err(Error::connection_timeout(timeout_ms));
                    }
                    return Err(Error::ConnectionClosed);
                }
            },
            None => dial.await,
        };

        match outcome {
            Ok((ws_stream, _response)) => {
                let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

                // The sender must be in place before the state flips to
                // Connected, so a concurrent send() never observes the gap.
                *self.shared.outbound.lock() = Some(outbound_tx);

                if self.shared.settle(TransportState::Connected) {
                    debug!(socket_id = %self.id, "Connected");
                    tokio::spawn(Self::run_io_loop(
                        self.id,
                        Arc::clone(&self.shared),
                        ws_stream,
                        outbound_rx,
                    ));
                    Ok(())
                } else {
                    // close() won the settle race; discard the connection.
                    self.shared.force_closed();
                    drop(ws_stream);
                    Err(Error::ConnectionClosed)
                }
            }
            Err(e) => {
                if self.shared.settle(TransportState::Closed) {
                    warn!(socket_id = %self.id, error = %e, "Connect failed");
                    Err(Error::WebSocket(e))
                } else {
                    Err(Error::ConnectionClosed)
                }
            }
        }
    }

    /// Sends one binary message.
    ///
    /// Returns `false` unless the transport is `Connected`; otherwise hands
    /// the whole buffer to the I/O task in a single synchronous step. There
    /// are no partial sends: the buffer is either accepted in full or the
    /// call reports failure. Never suspends, never panics.
    pub fn send(&self, data: impl Into<Vec<u8>>) -> bool {
        if !self.is_connected() {
            trace!(socket_id = %self.id, state = %self.state(), "send on non-connected transport");
            return false;
        }

        let guard = self.shared.outbound.lock();
        match guard.as_ref() {
            Some(tx) => tx.send(data.into()).is_ok(),
            None => false,
        }
    }

    /// Polls for the oldest buffered inbound message.
    ///
    /// `None` means "no data right now", the engine's EAGAIN, and is
    /// also the permanent answer once the transport is `Closed`. Never
    /// blocks.
    pub fn receive(&self) -> Option<Vec<u8>> {
        if self.state() == TransportState::Closed {
            return None;
        }
        self.shared.inbound.pop()
    }

    /// Closes the transport.
    ///
    /// Forces the state to `Closed`, terminates the I/O task, and discards
    /// buffered inbound messages. Safe to call any number of times, from
    /// any state.
    pub fn close(&self) {
        if self.shared.force_closed() {
            debug!(socket_id = %self.id, "Transport closed");
        }
    }

    /// Builds the WebSocket client request, attaching subprotocols.
    fn build_request(&self) -> Result<tokio_tungstenite::tungstenite::handshake::client::Request> {
        let url = self.options.parsed_url()?;
        let mut request = url.as_str().into_client_request()?;

        if let Some(header) = self.options.protocol_header() {
            let value = HeaderValue::from_str(&header)
                .map_err(|_| Error::config(format!("invalid subprotocol header: {header:?}")))?;
            request.headers_mut().insert(SEC_WEBSOCKET_PROTOCOL, value);
        }

        Ok(request)
    }

    /// I/O task: exclusive owner of the WebSocket stream.
    async fn run_io_loop(
        id: SocketId,
        shared: Arc<Shared>,
        ws_stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
        mut outbound_rx: mpsc::UnboundedReceiver<Vec<u8>>,
    ) {
        let (mut ws_write, mut ws_read): (WsSink, WsSource) = ws_stream.split();

        loop {
            let room = shared.inbound.has_capacity();

            tokio::select! {
                // Inbound frames, only while the queue has room.
                message = ws_read.next(), if room => {
                    match message {
                        Some(Ok(Message::Binary(data))) => {
                            trace!(socket_id = %id, len = data.len(), "Inbound message queued");
                            if !shared.inbound.push(data.into()) {
                                warn!(socket_id = %id, "Inbound queue overflow; frame dropped");
                            }
                        }

                        Some(Ok(Message::Close(_))) => {
                            debug!(socket_id = %id, "WebSocket closed by remote");
                            break;
                        }

                        Some(Err(e)) => {
                            error!(socket_id = %id, error = %e, "WebSocket error");
                            break;
                        }

                        None => {
                            debug!(socket_id = %id, "WebSocket stream ended");
                            break;
                        }

                        // Text, Ping, Pong, raw frames: not part of the
                        // binary bridge contract.
                        _ => {}
                    }
                }

                // Outbound buffers from send().
                command = outbound_rx.recv() => {
                    match command {
                        Some(data) => {
                            if let Err(e) = ws_write.send(Message::Binary(data.into())).await {
                                warn!(socket_id = %id, error = %e, "Outbound send failed");
                                break;
                            }
                        }

                        None => {
                            // close() dropped the sender; say goodbye.
                            debug!(socket_id = %id, "Close requested");
                            let _ = ws_write.close().await;
                            break;
                        }
                    }
                }

                // Queue full: hold off reading, re-check shortly.
                () = tokio::time::sleep(QUEUE_FULL_BACKOFF), if !room => {
                    trace!(socket_id = %id, "Inbound queue full; deferring reads");
                }
            }
        }

        shared.force_closed();
        debug!(socket_id = %id, "Transport I/O loop terminated");
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("id", &self.id)
            .field("url", &self.options.url)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================


// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod prop_tests {
    use super::*;

    use proptest::prelude::*;

    proptest! {
        /// Any sequence of queued messages drains in exactly arrival
        /// order, followed by an empty poll.
        #[test]
        fn queue_drains_in_arrival_order(
            messages in proptest::collection::vec(
                proptest::collection::vec(any::<u8>(), 0..64),
                0..32,
            )
        ) {
            let queue = InboundQueue::new(None);
            for message in &messages {
                prop_assert!(queue.push(message.clone()));
            }

            for message in &messages {
                let popped = queue.pop();
                prop_assert_eq!(popped.as_ref(), Some(message));
            }
            prop_assert_eq!(queue.pop(), None);
        }

        /// A bounded queue never exceeds its bound and preserves order for
        /// everything it accepted.
        #[test]
        fn bounded_queue_never_overfills(
            bound in 1usize..8,
            messages in proptest::collection::vec(
                proptest::collection::vec(any::<u8>(), 0..16),
                0..32,
            )
        ) {
            let queue = InboundQueue::new(Some(bound));
            let mut accepted = Vec::new();

            for message in &messages {
                if queue.push(message.clone()) {
                    accepted.push(message.clone());
                }
                prop_assert!(queue.len() <= bound);
            }

            for message in &accepted {
                let popped = queue.pop();
                prop_assert_eq!(popped.as_ref(), Some(message));
            }
            prop_assert_eq!(queue.pop(), None);
        }
    }
}
