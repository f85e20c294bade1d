//! Transport configuration options.
//!
//! Provides a type-safe interface for configuring a [`Transport`]: endpoint
//! URL, WebSocket subprotocols, connect timeout, and the inbound queue
//! bound.
//!
//! [`Transport`]: super::Transport
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use ssh2_ws_bridge::TransportOptions;
//!
//! let options = TransportOptions::new("ws://gateway.local:8022/ssh")
//!     .with_protocol("ssh")
//!     .with_connect_timeout(Duration::from_secs(10))
//!     .with_max_queued_messages(256);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default timeout for the connection attempt (30s).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// TransportOptions
// ============================================================================

/// Configuration for one [`Transport`](super::Transport).
///
/// Controls the endpoint, the offered WebSocket subprotocols, how long a
/// connection attempt may take, and whether the inbound message queue is
/// bounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportOptions {
    /// WebSocket endpoint URL (`ws://` or `wss://`).
    pub url: String,

    /// Subprotocols offered during the WebSocket handshake.
    pub protocols: Vec<String>,

    /// Timeout for the connection attempt. `None` waits indefinitely for
    /// the underlying connection to report open or failure.
    pub connect_timeout: Option<Duration>,

    /// Upper bound on buffered inbound messages. `None` is unbounded.
    ///
    /// When the bound is reached the transport stops reading from the
    /// underlying connection until the engine drains the queue; nothing is
    /// ever dropped.
    pub max_queued_messages: Option<usize>,
}

// ============================================================================
// Constructors
// ============================================================================

impl TransportOptions {
    /// Creates options for the given endpoint URL with defaults: no
    /// subprotocols, a 30s connect timeout, and an unbounded queue.
    #[inline]
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            protocols: Vec::new(),
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
            max_queued_messages: None,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl TransportOptions {
    /// Offers a subprotocol during the handshake.
    #[inline]
    #[must_use]
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocols.push(protocol.into());
        self
    }

    /// Offers multiple subprotocols during the handshake.
    #[inline]
    #[must_use]
    pub fn with_protocols(
        mut self,
        protocols: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.protocols.extend(protocols.into_iter().map(Into::into));
        self
    }

    /// Sets the connect timeout.
    #[inline]
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Disables the connect timeout; the attempt then waits indefinitely
    /// for the underlying connection's own terminal event.
    #[inline]
    #[must_use]
    pub fn without_connect_timeout(mut self) -> Self {
        self.connect_timeout = None;
        self
    }

    /// Bounds the inbound message queue.
    #[inline]
    #[must_use]
    pub fn with_max_queued_messages(mut self, max: usize) -> Self {
        self.max_queued_messages = Some(max);
        self
    }
}

// ============================================================================
// Validation
// ============================================================================

impl TransportOptions {
    /// Validates the full configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::Url`] if the URL does not parse
    /// - [`Error::Config`] for a non-WebSocket scheme, a malformed
    ///   subprotocol token, or a zero queue bound
    pub fn validate(&self) -> Result<()> {
        self.parsed_url()?;
        self.validate_protocols()?;

        if self.max_queued_messages == Some(0) {
            return Err(Error::config(
                "max_queued_messages must be at least 1 (use None for unbounded)",
            ));
        }

        Ok(())
    }

    /// Parses and scheme-checks the endpoint URL.
    pub(crate) fn parsed_url(&self) -> Result<Url> {
        let url = Url::parse(&self.url)?;
        match url.scheme() {
            "ws" | "wss" => Ok(url),
            other => Err(Error::config(format!(
                "unsupported URL scheme: {other} (expected ws or wss)"
            ))),
        }
    }

    /// Returns the `Sec-WebSocket-Protocol` header value, if any
    /// subprotocols were configured.
    pub(crate) fn protocol_header(&self) -> Option<String> {
        if self.protocols.is_empty() {
            None
        } else {
            Some(self.protocols.join(", "))
        }
    }

    /// Checks that every subprotocol is a plausible header token.
    fn validate_protocols(&self) -> Result<()> {
        for protocol in &self.protocols {
            if protocol.is_empty() {
                return Err(Error::config("subprotocol must not be empty"));
            }
            if protocol
                .chars()
                .any(|c| c == ',' || c.is_whitespace() || c.is_control())
            {
                return Err(Error::config(format!(
                    "subprotocol contains invalid characters: {protocol:?}"
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults() {
        let options = TransportOptions::new("ws://127.0.0.1:9000");
        assert_eq!(options.url, "ws://127.0.0.1:9000");
        assert!(options.protocols.is_empty());
        assert_eq!(options.connect_timeout, Some(DEFAULT_CONNECT_TIMEOUT));
        assert!(options.max_queued_messages.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let options = TransportOptions::new("wss://gateway.local/ssh")
            .with_protocol("ssh")
            .with_connect_timeout(Duration::from_secs(5))
            .with_max_queued_messages(64);

        assert_eq!(options.protocols, vec!["ssh".to_string()]);
        assert_eq!(options.connect_timeout, Some(Duration::from_secs(5)));
        assert_eq!(options.max_queued_messages, Some(64));
    }

    #[test]
    fn test_with_protocols_multiple() {
        let options =
            TransportOptions::new("ws://h/").with_protocols(["ssh", "ssh-fallback"]);
        assert_eq!(options.protocols.len(), 2);
        assert_eq!(
            options.protocol_header().as_deref(),
            Some("ssh, ssh-fallback")
        );
    }

    #[test]
    fn test_protocol_header_empty_when_unset() {
        let options = TransportOptions::new("ws://h/");
        assert!(options.protocol_header().is_none());
    }

    #[test]
    fn test_without_connect_timeout() {
        let options = TransportOptions::new("ws://h/").without_connect_timeout();
        assert!(options.connect_timeout.is_none());
    }

    #[test]
    fn test_validate_accepts_ws_and_wss() {
        assert!(TransportOptions::new("ws://127.0.0.1:1/").validate().is_ok());
        assert!(TransportOptions::new("wss://example.com/ssh")
            .validate()
            .is_ok());
    }

    #[test]
    fn test_validate_rejects_http_scheme() {
        let err = TransportOptions::new("http://example.com/")
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("unsupported URL scheme"));
    }

    #[test]
    fn test_validate_rejects_garbage_url() {
        let err = TransportOptions::new("not a url").validate().unwrap_err();
        assert!(matches!(err, Error::Url(_)));
    }

    #[test]
    fn test_validate_rejects_empty_protocol() {
        let err = TransportOptions::new("ws://h/")
            .with_protocol("")
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("subprotocol"));
    }

    #[test]
    fn test_validate_rejects_protocol_with_comma() {
        let err = TransportOptions::new("ws://h/")
            .with_protocol("a,b")
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("invalid characters"));
    }

    #[test]
    fn test_validate_rejects_zero_queue_bound() {
        let err = TransportOptions::new("ws://h/")
            .with_max_queued_messages(0)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("max_queued_messages"));
    }
}
