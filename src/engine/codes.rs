//! Numeric result codes shared with the foreign engine.
//!
//! The engine reports every failure as a negative integer and reserves
//! zero for success. The bridge speaks the same dialect at the callback
//! boundary: [`ErrorCode::Eagain`] is the "try again later" answer the
//! engine's polling loop expects, and the socket-level codes mark faults
//! the engine treats as fatal for the connection.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

// ============================================================================
// ErrorCode
// ============================================================================

/// Result codes of the foreign engine, verbatim.
///
/// Only a handful matter to the bridge itself (`Eagain`, `SocketSend`,
/// `SocketRecv`); the rest pass through so callers can interpret any
/// engine return value without a second table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    /// Success.
    None = 0,
    SocketNone = -1,
    BannerRecv = -2,
    BannerSend = -3,
    InvalidMac = -4,
    KexFailure = -5,
    Alloc = -6,
    /// Fatal fault on the send path. The bridge returns this when the
    /// engine hands over an unreadable buffer.
    SocketSend = -7,
    KeyExchangeFailure = -8,
    Timeout = -9,
    HostkeyInit = -10,
    HostkeySign = -11,
    Decrypt = -12,
    SocketDisconnect = -13,
    Proto = -14,
    PasswordExpired = -15,
    File = -16,
    MethodNone = -17,
    AuthenticationFailed = -18,
    PublickeyUnrecognized = -19,
    PublickeyUnverified = -20,
    ChannelOutoforder = -21,
    ChannelFailure = -22,
    ChannelRequestDenied = -23,
    ChannelUnknown = -24,
    ChannelWindowExceeded = -25,
    ChannelPacketExceeded = -26,
    ChannelClosed = -27,
    ChannelEofSent = -28,
    ScpProtocol = -29,
    Zlib = -30,
    SocketTimeout = -31,
    SftpProtocol = -32,
    RequestDenied = -33,
    MethodNotSupported = -34,
    Inval = -35,
    InvalidPollType = -36,
    /// Would block. Not a failure: the engine re-polls on this code.
    Eagain = -37,
    BufferTooSmall = -38,
    BadUse = -39,
    Compress = -40,
    OutOfBoundary = -41,
    AgentProtocol = -42,
    /// Fatal fault on the receive path. The bridge returns this when the
    /// engine hands over an unwritable buffer.
    SocketRecv = -43,
    Encrypt = -44,
    BadSocket = -45,
    KnownHosts = -46,
    ChannelWindowFull = -47,
    KeyfileAuthFailed = -48,
}

impl ErrorCode {
    /// Returns the raw integer the engine understands.
    #[inline]
    #[must_use]
    pub const fn as_raw(self) -> i32 {
        self as i32
    }

    /// Maps a raw engine return value back to a code.
    ///
    /// Positive values are byte counts, not codes; they map to `None`
    /// here just like `0` would at the engine boundary.
    #[must_use]
    pub fn from_raw(raw: i32) -> Option<Self> {
        let code = match raw {
            0.. => Self::None,
            -1 => Self::SocketNone,
            -2 => Self::BannerRecv,
            -3 => Self::BannerSend,
            -4 => Self::InvalidMac,
            -5 => Self::KexFailure,
            -6 => Self::Alloc,
            -7 => Self::SocketSend,
            -8 => Self::KeyExchangeFailure,
            -9 => Self::Timeout,
            -10 => Self::HostkeyInit,
            -11 => Self::HostkeySign,
            -12 => Self::Decrypt,
            -13 => Self::SocketDisconnect,
            -14 => Self::Proto,
            -15 => Self::PasswordExpired,
            -16 => Self::File,
            -17 => Self::MethodNone,
            -18 => Self::AuthenticationFailed,
            -19 => Self::PublickeyUnrecognized,
            -20 => Self::PublickeyUnverified,
            -21 => Self::ChannelOutoforder,
            -22 => Self::ChannelFailure,
            -23 => Self::ChannelRequestDenied,
            -24 => Self::ChannelUnknown,
            -25 => Self::ChannelWindowExceeded,
            -26 => Self::ChannelPacketExceeded,
            -27 => Self::ChannelClosed,
            -28 => Self::ChannelEofSent,
            -29 => Self::ScpProtocol,
            -30 => Self::Zlib,
            -31 => Self::SocketTimeout,
            -32 => Self::SftpProtocol,
            -33 => Self::RequestDenied,
            -34 => Self::MethodNotSupported,
            -35 => Self::Inval,
            -36 => Self::InvalidPollType,
            -37 => Self::Eagain,
            -38 => Self::BufferTooSmall,
            -39 => Self::BadUse,
            -40 => Self::Compress,
            -41 => Self::OutOfBoundary,
            -42 => Self::AgentProtocol,
            -43 => Self::SocketRecv,
            -44 => Self::Encrypt,
            -45 => Self::BadSocket,
            -46 => Self::KnownHosts,
            -47 => Self::ChannelWindowFull,
            -48 => Self::KeyfileAuthFailed,
            _ => return None,
        };
        Some(code)
    }

    /// Canonical constant name, `EAGAIN` style.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::SocketNone => "SOCKET_NONE",
            Self::BannerRecv => "BANNER_RECV",
            Self::BannerSend => "BANNER_SEND",
            Self::InvalidMac => "INVALID_MAC",
            Self::KexFailure => "KEX_FAILURE",
            Self::Alloc => "ALLOC",
            Self::SocketSend => "SOCKET_SEND",
            Self::KeyExchangeFailure => "KEY_EXCHANGE_FAILURE",
            Self::Timeout => "TIMEOUT",
            Self::HostkeyInit => "HOSTKEY_INIT",
            Self::HostkeySign => "HOSTKEY_SIGN",
            Self::Decrypt => "DECRYPT",
            Self::SocketDisconnect => "SOCKET_DISCONNECT",
            Self::Proto => "PROTO",
            Self::PasswordExpired => "PASSWORD_EXPIRED",
            Self::File => "FILE",
            Self::MethodNone => "METHOD_NONE",
            Self::AuthenticationFailed => "AUTHENTICATION_FAILED",
            Self::PublickeyUnrecognized => "PUBLICKEY_UNRECOGNIZED",
            Self::PublickeyUnverified => "PUBLICKEY_UNVERIFIED",
            Self::ChannelOutoforder => "CHANNEL_OUTOFORDER",
            Self::ChannelFailure => "CHANNEL_FAILURE",
            Self::ChannelRequestDenied => "CHANNEL_REQUEST_DENIED",
            Self::ChannelUnknown => "CHANNEL_UNKNOWN",
            Self::ChannelWindowExceeded => "CHANNEL_WINDOW_EXCEEDED",
            Self::ChannelPacketExceeded => "CHANNEL_PACKET_EXCEEDED",
            Self::ChannelClosed => "CHANNEL_CLOSED",
            Self::ChannelEofSent => "CHANNEL_EOF_SENT",
            Self::ScpProtocol => "SCP_PROTOCOL",
            Self::Zlib => "ZLIB",
            Self::SocketTimeout => "SOCKET_TIMEOUT",
            Self::SftpProtocol => "SFTP_PROTOCOL",
            Self::RequestDenied => "REQUEST_DENIED",
            Self::MethodNotSupported => "METHOD_NOT_SUPPORTED",
            Self::Inval => "INVAL",
            Self::InvalidPollType => "INVALID_POLL_TYPE",
            Self::Eagain => "EAGAIN",
            Self::BufferTooSmall => "BUFFER_TOO_SMALL",
            Self::BadUse => "BAD_USE",
            Self::Compress => "COMPRESS",
            Self::OutOfBoundary => "OUT_OF_BOUNDARY",
            Self::AgentProtocol => "AGENT_PROTOCOL",
            Self::SocketRecv => "SOCKET_RECV",
            Self::Encrypt => "ENCRYPT",
            Self::BadSocket => "BAD_SOCKET",
            Self::KnownHosts => "KNOWN_HOSTS",
            Self::ChannelWindowFull => "CHANNEL_WINDOW_FULL",
            Self::KeyfileAuthFailed => "KEYFILE_AUTH_FAILED",
        }
    }

    /// Returns `true` for the non-fatal "re-poll later" code.
    #[inline]
    #[must_use]
    pub const fn is_would_block(self) -> bool {
        matches!(self, Self::Eagain)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_raw())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_sentinels() {
        assert_eq!(ErrorCode::Eagain.as_raw(), -37);
        assert_eq!(ErrorCode::SocketSend.as_raw(), -7);
        assert_eq!(ErrorCode::SocketRecv.as_raw(), -43);
        assert_eq!(ErrorCode::None.as_raw(), 0);
    }

    #[test]
    fn test_from_raw_roundtrip() {
        for raw in -48..=0 {
            let code = ErrorCode::from_raw(raw).expect("every code in range maps");
            assert_eq!(code.as_raw(), raw);
        }
    }

    #[test]
    fn test_from_raw_out_of_range() {
        assert_eq!(ErrorCode::from_raw(-49), None);
        assert_eq!(ErrorCode::from_raw(i32::MIN), None);
    }

    #[test]
    fn test_positive_values_are_success() {
        assert_eq!(ErrorCode::from_raw(1), Some(ErrorCode::None));
        assert_eq!(ErrorCode::from_raw(4096), Some(ErrorCode::None));
    }

    #[test]
    fn test_would_block_is_only_eagain() {
        assert!(ErrorCode::Eagain.is_would_block());
        assert!(!ErrorCode::SocketSend.is_would_block());
        assert!(!ErrorCode::Timeout.is_would_block());
        assert!(!ErrorCode::None.is_would_block());
    }

    #[test]
    fn test_display_includes_name_and_value() {
        assert_eq!(ErrorCode::Eagain.to_string(), "EAGAIN (-37)");
        assert_eq!(ErrorCode::None.to_string(), "NONE (0)");
    }
}
