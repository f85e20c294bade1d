//! Opaque handles to objects living inside the foreign engine.
//!
//! The engine returns its internal objects as raw non-zero integers and
//! uses `0` as the null result. Each handle kind gets its own newtype so
//! a channel can never be passed where a session is expected, and the
//! null case surfaces as `Option` instead of a magic value.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::num::NonZeroU32;

// ============================================================================
// Handle definitions
// ============================================================================

macro_rules! define_handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(NonZeroU32);

        impl $name {
            /// Wraps a raw engine value; `0` is the engine's null and
            /// yields `None`.
            #[inline]
            #[must_use]
            pub fn from_raw(raw: u32) -> Option<Self> {
                NonZeroU32::new(raw).map(Self)
            }

            /// Returns the raw value to pass back to the engine.
            #[inline]
            #[must_use]
            pub const fn as_raw(self) -> u32 {
                self.0.get()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_handle! {
    /// An SSH session inside the engine.
    SessionHandle
}

define_handle! {
    /// A channel opened on a session.
    ChannelHandle
}

define_handle! {
    /// An SFTP subsystem instance.
    SftpHandle
}

define_handle! {
    /// An open SFTP file or directory.
    SftpFileHandle
}

define_handle! {
    /// A remote port-forward listener.
    ListenerHandle
}

define_handle! {
    /// A known-hosts collection.
    KnownHostsHandle
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_null() {
        assert!(SessionHandle::from_raw(0).is_none());
        assert!(ChannelHandle::from_raw(0).is_none());
        assert!(SftpHandle::from_raw(0).is_none());
        assert!(SftpFileHandle::from_raw(0).is_none());
        assert!(ListenerHandle::from_raw(0).is_none());
        assert!(KnownHostsHandle::from_raw(0).is_none());
    }

    #[test]
    fn test_raw_roundtrip() {
        let handle = SessionHandle::from_raw(0x00A1_B2C3).expect("non-zero");
        assert_eq!(handle.as_raw(), 0x00A1_B2C3);
    }

    #[test]
    fn test_display_shows_raw_value() {
        let handle = ChannelHandle::from_raw(42).expect("non-zero");
        assert_eq!(handle.to_string(), "42");
    }

    #[test]
    fn test_handles_are_distinct_types() {
        // Purely a compile-time property; the assert keeps the test body
        // honest at runtime.
        let session = SessionHandle::from_raw(7).expect("non-zero");
        let channel = ChannelHandle::from_raw(7).expect("non-zero");
        assert_eq!(session.as_raw(), channel.as_raw());
    }
}
