//! Error types for FreeD ingest.
//!
//! Two tiers of error exist:
//!
//! - **Packet errors** ([`DecodeError`], [`EncodeError`]) are small `Copy` values produced
//!   by the codec. Decode errors are local and non-fatal: the receive loop counts them and
//!   drops the datagram.
//! - **Operational errors** ([`FreedError`]) cover socket setup, lifecycle misuse and
//!   configuration, and carry structured context for logging.
//!
//! ## Recovery
//!
//! ```rust
//! use freed_link::FreedError;
//!
//! let error = FreedError::config_error("wait_timeout_ms must be greater than zero");
//! if !error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use thiserror::Error;

use crate::types::Endpoint;

/// Result type alias for FreeD operations.
pub type Result<T, E = FreedError> = std::result::Result<T, E>;

/// Reasons a datagram is rejected by [`crate::codec::decode`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("D1 packet must be {expected} bytes, got {found}")]
    Length { expected: usize, found: usize },

    #[error("Unexpected packet marker {found:#04x} (expected 0xd1)")]
    Marker { found: u8 },
}

/// Reasons [`crate::codec::encode`] refuses to write.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    #[error("Destination buffer holds {available} bytes, {required} required")]
    BufferTooSmall { required: usize, available: usize },
}

/// Main error type for receiver and configuration operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FreedError {
    #[error("Packet decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("Packet encode failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("Failed to open socket for {endpoint}: {reason}")]
    Socket {
        endpoint: Endpoint,
        reason: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot {operation} while receiver is {state}")]
    InvalidState { operation: &'static str, state: &'static str },

    #[error("Failed to spawn receive thread")]
    ThreadSpawn {
        #[source]
        source: std::io::Error,
    },

    #[error("Receive thread panicked")]
    ThreadPanicked,

    #[error("Configuration error: {details}")]
    Config { details: String },
}

impl FreedError {
    /// Returns whether this error is potentially recoverable by reconstructing the receiver.
    pub fn is_retryable(&self) -> bool {
        match self {
            FreedError::Socket { .. } => true,
            FreedError::ThreadSpawn { .. } => true,
            FreedError::ThreadPanicked => true,
            FreedError::Decode(_) => false,
            FreedError::Encode(_) => false,
            FreedError::InvalidState { .. } => false,
            FreedError::Config { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            FreedError::Decode(_) => vec![
                "Check the sender emits FreeD D1 packets",
                "Verify nothing else transmits on the same port",
            ],
            FreedError::Encode(_) => vec!["Supply a destination buffer of at least 29 bytes"],
            FreedError::Socket { .. } => vec![
                "Check the address is assigned to a local interface",
                "Check no other process holds the port without SO_REUSEADDR",
                "Verify a multicast route exists for group addresses",
                "Construct a new receiver once the network is available",
            ],
            FreedError::InvalidState { .. } => {
                vec!["Create a new receiver instead of restarting a stopped one"]
            }
            FreedError::ThreadSpawn { .. } => vec![
                "Check process thread limits",
                "Construct a new receiver",
            ],
            FreedError::ThreadPanicked => vec![
                "Inspect logs from the freed_rx span",
                "Construct a new receiver",
            ],
            FreedError::Config { .. } => vec![
                "Check configuration values against their documented ranges",
                "Remove the field to fall back to its default",
            ],
        }
    }

    /// Helper constructor for socket setup failures.
    pub fn socket_error(endpoint: Endpoint, source: std::io::Error) -> Self {
        FreedError::Socket { endpoint, reason: source.to_string(), source }
    }

    /// Helper constructor for configuration errors.
    pub fn config_error(details: impl Into<String>) -> Self {
        FreedError::Config { details: details.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::net::{Ipv4Addr, SocketAddr};

    proptest! {
        #[test]
        fn decode_error_messages_carry_their_context(
            expected in 0usize..64,
            found in 0usize..4096,
            marker in any::<u8>()
        ) {
            let length = DecodeError::Length { expected, found }.to_string();
            prop_assert!(length.contains(&expected.to_string()));
            prop_assert!(length.contains(&found.to_string()));

            let marker_msg = DecodeError::Marker { found: marker }.to_string();
            let hex = format!("{marker:#04x}");
            prop_assert!(marker_msg.contains(&hex), "{} missing {}", marker_msg, hex);
        }

        #[test]
        fn config_errors_keep_details(details in ".*") {
            let error = FreedError::config_error(details.clone());
            prop_assert!(error.to_string().contains(&details));
            prop_assert!(!error.is_retryable());
        }
    }

    #[test]
    fn socket_error_keeps_source_chain() {
        let endpoint = Endpoint::from(SocketAddr::from((Ipv4Addr::LOCALHOST, 6301)));
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use");
        let error = FreedError::socket_error(endpoint, io);

        assert!(error.to_string().contains("127.0.0.1:6301"));
        assert!(error.is_retryable());
        let source = std::error::Error::source(&error).expect("source should be kept");
        assert_eq!(source.to_string(), "address in use");
    }

    #[test]
    fn packet_errors_convert_into_freed_error() {
        let error: FreedError = DecodeError::Marker { found: 0x00 }.into();
        assert!(matches!(error, FreedError::Decode(DecodeError::Marker { found: 0 })));

        let error: FreedError = EncodeError::BufferTooSmall { required: 29, available: 4 }.into();
        assert!(matches!(error, FreedError::Encode(_)));
    }

    #[test]
    fn error_traits_validation() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<FreedError>();
        assert_send_sync_static::<DecodeError>();
    }

    #[test]
    fn recovery_suggestions_are_never_empty() {
        let errors = [
            FreedError::Decode(DecodeError::Length { expected: 29, found: 0 }),
            FreedError::Encode(EncodeError::BufferTooSmall { required: 29, available: 0 }),
            FreedError::InvalidState { operation: "start", state: "Stopped" },
            FreedError::ThreadPanicked,
            FreedError::config_error("bad"),
        ];
        for error in &errors {
            assert!(!error.recovery_suggestions().is_empty(), "{error}");
        }
    }
}
