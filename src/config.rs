//! Receiver configuration
//!
//! Every field has a default, so a YAML document only needs the keys it changes:
//!
//! ```rust
//! use freed_link::ReceiverConfig;
//!
//! let config = ReceiverConfig::from_yaml("publish_hz: 50\nmulticast_ttl: 4\n").unwrap();
//! assert_eq!(config.publish_hz, 50);
//! assert_eq!(config.wait_timeout_ms, 10);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::codec::D1_PACKET_SIZE;
use crate::{FreedError, Result};

/// Default socket receive buffer (1 MiB).
pub const DEFAULT_RECV_BUFFER_SIZE: usize = 1024 * 1024;

/// Socket and loop settings for a [`crate::Receiver`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReceiverConfig {
    /// Upper bound on one readiness wait; also bounds how late a stop is noticed
    pub wait_timeout_ms: u64,

    /// Requested `SO_RCVBUF` size in bytes
    pub recv_buffer_size: usize,

    /// Set `SO_REUSEADDR` before binding
    pub reuse_address: bool,

    /// Deliver locally sent multicast datagrams
    pub multicast_loopback: bool,

    /// IPv4 multicast TTL
    pub multicast_ttl: u32,

    /// Tick rate of the optional publish driver
    pub publish_hz: u32,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            wait_timeout_ms: 10,
            recv_buffer_size: DEFAULT_RECV_BUFFER_SIZE,
            reuse_address: true,
            multicast_loopback: true,
            multicast_ttl: 2,
            publish_hz: 60,
        }
    }
}

impl ReceiverConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)
            .map_err(|e| FreedError::config_error(format!("invalid receiver config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that would make the receiver misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.wait_timeout_ms == 0 {
            return Err(FreedError::config_error(
                "wait_timeout_ms must be greater than zero (a zero wait busy-spins)",
            ));
        }
        if self.recv_buffer_size < D1_PACKET_SIZE {
            return Err(FreedError::config_error(format!(
                "recv_buffer_size must hold at least one packet ({} bytes), got {}",
                D1_PACKET_SIZE, self.recv_buffer_size
            )));
        }
        if self.publish_hz == 0 {
            return Err(FreedError::config_error("publish_hz must be greater than zero"));
        }
        Ok(())
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    /// Interval between publish ticks.
    pub fn publish_period(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.publish_hz.max(1)))
    }
}
