//! Receive-path counters

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::DecodeError;

/// Counters updated by the receive thread, readable from any thread.
#[derive(Debug, Default)]
pub struct ReceiverStats {
    datagrams: AtomicU64,
    bytes: AtomicU64,
    accepted: AtomicU64,
    rejected_length: AtomicU64,
    rejected_marker: AtomicU64,
    io_errors: AtomicU64,
}

/// Point-in-time copy of [`ReceiverStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiverStatsSnapshot {
    pub datagrams: u64,
    pub bytes: u64,
    pub accepted: u64,
    pub rejected_length: u64,
    pub rejected_marker: u64,
    pub io_errors: u64,
}

impl ReceiverStatsSnapshot {
    /// Datagrams dropped by the decoder.
    pub fn rejected(&self) -> u64 {
        self.rejected_length + self.rejected_marker
    }
}

impl ReceiverStats {
    pub(crate) fn record_datagram(&self, len: usize) {
        self.datagrams.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(len as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self, error: &DecodeError) {
        let counter = match error {
            DecodeError::Length { .. } => &self.rejected_length,
            DecodeError::Marker { .. } => &self.rejected_marker,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_io_error(&self) {
        self.io_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ReceiverStatsSnapshot {
        ReceiverStatsSnapshot {
            datagrams: self.datagrams.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected_length: self.rejected_length.load(Ordering::Relaxed),
            rejected_marker: self.rejected_marker.load(Ordering::Relaxed),
            io_errors: self.io_errors.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejections_are_split_by_reason() {
        let stats = ReceiverStats::default();
        stats.record_datagram(29);
        stats.record_accepted();
        stats.record_datagram(4);
        stats.record_rejected(&DecodeError::Length { expected: 29, found: 4 });
        stats.record_datagram(29);
        stats.record_rejected(&DecodeError::Marker { found: 0 });

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.datagrams, 3);
        assert_eq!(snapshot.bytes, 62);
        assert_eq!(snapshot.accepted, 1);
        assert_eq!(snapshot.rejected_length, 1);
        assert_eq!(snapshot.rejected_marker, 1);
        assert_eq!(snapshot.rejected(), 2);
        assert_eq!(snapshot.io_errors, 0);
    }
}
