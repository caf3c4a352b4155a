//! FreeD D1 camera-tracking ingest.
//!
//! freed-link receives FreeD D1 telemetry over UDP, keeps the latest pose/lens sample
//! per device and converts samples into position + quaternion transforms for a
//! downstream consumer.
//!
//! # Features
//!
//! - **Codec**: exact 29-byte D1 decode/encode with 24-bit sign extension
//! - **Receiver**: dedicated receive thread, unicast or multicast, prompt stop
//! - **Store**: per-device latest sample with per-slot locking, no torn reads
//! - **Publishing**: pull-based ticks into any [`Sink`], optional tokio driver
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use freed_link::{FreeD, Sink, SubjectId, SubjectRole, Transform};
//!
//! struct Printer;
//!
//! impl Sink for Printer {
//!     fn declare_subject(&mut self, _subject: &SubjectId, _role: SubjectRole) {}
//!
//!     fn update_subject_frame(&mut self, subject: &SubjectId, transform: Transform) {
//!         println!("{subject}: {:?}", transform.position);
//!     }
//! }
//!
//! fn main() -> freed_link::Result<()> {
//!     let mut source = FreeD::listen("0.0.0.0:6301".parse()?);
//!     println!("{}", source.status());
//!
//!     // Call once per frame from the consumer's own loop
//!     source.update(&mut Printer);
//!
//!     source.request_shutdown();
//!     Ok(())
//! }
//! ```

// Core types and error handling
mod error;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Wire format and pose math
pub mod codec;
pub mod pose;

// Shared state and ingest
pub mod config;
pub mod receiver;
pub mod store;

// Consumer side
pub mod driver;
pub mod publisher;
pub mod source;

// Core exports
pub use error::*;
pub use types::*;

pub use config::ReceiverConfig;
pub use driver::PublishDriver;
pub use publisher::{Publisher, Sink};
pub use receiver::{Receiver, ReceiverState, ReceiverStatsSnapshot, ReceiverStatus};
pub use source::Source;
pub use store::SampleStore;

/// Unified entry point for FreeD sources.
pub struct FreeD;

impl FreeD {
    /// Listen on `endpoint` with the default configuration.
    ///
    /// Never fails; check [`Source::status`] or [`Source::is_valid`] to see whether
    /// the socket came up.
    pub fn listen(endpoint: Endpoint) -> Source {
        Source::open(endpoint, ReceiverConfig::default())
    }

    /// Listen on `endpoint` with a custom configuration.
    pub fn listen_with(endpoint: Endpoint, config: ReceiverConfig) -> Source {
        Source::open(endpoint, config)
    }
}
