//! One FreeD transport as seen by a consumer
//!
//! A [`Source`] wires a [`SampleStore`], a [`Receiver`] and a [`Publisher`] for a
//! single endpoint. Opening never fails: when the socket cannot be set up the
//! source reports [`ReceiverStatus::DeviceNotFound`] and stays invalid, and the
//! caller decides whether to build a new one.

use std::sync::Arc;

use tracing::warn;

use crate::config::ReceiverConfig;
use crate::publisher::{Publisher, Sink};
use crate::receiver::{Receiver, ReceiverStatsSnapshot, ReceiverStatus};
use crate::store::SampleStore;
use crate::types::Endpoint;

pub struct Source {
    receiver: Receiver,
    publisher: Publisher,
}

impl Source {
    /// Start receiving on `endpoint`.
    pub fn open(endpoint: Endpoint, config: ReceiverConfig) -> Self {
        let store = Arc::new(SampleStore::new());
        let publisher = Publisher::new(Arc::clone(&store), endpoint);

        let mut receiver = Receiver::new(endpoint, config, store);
        // Failure is reported through status()
        let _ = receiver.start();

        Self { receiver, publisher }
    }

    /// Publish the latest sample of every known device to `sink`.
    pub fn update<S: Sink + ?Sized>(&self, sink: &mut S) -> usize {
        self.publisher.publish(sink)
    }

    /// Stop receiving. Always succeeds and may be called repeatedly.
    pub fn request_shutdown(&mut self) -> bool {
        if self.receiver.stop().is_err() {
            warn!(endpoint = %self.endpoint(), "Source shut down after receive thread panic");
        }
        true
    }

    pub fn is_valid(&self) -> bool {
        self.receiver.is_valid()
    }

    pub fn status(&self) -> &ReceiverStatus {
        self.receiver.status()
    }

    pub fn endpoint(&self) -> Endpoint {
        self.receiver.endpoint()
    }

    pub fn receiver(&self) -> &Receiver {
        &self.receiver
    }

    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    pub fn store(&self) -> &Arc<SampleStore> {
        self.receiver.store()
    }

    pub fn stats(&self) -> ReceiverStatsSnapshot {
        self.receiver.stats()
    }
}
