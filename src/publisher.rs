//! Publishing latest samples to an external sink
//!
//! A [`Publisher`] is ticked from outside (a render loop, a timer, or
//! [`crate::driver::PublishDriver`]). Each tick reads every present slot of the
//! [`SampleStore`], converts it with [`crate::pose::convert`] and hands the result to
//! a [`Sink`] as a declare + update pair.

use std::sync::Arc;

use tracing::trace;

use crate::pose;
use crate::store::SampleStore;
use crate::types::{Endpoint, SubjectId, SubjectRole, Transform};

/// Consumer of named pose updates.
///
/// `declare_subject` is called before every `update_subject_frame` and must be
/// idempotent.
pub trait Sink {
    fn declare_subject(&mut self, subject: &SubjectId, role: SubjectRole);

    fn update_subject_frame(&mut self, subject: &SubjectId, transform: Transform);
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn declare_subject(&mut self, subject: &SubjectId, role: SubjectRole) {
        (**self).declare_subject(subject, role);
    }

    fn update_subject_frame(&mut self, subject: &SubjectId, transform: Transform) {
        (**self).update_subject_frame(subject, transform);
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn declare_subject(&mut self, subject: &SubjectId, role: SubjectRole) {
        (**self).declare_subject(subject, role);
    }

    fn update_subject_frame(&mut self, subject: &SubjectId, transform: Transform) {
        (**self).update_subject_frame(subject, transform);
    }
}

/// Reads the store and emits one subject per present device.
#[derive(Debug, Clone)]
pub struct Publisher {
    store: Arc<SampleStore>,
    endpoint: Endpoint,
}

impl Publisher {
    pub fn new(store: Arc<SampleStore>, endpoint: Endpoint) -> Self {
        Self { store, endpoint }
    }

    /// Run one publish tick. Returns the number of subjects updated.
    pub fn publish<S: Sink + ?Sized>(&self, sink: &mut S) -> usize {
        let mut published = 0;

        for (id, sample) in self.store.scan_present() {
            let subject = self.subject_id(id);
            let transform = pose::convert(&sample);

            sink.declare_subject(&subject, SubjectRole::Transform);
            sink.update_subject_frame(&subject, transform);
            published += 1;
        }

        trace!(published, "Publish tick");
        published
    }

    /// Subject name for device `id` on this publisher's endpoint.
    pub fn subject_id(&self, id: u8) -> SubjectId {
        SubjectId::new(id, &self.endpoint)
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::camera_sample;
    use crate::types::Sample;
    use glam::DVec3;

    #[derive(Debug, PartialEq)]
    enum Call {
        Declare(String, SubjectRole),
        Update(String, Transform),
    }

    #[derive(Default)]
    struct RecordingSink {
        calls: Vec<Call>,
    }

    impl Sink for RecordingSink {
        fn declare_subject(&mut self, subject: &SubjectId, role: SubjectRole) {
            self.calls.push(Call::Declare(subject.to_string(), role));
        }

        fn update_subject_frame(&mut self, subject: &SubjectId, transform: Transform) {
            self.calls.push(Call::Update(subject.to_string(), transform));
        }
    }

    fn publisher() -> (Arc<SampleStore>, Publisher) {
        let store = Arc::new(SampleStore::new());
        let endpoint: Endpoint = "192.168.1.20:6301".parse().unwrap();
        (Arc::clone(&store), Publisher::new(store, endpoint))
    }

    #[test]
    fn empty_store_publishes_nothing() {
        let (_, publisher) = publisher();
        let mut sink = RecordingSink::default();
        assert_eq!(publisher.publish(&mut sink), 0);
        assert!(sink.calls.is_empty());
    }

    #[test]
    fn each_present_device_is_declared_then_updated() {
        let (store, publisher) = publisher();
        store.record(Sample { x: 100.0, ..Sample::new(7) });
        store.record(camera_sample(2));

        let mut sink = RecordingSink::default();
        assert_eq!(publisher.publish(&mut sink), 2);

        assert_eq!(sink.calls.len(), 4);
        let declare = |name: &str| Call::Declare(name.into(), SubjectRole::Transform);
        assert_eq!(sink.calls[0], declare("2@192.168.1.20:6301"));
        assert!(matches!(&sink.calls[1], Call::Update(name, _) if name == "2@192.168.1.20:6301"));
        assert_eq!(sink.calls[2], declare("7@192.168.1.20:6301"));
        match &sink.calls[3] {
            Call::Update(name, transform) => {
                assert_eq!(name, "7@192.168.1.20:6301");
                assert_eq!(transform.position, DVec3::new(10.0, 0.0, 0.0));
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn repeated_ticks_redeclare_and_reuse_latest_sample() {
        let (store, publisher) = publisher();
        store.record(camera_sample(1));

        let mut sink = RecordingSink::default();
        publisher.publish(&mut sink);
        publisher.publish(&mut sink);

        assert_eq!(sink.calls.len(), 4);
        assert_eq!(sink.calls[0], sink.calls[2]);
        assert_eq!(sink.calls[1], sink.calls[3]);
    }

    #[test]
    fn publishes_through_trait_objects() {
        let (store, publisher) = publisher();
        store.record(camera_sample(3));

        let mut boxed: Box<dyn Sink> = Box::new(RecordingSink::default());
        assert_eq!(publisher.publish(&mut boxed), 1);
        assert_eq!(publisher.publish(boxed.as_mut()), 1);
    }
}
