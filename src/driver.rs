//! Driver runs publish ticks on a tokio interval

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

use crate::publisher::{Publisher, Sink};

/// Periodic publish task for consumers without their own tick source.
///
/// Must be spawned from within a tokio runtime. Dropping the driver cancels the task.
pub struct PublishDriver {
    cancel: CancellationToken,
    task: JoinHandle<u64>,
    _guard: DropGuard,
}

impl PublishDriver {
    /// Spawn a task that calls [`Publisher::publish`] every `period` until cancelled.
    pub fn spawn<S>(publisher: Publisher, mut sink: S, period: Duration) -> Self
    where
        S: Sink + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let cancel_task = cancel.clone();

        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            // Delay rather than burst after a stall
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            info!(endpoint = %publisher.endpoint(), ?period, "Publish driver started");
            let mut ticks = 0u64;

            loop {
                tokio::select! {
                    biased;
                    _ = cancel_task.cancelled() => break,
                    _ = ticker.tick() => {
                        publisher.publish(&mut sink);
                        ticks += 1;
                    }
                }
            }

            debug!(ticks, "Publish driver ended");
            ticks
        });

        let _guard = cancel.clone().drop_guard();
        Self { cancel, task, _guard }
    }

    /// Token that stops the driver when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop the task and wait for it. Returns the number of ticks run.
    pub async fn shutdown(self) -> u64 {
        self.cancel.cancel();
        match self.task.await {
            Ok(ticks) => ticks,
            Err(e) => {
                warn!(error = %e, "Publish task failed");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SampleStore;
    use crate::test_utils::camera_sample;
    use crate::types::{Endpoint, SubjectId, SubjectRole, Transform};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CountingSink {
        updates: Arc<Mutex<Vec<SubjectId>>>,
    }

    impl Sink for CountingSink {
        fn declare_subject(&mut self, _subject: &SubjectId, _role: SubjectRole) {}

        fn update_subject_frame(&mut self, subject: &SubjectId, _transform: Transform) {
            self.updates.lock().unwrap().push(subject.clone());
        }
    }

    #[tokio::test]
    async fn driver_publishes_until_shutdown() {
        let store = Arc::new(SampleStore::new());
        store.record(camera_sample(4));
        let publisher = Publisher::new(Arc::clone(&store), Endpoint::localhost(6301));

        let sink = CountingSink::default();
        let updates = Arc::clone(&sink.updates);
        let driver = PublishDriver::spawn(publisher, sink, Duration::from_millis(5));

        tokio::time::sleep(Duration::from_millis(60)).await;
        let ticks = driver.shutdown().await;

        let seen = updates.lock().unwrap().len() as u64;
        assert!(ticks >= 2, "only {ticks} ticks ran");
        assert_eq!(seen, ticks);
        assert_eq!(updates.lock().unwrap()[0].as_str(), "4@127.0.0.1:6301");

        // Nothing is published after shutdown returns
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(updates.lock().unwrap().len() as u64, seen);
    }

    #[tokio::test]
    async fn external_cancellation_ends_the_task() {
        let publisher = Publisher::new(Arc::new(SampleStore::new()), Endpoint::localhost(6301));
        let driver =
            PublishDriver::spawn(publisher, CountingSink::default(), Duration::from_millis(1));

        driver.cancellation_token().cancel();
        let ticks = driver.shutdown().await;
        assert!(ticks <= 1);
    }

    #[tokio::test]
    async fn dropping_the_driver_stops_publishing() {
        let store = Arc::new(SampleStore::new());
        store.record(camera_sample(2));
        let publisher = Publisher::new(Arc::clone(&store), Endpoint::localhost(6301));

        let sink = CountingSink::default();
        let updates = Arc::clone(&sink.updates);
        let driver = PublishDriver::spawn(publisher, sink, Duration::from_millis(5));

        tokio::time::sleep(Duration::from_millis(30)).await;
        drop(driver);
        tokio::time::sleep(Duration::from_millis(20)).await;

        let seen = updates.lock().unwrap().len();
        assert!(seen >= 1);
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(updates.lock().unwrap().len(), seen);
    }

    struct PanickingSink;

    impl Sink for PanickingSink {
        fn declare_subject(&mut self, _subject: &SubjectId, _role: SubjectRole) {}

        fn update_subject_frame(&mut self, _subject: &SubjectId, _transform: Transform) {
            panic!("sink failure");
        }
    }

    #[tokio::test]
    async fn panicked_task_reports_zero_ticks() {
        let store = Arc::new(SampleStore::new());
        store.record(camera_sample(1));
        let publisher = Publisher::new(store, Endpoint::localhost(6301));

        let driver = PublishDriver::spawn(publisher, PanickingSink, Duration::from_millis(1));
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(driver.shutdown().await, 0);
    }
}
