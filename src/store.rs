//! Latest-sample table shared between the receive thread and the publisher
//!
//! One slot per possible device identifier. Each slot has its own lock held only
//! for the copy of one [`Sample`], so a reader never observes a mixture of two
//! writes and writers for different devices never contend.

use parking_lot::Mutex;

use crate::types::Sample;

/// Number of slots: one per one-byte device identifier.
pub const SLOT_COUNT: usize = 256;

#[derive(Debug, Default, Clone, Copy)]
struct Slot {
    latest: Option<Sample>,
    arrivals: u64,
}

/// Fixed 256-slot table holding the most recent [`Sample`] per device.
pub struct SampleStore {
    slots: [Mutex<Slot>; SLOT_COUNT],
}

impl SampleStore {
    pub fn new() -> Self {
        Self { slots: std::array::from_fn(|_| Mutex::new(Slot::default())) }
    }

    /// Replace slot `id` with `sample` and bump its arrival counter.
    ///
    /// Callers on the receive path route by the decoded id (see [`Self::record`]).
    pub fn write(&self, id: u8, sample: Sample) {
        let mut slot = self.slots[id as usize].lock();
        slot.latest = Some(sample);
        slot.arrivals = slot.arrivals.wrapping_add(1);
    }

    /// Store `sample` in the slot named by its own id.
    pub fn record(&self, sample: Sample) {
        self.write(sample.id, sample);
    }

    /// Copy of the latest sample for `id`, if any has arrived.
    pub fn read(&self, id: u8) -> Option<Sample> {
        self.slots[id as usize].lock().latest
    }

    /// Number of samples written to `id` so far.
    pub fn arrivals(&self, id: u8) -> u64 {
        self.slots[id as usize].lock().arrivals
    }

    /// Whether any sample has arrived for `id`.
    pub fn is_present(&self, id: u8) -> bool {
        self.arrivals(id) > 0
    }

    /// Iterate over present slots in id order.
    ///
    /// Each slot is read independently; with concurrent writers, different ids may
    /// reflect different points in time.
    pub fn scan_present(&self) -> impl Iterator<Item = (u8, Sample)> + '_ {
        (0..=u8::MAX).filter_map(move |id| self.read(id).map(|sample| (id, sample)))
    }

    /// Number of slots that have received at least one sample.
    pub fn present_count(&self) -> usize {
        (0..=u8::MAX).filter(|&id| self.is_present(id)).count()
    }
}

impl Default for SampleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SampleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleStore").field("present", &self.present_count()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::camera_sample;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn write_then_read_returns_same_sample() {
        let store = SampleStore::new();
        let sample = camera_sample(5);
        store.write(5, sample);

        assert_eq!(store.read(5), Some(sample));
        assert_eq!(store.read(6), None);
        assert_eq!(store.arrivals(5), 1);
        assert!(!store.is_present(6));
    }

    #[test]
    fn later_write_wins_and_counts() {
        let store = SampleStore::new();
        store.record(Sample { pan: 1.0, ..Sample::new(9) });
        store.record(Sample { pan: 2.0, ..Sample::new(9) });

        assert_eq!(store.read(9).map(|s| s.pan), Some(2.0));
        assert_eq!(store.arrivals(9), 2);
    }

    #[test]
    fn scan_skips_absent_slots_in_id_order() {
        let store = SampleStore::new();
        for id in [200u8, 0, 17, 255] {
            store.record(camera_sample(id));
        }

        let ids: Vec<u8> = store.scan_present().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![0, 17, 200, 255]);
        assert_eq!(store.present_count(), 4);
        assert!(store.scan_present().all(|(id, sample)| sample.id == id));
    }

    #[test]
    fn concurrent_writers_on_distinct_ids_never_tear() {
        const WRITERS: u8 = 16;
        const ROUNDS: u32 = 2_000;

        let store = Arc::new(SampleStore::new());

        // Every field of a sample is derived from the same counter, so a torn read
        // shows up as fields that disagree with each other.
        let consistent = |id: u8, n: u32| Sample {
            id,
            pan: n as f64,
            tilt: n as f64,
            roll: n as f64,
            x: n as f64,
            y: n as f64,
            z: n as f64,
            zoom: n,
            focus: n,
            spare: (n as u16).to_be_bytes(),
        };

        let writers: Vec<_> = (0..WRITERS)
            .map(|id| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for n in 0..ROUNDS {
                        store.write(id, consistent(id, n));
                    }
                })
            })
            .collect();

        let reader = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..ROUNDS {
                    for (id, s) in store.scan_present() {
                        let n = s.zoom;
                        assert_eq!(s, consistent(id, n), "torn read on slot {id}");
                    }
                }
            })
        };

        for writer in writers {
            writer.join().unwrap();
        }
        reader.join().unwrap();

        for id in 0..WRITERS {
            assert_eq!(store.read(id), Some(consistent(id, ROUNDS - 1)));
            assert_eq!(store.arrivals(id), ROUNDS as u64);
        }
    }
}
