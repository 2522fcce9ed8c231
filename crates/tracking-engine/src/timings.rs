//! Fixed-capacity ring of per-cycle timings.

use serde::Serialize;

use kickbot_tracking_model::Timings;

/// Stage timings tagged with the cycle that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CycleTimings {
    pub cycle: u64,
    #[serde(flatten)]
    pub timings: Timings,
}

/// Circular buffer that overwrites its oldest entry once full.
#[derive(Debug, Clone)]
pub struct TimingsRing {
    slots: Vec<CycleTimings>,
    /// Index the next push writes to.
    next: usize,
    len: usize,
}

impl TimingsRing {
    /// Create a ring holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![CycleTimings::default(); capacity.max(1)],
            next: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Record a cycle, overwriting the oldest entry when full.
    pub fn push(&mut self, cycle: u64, timings: Timings) {
        self.slots[self.next] = CycleTimings { cycle, timings };
        self.next = (self.next + 1) % self.slots.len();
        self.len = (self.len + 1).min(self.slots.len());
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &CycleTimings> + '_ {
        let start = (self.next + self.slots.len() - self.len) % self.slots.len();
        (0..self.len).map(move |i| &self.slots[(start + i) % self.slots.len()])
    }

    /// Timings of `cycle`, if it is still in the ring.
    pub fn for_cycle(&self, cycle: u64) -> Option<&Timings> {
        self.iter()
            .rev()
            .find(|entry| entry.cycle == cycle)
            .map(|entry| &entry.timings)
    }

    /// Mean resize + convert + inference time over the stored entries.
    pub fn average_forward_us(&self) -> Option<f64> {
        if self.len == 0 {
            return None;
        }
        let total: u64 = self.iter().map(|entry| entry.timings.forward_us()).sum();
        Some(total as f64 / self.len as f64)
    }
}
