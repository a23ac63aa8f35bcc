//! Event queue with deterministic ordering.

use lorasim_core::{Event, EventPriority};
use lorasim_types::DeviceId;
use std::cmp::Ordering;
use std::time::Duration;

/// Key for ordering events in the queue.
///
/// Events are ordered by:
/// 1. Time (earlier first)
/// 2. Priority (internal, then listen windows, then timers, then lifecycle)
/// 3. Device (deterministic ordering)
/// 4. Sequence number (FIFO for same time/priority/device)
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct EventKey {
    /// When this event should be processed.
    pub time: Duration,
    /// Priority for ordering at same time.
    pub priority: EventPriority,
    /// Which device receives this event.
    pub device: DeviceId,
    /// Sequence number for deterministic FIFO ordering.
    pub sequence: u64,
}

impl EventKey {
    /// Create a new event key for an [`Event`].
    pub fn new(time: Duration, event: &Event, device: DeviceId, sequence: u64) -> Self {
        Self {
            time,
            priority: event.priority(),
            device,
            sequence,
        }
    }
}

impl Ord for EventKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .cmp(&other.time)
            .then_with(|| self.priority.cmp(&other.priority))
            .then_with(|| self.device.cmp(&other.device))
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

impl PartialOrd for EventKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
