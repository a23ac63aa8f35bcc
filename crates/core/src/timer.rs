//! Timer identification.
//!
//! The state machine emits `Action::SetTimer` and `Action::CancelTimer`;
//! the runner keys pending timers by `(device, TimerId)`, so each id names
//! a single slot per device.

use crate::Event;

/// Timer identification for scheduled events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerId {
    /// Harvest integration tick.
    HarvestTick,
    /// Next discovery beacon.
    Beacon,
    /// Next listen-window boundary (scheduled listening only).
    ListenWindow,
    /// Next periodic uplink.
    Uplink,
}

impl TimerId {
    /// The event delivered when this timer fires.
    pub fn event(self) -> Event {
        match self {
            TimerId::HarvestTick => Event::HarvestTick,
            TimerId::Beacon => Event::BeaconTimer,
            TimerId::ListenWindow => Event::ListenWindowTimer,
            TimerId::Uplink => Event::UplinkTimer,
        }
    }
}
