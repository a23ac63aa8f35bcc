//! Event types for the deterministic device state machines.

/// Priority levels for event ordering within the same timestamp.
///
/// Events at the same simulation time are processed in priority order.
/// Lower values = higher priority (processed first). Within one priority
/// the runner falls back to scheduling order, first scheduled runs first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum EventPriority {
    /// Internal events: consequences of prior event processing.
    /// Processed first to maintain causality.
    Internal = 0,

    /// Listen-window transitions. A window that opens at the same instant
    /// as a beacon is already open when the beacon fires.
    Window = 1,

    /// Timer events: scheduled by the device itself.
    Timer = 2,

    /// Lifecycle commands from the surrounding simulation. Processed last,
    /// so work already due at a stop instant still runs.
    Lifecycle = 3,
}

impl EventPriority {
    /// Number of priority levels, for per-priority counters.
    pub const COUNT: usize = 4;
}

/// All possible events a device can receive.
///
/// Events are **passive data** - they describe something that happened.
/// The state machine processes events and returns actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    // ═══════════════════════════════════════════════════════════════════════
    // Timers (priority: Timer / Window)
    // ═══════════════════════════════════════════════════════════════════════
    /// Integrate harvested power over one tick interval.
    HarvestTick,

    /// Time to transmit a discovery beacon.
    BeaconTimer,

    /// Scheduled-listening window boundary (open or close).
    ListenWindowTimer,

    /// Time to send a periodic data uplink.
    UplinkTimer,

    // ═══════════════════════════════════════════════════════════════════════
    // Lifecycle (priority: Lifecycle)
    // ═══════════════════════════════════════════════════════════════════════
    /// Begin integrating harvested energy; records the zero reference time.
    StartHarvesting,

    /// Stop integrating harvested energy.
    StopHarvesting,

    /// Start the discovery and uplink applications.
    StartApplication,

    /// Stop the discovery and uplink applications.
    StopApplication,

    // ═══════════════════════════════════════════════════════════════════════
    // Internal (priority: Internal)
    // ═══════════════════════════════════════════════════════════════════════
    /// The device's energy reservoir reached zero; its lifetime ends.
    EnergyDepleted,
}

impl Event {
    /// Get the priority for this event type.
    pub fn priority(&self) -> EventPriority {
        match self {
            Event::EnergyDepleted => EventPriority::Internal,

            Event::ListenWindowTimer => EventPriority::Window,

            Event::HarvestTick | Event::BeaconTimer | Event::UplinkTimer => EventPriority::Timer,

            Event::StartHarvesting
            | Event::StopHarvesting
            | Event::StartApplication
            | Event::StopApplication => EventPriority::Lifecycle,
        }
    }

    /// Get a human-readable name for this event type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Event::HarvestTick => "HarvestTick",
            Event::BeaconTimer => "BeaconTimer",
            Event::ListenWindowTimer => "ListenWindowTimer",
            Event::UplinkTimer => "UplinkTimer",
            Event::StartHarvesting => "StartHarvesting",
            Event::StopHarvesting => "StopHarvesting",
            Event::StartApplication => "StartApplication",
            Event::StopApplication => "StopApplication",
            Event::EnergyDepleted => "EnergyDepleted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        assert!(EventPriority::Internal < EventPriority::Window);
        assert!(EventPriority::Window < EventPriority::Timer);
        assert!(EventPriority::Timer < EventPriority::Lifecycle);
    }

    #[test]
    fn test_stop_runs_after_due_timers() {
        assert!(Event::BeaconTimer.priority() < Event::StopApplication.priority());
        assert!(Event::HarvestTick.priority() < Event::StopHarvesting.priority());
        assert!(Event::ListenWindowTimer.priority() < Event::BeaconTimer.priority());
    }
}
