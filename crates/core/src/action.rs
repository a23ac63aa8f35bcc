//! Action types for the deterministic device state machines.

use crate::TimerId;
use std::time::Duration;

/// A radio transmission requested by a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transmission {
    /// A discovery beacon.
    Beacon,
    /// A periodic data uplink.
    Uplink,
}

impl Transmission {
    /// Get a human-readable name for this transmission type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Transmission::Beacon => "Beacon",
            Transmission::Uplink => "Uplink",
        }
    }
}

/// Actions a device state machine asks the runner to perform.
///
/// Actions are **commands** - the runner executes them. State machines
/// never touch the scheduler, the radio, or the energy reservoir directly.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ═══════════════════════════════════════════════════════════════════════
    // Timers
    // ═══════════════════════════════════════════════════════════════════════
    /// Arm a timer to fire after `duration`. Replaces a pending timer with
    /// the same id.
    SetTimer { id: TimerId, duration: Duration },

    /// Cancel a pending timer. A no-op if the timer already fired or was
    /// never set.
    CancelTimer { id: TimerId },

    // ═══════════════════════════════════════════════════════════════════════
    // Radio
    // ═══════════════════════════════════════════════════════════════════════
    /// Put a frame on the air.
    Transmit { transmission: Transmission },

    /// Switch the receiver on or off.
    SetListening { listening: bool },

    // ═══════════════════════════════════════════════════════════════════════
    // Energy
    // ═══════════════════════════════════════════════════════════════════════
    /// Energy harvested during the last tick, in joules.
    RecordHarvest { joules: f64 },
}

impl Action {
    /// Get a human-readable name for this action type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Action::SetTimer { .. } => "SetTimer",
            Action::CancelTimer { .. } => "CancelTimer",
            Action::Transmit { .. } => "Transmit",
            Action::SetListening { .. } => "SetListening",
            Action::RecordHarvest { .. } => "RecordHarvest",
        }
    }
}
