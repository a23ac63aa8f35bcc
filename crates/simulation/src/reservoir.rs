//! Per-device energy storage.
//!
//! A bucket of joules: radio work draws from it, and when enabled the
//! harvester refills it up to an optional capacity.

use std::time::Duration;

/// Read-only view of a device's stored energy.
///
/// This is all the statistics layer gets to see of a reservoir.
pub trait EnergySource {
    /// Energy stored at the start of the run, in joules.
    fn initial_energy(&self) -> f64;

    /// Energy currently stored, in joules. Never negative.
    fn remaining_energy(&self) -> f64;
}

/// Configuration for every device's reservoir.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservoirConfig {
    /// Starting energy in joules.
    pub initial_energy: f64,

    /// Upper bound on stored energy. `None` means unbounded.
    pub capacity: Option<f64>,

    /// Whether harvested energy is credited to the reservoir.
    ///
    /// When disabled the harvest tracker is a pure ledger and the reservoir
    /// only ever drains.
    pub charge_from_harvest: bool,
}

impl Default for ReservoirConfig {
    fn default() -> Self {
        Self {
            initial_energy: 7.2,
            capacity: None,
            charge_from_harvest: false,
        }
    }
}

/// Energy reservoir (battery or supercapacitor) for one device.
#[derive(Debug, Clone)]
pub struct EnergyReservoir {
    initial: f64,
    remaining: f64,
    capacity: Option<f64>,
    /// Energy actually removed, in joules. Excludes any shortfall.
    total_drawn: f64,
    /// Energy actually stored from charging, in joules. Excludes overflow.
    total_charged: f64,
    /// First instant the reservoir reached zero.
    depleted_at: Option<Duration>,
}

impl EnergyReservoir {
    pub fn new(config: &ReservoirConfig) -> Self {
        Self {
            initial: config.initial_energy,
            remaining: config.initial_energy,
            capacity: config.capacity,
            total_drawn: 0.0,
            total_charged: 0.0,
            depleted_at: None,
        }
    }

    /// Remove `joules`, clamping at zero.
    ///
    /// Returns true only for the draw that first empties the reservoir;
    /// `at` is recorded as the depletion instant.
    pub fn draw(&mut self, joules: f64, at: Duration) -> bool {
        if joules <= 0.0 {
            return false;
        }
        let drawn = joules.min(self.remaining);
        self.remaining -= drawn;
        self.total_drawn += drawn;

        if self.remaining <= 0.0 && self.depleted_at.is_none() {
            self.remaining = 0.0;
            self.depleted_at = Some(at);
            return true;
        }
        false
    }

    /// Add `joules`, saturating at capacity. Returns the energy stored.
    pub fn charge(&mut self, joules: f64) -> f64 {
        if joules <= 0.0 {
            return 0.0;
        }
        let headroom = self
            .capacity
            .map_or(f64::INFINITY, |capacity| (capacity - self.remaining).max(0.0));
        let stored = joules.min(headroom);
        self.remaining += stored;
        self.total_charged += stored;
        stored
    }

    pub fn total_drawn(&self) -> f64 {
        self.total_drawn
    }

    pub fn total_charged(&self) -> f64 {
        self.total_charged
    }

    /// When the reservoir first ran dry, if it did.
    pub fn depleted_at(&self) -> Option<Duration> {
        self.depleted_at
    }

    pub fn is_depleted(&self) -> bool {
        self.depleted_at.is_some()
    }
}

impl EnergySource for EnergyReservoir {
    fn initial_energy(&self) -> f64 {
        self.initial
    }

    fn remaining_energy(&self) -> f64 {
        self.remaining
    }
}
