//! Energy harvesting for simulated devices.
//!
//! [`harvesting_rate`] is a pure function from scenario and elapsed time to
//! instantaneous power. [`EnergyHarvestingTracker`] integrates it on a fixed
//! tick and keeps a cumulative ledger of harvested energy.

mod rate;
mod tracker;

pub use rate::{
    harvesting_rate, AMBIENT_RF_FRACTION, DAYLIGHT_SECS, DAY_NIGHT_PERIOD_SECS,
    LOW_LIGHT_FRACTION,
};
pub use tracker::{EnergyHarvestingTracker, DEFAULT_TICK_INTERVAL};
