//! Neighbor discovery for simulated devices.
//!
//! [`DiscoveryStateMachine`] decides when a device sends beacons and when
//! its receiver is on. It counts beacons sent and beacons heard; a device
//! hears its own beacon whenever it is listening at the moment it sends.

mod config;
mod state;

pub use config::DiscoveryConfig;
pub use state::{BeaconSchedule, DiscoveryStateMachine, ListeningPolicy};
