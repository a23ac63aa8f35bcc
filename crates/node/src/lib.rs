//! Combined device state machine.
//!
//! This crate composes the harvest tracker, the discovery state machine,
//! and the periodic uplink sender into a complete simulated device.

mod state;
mod uplink;

pub use state::DeviceStateMachine;
pub use uplink::{UplinkConfig, UplinkSender};
