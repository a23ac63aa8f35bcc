//! Core types for the energy-harvesting discovery simulator.
//!
//! Identifiers, the harvesting scenario and discovery protocol variants,
//! and the argument validation error shared by every configuration layer.

mod error;
mod identifiers;
mod protocol;
mod scenario;

pub use error::InvalidArgument;
pub use identifiers::{DeviceId, Position};
pub use protocol::DiscoveryProtocol;
pub use scenario::HarvestScenario;
