//! Deterministic simulation runner.
//!
//! This crate provides a fully deterministic environment for running a
//! fleet of energy-harvesting devices. Given the same seed, it produces
//! identical results every run.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  SimulationRunner                       │
//! │                                                         │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │     Event Queue (BTreeMap<EventKey, Event>)        │ │
//! │  │     Ordered by: time, priority, device, sequence   │ │
//! │  └────────────────────────┬───────────────────────────┘ │
//! │                           │                             │
//! │                           ▼                             │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │     devices: Vec<DeviceStateMachine>               │ │
//! │  │     Each processes events sequentially             │ │
//! │  └────────────────────────┬───────────────────────────┘ │
//! │                           │                             │
//! │                           ▼                             │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │     Actions → timers, radio energy, reservoirs     │ │
//! │  └────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────┘
//! ```

mod event_queue;
mod fleet;
mod placement;
mod radio;
mod reservoir;
mod runner;

pub use event_queue::EventKey;
pub use fleet::FleetConfig;
pub use placement::uniform_disc;
pub use radio::{ConsumptionModel, IdleDraw, LoraModulation, RadioEnergyConfig, RadioEnergyModel};
pub use reservoir::{EnergyReservoir, EnergySource, ReservoirConfig};
pub use runner::{SimulationRunner, SimulationStats, TransmissionRecord};
