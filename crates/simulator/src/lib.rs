//! Energy-harvesting discovery simulator.
//!
//! Builds a fleet from user configuration, runs it on the deterministic
//! simulation runner, and turns the final readings into per-device records,
//! fleet totals, and a sustainability verdict.
//!
//! # Example
//!
//! ```ignore
//! use lorasim_simulator::{Simulator, SimulatorConfig};
//! use lorasim_types::{DiscoveryProtocol, HarvestScenario};
//!
//! let config = SimulatorConfig::new(10, 3600.0)
//!     .with_scenario(HarvestScenario::DayNightCycle)
//!     .with_protocol(DiscoveryProtocol::AlohaDiscovery)
//!     .with_seed(42);
//!
//! let mut simulator = Simulator::new(config)?;
//! let report = simulator.run()?;
//! report.print();
//! println!("sustainable: {}", report.summary.verdict.is_energy_positive());
//! ```

pub mod config;
pub mod error;
pub mod report;
pub mod runner;
pub mod stats;

pub use config::SimulatorConfig;
pub use error::SimulatorError;
pub use report::{EnergySample, SimulationReport};
pub use runner::Simulator;
pub use stats::{
    DeviceEnergyRecord, SimulationSummary, StatisticsAggregator, SustainabilityVerdict,
};
