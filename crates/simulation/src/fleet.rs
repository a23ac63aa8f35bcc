//! Fleet configuration for the runner.

use crate::{ConsumptionModel, ReservoirConfig};
use lorasim_discovery::DiscoveryConfig;
use lorasim_harvest::DEFAULT_TICK_INTERVAL;
use lorasim_node::UplinkConfig;
use lorasim_types::HarvestScenario;
use std::time::Duration;

/// Everything the runner needs to build a homogeneous fleet of devices.
///
/// Values are taken as given; validation happens where user input enters.
#[derive(Debug, Clone, PartialEq)]
pub struct FleetConfig {
    /// Number of devices.
    pub device_count: u32,
    /// Harvesting scenario shared by every device.
    pub scenario: HarvestScenario,
    /// Base harvesting power in watts.
    pub base_rate: f64,
    /// Harvest integration step.
    pub harvest_tick: Duration,
    /// Discovery protocol and timing.
    pub discovery: DiscoveryConfig,
    /// Periodic uplink, if any.
    pub uplink: Option<UplinkConfig>,
    /// Reservoir setup per device.
    pub reservoir: ReservoirConfig,
    /// Consumption imposed by radio work.
    pub consumption: ConsumptionModel,
    /// Placement disc radius in metres.
    pub radius: f64,
    /// When applications start. They stop at the run's stop time.
    pub application_start: Duration,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            device_count: 10,
            scenario: HarvestScenario::default(),
            base_rate: 0.00125,
            harvest_tick: DEFAULT_TICK_INTERVAL,
            discovery: DiscoveryConfig::default(),
            uplink: Some(UplinkConfig::default()),
            reservoir: ReservoirConfig::default(),
            consumption: ConsumptionModel::default(),
            radius: 810.0,
            application_start: Duration::ZERO,
        }
    }
}
