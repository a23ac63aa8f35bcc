//! Configuration types for the simulator.

use lorasim_discovery::DiscoveryConfig;
use lorasim_node::UplinkConfig;
use lorasim_simulation::{ConsumptionModel, FleetConfig, ReservoirConfig};
use lorasim_types::{DiscoveryProtocol, HarvestScenario, InvalidArgument};
use std::time::Duration;

/// Configuration for a simulation run.
///
/// Holds raw user values. Nothing is validated until
/// [`to_fleet_config`](Self::to_fleet_config).
#[derive(Clone, Debug)]
pub struct SimulatorConfig {
    /// Number of devices.
    pub device_count: u32,

    /// Simulated time in seconds; applications stop here.
    pub duration_secs: f64,

    /// Placement disc radius in metres.
    pub radius: f64,

    pub scenario: HarvestScenario,

    pub protocol: DiscoveryProtocol,

    /// Energy stored in each device at start, in joules.
    pub initial_energy: f64,

    /// Transmit power in dBm. Reported only.
    pub tx_power_dbm: f64,

    /// Beacon interval in seconds.
    pub beacon_interval_secs: f64,

    /// Scheduled-listening window in seconds. Half the beacon interval when
    /// unset.
    pub listen_interval_secs: Option<f64>,

    /// Base harvesting power in watts.
    pub harvesting_rate: f64,

    /// Application start in seconds.
    pub application_start_secs: f64,

    /// Random seed for deterministic simulation.
    pub seed: u64,

    pub consumption: ConsumptionModel,

    /// Delay from application start to the first uplink, in seconds.
    pub uplink_start_delay_secs: f64,

    /// Uplink period in seconds. `None` disables uplinks.
    pub uplink_period_secs: Option<f64>,

    /// Credit harvested energy to the reservoirs.
    pub charge_reservoir: bool,

    /// Reservoir capacity in joules. Unbounded when unset.
    pub reservoir_capacity: Option<f64>,

    /// Sample reservoirs into an energy timeline.
    pub record_energy_timeline: bool,

    /// Timeline sampling interval in seconds.
    pub energy_log_interval_secs: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            device_count: 10,
            duration_secs: 3600.0,
            radius: 810.0,
            scenario: HarvestScenario::ConstantSolar,
            protocol: DiscoveryProtocol::BeaconBased,
            initial_energy: 7.2,
            tx_power_dbm: 10.0,
            beacon_interval_secs: 60.0,
            listen_interval_secs: None,
            harvesting_rate: 0.00125,
            application_start_secs: 0.0,
            seed: 12345,
            consumption: ConsumptionModel::default(),
            uplink_start_delay_secs: 10.0,
            uplink_period_secs: Some(300.0),
            charge_reservoir: false,
            reservoir_capacity: None,
            record_energy_timeline: false,
            energy_log_interval_secs: 60.0,
        }
    }
}

impl SimulatorConfig {
    /// Create a new simulator configuration.
    pub fn new(device_count: u32, duration_secs: f64) -> Self {
        Self {
            device_count,
            duration_secs,
            ..Default::default()
        }
    }

    /// Set the harvesting scenario.
    pub fn with_scenario(mut self, scenario: HarvestScenario) -> Self {
        self.scenario = scenario;
        self
    }

    /// Set the discovery protocol.
    pub fn with_protocol(mut self, protocol: DiscoveryProtocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Set the initial energy per device, in joules.
    pub fn with_initial_energy(mut self, joules: f64) -> Self {
        self.initial_energy = joules;
        self
    }

    /// Set the beacon interval, in seconds.
    pub fn with_beacon_interval(mut self, secs: f64) -> Self {
        self.beacon_interval_secs = secs;
        self
    }

    /// Set the scheduled-listening window, in seconds.
    pub fn with_listen_interval(mut self, secs: f64) -> Self {
        self.listen_interval_secs = Some(secs);
        self
    }

    /// Set the base harvesting rate, in watts.
    pub fn with_harvesting_rate(mut self, watts: f64) -> Self {
        self.harvesting_rate = watts;
        self
    }

    pub fn with_radius(mut self, metres: f64) -> Self {
        self.radius = metres;
        self
    }

    pub fn with_tx_power(mut self, dbm: f64) -> Self {
        self.tx_power_dbm = dbm;
        self
    }

    pub fn with_application_start(mut self, secs: f64) -> Self {
        self.application_start_secs = secs;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_consumption(mut self, consumption: ConsumptionModel) -> Self {
        self.consumption = consumption;
        self
    }

    /// Set the uplink period in seconds, or disable uplinks with `None`.
    pub fn with_uplink_period(mut self, secs: Option<f64>) -> Self {
        self.uplink_period_secs = secs;
        self
    }

    /// Credit harvested energy to each device's reservoir.
    pub fn with_reservoir_charging(mut self, enabled: bool) -> Self {
        self.charge_reservoir = enabled;
        self
    }

    pub fn with_reservoir_capacity(mut self, joules: Option<f64>) -> Self {
        self.reservoir_capacity = joules;
        self
    }

    /// Sample an energy timeline every `interval_secs`.
    pub fn with_energy_timeline(mut self, interval_secs: f64) -> Self {
        self.record_energy_timeline = true;
        self.energy_log_interval_secs = interval_secs;
        self
    }

    /// Listen window actually used.
    pub fn effective_listen_interval_secs(&self) -> f64 {
        self.listen_interval_secs
            .unwrap_or(self.beacon_interval_secs / 2.0)
    }

    /// Fraction of time the receiver is on. `None` if the intervals are invalid.
    pub fn listen_duty_cycle(&self) -> Option<f64> {
        self.to_fleet_config()
            .ok()
            .map(|fleet| fleet.discovery.duty_cycle())
    }

    /// Validated run length.
    pub fn stop_time(&self) -> Result<Duration, InvalidArgument> {
        to_duration("simulation time", self.duration_secs, true)
    }

    /// Validated timeline sampling interval.
    pub fn energy_log_interval(&self) -> Result<Duration, InvalidArgument> {
        to_duration("energy log interval", self.energy_log_interval_secs, true)
    }

    /// Validate and convert to a FleetConfig for the underlying simulation.
    pub fn to_fleet_config(&self) -> Result<FleetConfig, InvalidArgument> {
        if self.device_count == 0 {
            return Err(InvalidArgument::NoDevices);
        }

        let stop_time = self.stop_time()?;
        let initial_energy = InvalidArgument::require_positive("initial energy", self.initial_energy)?;
        let beacon_interval = to_duration("beacon interval", self.beacon_interval_secs, true)?;
        let listen_interval = to_duration(
            "listen interval",
            self.effective_listen_interval_secs(),
            true,
        )?;
        let base_rate =
            InvalidArgument::require_non_negative("harvesting rate", self.harvesting_rate)?;
        let radius = InvalidArgument::require_non_negative("radius", self.radius)?;

        let application_start =
            to_duration("application start", self.application_start_secs, false)?;
        if application_start > stop_time {
            return Err(InvalidArgument::OutOfRange {
                name: "application start",
                requirement: "no later than the simulation time",
                value: self.application_start_secs,
            });
        }

        let capacity = self
            .reservoir_capacity
            .map(|joules| InvalidArgument::require_positive("reservoir capacity", joules))
            .transpose()?;

        let uplink = match self.uplink_period_secs {
            Some(period) => Some(UplinkConfig {
                start_delay: to_duration("uplink start delay", self.uplink_start_delay_secs, false)?,
                period: to_duration("uplink period", period, true)?,
            }),
            None => None,
        };

        Ok(FleetConfig {
            device_count: self.device_count,
            scenario: self.scenario,
            base_rate,
            discovery: DiscoveryConfig::new(self.protocol, beacon_interval)
                .with_listen_interval(listen_interval),
            uplink,
            reservoir: ReservoirConfig {
                initial_energy,
                capacity,
                charge_from_harvest: self.charge_reservoir,
            },
            consumption: self.consumption.clone(),
            radius,
            application_start,
            ..Default::default()
        })
    }

    /// Print the configuration banner.
    pub fn print_banner(&self) {
        println!("\n========================================");
        println!("LoRa Energy Harvesting & Discovery Simulation");
        println!("========================================");
        println!("Hardware Configuration:");
        match &self.consumption {
            ConsumptionModel::Radio(radio) => {
                let m = &radio.modulation;
                println!(
                    "  Radio: SF{}, BW{} kHz, CR4/{}, {:.1} V",
                    m.spreading_factor,
                    m.bandwidth_hz / 1000.0,
                    m.coding_rate + 4,
                    radio.supply_voltage
                );
                println!(
                    "  Currents: TX {:.1} mA, RX {:.1} mA, standby {:.1} mA",
                    radio.tx_current * 1000.0,
                    radio.rx_current * 1000.0,
                    radio.standby_current * 1000.0
                );
            }
            ConsumptionModel::None => println!("  Radio: no consumption model"),
        }
        match self.reservoir_capacity {
            Some(capacity) => println!("  Storage: {capacity} J capacity"),
            None => println!("  Storage: unbounded"),
        }
        println!("========================================");
        println!("Simulation Parameters:");
        println!("  Devices: {}", self.device_count);
        println!(
            "  Simulation time: {} s ({:.2} h)",
            self.duration_secs,
            self.duration_secs / 3600.0
        );
        println!("  Area radius: {} m", self.radius);
        println!("  Energy scenario: {}", self.scenario);
        println!("  Discovery protocol: {}", self.protocol);
        println!("  Initial energy: {} J", self.initial_energy);
        println!("  TX power: {} dBm", self.tx_power_dbm);
        println!("  Beacon interval: {} s", self.beacon_interval_secs);
        if self.protocol == DiscoveryProtocol::ScheduledListening {
            println!(
                "  Listen interval: {} s",
                self.effective_listen_interval_secs()
            );
            if let Some(duty) = self.listen_duty_cycle() {
                println!("  Receiver duty cycle: {:.1}%", duty * 100.0);
            }
        }
        println!(
            "  Harvesting rate: {} W ({:.4} mW)",
            self.harvesting_rate,
            self.harvesting_rate * 1000.0
        );
        match self.uplink_period_secs {
            Some(period) => println!("  Uplink: every {period} s"),
            None => println!("  Uplink: disabled"),
        }
        println!(
            "  Reservoir charging: {}",
            if self.charge_reservoir { "on" } else { "off" }
        );
        println!("  Seed: {}", self.seed);
        println!("========================================");
    }
}

/// Seconds to a `Duration`, rejecting negative, non-finite, oversized and,
/// when `positive`, zero values.
fn to_duration(name: &'static str, secs: f64, positive: bool) -> Result<Duration, InvalidArgument> {
    let secs = if positive {
        InvalidArgument::require_positive(name, secs)?
    } else {
        InvalidArgument::require_non_negative(name, secs)?
    };
    let duration = Duration::try_from_secs_f64(secs).map_err(|_| InvalidArgument::OutOfRange {
        name,
        requirement: "representable as a duration",
        value: secs,
    })?;
    // Sub-nanosecond values round to zero.
    if positive && duration.is_zero() {
        return Err(InvalidArgument::OutOfRange {
            name,
            requirement: "at least one nanosecond",
            value: secs,
        });
    }
    Ok(duration)
}
