//! LoRa energy-harvesting discovery simulator CLI.
//!
//! Runs one simulation, prints per-device results and the sustainability
//! verdict, and writes the results table.

use clap::{Parser, ValueEnum};
use lorasim_simulation::ConsumptionModel;
use lorasim_simulator::{Simulator, SimulatorConfig};
use lorasim_types::{DiscoveryProtocol, HarvestScenario};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lorasim")]
#[command(about = "Energy-harvesting neighbor discovery simulator for LoRa devices")]
#[command(version)]
struct Cli {
    /// Number of devices
    #[arg(long, alias = "nDevices", default_value = "10")]
    n_devices: u32,

    /// Simulated duration in seconds
    #[arg(long, default_value = "3600", allow_negative_numbers = true)]
    time: f64,

    /// Placement disc radius in metres
    #[arg(long, default_value = "810", allow_negative_numbers = true)]
    radius: f64,

    /// Harvesting scenario (0=None, 1=Regular, 2=Day/Night, 3=LowLight, 4=Hybrid, or a name)
    #[arg(long, alias = "energyScenario", default_value = "1")]
    energy_scenario: HarvestScenario,

    /// Discovery protocol (0=Beacon, 1=ALOHA, 2=Scheduled, 3=Adaptive, or a name)
    #[arg(long, default_value = "0")]
    protocol: DiscoveryProtocol,

    /// Initial stored energy per device in joules
    #[arg(long, alias = "initialEnergy", default_value = "7.2", allow_negative_numbers = true)]
    initial_energy: f64,

    /// Transmit power in dBm
    #[arg(long, alias = "txPower", default_value = "10", allow_negative_numbers = true)]
    tx_power: f64,

    /// Mean beacon interval in seconds
    #[arg(long, alias = "beaconInterval", default_value = "60", allow_negative_numbers = true)]
    beacon_interval: f64,

    /// Listen window for scheduled listening (defaults to half the beacon interval)
    #[arg(long, alias = "listenInterval", allow_negative_numbers = true)]
    listen_interval: Option<f64>,

    /// Base harvesting power in watts
    #[arg(long, alias = "harvestingRate", default_value = "0.00125", allow_negative_numbers = true)]
    harvesting_rate: f64,

    /// Results table path
    #[arg(short, long, default_value = "results/energy_discovery.txt")]
    output: PathBuf,

    /// Random seed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Device energy consumption model
    #[arg(long, value_enum, default_value = "radio")]
    consumption: Consumption,

    /// Disable periodic data uplinks
    #[arg(long)]
    no_uplink: bool,

    /// Uplink period in seconds
    #[arg(long, default_value = "300", allow_negative_numbers = true)]
    uplink_period: f64,

    /// Credit harvested energy back into the reservoir
    #[arg(long)]
    charge_reservoir: bool,

    /// Reservoir capacity in joules (unbounded when omitted)
    #[arg(long, allow_negative_numbers = true)]
    reservoir_capacity: Option<f64>,

    /// Write a per-device energy timeline to this path
    #[arg(long)]
    energy_log: Option<PathBuf>,

    /// Energy timeline sampling interval in seconds
    #[arg(long, default_value = "60", allow_negative_numbers = true)]
    energy_log_interval: f64,
}

#[derive(Clone, Copy, ValueEnum)]
enum Consumption {
    /// No device draw; harvesting only
    None,
    /// SX127x-class radio draw
    Radio,
}

impl From<Consumption> for ConsumptionModel {
    fn from(consumption: Consumption) -> Self {
        match consumption {
            Consumption::None => ConsumptionModel::None,
            Consumption::Radio => ConsumptionModel::default(),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,lorasim_simulator=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = SimulatorConfig::new(cli.n_devices, cli.time)
        .with_scenario(cli.energy_scenario)
        .with_protocol(cli.protocol)
        .with_initial_energy(cli.initial_energy)
        .with_tx_power(cli.tx_power)
        .with_beacon_interval(cli.beacon_interval)
        .with_harvesting_rate(cli.harvesting_rate)
        .with_radius(cli.radius)
        .with_seed(cli.seed.unwrap_or_else(rand::random))
        .with_consumption(cli.consumption.into())
        .with_uplink_period((!cli.no_uplink).then_some(cli.uplink_period))
        .with_reservoir_charging(cli.charge_reservoir)
        .with_reservoir_capacity(cli.reservoir_capacity);
    if let Some(listen) = cli.listen_interval {
        config = config.with_listen_interval(listen);
    }
    if cli.energy_log.is_some() {
        config = config.with_energy_timeline(cli.energy_log_interval);
    }

    config.print_banner();

    let mut simulator = Simulator::new(config)?;
    let report = simulator.run()?;
    report.print();

    if let Err(e) = report.write_csv(&cli.output) {
        error!(path = %cli.output.display(), error = %e, "Failed to write results");
        return Err(e.into());
    }
    println!("\nResults saved to {}", cli.output.display());

    if let Some(path) = &cli.energy_log {
        report.write_energy_timeline(path)?;
    }

    Ok(())
}
