//! Console report and file output.

use crate::{DeviceEnergyRecord, SimulationSummary, SimulatorError, SustainabilityVerdict};
use lorasim_simulation::SimulationStats;
use lorasim_types::DeviceId;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// One energy timeline sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergySample {
    #[serde(rename = "time_s")]
    pub time_secs: f64,
    #[serde(rename = "NodeID")]
    pub device: DeviceId,
    #[serde(rename = "RemainingEnergy")]
    pub remaining_energy: f64,
    #[serde(rename = "Harvested")]
    pub harvested: f64,
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub records: Vec<DeviceEnergyRecord>,
    pub summary: SimulationSummary,
    pub stats: SimulationStats,
    /// Empty unless the timeline was requested.
    pub energy_timeline: Vec<EnergySample>,
    pub seed: u64,
}

impl SimulationReport {
    /// Look up one device's record.
    pub fn record(&self, device: DeviceId) -> Option<&DeviceEnergyRecord> {
        self.records.iter().find(|r| r.device == device)
    }

    /// Print per-device results, the summary and the verdict.
    pub fn print(&self) {
        println!("\n========================================");
        println!("Simulation Results");
        println!("========================================");

        for record in &self.records {
            print_record(record);
        }

        let s = &self.summary;
        println!("\n========================================");
        println!("Summary Statistics");
        println!("========================================");
        println!("Total devices: {}", s.device_count);
        println!(
            "Discovered devices: {} ({:.1}%)",
            s.discovered_count,
            s.discovery_rate()
        );
        println!("Average energy consumed: {:.4} J", s.average_consumed());
        println!("Average energy harvested: {:.4} J", s.average_harvested());
        println!("Average net balance: {:.4} J", s.average_net_balance());
        println!("Total beacons sent: {}", s.total_beacons_sent);
        println!("Total beacons received: {}", s.total_beacons_received);
        println!("Average beacons per device: {:.2}", s.average_beacons_sent());
        if let Some(mean) = s.mean_time_to_discovery {
            println!("Mean time to first discovery: {:.1} s", mean.as_secs_f64());
        }
        if s.depleted_count > 0 {
            println!("Depleted devices: {}", s.depleted_count);
        }
        println!(
            "Frames on air: {} beacons, {} uplinks",
            self.stats.beacons_transmitted, self.stats.uplinks_transmitted
        );

        match s.verdict {
            SustainabilityVerdict::EnergyPositive { average_surplus } => {
                println!("\n✓ {}", s.verdict);
                println!(
                    "  Average surplus: {:.4} J over {:.2} hours",
                    average_surplus,
                    s.hours()
                );
            }
            SustainabilityVerdict::EnergyNegative {
                average_deficit,
                net_consumption_rate,
                projected_lifetime_hours,
            } => {
                println!("\n⚠ {}", s.verdict);
                println!(
                    "  Average deficit: {:.4} J over {:.2} hours",
                    average_deficit,
                    s.hours()
                );
                println!(
                    "  Net consumption rate: {:.6} mW",
                    net_consumption_rate * 1000.0
                );
                if let Some(hours) = projected_lifetime_hours {
                    println!("  Projected lifetime: {hours:.2} hours");
                }
                if let Some(caveat) = s.lifetime_caveat() {
                    println!("  {caveat}");
                }
            }
        }
    }

    /// Write the results table to `path`, creating parent directories.
    pub fn write_csv(&self, path: &Path) -> Result<(), SimulatorError> {
        let file = create_file(path)?;
        self.write_csv_to(file)?;
        info!(path = %path.display(), rows = self.records.len(), "Results written");
        Ok(())
    }

    /// Write the results table to any writer.
    pub fn write_csv_to<W: Write>(&self, writer: W) -> Result<(), SimulatorError> {
        let mut csv = csv::Writer::from_writer(writer);
        for record in &self.records {
            csv.serialize(record)?;
        }
        csv.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    /// Write the energy timeline to `path`, creating parent directories.
    pub fn write_energy_timeline(&self, path: &Path) -> Result<(), SimulatorError> {
        let mut csv = csv::Writer::from_writer(create_file(path)?);
        for sample in &self.energy_timeline {
            csv.serialize(sample)?;
        }
        csv.flush().map_err(|source| SimulatorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            path = %path.display(),
            samples = self.energy_timeline.len(),
            "Energy timeline written"
        );
        Ok(())
    }
}

fn print_record(record: &DeviceEnergyRecord) {
    println!("\nDevice {}:", record.device.0);
    println!("  Position: {} m", record.position);
    println!(
        "  Distance from gateway: {:.2} m",
        record.position.distance_from_anchor()
    );
    println!("  Initial energy: {:.4} J", record.initial_energy);
    println!(
        "  Final energy: {:.4} J ({:.1}%)",
        record.final_energy,
        record.remaining_percent()
    );
    println!("  Consumed: {:.4} J", record.consumed);
    println!("  Harvested: {:.4} J", record.harvested);
    println!("  Net balance: {:.4} J", record.net_balance());
    println!("  Beacons sent: {}", record.beacons_sent);
    println!("  Beacons received: {}", record.beacons_received);
    println!(
        "  Discovered: {}",
        if record.discovered { "Yes" } else { "No" }
    );
    if let Some(after) = record.first_discovered_at {
        println!("  First discovery after: {:.1} s", after.as_secs_f64());
    }
    if let Some(joules) = record.energy_per_beacon() {
        println!("  Energy per beacon: {:.4} J", joules);
    }
    if let Some(at) = record.depleted_at {
        println!("  Depleted at: {:.1} s", at.as_secs_f64());
    }
}

fn create_file(path: &Path) -> Result<File, SimulatorError> {
    let io_error = |source| SimulatorError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    File::create(path).map_err(io_error)
}
