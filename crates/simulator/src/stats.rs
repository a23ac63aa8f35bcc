//! End-of-run statistics and the sustainability verdict.

use lorasim_simulation::{EnergySource, SimulationRunner};
use lorasim_types::{DeviceId, InvalidArgument, Position};
use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// Final readings for one device.
///
/// Serializes to one row of the results table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceEnergyRecord {
    #[serde(rename = "NodeID")]
    pub device: DeviceId,
    #[serde(rename = "InitialEnergy")]
    pub initial_energy: f64,
    #[serde(rename = "FinalEnergy")]
    pub final_energy: f64,
    /// `initial_energy - final_energy`. Negative only when harvest was
    /// credited to the reservoir.
    #[serde(rename = "Consumed")]
    pub consumed: f64,
    #[serde(rename = "Harvested")]
    pub harvested: f64,
    #[serde(rename = "BeaconsSent")]
    pub beacons_sent: u64,
    #[serde(rename = "BeaconsReceived")]
    pub beacons_received: u64,
    #[serde(rename = "Discovered", serialize_with = "as_flag")]
    pub discovered: bool,
    #[serde(skip)]
    pub position: Position,
    #[serde(skip)]
    pub depleted_at: Option<Duration>,
    /// Time from application start to the first beacon heard.
    #[serde(skip)]
    pub first_discovered_at: Option<Duration>,
}

fn as_flag<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*value))
}

impl DeviceEnergyRecord {
    /// Harvested minus consumed, in joules.
    pub fn net_balance(&self) -> f64 {
        self.harvested - self.consumed
    }

    /// Remaining energy as a percentage of the initial energy.
    pub fn remaining_percent(&self) -> f64 {
        self.final_energy / self.initial_energy * 100.0
    }

    /// Joules consumed per beacon sent. `None` before the first beacon.
    pub fn energy_per_beacon(&self) -> Option<f64> {
        (self.beacons_sent > 0).then(|| self.consumed / self.beacons_sent as f64)
    }
}

/// Whether the fleet's energy trajectory can continue indefinitely.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SustainabilityVerdict {
    /// Harvest covers consumption.
    EnergyPositive {
        /// Mean net balance per device over the run, in joules.
        average_surplus: f64,
    },
    /// Consumption outpaces harvest.
    EnergyNegative {
        /// Mean net shortfall per device over the run, in joules.
        average_deficit: f64,
        /// Mean net drain per device, in watts.
        net_consumption_rate: f64,
        /// Hours an initially full device would last at that drain.
        projected_lifetime_hours: Option<f64>,
    },
}

impl SustainabilityVerdict {
    /// Classify a run from its totals.
    ///
    /// Energy-positive iff `(harvested - consumed) / devices >= 0`.
    /// Otherwise `rate = (consumed - harvested) / devices / duration` and,
    /// when that is positive, the projected lifetime is
    /// `initial_energy_per_device / rate / 3600` hours.
    pub fn classify(
        total_harvested: f64,
        total_consumed: f64,
        device_count: usize,
        duration_secs: f64,
        initial_energy_per_device: f64,
    ) -> Result<Self, InvalidArgument> {
        if device_count == 0 {
            return Err(InvalidArgument::NoDevices);
        }
        let devices = device_count as f64;

        let average_net = (total_harvested - total_consumed) / devices;
        if average_net >= 0.0 {
            return Ok(SustainabilityVerdict::EnergyPositive {
                average_surplus: average_net,
            });
        }

        let net_consumption_rate = (total_consumed - total_harvested) / devices / duration_secs;
        let projected_lifetime_hours = (net_consumption_rate.is_finite()
            && net_consumption_rate > 0.0)
            .then(|| initial_energy_per_device / net_consumption_rate / 3600.0);

        Ok(SustainabilityVerdict::EnergyNegative {
            average_deficit: -average_net,
            net_consumption_rate,
            projected_lifetime_hours,
        })
    }

    pub fn is_energy_positive(&self) -> bool {
        matches!(self, SustainabilityVerdict::EnergyPositive { .. })
    }

    pub fn projected_lifetime_hours(&self) -> Option<f64> {
        match self {
            SustainabilityVerdict::EnergyPositive { .. } => None,
            SustainabilityVerdict::EnergyNegative {
                projected_lifetime_hours,
                ..
            } => *projected_lifetime_hours,
        }
    }
}

impl fmt::Display for SustainabilityVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SustainabilityVerdict::EnergyPositive { .. } => {
                f.write_str("Energy-positive operation (sustainable)")
            }
            SustainabilityVerdict::EnergyNegative { .. } => {
                f.write_str("Energy-negative operation (not sustainable)")
            }
        }
    }
}

/// Fleet-wide totals for one run. Built once, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSummary {
    pub device_count: usize,
    pub discovered_count: usize,
    pub depleted_count: usize,
    pub total_consumed: f64,
    pub total_harvested: f64,
    pub total_beacons_sent: u64,
    pub total_beacons_received: u64,
    pub duration: Duration,
    pub initial_energy_per_device: f64,
    /// Mean time to first discovery over the devices that discovered.
    pub mean_time_to_discovery: Option<Duration>,
    pub verdict: SustainabilityVerdict,
}

impl SimulationSummary {
    /// Percentage of devices discovered.
    pub fn discovery_rate(&self) -> f64 {
        self.discovered_count as f64 * 100.0 / self.device_count as f64
    }

    pub fn average_consumed(&self) -> f64 {
        self.total_consumed / self.device_count as f64
    }

    pub fn average_harvested(&self) -> f64 {
        self.total_harvested / self.device_count as f64
    }

    pub fn average_net_balance(&self) -> f64 {
        (self.total_harvested - self.total_consumed) / self.device_count as f64
    }

    pub fn average_beacons_sent(&self) -> f64 {
        self.total_beacons_sent as f64 / self.device_count as f64
    }

    /// Run length in hours.
    pub fn hours(&self) -> f64 {
        self.duration.as_secs_f64() / 3600.0
    }

    /// Warning for the projected lifetime when devices ran dry mid-run.
    ///
    /// Consumption stops at the initial energy once a device depletes, so
    /// the projection overstates how long such a fleet lasts.
    pub fn lifetime_caveat(&self) -> Option<String> {
        (self.depleted_count > 0 && !self.verdict.is_energy_positive()).then(|| {
            format!(
                "{} of {} devices depleted before the end of the run; \
                 projection is a lower bound on drain",
                self.depleted_count, self.device_count
            )
        })
    }
}

/// Collects per-device results at the end of a run.
///
/// The aggregator pulls from the runner; nothing pushes into it.
#[derive(Debug)]
pub struct StatisticsAggregator {
    duration: Duration,
    records: Vec<DeviceEnergyRecord>,
}

impl StatisticsAggregator {
    /// Create an empty aggregator for a run of `duration`.
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            records: Vec::new(),
        }
    }

    /// Read final values for every device in `runner`.
    ///
    /// Replaces anything collected before.
    pub fn collect(&mut self, runner: &SimulationRunner) {
        let charging = runner.config().reservoir.charge_from_harvest;

        self.records = runner
            .devices()
            .iter()
            .filter_map(|device| {
                let id = device.id();
                let reservoir = runner.reservoir(id)?;
                Some((id, device, reservoir))
            })
            .map(|(id, device, reservoir)| {
                let initial_energy = reservoir.initial_energy();
                let final_energy = reservoir.remaining_energy();
                let consumed = initial_energy - final_energy;
                if consumed < 0.0 {
                    if charging {
                        debug!(device = %id, consumed, "Reservoir ended above its initial energy");
                    } else {
                        warn!(device = %id, consumed, "Negative consumption without charging");
                    }
                }

                let discovery = device.discovery();
                DeviceEnergyRecord {
                    device: id,
                    initial_energy,
                    final_energy,
                    consumed,
                    harvested: device.harvester().total_harvested(),
                    beacons_sent: discovery.beacons_sent(),
                    beacons_received: discovery.beacons_received(),
                    discovered: discovery.discovered(),
                    position: runner.position(id).unwrap_or_default(),
                    depleted_at: reservoir.depleted_at(),
                    first_discovered_at: discovery.first_discovered_at(),
                }
            })
            .collect();
    }

    /// Per-device records, in device order.
    pub fn records(&self) -> &[DeviceEnergyRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<DeviceEnergyRecord> {
        self.records
    }

    /// Compute totals and the verdict.
    ///
    /// Fails with [`InvalidArgument::NoDevices`] when nothing was collected.
    pub fn summarize(&self) -> Result<SimulationSummary, InvalidArgument> {
        if self.records.is_empty() {
            return Err(InvalidArgument::NoDevices);
        }
        let device_count = self.records.len();

        let total_consumed: f64 = self.records.iter().map(|r| r.consumed).sum();
        let total_harvested: f64 = self.records.iter().map(|r| r.harvested).sum();
        let initial_energy_per_device =
            self.records.iter().map(|r| r.initial_energy).sum::<f64>() / device_count as f64;

        let discovery_times: Vec<Duration> = self
            .records
            .iter()
            .filter_map(|r| r.first_discovered_at)
            .collect();
        let mean_time_to_discovery = (!discovery_times.is_empty()).then(|| {
            discovery_times.iter().sum::<Duration>() / discovery_times.len() as u32
        });

        let verdict = SustainabilityVerdict::classify(
            total_harvested,
            total_consumed,
            device_count,
            self.duration.as_secs_f64(),
            initial_energy_per_device,
        )?;

        Ok(SimulationSummary {
            device_count,
            discovered_count: self.records.iter().filter(|r| r.discovered).count(),
            depleted_count: self
                .records
                .iter()
                .filter(|r| r.depleted_at.is_some())
                .count(),
            total_consumed,
            total_harvested,
            total_beacons_sent: self.records.iter().map(|r| r.beacons_sent).sum(),
            total_beacons_received: self.records.iter().map(|r| r.beacons_received).sum(),
            duration: self.duration,
            initial_energy_per_device,
            mean_time_to_discovery,
            verdict,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u32, consumed: f64, harvested: f64, received: u64) -> DeviceEnergyRecord {
        DeviceEnergyRecord {
            device: DeviceId(id),
            initial_energy: 7.2,
            final_energy: 7.2 - consumed,
            consumed,
            harvested,
            beacons_sent: 10,
            beacons_received: received,
            discovered: received > 0,
            position: Position::ORIGIN,
            depleted_at: None,
            first_discovered_at: (received > 0).then(|| Duration::from_secs(60)),
        }
    }

    fn aggregator(records: Vec<DeviceEnergyRecord>) -> StatisticsAggregator {
        StatisticsAggregator {
            duration: Duration::from_secs(3600),
            records,
        }
    }

    #[test]
    fn test_surplus_is_energy_positive() {
        let verdict = SustainabilityVerdict::classify(5.0, 4.0, 2, 3600.0, 7.2).unwrap();
        assert_eq!(
            verdict,
            SustainabilityVerdict::EnergyPositive {
                average_surplus: 0.5
            }
        );
        assert!(verdict.is_energy_positive());
    }

    #[test]
    fn test_break_even_is_energy_positive() {
        let verdict = SustainabilityVerdict::classify(3.0, 3.0, 1, 3600.0, 7.2).unwrap();
        assert!(verdict.is_energy_positive());
    }

    #[test]
    fn test_projected_lifetime_formula() {
        let (harvested, consumed, devices, duration, initial) = (1.0, 4.6, 2, 3600.0, 7.2);
        let verdict =
            SustainabilityVerdict::classify(harvested, consumed, devices, duration, initial)
                .unwrap();

        let rate = (consumed - harvested) / devices as f64 / duration;
        let expected = initial / rate / 3600.0;
        match verdict {
            SustainabilityVerdict::EnergyNegative {
                average_deficit,
                net_consumption_rate,
                projected_lifetime_hours,
            } => {
                assert_eq!(net_consumption_rate, rate);
                assert_eq!(projected_lifetime_hours, Some(expected));
                assert!((average_deficit - 1.8).abs() < 1e-12);
            }
            other => panic!("expected energy-negative, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_rejects_empty_fleet() {
        assert_eq!(
            SustainabilityVerdict::classify(0.0, 1.0, 0, 3600.0, 7.2),
            Err(InvalidArgument::NoDevices)
        );
    }

    #[test]
    fn test_summarize_empty_is_no_devices() {
        assert_eq!(
            aggregator(vec![]).summarize(),
            Err(InvalidArgument::NoDevices)
        );
    }

    #[test]
    fn test_summary_totals() {
        let summary = aggregator(vec![
            record(0, 2.0, 1.0, 3),
            record(1, 4.0, 1.0, 0),
        ])
        .summarize()
        .unwrap();

        assert_eq!(summary.device_count, 2);
        assert_eq!(summary.discovered_count, 1);
        assert_eq!(summary.discovery_rate(), 50.0);
        assert_eq!(summary.total_consumed, 6.0);
        assert_eq!(summary.total_harvested, 2.0);
        assert_eq!(summary.average_net_balance(), -2.0);
        assert_eq!(summary.total_beacons_sent, 20);
        assert_eq!(summary.total_beacons_received, 3);
        assert_eq!(summary.average_beacons_sent(), 10.0);
        assert!(!summary.verdict.is_energy_positive());
        assert!(summary.verdict.projected_lifetime_hours().is_some());
    }

    #[test]
    fn test_mean_time_to_discovery_skips_undiscovered() {
        let mut early = record(0, 1.0, 0.0, 2);
        early.first_discovered_at = Some(Duration::from_secs(30));
        let late = record(1, 1.0, 0.0, 1);
        let silent = record(2, 1.0, 0.0, 0);

        let summary = aggregator(vec![early, late, silent]).summarize().unwrap();
        assert_eq!(summary.mean_time_to_discovery, Some(Duration::from_secs(45)));

        let summary = aggregator(vec![record(0, 1.0, 0.0, 0)]).summarize().unwrap();
        assert_eq!(summary.mean_time_to_discovery, None);
    }

    #[test]
    fn test_lifetime_caveat_only_when_devices_depleted() {
        let mut drained = record(0, 7.2, 0.0, 1);
        drained.depleted_at = Some(Duration::from_secs(202));
        let summary = aggregator(vec![drained, record(1, 3.0, 0.0, 1)])
            .summarize()
            .unwrap();
        assert_eq!(
            summary.lifetime_caveat().as_deref(),
            Some("1 of 2 devices depleted before the end of the run; projection is a lower bound on drain")
        );

        let summary = aggregator(vec![record(0, 3.0, 0.0, 1)]).summarize().unwrap();
        assert_eq!(summary.lifetime_caveat(), None);
    }

    #[test]
    fn test_energy_per_beacon() {
        assert_eq!(record(0, 2.5, 0.0, 1).energy_per_beacon(), Some(0.25));
        let mut quiet = record(1, 2.5, 0.0, 0);
        quiet.beacons_sent = 0;
        assert_eq!(quiet.energy_per_beacon(), None);
    }

    #[test]
    fn test_record_serializes_discovered_as_flag() {
        let mut writer = csv::Writer::from_writer(vec![]);
        writer.serialize(record(3, 1.5, 0.5, 2)).unwrap();
        writer.serialize(record(4, 1.5, 0.5, 0)).unwrap();
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("NodeID,InitialEnergy,FinalEnergy,Consumed,Harvested,BeaconsSent,BeaconsReceived,Discovered")
        );
        assert_eq!(lines.next(), Some("3,7.2,5.7,1.5,0.5,10,2,1"));
        assert_eq!(lines.next(), Some("4,7.2,5.7,1.5,0.5,10,0,0"));
    }
}
