//! Simulation driver.

use crate::{
    EnergySample, SimulationReport, SimulatorConfig, SimulatorError, StatisticsAggregator,
};
use lorasim_simulation::{EnergySource, SimulationRunner};
use std::time::Duration;
use tracing::info;

/// Runs one configured simulation from start to report.
pub struct Simulator {
    config: SimulatorConfig,
    runner: SimulationRunner,
    stop_time: Duration,
    /// Timeline sampling step, when recording.
    sample_interval: Option<Duration>,
}

impl Simulator {
    /// Validate `config` and build the fleet.
    pub fn new(config: SimulatorConfig) -> Result<Self, SimulatorError> {
        let fleet = config.to_fleet_config()?;
        let stop_time = config.stop_time()?;
        let sample_interval = if config.record_energy_timeline {
            Some(config.energy_log_interval()?)
        } else {
            None
        };

        let runner = SimulationRunner::new(fleet, config.seed);
        Ok(Self {
            config,
            runner,
            stop_time,
            sample_interval,
        })
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Get the underlying simulation runner.
    pub fn runner(&self) -> &SimulationRunner {
        &self.runner
    }

    /// Run to the stop time and collect results.
    pub fn run(&mut self) -> Result<SimulationReport, SimulatorError> {
        info!(
            devices = self.config.device_count,
            duration_secs = self.config.duration_secs,
            seed = self.config.seed,
            "Starting simulation"
        );
        self.runner.initialize(self.stop_time);

        let mut timeline = Vec::new();
        match self.sample_interval {
            Some(step) => {
                self.sample(&mut timeline);
                while self.runner.now() < self.stop_time {
                    let next = (self.runner.now() + step).min(self.stop_time);
                    self.runner.run_until(next);
                    self.sample(&mut timeline);
                }
            }
            None => self.runner.run_until(self.stop_time),
        }

        let mut aggregator = StatisticsAggregator::new(self.stop_time);
        aggregator.collect(&self.runner);
        let summary = aggregator.summarize()?;

        let stats = self.runner.stats().clone();
        info!(
            events = stats.events_processed,
            beacons = stats.beacons_transmitted,
            uplinks = stats.uplinks_transmitted,
            depleted = stats.devices_depleted,
            sustainable = summary.verdict.is_energy_positive(),
            "Simulation complete"
        );

        Ok(SimulationReport {
            records: aggregator.into_records(),
            summary,
            stats,
            energy_timeline: timeline,
            seed: self.config.seed,
        })
    }

    fn sample(&self, timeline: &mut Vec<EnergySample>) {
        let time_secs = self.runner.now().as_secs_f64();
        for device in self.runner.devices() {
            let id = device.id();
            let Some(reservoir) = self.runner.reservoir(id) else {
                continue;
            };
            timeline.push(EnergySample {
                time_secs,
                device: id,
                remaining_energy: reservoir.remaining_energy(),
                harvested: device.harvester().total_harvested(),
            });
        }
    }
}
