//! Per-device harvested energy ledger.

use crate::harvesting_rate;
use lorasim_core::{Action, TimerId};
use lorasim_types::HarvestScenario;
use std::time::Duration;
use tracing::debug;

/// Integration step used unless overridden.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Integrates harvested power on a fixed tick.
///
/// The tracker is a passive ledger: it reports each increment through
/// [`Action::RecordHarvest`] but never writes to the device's energy
/// reservoir itself. Whether increments reach the reservoir is the runner's
/// policy.
///
/// Each tick at time `t` credits `rate(t - tick) * tick`, so the integral
/// over `[start, start + n * tick]` is a left Riemann sum and is exact for
/// constant-rate scenarios.
#[derive(Debug)]
pub struct EnergyHarvestingTracker {
    scenario: HarvestScenario,
    /// Base power in watts.
    base_rate: f64,
    tick_interval: Duration,
    /// Cumulative harvested energy in joules. Never decreases.
    total_harvested: f64,
    /// Zero reference for elapsed-time computation.
    started_at: Duration,
    running: bool,
    now: Duration,
}

impl EnergyHarvestingTracker {
    /// Create a stopped tracker with the default 1 s tick.
    pub fn new(scenario: HarvestScenario, base_rate: f64) -> Self {
        Self {
            scenario,
            base_rate,
            tick_interval: DEFAULT_TICK_INTERVAL,
            total_harvested: 0.0,
            started_at: Duration::ZERO,
            running: false,
            now: Duration::ZERO,
        }
    }

    /// Use a different integration step.
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    /// Set the current time.
    pub fn set_time(&mut self, now: Duration) {
        self.now = now;
    }

    /// Start integrating from the current time.
    ///
    /// Starting an already running tracker does nothing. A tracker with no
    /// harvester attached is marked running but never ticks.
    pub fn start(&mut self) -> Vec<Action> {
        if self.running {
            return vec![];
        }
        self.running = true;
        self.started_at = self.now;

        debug!(
            scenario = %self.scenario,
            base_rate = self.base_rate,
            at = ?self.now,
            "Harvest tracking started"
        );

        if !self.scenario.harvests() {
            return vec![];
        }
        vec![Action::SetTimer {
            id: TimerId::HarvestTick,
            duration: self.tick_interval,
        }]
    }

    /// Stop integrating. The pending tick, if any, is cancelled.
    pub fn stop(&mut self) -> Vec<Action> {
        if self.running {
            debug!(
                total_harvested = self.total_harvested,
                at = ?self.now,
                "Harvest tracking stopped"
            );
        }
        self.running = false;
        vec![Action::CancelTimer {
            id: TimerId::HarvestTick,
        }]
    }

    /// Handle the harvest tick timer.
    ///
    /// # Panics
    ///
    /// Panics if the tracker is stopped. Stopping cancels the tick, so a
    /// tick reaching a stopped tracker means the scheduler lost a
    /// cancellation.
    pub fn on_tick(&mut self) -> Vec<Action> {
        assert!(
            self.running,
            "harvest tick delivered to a stopped tracker at {:?}",
            self.now
        );

        let elapsed = self.now.saturating_sub(self.started_at);
        let interval_start = elapsed.saturating_sub(self.tick_interval);
        let power = harvesting_rate(self.scenario, interval_start.as_secs_f64(), self.base_rate);
        let joules = power * self.tick_interval.as_secs_f64();
        self.total_harvested += joules;

        let mut actions = vec![Action::SetTimer {
            id: TimerId::HarvestTick,
            duration: self.tick_interval,
        }];
        if joules > 0.0 {
            actions.push(Action::RecordHarvest { joules });
        }
        actions
    }

    /// Cumulative harvested energy in joules.
    pub fn total_harvested(&self) -> f64 {
        self.total_harvested
    }

    /// Whether the tracker is currently integrating.
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn scenario(&self) -> HarvestScenario {
        self.scenario
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    const R: f64 = 0.00125;

    /// Run `ticks` ticks one second apart, starting at `t = 0`.
    fn run_ticks(tracker: &mut EnergyHarvestingTracker, ticks: u64) {
        tracker.set_time(Duration::ZERO);
        tracker.start();
        for i in 1..=ticks {
            tracker.set_time(Duration::from_secs(i));
            tracker.on_tick();
        }
    }

    #[traced_test]
    #[test]
    fn test_start_arms_tick() {
        let mut tracker = EnergyHarvestingTracker::new(HarvestScenario::ConstantSolar, R);
        let actions = tracker.start();
        assert_eq!(
            actions,
            vec![Action::SetTimer {
                id: TimerId::HarvestTick,
                duration: Duration::from_secs(1)
            }]
        );
        assert!(tracker.is_running());
        // Second start is a no-op.
        assert!(tracker.start().is_empty());
    }

    #[test]
    fn test_constant_solar_integrates_exactly() {
        for seconds in [0u64, 1, 60, 3600] {
            let mut tracker = EnergyHarvestingTracker::new(HarvestScenario::ConstantSolar, R);
            run_ticks(&mut tracker, seconds);
            let expected = R * seconds as f64;
            assert!(
                (tracker.total_harvested() - expected).abs() < 1e-9,
                "T = {seconds}: {} != {expected}",
                tracker.total_harvested()
            );
        }
    }

    #[test]
    fn test_tick_reports_increment() {
        let mut tracker = EnergyHarvestingTracker::new(HarvestScenario::ConstantSolar, R);
        tracker.start();
        tracker.set_time(Duration::from_secs(1));
        let actions = tracker.on_tick();
        assert!(actions.contains(&Action::RecordHarvest { joules: R }));
    }

    #[test]
    fn test_day_night_first_tick_is_zero() {
        // The first interval starts at dawn, where power is zero.
        let mut tracker = EnergyHarvestingTracker::new(HarvestScenario::DayNightCycle, R);
        tracker.start();
        tracker.set_time(Duration::from_secs(1));
        let actions = tracker.on_tick();
        assert_eq!(tracker.total_harvested(), 0.0);
        assert!(!actions
            .iter()
            .any(|a| matches!(a, Action::RecordHarvest { .. })));
    }

    #[test]
    fn test_harvested_is_monotonic() {
        let mut tracker = EnergyHarvestingTracker::new(HarvestScenario::Hybrid, R);
        tracker.start();
        let mut previous = 0.0;
        for i in 1..=500 {
            tracker.set_time(Duration::from_secs(i));
            tracker.on_tick();
            assert!(tracker.total_harvested() > previous);
            previous = tracker.total_harvested();
        }
    }

    #[test]
    fn test_no_harvester_never_ticks() {
        let mut tracker = EnergyHarvestingTracker::new(HarvestScenario::NoHarvesting, R);
        assert!(tracker.start().is_empty());
        assert!(tracker.is_running());
        assert_eq!(tracker.total_harvested(), 0.0);
    }

    #[test]
    fn test_stop_cancels_tick() {
        let mut tracker = EnergyHarvestingTracker::new(HarvestScenario::LowLight, R);
        tracker.start();
        let actions = tracker.stop();
        assert_eq!(
            actions,
            vec![Action::CancelTimer {
                id: TimerId::HarvestTick
            }]
        );
        assert!(!tracker.is_running());
        // Idempotent.
        assert_eq!(tracker.stop().len(), 1);
    }

    #[test]
    #[should_panic(expected = "stopped tracker")]
    fn test_tick_after_stop_is_a_defect() {
        let mut tracker = EnergyHarvestingTracker::new(HarvestScenario::ConstantSolar, R);
        tracker.start();
        tracker.stop();
        tracker.on_tick();
    }

    #[test]
    fn test_elapsed_measured_from_start() {
        // Starting mid-run shifts the day/night phase with it.
        let mut tracker = EnergyHarvestingTracker::new(HarvestScenario::DayNightCycle, R);
        tracker.set_time(Duration::from_secs(5_000));
        tracker.start();
        tracker.set_time(Duration::from_secs(5_001));
        tracker.on_tick();
        assert_eq!(tracker.total_harvested(), 0.0);
    }
}
