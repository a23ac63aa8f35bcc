//! Instantaneous harvesting power per scenario.

use lorasim_types::HarvestScenario;
use std::f64::consts::PI;

/// Length of one day/night cycle in seconds (12 h).
pub const DAY_NIGHT_PERIOD_SECS: f64 = 43_200.0;

/// Length of the daylight half of a cycle in seconds.
pub const DAYLIGHT_SECS: f64 = 21_600.0;

/// Fraction of the base rate available at night and in low light.
pub const LOW_LIGHT_FRACTION: f64 = 0.05;

/// Residual ambient RF contribution in the hybrid scenario, as a fraction
/// of the base rate.
pub const AMBIENT_RF_FRACTION: f64 = 0.001;

/// Instantaneous harvested power in watts.
///
/// `elapsed_secs` is measured from the moment harvesting started. The
/// function is pure: the same inputs always give the same power.
///
/// Daylight covers phases `[0, 21600]` of each 43200 s period and follows a
/// half-sine peaking at `base_rate`; it is exactly zero at both ends. The
/// remainder of the period is night at `0.05 * base_rate`.
pub fn harvesting_rate(scenario: HarvestScenario, elapsed_secs: f64, base_rate: f64) -> f64 {
    match scenario {
        HarvestScenario::NoHarvesting => 0.0,
        HarvestScenario::ConstantSolar => base_rate,
        HarvestScenario::DayNightCycle => day_night(elapsed_secs, base_rate),
        HarvestScenario::LowLight => LOW_LIGHT_FRACTION * base_rate,
        HarvestScenario::Hybrid => {
            day_night(elapsed_secs, base_rate) + AMBIENT_RF_FRACTION * base_rate
        }
    }
}

fn day_night(elapsed_secs: f64, base_rate: f64) -> f64 {
    let phase_secs = elapsed_secs.rem_euclid(DAY_NIGHT_PERIOD_SECS);
    if phase_secs < DAYLIGHT_SECS {
        base_rate * (PI * phase_secs / DAYLIGHT_SECS).sin()
    } else if phase_secs == DAYLIGHT_SECS {
        // Dusk. sin(pi) evaluates to ~1e-16, not zero.
        0.0
    } else {
        LOW_LIGHT_FRACTION * base_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const R: f64 = 0.00125;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_no_harvesting_is_zero() {
        for t in [0.0, 1.0, 10_800.0, 50_000.0] {
            assert_eq!(harvesting_rate(HarvestScenario::NoHarvesting, t, R), 0.0);
        }
    }

    #[test]
    fn test_constant_and_low_light() {
        assert_eq!(harvesting_rate(HarvestScenario::ConstantSolar, 123.0, R), R);
        assert!(close(
            harvesting_rate(HarvestScenario::LowLight, 123.0, R),
            0.05 * R
        ));
    }

    #[test]
    fn test_day_night_shape() {
        let s = HarvestScenario::DayNightCycle;
        assert_eq!(harvesting_rate(s, 0.0, R), 0.0);
        assert!(close(harvesting_rate(s, 10_800.0, R), R));
        assert_eq!(harvesting_rate(s, 21_600.0, R), 0.0);
        for t in [21_601.0, 30_000.0, 43_199.0] {
            assert!(close(harvesting_rate(s, t, R), 0.05 * R), "t = {t}");
        }
        // Next period starts a new day.
        assert!(close(harvesting_rate(s, 43_200.0 + 10_800.0, R), R));
    }

    #[test]
    fn test_day_is_symmetric() {
        let s = HarvestScenario::DayNightCycle;
        for t in [100.0, 3_600.0, 9_000.0] {
            assert!(close(
                harvesting_rate(s, t, R),
                harvesting_rate(s, DAYLIGHT_SECS - t, R)
            ));
        }
    }

    #[test]
    fn test_hybrid_adds_ambient_rf() {
        for t in [0.0, 5_000.0, 10_800.0, 21_600.0, 30_000.0, 90_000.0] {
            let expected = harvesting_rate(HarvestScenario::DayNightCycle, t, R) + 0.001 * R;
            assert!(close(harvesting_rate(HarvestScenario::Hybrid, t, R), expected));
        }
    }
}
