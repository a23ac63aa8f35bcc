//! Configuration for discovery timing.

use lorasim_types::DiscoveryProtocol;
use std::time::Duration;

/// Beacon and listen-window timing for one device.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryConfig {
    /// Protocol variant driving the state machine.
    pub protocol: DiscoveryProtocol,

    /// Spacing between beacons. For ALOHA this is the upper bound of the
    /// uniform random spacing.
    pub beacon_interval: Duration,

    /// Receiver on-time per beacon interval under scheduled listening.
    /// Ignored by the other protocols.
    pub listen_interval: Duration,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self::new(DiscoveryProtocol::default(), Duration::from_secs(60))
    }
}

impl DiscoveryConfig {
    /// Create a config with the listen window at half the beacon interval.
    pub fn new(protocol: DiscoveryProtocol, beacon_interval: Duration) -> Self {
        Self {
            protocol,
            beacon_interval,
            listen_interval: beacon_interval / 2,
        }
    }

    /// Override the listen window.
    pub fn with_listen_interval(mut self, listen_interval: Duration) -> Self {
        self.listen_interval = listen_interval;
        self
    }

    /// Fraction of time the receiver is on, in `[0, 1]`.
    pub fn duty_cycle(&self) -> f64 {
        match self.protocol {
            DiscoveryProtocol::ScheduledListening if !self.beacon_interval.is_zero() => {
                (self.listen_interval.as_secs_f64() / self.beacon_interval.as_secs_f64()).min(1.0)
            }
            _ => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listen_defaults_to_half_beacon() {
        let config = DiscoveryConfig::new(DiscoveryProtocol::ScheduledListening, Duration::from_secs(60));
        assert_eq!(config.listen_interval, Duration::from_secs(30));
        assert_eq!(config.duty_cycle(), 0.5);
    }

    #[test]
    fn test_continuous_protocols_have_full_duty_cycle() {
        let config = DiscoveryConfig::new(DiscoveryProtocol::AlohaDiscovery, Duration::from_secs(60))
            .with_listen_interval(Duration::from_secs(5));
        assert_eq!(config.duty_cycle(), 1.0);
    }

    #[test]
    fn test_oversized_window_saturates() {
        let config = DiscoveryConfig::new(DiscoveryProtocol::ScheduledListening, Duration::from_secs(10))
            .with_listen_interval(Duration::from_secs(30));
        assert_eq!(config.duty_cycle(), 1.0);
    }
}
