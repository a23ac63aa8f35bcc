//! Periodic data uplink.
//!
//! Every device reports to the gateway on a fixed period while its
//! application runs. Uplinks only cost energy; they never touch discovery
//! counters.

use lorasim_core::{Action, TimerId, Transmission};
use lorasim_types::DeviceId;
use std::time::Duration;
use tracing::trace;

/// Timing of the periodic uplink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UplinkConfig {
    /// Delay from application start to the first uplink.
    pub start_delay: Duration,
    /// Spacing between uplinks.
    pub period: Duration,
}

impl Default for UplinkConfig {
    fn default() -> Self {
        Self {
            start_delay: Duration::from_secs(10),
            period: Duration::from_secs(300),
        }
    }
}

/// Sends an uplink every `period` while running.
#[derive(Debug)]
pub struct UplinkSender {
    device: DeviceId,
    config: UplinkConfig,
    running: bool,
    sent: u64,
    now: Duration,
}

impl UplinkSender {
    pub fn new(device: DeviceId, config: UplinkConfig) -> Self {
        Self {
            device,
            config,
            running: false,
            sent: 0,
            now: Duration::ZERO,
        }
    }

    pub fn set_time(&mut self, now: Duration) {
        self.now = now;
    }

    /// Arm the first uplink. A no-op while already running.
    pub fn start(&mut self) -> Vec<Action> {
        if self.running {
            return vec![];
        }
        self.running = true;
        vec![Action::SetTimer {
            id: TimerId::Uplink,
            duration: self.config.start_delay,
        }]
    }

    /// Cancel the pending uplink.
    pub fn stop(&mut self) -> Vec<Action> {
        self.running = false;
        vec![Action::CancelTimer {
            id: TimerId::Uplink,
        }]
    }

    /// Handle the uplink timer.
    ///
    /// # Panics
    ///
    /// Panics if the sender is stopped.
    pub fn on_timer(&mut self) -> Vec<Action> {
        assert!(
            self.running,
            "uplink timer fired for stopped {} at {:?}",
            self.device, self.now
        );
        self.sent += 1;
        trace!(device = %self.device, sent = self.sent, "Uplink sent");

        vec![
            Action::Transmit {
                transmission: Transmission::Uplink,
            },
            Action::SetTimer {
                id: TimerId::Uplink,
                duration: self.config.period,
            },
        ]
    }

    /// Uplinks sent so far.
    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}
