//! Discovery state machine.
//!
//! Drives beacon transmission and listen-window timing for one device.
//!
//! # Protocols
//!
//! | Protocol  | First beacon          | Next beacon           | Receiver            |
//! |-----------|-----------------------|-----------------------|---------------------|
//! | Beacon    | `interval`            | `interval`            | always on           |
//! | ALOHA     | `U[0, interval)`      | `U[0, interval)`      | always on           |
//! | Scheduled | `interval`            | `interval`            | on `listen`, off the rest of each interval |
//! | Adaptive  | `interval`            | `interval`            | always on           |
//!
//! Every beacon fire increments `beacons_sent`; if the receiver is on at
//! that instant the device hears its own beacon and `beacons_received` is
//! incremented too. Peer reception belongs to the radio layer and is not
//! modelled here.

use crate::DiscoveryConfig;
use lorasim_core::{Action, TimerId, Transmission};
use lorasim_types::{DeviceId, DiscoveryProtocol};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;
use tracing::{debug, info, trace};

/// How the delay to the next beacon is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeaconSchedule {
    /// Exactly one beacon interval.
    Fixed,
    /// A fresh uniform draw from `[0, beacon_interval)`.
    Randomized,
}

/// When the receiver is on while the application runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListeningPolicy {
    /// On for the whole active lifetime.
    Continuous,
    /// On for `on`, then off for `off`, repeating from application start.
    DutyCycled { on: Duration, off: Duration },
}

impl BeaconSchedule {
    fn for_protocol(protocol: DiscoveryProtocol) -> Self {
        match protocol {
            DiscoveryProtocol::AlohaDiscovery => BeaconSchedule::Randomized,
            // Adaptive has no energy-aware policy yet and runs as Beacon.
            DiscoveryProtocol::BeaconBased
            | DiscoveryProtocol::ScheduledListening
            | DiscoveryProtocol::AdaptiveDiscovery => BeaconSchedule::Fixed,
        }
    }
}

impl ListeningPolicy {
    fn for_config(config: &DiscoveryConfig) -> Self {
        match config.protocol {
            DiscoveryProtocol::ScheduledListening
                if config.listen_interval < config.beacon_interval =>
            {
                ListeningPolicy::DutyCycled {
                    on: config.listen_interval,
                    off: config.beacon_interval - config.listen_interval,
                }
            }
            _ => ListeningPolicy::Continuous,
        }
    }
}

/// Discovery state for a single device.
///
/// Owns at most one pending beacon timer and one pending listen-window
/// timer; the runner enforces this by keying timers on [`TimerId`].
#[derive(Debug)]
pub struct DiscoveryStateMachine {
    device: DeviceId,
    config: DiscoveryConfig,
    schedule: BeaconSchedule,
    policy: ListeningPolicy,

    /// Per-device random stream for ALOHA delays.
    rng: ChaCha8Rng,

    /// Whether the receiver is on.
    listening: bool,

    /// Whether the application is between start and stop.
    active: bool,

    /// Beacons transmitted. Monotonic.
    beacons_sent: u64,

    /// Own beacons heard while listening. Never exceeds `beacons_sent`.
    beacons_received: u64,

    /// Time of the most recent beacon.
    last_beacon_at: Option<Duration>,

    /// When the application last started.
    started_at: Option<Duration>,

    /// Time from application start to the first beacon heard.
    first_discovered_at: Option<Duration>,

    /// Current simulation time.
    now: Duration,
}

impl DiscoveryStateMachine {
    /// Create an idle state machine.
    pub fn new(device: DeviceId, config: DiscoveryConfig, rng: ChaCha8Rng) -> Self {
        let schedule = BeaconSchedule::for_protocol(config.protocol);
        let policy = ListeningPolicy::for_config(&config);
        Self {
            device,
            config,
            schedule,
            policy,
            rng,
            listening: false,
            active: false,
            beacons_sent: 0,
            beacons_received: 0,
            last_beacon_at: None,
            started_at: None,
            first_discovered_at: None,
            now: Duration::ZERO,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Public API
    // ═══════════════════════════════════════════════════════════════════════════

    /// Set the current time.
    pub fn set_time(&mut self, now: Duration) {
        self.now = now;
    }

    /// Start the application: turn the receiver on and arm the first beacon.
    ///
    /// Starting an already active state machine does nothing.
    pub fn start_application(&mut self) -> Vec<Action> {
        if self.active {
            return vec![];
        }
        self.active = true;
        self.listening = true;
        self.started_at = Some(self.now);

        let first_beacon = self.next_beacon_delay();
        info!(
            device = %self.device,
            protocol = %self.config.protocol,
            first_beacon = ?first_beacon,
            policy = ?self.policy,
            "Discovery started"
        );

        let mut actions = vec![Action::SetListening { listening: true }];
        if let ListeningPolicy::DutyCycled { on, .. } = self.policy {
            actions.push(Action::SetTimer {
                id: TimerId::ListenWindow,
                duration: on,
            });
        }
        actions.push(Action::SetTimer {
            id: TimerId::Beacon,
            duration: first_beacon,
        });
        actions
    }

    /// Stop the application.
    ///
    /// Both timers are cancelled unconditionally and the receiver is turned
    /// off, so no discovery callback fires after this returns.
    pub fn stop_application(&mut self) -> Vec<Action> {
        if self.active {
            info!(
                device = %self.device,
                beacons_sent = self.beacons_sent,
                beacons_received = self.beacons_received,
                "Discovery stopped"
            );
        }
        self.active = false;
        self.listening = false;
        vec![
            Action::CancelTimer {
                id: TimerId::Beacon,
            },
            Action::CancelTimer {
                id: TimerId::ListenWindow,
            },
            Action::SetListening { listening: false },
        ]
    }

    /// Handle the beacon timer: send a beacon and arm the next one.
    ///
    /// # Panics
    ///
    /// Panics if the application is stopped; stopping cancels the beacon
    /// timer, so reaching this is a scheduler defect.
    pub fn on_beacon_timer(&mut self) -> Vec<Action> {
        assert!(
            self.active,
            "beacon timer fired for stopped {} at {:?}",
            self.device, self.now
        );

        self.beacons_sent += 1;
        if self.listening {
            self.beacons_received += 1;
            if self.first_discovered_at.is_none() {
                let since_start = self.now.saturating_sub(self.started_at.unwrap_or_default());
                self.first_discovered_at = Some(since_start);
                debug!(
                    device = %self.device,
                    after = ?since_start,
                    "First discovery"
                );
            }
        }
        self.last_beacon_at = Some(self.now);

        let next = self.next_beacon_delay();
        trace!(
            device = %self.device,
            sent = self.beacons_sent,
            received = self.beacons_received,
            listening = self.listening,
            next = ?next,
            "Beacon sent"
        );

        vec![
            Action::Transmit {
                transmission: Transmission::Beacon,
            },
            Action::SetTimer {
                id: TimerId::Beacon,
                duration: next,
            },
        ]
    }

    /// Handle a listen-window boundary: toggle the receiver and arm the
    /// next boundary.
    ///
    /// # Panics
    ///
    /// Panics if the application is stopped or the policy is continuous;
    /// neither ever arms this timer.
    pub fn on_listen_window_timer(&mut self) -> Vec<Action> {
        assert!(
            self.active,
            "listen window timer fired for stopped {} at {:?}",
            self.device, self.now
        );
        let ListeningPolicy::DutyCycled { on, off } = self.policy else {
            panic!(
                "listen window timer fired for {} with continuous listening",
                self.device
            );
        };

        self.listening = !self.listening;
        let duration = if self.listening { on } else { off };
        debug!(
            device = %self.device,
            listening = self.listening,
            next_boundary = ?duration,
            "Listen window toggled"
        );

        vec![
            Action::SetListening {
                listening: self.listening,
            },
            Action::SetTimer {
                id: TimerId::ListenWindow,
                duration,
            },
        ]
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Accessors
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn device(&self) -> DeviceId {
        self.device
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    pub fn listening_policy(&self) -> ListeningPolicy {
        self.policy
    }

    /// Whether the receiver is currently on.
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Whether the application is running.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn beacons_sent(&self) -> u64 {
        self.beacons_sent
    }

    pub fn beacons_received(&self) -> u64 {
        self.beacons_received
    }

    /// A device counts as discovered once it has heard at least one beacon.
    pub fn discovered(&self) -> bool {
        self.beacons_received > 0
    }

    pub fn last_beacon_at(&self) -> Option<Duration> {
        self.last_beacon_at
    }

    /// Time from application start to the first beacon heard, if any.
    pub fn first_discovered_at(&self) -> Option<Duration> {
        self.first_discovered_at
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Internal
    // ═══════════════════════════════════════════════════════════════════════════

    fn next_beacon_delay(&mut self) -> Duration {
        match self.schedule {
            BeaconSchedule::Fixed => self.config.beacon_interval,
            BeaconSchedule::Randomized => {
                let bound = self.config.beacon_interval.as_secs_f64();
                if bound > 0.0 {
                    Duration::from_secs_f64(self.rng.gen_range(0.0..bound))
                } else {
                    Duration::ZERO
                }
            }
        }
    }
}
