//! Device state machine.

use crate::UplinkSender;
use lorasim_core::{Action, Event, StateMachine};
use lorasim_discovery::DiscoveryStateMachine;
use lorasim_harvest::EnergyHarvestingTracker;
use lorasim_types::DeviceId;
use std::time::Duration;
use tracing::warn;

/// Combined state machine for one simulated device.
///
/// Routes events to the harvest tracker, the discovery state machine and
/// the optional uplink sender. Each component owns its own state; the
/// device only owns the lifetime flag.
#[derive(Debug)]
pub struct DeviceStateMachine {
    id: DeviceId,
    harvester: EnergyHarvestingTracker,
    discovery: DiscoveryStateMachine,
    uplink: Option<UplinkSender>,

    /// Set once the reservoir ran dry. Lifecycle starts are ignored after.
    depleted: bool,

    now: Duration,
}

impl DeviceStateMachine {
    pub fn new(
        id: DeviceId,
        harvester: EnergyHarvestingTracker,
        discovery: DiscoveryStateMachine,
        uplink: Option<UplinkSender>,
    ) -> Self {
        Self {
            id,
            harvester,
            discovery,
            uplink,
            depleted: false,
            now: Duration::ZERO,
        }
    }

    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub fn harvester(&self) -> &EnergyHarvestingTracker {
        &self.harvester
    }

    pub fn discovery(&self) -> &DiscoveryStateMachine {
        &self.discovery
    }

    pub fn uplink(&self) -> Option<&UplinkSender> {
        self.uplink.as_ref()
    }

    /// Whether the device's energy ran out.
    pub fn is_depleted(&self) -> bool {
        self.depleted
    }

    fn start_application(&mut self) -> Vec<Action> {
        let mut actions = self.discovery.start_application();
        if let Some(uplink) = self.uplink.as_mut() {
            actions.extend(uplink.start());
        }
        actions
    }

    fn stop_application(&mut self) -> Vec<Action> {
        let mut actions = self.discovery.stop_application();
        if let Some(uplink) = self.uplink.as_mut() {
            actions.extend(uplink.stop());
        }
        actions
    }

    /// End the device's lifetime: every component stops and every timer
    /// it owns is cancelled.
    fn on_energy_depleted(&mut self) -> Vec<Action> {
        if self.depleted {
            return vec![];
        }
        self.depleted = true;
        warn!(
            device = %self.id,
            at = ?self.now,
            beacons_sent = self.discovery.beacons_sent(),
            "Device energy depleted"
        );

        let mut actions = self.stop_application();
        actions.extend(self.harvester.stop());
        actions
    }
}

impl StateMachine for DeviceStateMachine {
    fn handle(&mut self, event: Event) -> Vec<Action> {
        match event {
            Event::HarvestTick => self.harvester.on_tick(),
            Event::BeaconTimer => self.discovery.on_beacon_timer(),
            Event::ListenWindowTimer => self.discovery.on_listen_window_timer(),
            Event::UplinkTimer => {
                let Some(uplink) = self.uplink.as_mut() else {
                    panic!("uplink timer fired for {} without an uplink sender", self.id);
                };
                uplink.on_timer()
            }

            Event::StartHarvesting if self.depleted => vec![],
            Event::StartHarvesting => self.harvester.start(),
            Event::StopHarvesting => self.harvester.stop(),
            Event::StartApplication if self.depleted => vec![],
            Event::StartApplication => self.start_application(),
            Event::StopApplication => self.stop_application(),

            Event::EnergyDepleted => self.on_energy_depleted(),
        }
    }

    fn set_time(&mut self, now: Duration) {
        self.now = now;
        self.harvester.set_time(now);
        self.discovery.set_time(now);
        if let Some(uplink) = self.uplink.as_mut() {
            uplink.set_time(now);
        }
    }

    fn now(&self) -> Duration {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UplinkConfig;
    use lorasim_core::TimerId;
    use lorasim_discovery::DiscoveryConfig;
    use lorasim_types::{DiscoveryProtocol, HarvestScenario};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use tracing_test::traced_test;

    fn make_device(uplink: bool) -> DeviceStateMachine {
        let id = DeviceId(1);
        DeviceStateMachine::new(
            id,
            EnergyHarvestingTracker::new(HarvestScenario::ConstantSolar, 0.00125),
            DiscoveryStateMachine::new(
                id,
                DiscoveryConfig::new(DiscoveryProtocol::BeaconBased, Duration::from_secs(60)),
                ChaCha8Rng::seed_from_u64(1),
            ),
            uplink.then(|| UplinkSender::new(id, UplinkConfig::default())),
        )
    }

    fn timers_set(actions: &[Action]) -> Vec<TimerId> {
        actions
            .iter()
            .filter_map(|a| match a {
                Action::SetTimer { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }

    #[traced_test]
    #[test]
    fn test_lifecycle_routing() {
        let mut device = make_device(true);

        let actions = device.handle(Event::StartHarvesting);
        assert_eq!(timers_set(&actions), vec![TimerId::HarvestTick]);

        let actions = device.handle(Event::StartApplication);
        assert_eq!(timers_set(&actions), vec![TimerId::Beacon, TimerId::Uplink]);

        device.set_time(Duration::from_secs(60));
        device.handle(Event::BeaconTimer);
        assert_eq!(device.discovery().beacons_sent(), 1);
        assert_eq!(device.now(), Duration::from_secs(60));
    }

    #[traced_test]
    #[test]
    fn test_depletion_stops_everything() {
        let mut device = make_device(true);
        device.handle(Event::StartHarvesting);
        device.handle(Event::StartApplication);

        let actions = device.handle(Event::EnergyDepleted);
        assert!(device.is_depleted());
        assert!(!device.harvester().is_running());
        assert!(!device.discovery().is_active());
        for id in [TimerId::HarvestTick, TimerId::Beacon, TimerId::ListenWindow, TimerId::Uplink] {
            assert!(actions.contains(&Action::CancelTimer { id }), "{id:?} not cancelled");
        }

        // Depletion is terminal.
        assert!(device.handle(Event::EnergyDepleted).is_empty());
        assert!(device.handle(Event::StartApplication).is_empty());
        assert!(device.handle(Event::StartHarvesting).is_empty());
    }

    #[test]
    fn test_without_uplink() {
        let mut device = make_device(false);
        let actions = device.handle(Event::StartApplication);
        assert_eq!(timers_set(&actions), vec![TimerId::Beacon]);
        assert!(device.uplink().is_none());
    }
}
