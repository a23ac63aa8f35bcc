//! Deterministic simulation runner.
//!
//! Owns simulated time, the event queue, and every piece of state the
//! device models are not allowed to touch: radios and reservoirs.

use crate::event_queue::EventKey;
use crate::{uniform_disc, EnergyReservoir, EnergySource, FleetConfig, RadioEnergyModel};
use lorasim_core::{Action, Event, EventPriority, StateMachine, TimerId, Transmission};
use lorasim_discovery::DiscoveryStateMachine;
use lorasim_harvest::EnergyHarvestingTracker;
use lorasim_node::{DeviceStateMachine, UplinkSender};
use lorasim_types::{DeviceId, Position};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Deterministic simulation runner.
///
/// Processes events in deterministic order and executes actions.
/// Given the same seed, produces identical results every run.
///
/// Devices never interact: each one's state machine, radio and reservoir
/// are indexed by its [`DeviceId`].
pub struct SimulationRunner {
    config: FleetConfig,

    /// All devices, indexed by `DeviceId`.
    devices: Vec<DeviceStateMachine>,

    /// Report-only positions, indexed by `DeviceId`.
    positions: Vec<Position>,

    /// Per-device energy storage.
    reservoirs: Vec<EnergyReservoir>,

    /// Per-device radio energy integration.
    radios: Vec<RadioEnergyModel>,

    /// Global event queue, ordered deterministically.
    event_queue: BTreeMap<EventKey, Event>,

    /// Sequence counter for deterministic ordering.
    sequence: u64,

    /// Current simulation time.
    now: Duration,

    /// Timer registry for cancellation support.
    /// Maps (device, timer_id) -> event_key for removal.
    timers: HashMap<(DeviceId, TimerId), EventKey>,

    /// Statistics.
    stats: SimulationStats,

    /// Every transmission, when enabled.
    transmission_log: Option<Vec<TransmissionRecord>>,
}

/// Statistics collected during simulation.
#[derive(Debug, Default, Clone)]
pub struct SimulationStats {
    /// Total events processed.
    pub events_processed: u64,
    /// Events processed by priority.
    pub events_by_priority: [u64; EventPriority::COUNT],
    /// Total actions generated.
    pub actions_generated: u64,
    /// Timers set.
    pub timers_set: u64,
    /// Timers cancelled while pending.
    pub timers_cancelled: u64,
    /// Beacon frames put on the air.
    pub beacons_transmitted: u64,
    /// Uplink frames put on the air.
    pub uplinks_transmitted: u64,
    /// Harvest increments reported by trackers, in joules.
    pub energy_harvested: f64,
    /// Devices whose reservoir ran dry.
    pub devices_depleted: u64,
}

/// One frame put on the air.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransmissionRecord {
    pub time: Duration,
    pub device: DeviceId,
    pub transmission: Transmission,
}

impl SimulationRunner {
    /// Create a new simulation runner with the given configuration.
    ///
    /// One master stream seeded from `seed` first places every device and
    /// then seeds each device's own random stream.
    pub fn new(config: FleetConfig, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let positions = uniform_disc(config.device_count, config.radius, &mut rng);

        let devices: Vec<DeviceStateMachine> = (0..config.device_count)
            .map(|i| {
                let id = DeviceId(i);
                let device_rng = ChaCha8Rng::seed_from_u64(rng.gen());
                DeviceStateMachine::new(
                    id,
                    EnergyHarvestingTracker::new(config.scenario, config.base_rate)
                        .with_tick_interval(config.harvest_tick),
                    DiscoveryStateMachine::new(id, config.discovery.clone(), device_rng),
                    config
                        .uplink
                        .clone()
                        .map(|uplink| UplinkSender::new(id, uplink)),
                )
            })
            .collect();

        let reservoirs = (0..config.device_count)
            .map(|_| EnergyReservoir::new(&config.reservoir))
            .collect();
        let radios = (0..config.device_count)
            .map(|_| RadioEnergyModel::new(&config.consumption))
            .collect();

        info!(
            devices = config.device_count,
            scenario = %config.scenario,
            protocol = %config.discovery.protocol,
            seed,
            "Created simulation runner"
        );

        Self {
            config,
            devices,
            positions,
            reservoirs,
            radios,
            event_queue: BTreeMap::new(),
            sequence: 0,
            now: Duration::ZERO,
            timers: HashMap::new(),
            stats: SimulationStats::default(),
            transmission_log: None,
        }
    }

    /// Record every transmission from now on.
    pub fn enable_transmission_log(&mut self) {
        self.transmission_log.get_or_insert_with(Vec::new);
    }

    /// Schedule every device's lifecycle.
    ///
    /// Harvesting starts at time zero and applications at the configured
    /// start; both stop at `stop_time`. Lifecycle events sort after timers
    /// due at the same instant, so work due exactly at `stop_time` still
    /// happens.
    pub fn initialize(&mut self, stop_time: Duration) {
        let start = self.config.application_start;
        for index in 0..self.devices.len() {
            let device = DeviceId(index as u32);
            self.schedule_event(device, Duration::ZERO, Event::StartHarvesting);
            self.schedule_event(device, start, Event::StartApplication);
            self.schedule_event(device, stop_time, Event::StopApplication);
            self.schedule_event(device, stop_time, Event::StopHarvesting);
        }
        info!(
            application_start = ?start,
            stop_time = ?stop_time,
            "Scheduled device lifecycles"
        );
    }

    /// Run all events up to and including `end_time`.
    ///
    /// Afterwards the clock reads `end_time` and every radio is settled to
    /// it, so reservoir readings are current.
    pub fn run_until(&mut self, end_time: Duration) {
        trace!(
            end_time_secs = end_time.as_secs_f64(),
            "Running simulation step"
        );

        while let Some((&key, _)) = self.event_queue.first_key_value() {
            if key.time > end_time {
                debug!(
                    remaining_events = self.event_queue.len(),
                    "Time limit reached"
                );
                break;
            }

            let Some((key, event)) = self.event_queue.pop_first() else {
                break;
            };
            self.now = key.time;
            let device = key.device;

            // Charge idle consumption up to now. If that empties the
            // reservoir, depletion is delivered before this event.
            if self.settle_device(device) {
                self.event_queue.insert(key, event);
                continue;
            }

            if let Some(id) = timer_for(event) {
                if self.timers.get(&(device, id)) == Some(&key) {
                    self.timers.remove(&(device, id));
                }
            }

            trace!(
                time = ?self.now,
                device = %device,
                event = event.type_name(),
                "Processing event"
            );

            self.stats.events_processed += 1;
            self.stats.events_by_priority[event.priority() as usize] += 1;

            let machine = &mut self.devices[device.index()];
            machine.set_time(self.now);
            let actions = machine.handle(event);

            self.stats.actions_generated += actions.len() as u64;

            for action in actions {
                self.process_action(device, action);
            }

            if event == Event::EnergyDepleted {
                self.radios[device.index()].power_off();
            }
        }

        // Always advance time to end_time, even if we ran out of events.
        if self.now < end_time {
            self.now = end_time;
        }
        self.settle_all();

        trace!(
            events_processed = self.stats.events_processed,
            actions_generated = self.stats.actions_generated,
            final_time = ?self.now,
            "Simulation step complete"
        );
    }

    /// Settle every radio to the current time.
    pub fn settle_all(&mut self) {
        for index in 0..self.devices.len() {
            self.settle_device(DeviceId(index as u32));
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Accessors
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn config(&self) -> &FleetConfig {
        &self.config
    }

    /// Get current simulation time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Get simulation statistics.
    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Get a reference to a device's state machine.
    pub fn device(&self, id: DeviceId) -> Option<&DeviceStateMachine> {
        self.devices.get(id.index())
    }

    pub fn devices(&self) -> &[DeviceStateMachine] {
        &self.devices
    }

    /// Get a device's reservoir.
    pub fn reservoir(&self, id: DeviceId) -> Option<&EnergyReservoir> {
        self.reservoirs.get(id.index())
    }

    pub fn radio(&self, id: DeviceId) -> Option<&RadioEnergyModel> {
        self.radios.get(id.index())
    }

    pub fn position(&self, id: DeviceId) -> Option<Position> {
        self.positions.get(id.index()).copied()
    }

    /// Whether `timer` is pending for `device`.
    pub fn has_pending_timer(&self, device: DeviceId, timer: TimerId) -> bool {
        self.timers.contains_key(&(device, timer))
    }

    /// Number of events still queued.
    pub fn pending_events(&self) -> usize {
        self.event_queue.len()
    }

    /// Transmissions recorded so far. Empty unless the log is enabled.
    pub fn transmission_log(&self) -> &[TransmissionRecord] {
        self.transmission_log.as_deref().unwrap_or(&[])
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Internal
    // ═══════════════════════════════════════════════════════════════════════════

    /// Process an action from a device.
    fn process_action(&mut self, from: DeviceId, action: Action) {
        match action {
            Action::SetTimer { id, duration } => {
                if let Some(old) = self.timers.remove(&(from, id)) {
                    self.event_queue.remove(&old);
                }
                let fire_time = self.now + duration;
                let key = self.schedule_event(from, fire_time, id.event());
                self.timers.insert((from, id), key);
                self.stats.timers_set += 1;
            }

            Action::CancelTimer { id } => {
                if let Some(key) = self.timers.remove(&(from, id)) {
                    self.event_queue.remove(&key);
                    self.stats.timers_cancelled += 1;
                }
            }

            Action::Transmit { transmission } => {
                match transmission {
                    Transmission::Beacon => self.stats.beacons_transmitted += 1,
                    Transmission::Uplink => self.stats.uplinks_transmitted += 1,
                }
                if let Some(log) = self.transmission_log.as_mut() {
                    log.push(TransmissionRecord {
                        time: self.now,
                        device: from,
                        transmission,
                    });
                }
                let joules = self.radios[from.index()].transmit(transmission);
                if self.reservoirs[from.index()].draw(joules, self.now) {
                    self.on_depleted(from, self.now);
                }
            }

            Action::SetListening { listening } => {
                self.radios[from.index()].set_listening(listening);
            }

            Action::RecordHarvest { joules } => {
                self.stats.energy_harvested += joules;
                if self.config.reservoir.charge_from_harvest {
                    self.reservoirs[from.index()].charge(joules);
                }
            }
        }
    }

    /// Draw a device's idle consumption up to now.
    ///
    /// Returns true if this draw emptied the reservoir.
    fn settle_device(&mut self, device: DeviceId) -> bool {
        let index = device.index();
        let draw = self.radios[index].settle(self.now);
        if draw.joules <= 0.0 {
            return false;
        }

        // Back-date depletion to the instant the reservoir actually hit zero.
        let remaining = self.reservoirs[index].remaining_energy();
        let at = if draw.power > 0.0 && draw.joules > remaining {
            let overshoot = (draw.joules - remaining) / draw.power;
            self.now.saturating_sub(Duration::from_secs_f64(overshoot))
        } else {
            self.now
        };

        let depleted = self.reservoirs[index].draw(draw.joules, at);
        if depleted {
            self.on_depleted(device, at);
        }
        depleted
    }

    fn on_depleted(&mut self, device: DeviceId, at: Duration) {
        self.stats.devices_depleted += 1;
        warn!(device = %device, at = ?at, "Reservoir empty");
        self.schedule_event(device, self.now, Event::EnergyDepleted);
    }

    /// Schedule an event.
    fn schedule_event(&mut self, device: DeviceId, time: Duration, event: Event) -> EventKey {
        self.sequence += 1;
        let key = EventKey::new(time, &event, device, self.sequence);
        self.event_queue.insert(key, event);
        key
    }
}

/// The timer slot an event is delivered from, if any.
fn timer_for(event: Event) -> Option<TimerId> {
    match event {
        Event::HarvestTick => Some(TimerId::HarvestTick),
        Event::BeaconTimer => Some(TimerId::Beacon),
        Event::ListenWindowTimer => Some(TimerId::ListenWindow),
        Event::UplinkTimer => Some(TimerId::Uplink),
        Event::StartHarvesting
        | Event::StopHarvesting
        | Event::StartApplication
        | Event::StopApplication
        | Event::EnergyDepleted => None,
    }
}
