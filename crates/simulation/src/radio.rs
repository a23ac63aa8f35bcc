//! Radio energy consumption.
//!
//! The radio is in one of two idle states, receive or standby, and pays a
//! transmit cost per frame. Idle energy is integrated lazily: the runner
//! settles a device's radio whenever that device handles an event.

use lorasim_core::Transmission;
use std::time::Duration;

/// LoRa modulation parameters for time-on-air.
#[derive(Debug, Clone, PartialEq)]
pub struct LoraModulation {
    /// Spreading factor, 7..=12.
    pub spreading_factor: u8,
    /// Bandwidth in Hz.
    pub bandwidth_hz: f64,
    /// Coding rate index, 1..=4 for 4/5..4/8.
    pub coding_rate: u8,
    /// Programmed preamble length in symbols.
    pub preamble_symbols: u16,
    pub explicit_header: bool,
    pub crc_enabled: bool,
}

impl Default for LoraModulation {
    fn default() -> Self {
        Self {
            spreading_factor: 7,
            bandwidth_hz: 500_000.0,
            coding_rate: 3,
            preamble_symbols: 8,
            explicit_header: true,
            crc_enabled: true,
        }
    }
}

impl LoraModulation {
    /// Symbol duration in seconds: `2^SF / BW`.
    pub fn symbol_time(&self) -> f64 {
        f64::from(1u32 << self.spreading_factor) / self.bandwidth_hz
    }

    /// Low data rate optimisation, mandated for SF11 and SF12 at 125 kHz.
    pub fn low_data_rate_optimization(&self) -> bool {
        self.bandwidth_hz == 125_000.0 && self.spreading_factor >= 11
    }

    /// Time on air for a `payload_bytes` frame, in seconds.
    ///
    /// `N_payload = 8 + max(ceil((8PL - 4SF + 28 + 16CRC - 20IH) / (4(SF - 2DE))) * (CR + 4), 0)`
    pub fn time_on_air(&self, payload_bytes: usize) -> f64 {
        let t_sym = self.symbol_time();
        let preamble = (f64::from(self.preamble_symbols) + 4.25) * t_sym;

        let sf = f64::from(self.spreading_factor);
        let pl = payload_bytes as f64;
        let crc = if self.crc_enabled { 1.0 } else { 0.0 };
        let ih = if self.explicit_header { 0.0 } else { 1.0 };
        let de = if self.low_data_rate_optimization() { 1.0 } else { 0.0 };
        let cr = f64::from(self.coding_rate);

        let numerator = 8.0 * pl - 4.0 * sf + 28.0 + 16.0 * crc - 20.0 * ih;
        let denominator = 4.0 * (sf - 2.0 * de);
        let payload_symbols = 8.0 + ((numerator / denominator).ceil() * (cr + 4.0)).max(0.0);

        preamble + payload_symbols * t_sym
    }
}

/// Electrical characteristics of the transceiver.
///
/// Defaults follow a Semtech SX127x at 3.3 V.
#[derive(Debug, Clone, PartialEq)]
pub struct RadioEnergyConfig {
    pub supply_voltage: f64,
    /// Amperes while transmitting.
    pub tx_current: f64,
    /// Amperes while receiving.
    pub rx_current: f64,
    /// Amperes in standby.
    pub standby_current: f64,
    pub modulation: LoraModulation,
    pub beacon_payload_bytes: usize,
    pub uplink_payload_bytes: usize,
}

impl Default for RadioEnergyConfig {
    fn default() -> Self {
        Self {
            supply_voltage: 3.3,
            tx_current: 0.120,
            rx_current: 0.0108,
            standby_current: 0.0003,
            modulation: LoraModulation::default(),
            beacon_payload_bytes: 20,
            uplink_payload_bytes: 20,
        }
    }
}

impl RadioEnergyConfig {
    pub fn tx_power(&self) -> f64 {
        self.tx_current * self.supply_voltage
    }

    pub fn rx_power(&self) -> f64 {
        self.rx_current * self.supply_voltage
    }

    pub fn standby_power(&self) -> f64 {
        self.standby_current * self.supply_voltage
    }

    /// Time on air for a transmission, in seconds.
    pub fn airtime(&self, transmission: Transmission) -> f64 {
        let payload = match transmission {
            Transmission::Beacon => self.beacon_payload_bytes,
            Transmission::Uplink => self.uplink_payload_bytes,
        };
        self.modulation.time_on_air(payload)
    }

    /// Energy for one transmission, in joules.
    pub fn transmit_energy(&self, transmission: Transmission) -> f64 {
        self.tx_power() * self.airtime(transmission)
    }
}

/// Where device consumption comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsumptionModel {
    /// No external consumption at all; reservoirs only change by charging.
    None,
    /// Radio idle and transmit costs.
    Radio(RadioEnergyConfig),
}

impl Default for ConsumptionModel {
    fn default() -> Self {
        ConsumptionModel::Radio(RadioEnergyConfig::default())
    }
}

/// Idle energy accrued since the last settle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdleDraw {
    /// Joules consumed over the settled span.
    pub joules: f64,
    /// Constant power over that span, in watts.
    pub power: f64,
}

/// Radio state and energy integration for one device.
#[derive(Debug, Clone)]
pub struct RadioEnergyModel {
    config: Option<RadioEnergyConfig>,
    listening: bool,
    powered: bool,
    last_settled: Duration,
    /// Cumulative joules accounted by this model.
    total: f64,
}

impl RadioEnergyModel {
    /// A powered radio in standby, settled at time zero.
    pub fn new(model: &ConsumptionModel) -> Self {
        let config = match model {
            ConsumptionModel::None => None,
            ConsumptionModel::Radio(config) => Some(config.clone()),
        };
        Self {
            config,
            listening: false,
            powered: true,
            last_settled: Duration::ZERO,
            total: 0.0,
        }
    }

    /// Integrate idle power from the last settle up to `now`.
    pub fn settle(&mut self, now: Duration) -> IdleDraw {
        let span = now.saturating_sub(self.last_settled).as_secs_f64();
        self.last_settled = self.last_settled.max(now);

        let power = match &self.config {
            Some(config) if self.powered => {
                if self.listening {
                    config.rx_power()
                } else {
                    config.standby_power()
                }
            }
            _ => 0.0,
        };
        let joules = power * span;
        self.total += joules;
        IdleDraw { joules, power }
    }

    /// Switch the receiver. The caller settles first.
    pub fn set_listening(&mut self, listening: bool) {
        self.listening = listening;
    }

    /// Energy for one frame, in joules.
    pub fn transmit(&mut self, transmission: Transmission) -> f64 {
        let joules = match &self.config {
            Some(config) if self.powered => config.transmit_energy(transmission),
            _ => 0.0,
        };
        self.total += joules;
        joules
    }

    /// Cut power for good; nothing more is consumed.
    pub fn power_off(&mut self) {
        self.powered = false;
        self.listening = false;
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Total energy this radio has consumed, in joules.
    pub fn total_consumed(&self) -> f64 {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_on_air_reference_value() {
        // SF7, 125 kHz, CR 4/5, 20 bytes: 12.544 ms preamble + 43 symbols.
        let modulation = LoraModulation {
            bandwidth_hz: 125_000.0,
            coding_rate: 1,
            ..Default::default()
        };
        assert!((modulation.time_on_air(20) - 0.056576).abs() < 1e-9);
    }

    #[test]
    fn test_low_data_rate_optimization() {
        let mut modulation = LoraModulation {
            bandwidth_hz: 125_000.0,
            spreading_factor: 12,
            ..Default::default()
        };
        assert!(modulation.low_data_rate_optimization());
        modulation.bandwidth_hz = 250_000.0;
        assert!(!modulation.low_data_rate_optimization());
    }

    #[test]
    fn test_airtime_grows_with_payload() {
        let modulation = LoraModulation::default();
        assert!(modulation.time_on_air(50) > modulation.time_on_air(20));
    }

    #[test]
    fn test_idle_integration() {
        let config = RadioEnergyConfig::default();
        let mut radio = RadioEnergyModel::new(&ConsumptionModel::Radio(config.clone()));

        let standby = radio.settle(Duration::from_secs(10));
        assert!((standby.joules - config.standby_power() * 10.0).abs() < 1e-12);

        radio.set_listening(true);
        let rx = radio.settle(Duration::from_secs(12));
        assert!((rx.joules - config.rx_power() * 2.0).abs() < 1e-12);
        assert_eq!(rx.power, config.rx_power());

        // Settling twice at the same instant costs nothing.
        assert_eq!(radio.settle(Duration::from_secs(12)).joules, 0.0);
    }

    #[test]
    fn test_power_off_stops_consumption() {
        let mut radio = RadioEnergyModel::new(&ConsumptionModel::default());
        radio.set_listening(true);
        radio.settle(Duration::from_secs(1));
        radio.power_off();
        assert_eq!(radio.settle(Duration::from_secs(100)).joules, 0.0);
        assert_eq!(radio.transmit(Transmission::Beacon), 0.0);
    }

    #[test]
    fn test_no_consumption_model() {
        let mut radio = RadioEnergyModel::new(&ConsumptionModel::None);
        radio.set_listening(true);
        assert_eq!(radio.settle(Duration::from_secs(3600)).joules, 0.0);
        assert_eq!(radio.transmit(Transmission::Uplink), 0.0);
        assert_eq!(radio.total_consumed(), 0.0);
    }
}
