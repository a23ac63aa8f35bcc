//! Full runs through the simulator front end.

use lorasim_simulation::ConsumptionModel;
use lorasim_simulator::{Simulator, SimulatorConfig, SimulatorError, SustainabilityVerdict};
use lorasim_types::{DeviceId, DiscoveryProtocol, HarvestScenario, InvalidArgument};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing_test::traced_test;

fn harvest_only(device_count: u32, duration_secs: f64) -> SimulatorConfig {
    SimulatorConfig::new(device_count, duration_secs)
        .with_consumption(ConsumptionModel::None)
        .with_uplink_period(None)
        .with_seed(7)
}

fn scratch_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("lorasim-{}-{}", name, std::process::id()))
}

#[traced_test]
#[test]
fn test_constant_solar_hour_is_energy_positive() {
    let config = harvest_only(1, 3600.0)
        .with_scenario(HarvestScenario::ConstantSolar)
        .with_harvesting_rate(0.00125)
        .with_initial_energy(7.2)
        .with_reservoir_charging(true);

    let report = Simulator::new(config).unwrap().run().unwrap();
    let record = report.record(DeviceId(0)).unwrap();

    assert!((record.harvested - 4.5).abs() < 1e-9);
    assert!((record.final_energy - 11.7).abs() < 1e-9);
    assert!(report.summary.verdict.is_energy_positive());
    assert_eq!(report.summary.depleted_count, 0);
}

#[test]
fn test_harvest_without_charging_leaves_reservoir_untouched() {
    let config = harvest_only(1, 3600.0).with_scenario(HarvestScenario::ConstantSolar);

    let report = Simulator::new(config).unwrap().run().unwrap();
    let record = &report.records[0];

    assert!((record.harvested - 4.5).abs() < 1e-9);
    assert_eq!(record.final_energy, 7.2);
    assert_eq!(record.consumed, 0.0);
    assert!(report.summary.verdict.is_energy_positive());
}

#[test]
fn test_beacon_based_five_minutes_sends_and_hears_five() {
    let config = harvest_only(1, 300.0)
        .with_scenario(HarvestScenario::NoHarvesting)
        .with_protocol(DiscoveryProtocol::BeaconBased)
        .with_beacon_interval(60.0);

    let report = Simulator::new(config).unwrap().run().unwrap();
    let record = &report.records[0];

    assert_eq!(record.beacons_sent, 5);
    assert_eq!(record.beacons_received, 5);
    assert!(record.discovered);
    assert_eq!(record.harvested, 0.0);
    assert_eq!(report.stats.beacons_transmitted, 5);
    assert_eq!(record.first_discovered_at, Some(Duration::from_secs(60)));
    assert_eq!(report.summary.mean_time_to_discovery, Some(Duration::from_secs(60)));
}

#[test]
fn test_scheduled_listening_hears_every_beacon() {
    let config = harvest_only(3, 600.0)
        .with_scenario(HarvestScenario::NoHarvesting)
        .with_protocol(DiscoveryProtocol::ScheduledListening)
        .with_beacon_interval(60.0)
        .with_listen_interval(10.0);

    let report = Simulator::new(config).unwrap().run().unwrap();

    for record in &report.records {
        assert_eq!(record.beacons_sent, 10);
        assert_eq!(record.beacons_received, record.beacons_sent);
    }
    assert_eq!(report.summary.discovery_rate(), 100.0);
}

#[traced_test]
#[test]
fn test_default_radio_without_harvest_depletes() {
    let config = SimulatorConfig::new(2, 3600.0)
        .with_scenario(HarvestScenario::NoHarvesting)
        .with_seed(99);

    let report = Simulator::new(config).unwrap().run().unwrap();

    assert_eq!(report.summary.depleted_count, 2);
    for record in &report.records {
        assert!(record.depleted_at.is_some());
        assert!(record.final_energy.abs() < 1e-9);
        assert!((record.consumed - 7.2).abs() < 1e-9);
    }
    match report.summary.verdict {
        SustainabilityVerdict::EnergyNegative {
            projected_lifetime_hours,
            ..
        } => {
            let hours = projected_lifetime_hours.unwrap();
            assert!((hours - 1.0).abs() < 1e-9);
        }
        other => panic!("expected an energy-negative verdict, got {other:?}"),
    }
}

#[test]
fn test_same_seed_gives_same_report() {
    let config = || {
        SimulatorConfig::new(5, 1800.0)
            .with_scenario(HarvestScenario::DayNightCycle)
            .with_protocol(DiscoveryProtocol::AlohaDiscovery)
            .with_seed(2024)
    };

    let first = Simulator::new(config()).unwrap().run().unwrap();
    let second = Simulator::new(config()).unwrap().run().unwrap();

    assert_eq!(first.records, second.records);
}

#[test]
fn test_results_table_written_to_disk() {
    let dir = scratch_dir("results");
    let path = dir.join("nested").join("energy_discovery.txt");
    let config = harvest_only(2, 300.0).with_scenario(HarvestScenario::NoHarvesting);

    let report = Simulator::new(config).unwrap().run().unwrap();
    report.write_csv(&path).unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    let mut lines = contents.lines();
    assert_eq!(
        lines.next(),
        Some("NodeID,InitialEnergy,FinalEnergy,Consumed,Harvested,BeaconsSent,BeaconsReceived,Discovered")
    );
    assert_eq!(lines.count(), 2);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_energy_timeline_sampled_at_interval() {
    let dir = scratch_dir("timeline");
    let path = dir.join("energy.csv");
    let config = harvest_only(2, 300.0)
        .with_scenario(HarvestScenario::ConstantSolar)
        .with_energy_timeline(60.0);

    let report = Simulator::new(config).unwrap().run().unwrap();

    // t = 0, 60, ..., 300 for both devices.
    assert_eq!(report.energy_timeline.len(), 12);
    let last = report.energy_timeline.last().unwrap();
    assert_eq!(last.time_secs, 300.0);
    assert!((last.harvested - 0.375).abs() < 1e-9);

    report.write_energy_timeline(&path).unwrap();
    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.starts_with("time_s,NodeID,RemainingEnergy,Harvested"));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_invalid_configuration_is_rejected() {
    let zero_devices = SimulatorConfig::new(0, 3600.0);
    assert!(matches!(
        Simulator::new(zero_devices),
        Err(SimulatorError::InvalidArgument(InvalidArgument::NoDevices))
    ));

    let negative_time = SimulatorConfig::new(10, -1.0);
    assert!(matches!(
        Simulator::new(negative_time),
        Err(SimulatorError::InvalidArgument(InvalidArgument::OutOfRange { .. }))
    ));

    let zero_beacon = SimulatorConfig::new(10, 3600.0).with_beacon_interval(0.0);
    assert!(Simulator::new(zero_beacon).is_err());
}
