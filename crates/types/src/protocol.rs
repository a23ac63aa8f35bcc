//! Discovery protocol variants.

use crate::InvalidArgument;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// When a device transmits beacons and when it listens for others.
///
/// Indices follow the command-line convention:
/// `0=Beacon, 1=ALOHA, 2=Scheduled, 3=Adaptive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DiscoveryProtocol {
    /// Fixed-interval beacons, continuous listening.
    #[default]
    BeaconBased,
    /// Uniformly randomized beacon spacing, continuous listening.
    AlohaDiscovery,
    /// Fixed-interval beacons, duty-cycled listening.
    ScheduledListening,
    /// Reserved for an energy-aware policy; currently behaves like `BeaconBased`.
    AdaptiveDiscovery,
}

impl DiscoveryProtocol {
    /// All protocols in index order.
    pub const ALL: [DiscoveryProtocol; 4] = [
        DiscoveryProtocol::BeaconBased,
        DiscoveryProtocol::AlohaDiscovery,
        DiscoveryProtocol::ScheduledListening,
        DiscoveryProtocol::AdaptiveDiscovery,
    ];

    /// Look up a protocol by its command-line index.
    pub fn from_index(index: u32) -> Result<Self, InvalidArgument> {
        Self::ALL
            .get(index as usize)
            .copied()
            .ok_or(InvalidArgument::ProtocolIndex(index))
    }

    /// The command-line index of this protocol.
    pub fn index(self) -> u32 {
        match self {
            DiscoveryProtocol::BeaconBased => 0,
            DiscoveryProtocol::AlohaDiscovery => 1,
            DiscoveryProtocol::ScheduledListening => 2,
            DiscoveryProtocol::AdaptiveDiscovery => 3,
        }
    }

    /// Human-readable name used in reports.
    pub fn name(self) -> &'static str {
        match self {
            DiscoveryProtocol::BeaconBased => "Beacon-Based",
            DiscoveryProtocol::AlohaDiscovery => "ALOHA Discovery",
            DiscoveryProtocol::ScheduledListening => "Scheduled Listening",
            DiscoveryProtocol::AdaptiveDiscovery => "Adaptive Discovery",
        }
    }
}

impl TryFrom<u32> for DiscoveryProtocol {
    type Error = InvalidArgument;

    fn try_from(index: u32) -> Result<Self, Self::Error> {
        Self::from_index(index)
    }
}

/// Parses either a numeric index or a kebab-case name.
impl FromStr for DiscoveryProtocol {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(index) = s.trim().parse::<u32>() {
            return Self::from_index(index);
        }
        match s.trim().to_lowercase().as_str() {
            "beacon" | "beacon-based" => Ok(DiscoveryProtocol::BeaconBased),
            "aloha" | "aloha-discovery" => Ok(DiscoveryProtocol::AlohaDiscovery),
            "scheduled" | "scheduled-listening" => Ok(DiscoveryProtocol::ScheduledListening),
            "adaptive" | "adaptive-discovery" => Ok(DiscoveryProtocol::AdaptiveDiscovery),
            other => Err(InvalidArgument::ProtocolName(other.to_string())),
        }
    }
}

impl fmt::Display for DiscoveryProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        for protocol in DiscoveryProtocol::ALL {
            assert_eq!(DiscoveryProtocol::from_index(protocol.index()), Ok(protocol));
        }
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        assert_eq!(
            DiscoveryProtocol::from_index(4),
            Err(InvalidArgument::ProtocolIndex(4))
        );
    }

    #[test]
    fn test_parse_index_or_name() {
        assert_eq!("1".parse(), Ok(DiscoveryProtocol::AlohaDiscovery));
        assert_eq!("scheduled".parse(), Ok(DiscoveryProtocol::ScheduledListening));
        assert!(matches!(
            "flooding".parse::<DiscoveryProtocol>(),
            Err(InvalidArgument::ProtocolName(_))
        ));
    }
}
