//! Energy harvesting scenarios.

use crate::InvalidArgument;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How ambient energy availability varies over simulated time.
///
/// Selected once per run and immutable afterwards. Indices follow the
/// command-line convention: `0=None, 1=Regular, 2=Day/Night, 3=LowLight, 4=Hybrid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HarvestScenario {
    /// No harvester attached.
    NoHarvesting,
    /// Regular artificial lighting (100-2000 lx): constant base rate.
    #[default]
    ConstantSolar,
    /// 12 h cycle: half-sine daylight followed by low-light night.
    DayNightCycle,
    /// Dark spots and shadows (10-100 lx): 5% of the base rate.
    LowLight,
    /// Day/night solar plus a small constant ambient RF contribution.
    Hybrid,
}

impl HarvestScenario {
    /// All scenarios in index order.
    pub const ALL: [HarvestScenario; 5] = [
        HarvestScenario::NoHarvesting,
        HarvestScenario::ConstantSolar,
        HarvestScenario::DayNightCycle,
        HarvestScenario::LowLight,
        HarvestScenario::Hybrid,
    ];

    /// Look up a scenario by its command-line index.
    pub fn from_index(index: u32) -> Result<Self, InvalidArgument> {
        Self::ALL
            .get(index as usize)
            .copied()
            .ok_or(InvalidArgument::ScenarioIndex(index))
    }

    /// The command-line index of this scenario.
    pub fn index(self) -> u32 {
        match self {
            HarvestScenario::NoHarvesting => 0,
            HarvestScenario::ConstantSolar => 1,
            HarvestScenario::DayNightCycle => 2,
            HarvestScenario::LowLight => 3,
            HarvestScenario::Hybrid => 4,
        }
    }

    /// Human-readable name used in reports.
    pub fn name(self) -> &'static str {
        match self {
            HarvestScenario::NoHarvesting => "No Harvesting",
            HarvestScenario::ConstantSolar => "Regular Light (100-2000 lx)",
            HarvestScenario::DayNightCycle => "Day/Night Cycle",
            HarvestScenario::LowLight => "Low Light (10-100 lx)",
            HarvestScenario::Hybrid => "Hybrid",
        }
    }

    /// Whether any harvester is attached at all.
    pub fn harvests(self) -> bool {
        self != HarvestScenario::NoHarvesting
    }
}

impl TryFrom<u32> for HarvestScenario {
    type Error = InvalidArgument;

    fn try_from(index: u32) -> Result<Self, Self::Error> {
        Self::from_index(index)
    }
}

/// Parses either a numeric index or a kebab-case name.
impl FromStr for HarvestScenario {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(index) = s.trim().parse::<u32>() {
            return Self::from_index(index);
        }
        match s.trim().to_lowercase().as_str() {
            "none" | "no-harvesting" => Ok(HarvestScenario::NoHarvesting),
            "constant-solar" | "regular" | "regular-light" => Ok(HarvestScenario::ConstantSolar),
            "day-night" | "day-night-cycle" => Ok(HarvestScenario::DayNightCycle),
            "low-light" => Ok(HarvestScenario::LowLight),
            "hybrid" => Ok(HarvestScenario::Hybrid),
            other => Err(InvalidArgument::ScenarioName(other.to_string())),
        }
    }
}

impl fmt::Display for HarvestScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
