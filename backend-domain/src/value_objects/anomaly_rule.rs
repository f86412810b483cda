// Anomaly rule value object

use serde::{Deserialize, Serialize};

/// The four detection rules, in their fixed evaluation order. Labels joined
/// with ", " form the AnomalyType column, so the order here is load-bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnomalyRule {
    HighValue,
    OddHour,
    ForeignLocation,
    HighVelocity,
}

impl AnomalyRule {
    pub const ALL: [AnomalyRule; 4] = [
        AnomalyRule::HighValue,
        AnomalyRule::OddHour,
        AnomalyRule::ForeignLocation,
        AnomalyRule::HighVelocity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyRule::HighValue => "High Value",
            AnomalyRule::OddHour => "Odd Hour",
            AnomalyRule::ForeignLocation => "Foreign Location",
            AnomalyRule::HighVelocity => "High Velocity",
        }
    }
}

impl std::fmt::Display for AnomalyRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
