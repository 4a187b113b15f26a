use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::calendar::SkipRule;

/// One of the six drywall phases, in installation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    Hang,
    Scrap,
    Tape,
    Bed,
    Skim,
    Sand,
}

impl Phase {
    /// All phases in the order they are scheduled.
    pub const ALL: [Phase; 6] = [
        Self::Hang,
        Self::Scrap,
        Self::Tape,
        Self::Bed,
        Self::Skim,
        Self::Sand,
    ];

    /// Qualifying days the phase takes when the reference table does not
    /// override it.
    pub fn default_duration(&self) -> u32 {
        match self {
            Self::Hang | Self::Scrap | Self::Sand => 1,
            Self::Tape | Self::Bed | Self::Skim => 2,
        }
    }

    /// Scrap crews only work weekdays; every other crew works Saturdays.
    pub fn skip_rule(&self) -> SkipRule {
        match self {
            Self::Scrap => SkipRule::Weekends,
            _ => SkipRule::Sundays,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hang => "Hang",
            Self::Scrap => "Scrap",
            Self::Tape => "Tape",
            Self::Bed => "Bed",
            Self::Skim => "Skim",
            Self::Sand => "Sand",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = PhaseParseError;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PhaseParseError(s.to_owned()))
    }
}

/// Error returned when parsing an invalid [`Phase`] string.
#[derive(Debug, Clone)]
pub struct PhaseParseError(pub String);

impl fmt::Display for PhaseParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid phase: {:?} (expected Hang, Scrap, Tape, Bed, Skim, or Sand)",
            self.0
        )
    }
}

impl std::error::Error for PhaseParseError {}
