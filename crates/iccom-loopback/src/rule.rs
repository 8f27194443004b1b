use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LoopbackError;

/// Every channel in `[from_ch, to_ch]` is bridged to `channel + range_shift`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopbackRule {
    pub from_ch: u32,
    pub to_ch: u32,
    pub range_shift: i32,
}

impl LoopbackRule {
    pub fn new(from_ch: u32, to_ch: u32, range_shift: i32) -> Self {
        Self {
            from_ch,
            to_ch,
            range_shift,
        }
    }

    /// Where `channel` is routed to, if the rule covers it.
    pub fn target_of(&self, channel: u32) -> Option<i64> {
        (self.from_ch..=self.to_ch)
            .contains(&channel)
            .then(|| i64::from(channel) + i64::from(self.range_shift))
    }
}

impl fmt::Display for LoopbackRule {
    /// The control file encoding: `from_ch to_ch range_shift`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.from_ch, self.to_ch, self.range_shift)
    }
}

impl FromStr for LoopbackRule {
    type Err = LoopbackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || LoopbackError::Parse(s.trim().to_string());
        let mut fields = s.split_whitespace();
        let (Some(from), Some(to), Some(shift), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(malformed());
        };

        Ok(Self {
            from_ch: from.parse().map_err(|_| malformed())?,
            to_ch: to.parse().map_err(|_| malformed())?,
            range_shift: shift.parse().map_err(|_| malformed())?,
        })
    }
}

/// What the control file currently says.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoopbackState {
    Inactive,
    Active(LoopbackRule),
}

impl LoopbackState {
    pub fn is_active(&self) -> bool {
        matches!(self, LoopbackState::Active(_))
    }

    pub fn rule(&self) -> Option<LoopbackRule> {
        match self {
            LoopbackState::Active(rule) => Some(*rule),
            LoopbackState::Inactive => None,
        }
    }
}

impl FromStr for LoopbackState {
    type Err = LoopbackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "0" | "disable" | "disabled" => Ok(LoopbackState::Inactive),
            other => other.parse().map(LoopbackState::Active),
        }
    }
}
