//! Team share model and permission levels.
//!
//! # Invariants
//! - `TeamLevel` is a closed set; raw payload values are parsed once at the
//!   boundary and anything outside `{0, 1}` is rejected.
//! - A schedule owner never needs a `TeamShare` row.

use crate::model::schedule::ScheduleNo;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Permission level granted to a team member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamLevel {
    /// May view the schedule.
    #[default]
    Read,
    /// May view and edit the schedule details.
    Write,
}

/// Raw level value that is not a known permission level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid team level `{0}`; expected 0 (read) or 1 (write)")]
pub struct InvalidTeamLevel(pub String);

impl TeamLevel {
    pub fn as_db(self) -> i64 {
        match self {
            Self::Read => 0,
            Self::Write => 1,
        }
    }

    pub fn from_db(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Read),
            1 => Some(Self::Write),
            _ => None,
        }
    }

    pub fn can_write(self) -> bool {
        self == Self::Write
    }
}

impl TryFrom<i64> for TeamLevel {
    type Error = InvalidTeamLevel;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_db(value).ok_or_else(|| InvalidTeamLevel(value.to_string()))
    }
}

impl FromStr for TeamLevel {
    type Err = InvalidTeamLevel;

    /// Accepts `0`/`1` or `read`/`write`, case-insensitive.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "0" | "read" => Ok(Self::Read),
            "1" | "write" => Ok(Self::Write),
            _ => Err(InvalidTeamLevel(value.trim().to_string())),
        }
    }
}

/// Grant of read or write access to one schedule for a non-owning member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamShare {
    pub sc_no: ScheduleNo,
    pub member_id: String,
    pub level: TeamLevel,
}
