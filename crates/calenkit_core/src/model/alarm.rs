//! Alarm domain model.
//!
//! # Responsibility
//! - Define alarm kinds and their storage encoding.
//! - Own the visibility rule shared by the alarm engine and its SQL.
//!
//! # Invariants
//! - `ScheduleDeleted` is the sentinel: visible only while its schedule is
//!   recycled. Every other kind is visible only while the schedule is active.
//! - Membership-scoped kinds are removed when the share they record is removed.

use crate::model::schedule::{ScheduleNo, ScheduleStatus};
use crate::model::team::TeamLevel;
use serde::{Deserialize, Serialize};

/// Stable alarm number assigned on creation.
pub type AlarmNo = i64;

/// Which event an alarm records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmKind {
    ShareAdded,
    LevelRead,
    LevelWrite,
    Unshared,
    ScheduleDeleted,
}

impl AlarmKind {
    /// Kinds tied to one `(schedule, member)` share.
    pub const MEMBERSHIP_SCOPED: [AlarmKind; 3] =
        [Self::ShareAdded, Self::LevelRead, Self::LevelWrite];

    pub fn as_db(self) -> &'static str {
        match self {
            Self::ShareAdded => "share_added",
            Self::LevelRead => "level_read",
            Self::LevelWrite => "level_write",
            Self::Unshared => "unshared",
            Self::ScheduleDeleted => "schedule_deleted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "share_added" => Some(Self::ShareAdded),
            "level_read" => Some(Self::LevelRead),
            "level_write" => Some(Self::LevelWrite),
            "unshared" => Some(Self::Unshared),
            "schedule_deleted" => Some(Self::ScheduleDeleted),
            _ => None,
        }
    }

    /// Alarm kind emitted when a share moves to `level`.
    pub fn for_level(level: TeamLevel) -> Self {
        match level {
            TeamLevel::Read => Self::LevelRead,
            TeamLevel::Write => Self::LevelWrite,
        }
    }

    pub fn is_sentinel(self) -> bool {
        self == Self::ScheduleDeleted
    }

    /// Derived visibility for an alarm whose schedule is in `status`.
    pub fn visible_for(self, status: ScheduleStatus) -> bool {
        match status {
            ScheduleStatus::Active => !self.is_sentinel(),
            ScheduleStatus::Recycled => self.is_sentinel(),
        }
    }
}

/// Notification record for one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alarm {
    pub al_no: AlarmNo,
    pub recipient_id: String,
    pub sc_no: ScheduleNo,
    pub kind: AlarmKind,
    pub created_at: i64,
    /// Computed from the schedule status at read time.
    pub is_visible: bool,
}

/// Visible alarm paired with the title of its schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmNotice {
    pub alarm: Alarm,
    pub schedule_title: String,
}
