//! Schedule domain model.
//!
//! # Responsibility
//! - Define the schedule record and its lifecycle status.
//! - Validate time ranges and date input before persistence.
//!
//! # Invariants
//! - `sc_no` is assigned by storage and never reused.
//! - `end_at` must not be earlier than `start_at`.
//! - `status` is the source of truth for recycle-bin state.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable schedule number assigned on creation.
pub type ScheduleNo = i64;

/// Maximum accepted title length in characters.
pub const TITLE_MAX_CHARS: usize = 200;

/// Lifecycle state of a stored schedule.
///
/// Purged schedules have no row at all, so they have no status value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    /// Soft-deleted, sitting in the owner's recycle bin.
    Recycled,
    /// Visible in listings and allowed to trigger alarms.
    Active,
}

impl ScheduleStatus {
    /// Integer encoding used by the `schedules.status` column.
    pub fn as_db(self) -> i64 {
        match self {
            Self::Recycled => 0,
            Self::Active => 1,
        }
    }

    pub fn from_db(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Recycled),
            1 => Some(Self::Active),
            _ => None,
        }
    }
}

/// Validation errors for schedule data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleValidationError {
    #[error("schedule owner must not be blank")]
    BlankOwner,
    #[error("schedule end {end_at} is earlier than start {start_at}")]
    InvalidRange { start_at: i64, end_at: i64 },
    #[error("schedule title has {len} chars, limit is {max}")]
    TitleTooLong { len: usize, max: usize },
    #[error("invalid schedule date `{0}`; expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// Canonical schedule record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub sc_no: ScheduleNo,
    pub owner_id: String,
    pub title: String,
    pub content: String,
    /// Unix epoch milliseconds.
    pub start_at: i64,
    /// Unix epoch milliseconds. Always >= `start_at`.
    pub end_at: i64,
    pub status: ScheduleStatus,
    /// Bookmark flag owned by `owner_id`.
    pub bookmarked: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Schedule {
    pub fn is_recycled(&self) -> bool {
        self.status == ScheduleStatus::Recycled
    }

    pub fn is_owned_by(&self, member_id: &str) -> bool {
        self.owner_id == member_id
    }

    /// Validates persisted invariants.
    pub fn validate(&self) -> Result<(), ScheduleValidationError> {
        if self.owner_id.trim().is_empty() {
            return Err(ScheduleValidationError::BlankOwner);
        }
        validate_title(&self.title)?;
        validate_range(self.start_at, self.end_at)
    }
}

/// Editable schedule details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDraft {
    pub title: String,
    pub content: String,
    pub start_at: i64,
    pub end_at: i64,
}

impl ScheduleDraft {
    pub fn validate(&self) -> Result<(), ScheduleValidationError> {
        validate_title(&self.title)?;
        validate_range(self.start_at, self.end_at)
    }
}

/// Parses a `YYYY-MM-DD` day into its UTC midnight in epoch milliseconds.
pub fn parse_schedule_date(date: &str) -> Result<i64, ScheduleValidationError> {
    let trimmed = date.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc().timestamp_millis())
        .ok_or_else(|| ScheduleValidationError::InvalidDate(trimmed.to_string()))
}

fn validate_title(title: &str) -> Result<(), ScheduleValidationError> {
    let len = title.chars().count();
    if len > TITLE_MAX_CHARS {
        return Err(ScheduleValidationError::TitleTooLong {
            len,
            max: TITLE_MAX_CHARS,
        });
    }
    Ok(())
}

fn validate_range(start_at: i64, end_at: i64) -> Result<(), ScheduleValidationError> {
    if end_at < start_at {
        return Err(ScheduleValidationError::InvalidRange { start_at, end_at });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{parse_schedule_date, ScheduleDraft, ScheduleStatus, ScheduleValidationError};

    #[test]
    fn status_db_encoding_is_stable() {
        assert_eq!(ScheduleStatus::Active.as_db(), 1);
        assert_eq!(ScheduleStatus::Recycled.as_db(), 0);
        assert_eq!(ScheduleStatus::from_db(1), Some(ScheduleStatus::Active));
        assert_eq!(ScheduleStatus::from_db(7), None);
    }

    #[test]
    fn parse_schedule_date_returns_utc_midnight() {
        assert_eq!(parse_schedule_date("1970-01-02").unwrap(), 86_400_000);
        assert_eq!(parse_schedule_date(" 2023-03-01 ").unwrap(), 1_677_628_800_000);
    }

    #[test]
    fn parse_schedule_date_rejects_garbage() {
        let err = parse_schedule_date("2023-13-40").unwrap_err();
        assert_eq!(
            err,
            ScheduleValidationError::InvalidDate("2023-13-40".to_string())
        );
    }

    #[test]
    fn draft_rejects_inverted_range_and_long_title() {
        let mut draft = ScheduleDraft {
            title: "standup".to_string(),
            content: String::new(),
            start_at: 200,
            end_at: 100,
        };
        assert!(matches!(
            draft.validate(),
            Err(ScheduleValidationError::InvalidRange { .. })
        ));

        draft.end_at = 300;
        draft.title = "x".repeat(201);
        assert!(matches!(
            draft.validate(),
            Err(ScheduleValidationError::TitleTooLong { len: 201, .. })
        ));
    }
}
