//! Caller-facing error for calendar use-cases.

use crate::db::DbError;
use crate::directory::email::DispatchError;
use crate::model::schedule::{ScheduleNo, ScheduleStatus, ScheduleValidationError};
use crate::model::team::InvalidTeamLevel;
use crate::repo::RepoError;
use thiserror::Error;

pub type CalendarResult<T> = Result<T, CalendarError>;

/// Named failure of one calendar action. Every variant is recoverable.
#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("schedule not found: {0}")]
    ScheduleNotFound(ScheduleNo),
    #[error("team share not found: schedule {sc_no}, member {member_id}")]
    TeamNotFound { sc_no: ScheduleNo, member_id: String },
    #[error("member {member_id} is already on the team of schedule {sc_no}")]
    ExistsTeam { sc_no: ScheduleNo, member_id: String },
    #[error("member not found: {0}")]
    MemberNotFound(String),
    #[error(transparent)]
    InvalidLevel(#[from] InvalidTeamLevel),
    #[error("member {0} cannot share a schedule with themself")]
    SelfShare(String),
    #[error("member {member_id} does not own schedule {sc_no}")]
    NotOwner { sc_no: ScheduleNo, member_id: String },
    #[error("member {member_id} has no write access to schedule {sc_no}")]
    WriteDenied { sc_no: ScheduleNo, member_id: String },
    #[error("member {member_id} cannot view schedule {sc_no}")]
    AccessDenied { sc_no: ScheduleNo, member_id: String },
    #[error("schedule {sc_no} is {actual:?}, expected {expected:?}")]
    InvalidState {
        sc_no: ScheduleNo,
        expected: ScheduleStatus,
        actual: ScheduleStatus,
    },
    #[error(transparent)]
    Validation(#[from] ScheduleValidationError),
    #[error("invalid member id `{0}`")]
    InvalidMemberId(String),
    #[error("invitation dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),
    #[error(transparent)]
    Repo(RepoError),
}

impl From<RepoError> for CalendarError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::ScheduleNotFound(sc_no) => Self::ScheduleNotFound(sc_no),
            RepoError::TeamNotFound { sc_no, member_id } => Self::TeamNotFound { sc_no, member_id },
            RepoError::ExistsTeam { sc_no, member_id } => Self::ExistsTeam { sc_no, member_id },
            RepoError::MemberNotFound(member_id) => Self::MemberNotFound(member_id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<DbError> for CalendarError {
    fn from(value: DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

impl From<rusqlite::Error> for CalendarError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::from(value))
    }
}
