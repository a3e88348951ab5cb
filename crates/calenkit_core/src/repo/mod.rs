//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per entity.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`ScheduleNotFound`,
//!   `TeamNotFound`, `ExistsTeam`) in addition to DB transport errors.
//! - Repositories only accept connections migrated to `latest_version()`.
//! - Repositories never cascade across tables; the facade owns cascades.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::schedule::{ScheduleNo, ScheduleValidationError};
use rusqlite::Connection;
use thiserror::Error;

pub mod alarm_repo;
pub mod schedule_repo;
pub mod team_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by schedule, team and alarm persistence.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Validation(#[from] ScheduleValidationError),
    #[error("{0}")]
    Db(#[from] DbError),
    #[error("schedule not found: {0}")]
    ScheduleNotFound(ScheduleNo),
    #[error("team share not found: schedule {sc_no}, member {member_id}")]
    TeamNotFound { sc_no: ScheduleNo, member_id: String },
    #[error("member {member_id} is already on the team of schedule {sc_no}")]
    ExistsTeam { sc_no: ScheduleNo, member_id: String },
    #[error("member not found: {0}")]
    MemberNotFound(String),
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
    #[error("repository requires schema version {expected_version}, got {actual_version}")]
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    #[error("repository requires table `{0}`")]
    MissingRequiredTable(&'static str),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Checks schema version and required tables before a repository is built.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    tables: &[&'static str],
) -> RepoResult<()> {
    let actual_version = current_user_version(conn)?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &table in tables {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub(crate) fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` in {column}"
        ))),
    }
}
