//! Team share repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `(sc_no, mem_id)` is unique; inserting an existing pair fails with
//!   `ExistsTeam` and never changes the stored level.
//! - Team listing order is deterministic: `created_at ASC, mem_id ASC`.
//! - Share writes re-check the schedule inside one immediate transaction, so
//!   a schedule purged after the caller's checks reports `ScheduleNotFound`.

use crate::model::schedule::ScheduleNo;
use crate::model::team::{TeamLevel, TeamShare};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

/// Repository interface for team share persistence.
pub trait TeamRepository {
    fn schedule_exists(&self, sc_no: ScheduleNo) -> RepoResult<bool>;
    fn list_shares(&self, sc_no: ScheduleNo) -> RepoResult<Vec<TeamShare>>;
    fn get_share(&self, sc_no: ScheduleNo, member_id: &str) -> RepoResult<Option<TeamShare>>;
    fn insert_share(&self, share: &TeamShare) -> RepoResult<()>;
    fn update_level(&self, sc_no: ScheduleNo, member_id: &str, level: TeamLevel)
        -> RepoResult<()>;
    fn delete_share(&self, sc_no: ScheduleNo, member_id: &str) -> RepoResult<()>;
    /// Deletes every share of a schedule and returns how many were removed.
    fn delete_all_shares(&self, sc_no: ScheduleNo) -> RepoResult<usize>;
}

/// SQLite-backed team share repository.
pub struct SqliteTeamRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTeamRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["schedules", "teams", "members"])?;
        Ok(Self { conn })
    }
}

impl TeamRepository for SqliteTeamRepository<'_> {
    fn schedule_exists(&self, sc_no: ScheduleNo) -> RepoResult<bool> {
        schedule_exists_on(self.conn, sc_no)
    }

    fn list_shares(&self, sc_no: ScheduleNo) -> RepoResult<Vec<TeamShare>> {
        let mut stmt = self.conn.prepare(
            "SELECT sc_no, mem_id, level
             FROM teams
             WHERE sc_no = ?1
             ORDER BY created_at ASC, mem_id ASC;",
        )?;
        let mut rows = stmt.query([sc_no])?;
        let mut shares = Vec::new();
        while let Some(row) = rows.next()? {
            shares.push(parse_share_row(row)?);
        }
        Ok(shares)
    }

    fn get_share(&self, sc_no: ScheduleNo, member_id: &str) -> RepoResult<Option<TeamShare>> {
        let mut stmt = self.conn.prepare(
            "SELECT sc_no, mem_id, level
             FROM teams
             WHERE sc_no = ?1
               AND mem_id = ?2;",
        )?;
        let mut rows = stmt.query(params![sc_no, member_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_share_row(row)?));
        }
        Ok(None)
    }

    fn insert_share(&self, share: &TeamShare) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_schedule_on(&tx, share.sc_no)?;
        let changed = tx.execute(
            "INSERT INTO teams (sc_no, mem_id, level)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (sc_no, mem_id) DO NOTHING;",
            params![share.sc_no, share.member_id.as_str(), share.level.as_db()],
        )?;
        if changed == 0 {
            return Err(RepoError::ExistsTeam {
                sc_no: share.sc_no,
                member_id: share.member_id.clone(),
            });
        }
        tx.commit()?;
        Ok(())
    }

    fn update_level(
        &self,
        sc_no: ScheduleNo,
        member_id: &str,
        level: TeamLevel,
    ) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_schedule_on(&tx, sc_no)?;
        let changed = tx.execute(
            "UPDATE teams SET level = ?3 WHERE sc_no = ?1 AND mem_id = ?2;",
            params![sc_no, member_id, level.as_db()],
        )?;
        if changed == 0 {
            return Err(team_not_found(sc_no, member_id));
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_share(&self, sc_no: ScheduleNo, member_id: &str) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_schedule_on(&tx, sc_no)?;
        let changed = tx.execute(
            "DELETE FROM teams WHERE sc_no = ?1 AND mem_id = ?2;",
            params![sc_no, member_id],
        )?;
        if changed == 0 {
            return Err(team_not_found(sc_no, member_id));
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_all_shares(&self, sc_no: ScheduleNo) -> RepoResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM teams WHERE sc_no = ?1;", [sc_no])?;
        Ok(removed)
    }
}

fn schedule_exists_on(conn: &Connection, sc_no: ScheduleNo) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM schedules WHERE sc_no = ?1);",
        [sc_no],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn ensure_schedule_on(conn: &Connection, sc_no: ScheduleNo) -> RepoResult<()> {
    if !schedule_exists_on(conn, sc_no)? {
        return Err(RepoError::ScheduleNotFound(sc_no));
    }
    Ok(())
}

fn team_not_found(sc_no: ScheduleNo, member_id: &str) -> RepoError {
    RepoError::TeamNotFound {
        sc_no,
        member_id: member_id.to_string(),
    }
}

fn parse_share_row(row: &Row<'_>) -> RepoResult<TeamShare> {
    let level_value: i64 = row.get("level")?;
    let level = TeamLevel::from_db(level_value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid level value `{level_value}` in teams.level"))
    })?;
    Ok(TeamShare {
        sc_no: row.get("sc_no")?,
        member_id: row.get("mem_id")?,
        level,
    })
}
