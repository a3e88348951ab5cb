//! Schedule repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide lifecycle and listing APIs over `schedules` storage.
//! - Keep SQL details inside core persistence boundary.
//!
//! # Invariants
//! - Reads by id ignore status; only listings filter recycled rows.
//! - `delete_schedule` removes the schedule row only. Callers must remove
//!   alarms and shares first or the foreign keys reject the delete.

use crate::model::schedule::{Schedule, ScheduleDraft, ScheduleNo, ScheduleStatus};
use crate::repo::{ensure_connection_ready, int_to_bool, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const SCHEDULE_SELECT_SQL: &str = "SELECT
    s.sc_no AS sc_no,
    s.owner_id AS owner_id,
    s.title AS title,
    s.content AS content,
    s.start_at AS start_at,
    s.end_at AS end_at,
    s.status AS status,
    s.bookmarked AS bookmarked,
    s.created_at AS created_at,
    s.updated_at AS updated_at
FROM schedules s";

/// Which relationship to the viewer a listing covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScheduleScope {
    /// Owned schedules plus schedules shared with the viewer.
    #[default]
    All,
    Owned,
    Shared,
}

/// Query options for listing active schedules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleListQuery {
    pub scope: ScheduleScope,
    /// Only schedules the viewer owns and has bookmarked.
    pub bookmarked_only: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for schedule persistence.
pub trait ScheduleRepository {
    /// Inserts an active, untitled schedule and returns its number.
    fn insert_schedule(&self, owner_id: &str, start_at: i64, end_at: i64)
        -> RepoResult<ScheduleNo>;
    /// Loads one schedule regardless of status.
    fn get_schedule(&self, sc_no: ScheduleNo) -> RepoResult<Option<Schedule>>;
    /// Lists active schedules visible to `member_id`.
    fn list_active(&self, member_id: &str, query: &ScheduleListQuery)
        -> RepoResult<Vec<Schedule>>;
    /// Lists recycled schedules owned by `owner_id`.
    fn list_recycled(&self, owner_id: &str) -> RepoResult<Vec<Schedule>>;
    fn update_details(&self, sc_no: ScheduleNo, draft: &ScheduleDraft) -> RepoResult<()>;
    fn set_status(&self, sc_no: ScheduleNo, status: ScheduleStatus) -> RepoResult<()>;
    /// Flips the bookmark flag and returns the new value.
    fn toggle_bookmark(&self, sc_no: ScheduleNo, owner_id: &str) -> RepoResult<bool>;
    fn delete_schedule(&self, sc_no: ScheduleNo) -> RepoResult<()>;
}

/// SQLite-backed schedule repository.
pub struct SqliteScheduleRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteScheduleRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["schedules", "teams"])?;
        Ok(Self { conn })
    }
}

impl ScheduleRepository for SqliteScheduleRepository<'_> {
    fn insert_schedule(
        &self,
        owner_id: &str,
        start_at: i64,
        end_at: i64,
    ) -> RepoResult<ScheduleNo> {
        self.conn.execute(
            "INSERT INTO schedules (owner_id, start_at, end_at, status)
             VALUES (?1, ?2, ?3, 1);",
            params![owner_id, start_at, end_at],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_schedule(&self, sc_no: ScheduleNo) -> RepoResult<Option<Schedule>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SCHEDULE_SELECT_SQL} WHERE s.sc_no = ?1;"))?;
        let mut rows = stmt.query([sc_no])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_schedule_row(row)?));
        }
        Ok(None)
    }

    fn list_active(
        &self,
        member_id: &str,
        query: &ScheduleListQuery,
    ) -> RepoResult<Vec<Schedule>> {
        let mut sql = format!("{SCHEDULE_SELECT_SQL} WHERE s.status = 1");
        let mut bind_values: Vec<Value> = Vec::new();
        let viewer = Value::Text(member_id.to_string());

        match query.scope {
            ScheduleScope::All => {
                sql.push_str(
                    " AND (s.owner_id = ? OR EXISTS (
                        SELECT 1 FROM teams t WHERE t.sc_no = s.sc_no AND t.mem_id = ?
                    ))",
                );
                bind_values.push(viewer.clone());
                bind_values.push(viewer.clone());
            }
            ScheduleScope::Owned => {
                sql.push_str(" AND s.owner_id = ?");
                bind_values.push(viewer.clone());
            }
            ScheduleScope::Shared => {
                sql.push_str(
                    " AND EXISTS (
                        SELECT 1 FROM teams t WHERE t.sc_no = s.sc_no AND t.mem_id = ?
                    )",
                );
                bind_values.push(viewer.clone());
            }
        }

        if query.bookmarked_only {
            sql.push_str(" AND s.bookmarked = 1 AND s.owner_id = ?");
            bind_values.push(viewer);
        }

        sql.push_str(" ORDER BY s.start_at ASC, s.sc_no ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut schedules = Vec::new();
        while let Some(row) = rows.next()? {
            schedules.push(parse_schedule_row(row)?);
        }
        Ok(schedules)
    }

    fn list_recycled(&self, owner_id: &str) -> RepoResult<Vec<Schedule>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SCHEDULE_SELECT_SQL}
             WHERE s.owner_id = ?1
               AND s.status = 0
             ORDER BY s.updated_at DESC, s.sc_no DESC;"
        ))?;
        let mut rows = stmt.query([owner_id])?;
        let mut schedules = Vec::new();
        while let Some(row) = rows.next()? {
            schedules.push(parse_schedule_row(row)?);
        }
        Ok(schedules)
    }

    fn update_details(&self, sc_no: ScheduleNo, draft: &ScheduleDraft) -> RepoResult<()> {
        draft.validate()?;

        let changed = self.conn.execute(
            "UPDATE schedules
             SET
                title = ?2,
                content = ?3,
                start_at = ?4,
                end_at = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE sc_no = ?1;",
            params![
                sc_no,
                draft.title.as_str(),
                draft.content.as_str(),
                draft.start_at,
                draft.end_at,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::ScheduleNotFound(sc_no));
        }
        Ok(())
    }

    fn set_status(&self, sc_no: ScheduleNo, status: ScheduleStatus) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE schedules
             SET
                status = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE sc_no = ?1;",
            params![sc_no, status.as_db()],
        )?;
        if changed == 0 {
            return Err(RepoError::ScheduleNotFound(sc_no));
        }
        Ok(())
    }

    fn toggle_bookmark(&self, sc_no: ScheduleNo, owner_id: &str) -> RepoResult<bool> {
        let flag: Option<i64> = self
            .conn
            .query_row(
                "UPDATE schedules
                 SET bookmarked = 1 - bookmarked
                 WHERE sc_no = ?1
                   AND owner_id = ?2
                 RETURNING bookmarked;",
                params![sc_no, owner_id],
                |row| row.get(0),
            )
            .optional()?;

        match flag {
            Some(value) => int_to_bool(value, "schedules.bookmarked"),
            None => Err(RepoError::ScheduleNotFound(sc_no)),
        }
    }

    fn delete_schedule(&self, sc_no: ScheduleNo) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM schedules WHERE sc_no = ?1;", [sc_no])?;
        if changed == 0 {
            return Err(RepoError::ScheduleNotFound(sc_no));
        }
        Ok(())
    }
}

fn parse_schedule_row(row: &Row<'_>) -> RepoResult<Schedule> {
    let status_value: i64 = row.get("status")?;
    let status = ScheduleStatus::from_db(status_value).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid status value `{status_value}` in schedules.status"
        ))
    })?;

    let schedule = Schedule {
        sc_no: row.get("sc_no")?,
        owner_id: row.get("owner_id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        start_at: row.get("start_at")?,
        end_at: row.get("end_at")?,
        status,
        bookmarked: int_to_bool(row.get("bookmarked")?, "schedules.bookmarked")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    schedule.validate()?;
    Ok(schedule)
}

