//! Alarm repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist alarm rows and compute their visibility from schedule state.
//! - Keep multi-statement alarm updates atomic.
//!
//! # Invariants
//! - Alarm rows are only inserted for schedules in the status their kind is
//!   visible in; the insert is a no-op otherwise.
//! - At most one `schedule_deleted` sentinel exists per recipient/schedule.
//! - `replace_membership_alarms` opens its own transaction and must not be
//!   called while another transaction is open on the same connection.

use crate::model::alarm::{Alarm, AlarmKind, AlarmNo, AlarmNotice};
use crate::model::schedule::{ScheduleNo, ScheduleStatus};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction, TransactionBehavior,
};

const ALARM_SELECT_SQL: &str = "SELECT
    a.al_no AS al_no,
    a.recipient_id AS recipient_id,
    a.sc_no AS sc_no,
    a.kind AS kind,
    a.created_at AS created_at,
    s.status AS sc_status,
    s.title AS sc_title
FROM alarms a
INNER JOIN schedules s ON s.sc_no = a.sc_no";

/// Mirrors `AlarmKind::visible_for` so listings filter in SQL.
const VISIBLE_PREDICATE_SQL: &str = "(
    (a.kind = 'schedule_deleted' AND s.status = 0)
    OR (a.kind <> 'schedule_deleted' AND s.status = 1)
)";

/// Repository interface for alarm persistence.
pub trait AlarmRepository {
    /// Inserts one alarm when the schedule is active. Returns `None` otherwise.
    fn insert_alarm(
        &self,
        recipient_id: &str,
        sc_no: ScheduleNo,
        kind: AlarmKind,
    ) -> RepoResult<Option<Alarm>>;
    /// Atomically deletes membership alarms of one share and inserts `notice`.
    ///
    /// Returns the number of deleted rows and the inserted notice, if the
    /// schedule is active.
    fn replace_membership_alarms(
        &self,
        sc_no: ScheduleNo,
        member_id: &str,
        notice: AlarmKind,
    ) -> RepoResult<(usize, Option<Alarm>)>;
    /// Inserts one sentinel per team member of a recycled schedule.
    fn insert_sentinels(&self, sc_no: ScheduleNo) -> RepoResult<Vec<Alarm>>;
    fn delete_sentinels(&self, sc_no: ScheduleNo) -> RepoResult<usize>;
    /// Deletes every alarm of a schedule.
    fn delete_for_schedule(&self, sc_no: ScheduleNo) -> RepoResult<usize>;
    /// Lists every alarm of a schedule with derived visibility.
    fn list_for_schedule(&self, sc_no: ScheduleNo) -> RepoResult<Vec<Alarm>>;
    /// Lists visible alarms for one recipient, newest first.
    fn list_visible(&self, recipient_id: &str) -> RepoResult<Vec<AlarmNotice>>;
}

/// SQLite-backed alarm repository.
pub struct SqliteAlarmRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAlarmRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["alarms", "schedules", "teams"])?;
        Ok(Self { conn })
    }
}

impl AlarmRepository for SqliteAlarmRepository<'_> {
    fn insert_alarm(
        &self,
        recipient_id: &str,
        sc_no: ScheduleNo,
        kind: AlarmKind,
    ) -> RepoResult<Option<Alarm>> {
        insert_alarm_on(self.conn, recipient_id, sc_no, kind)
    }

    fn replace_membership_alarms(
        &self,
        sc_no: ScheduleNo,
        member_id: &str,
        notice: AlarmKind,
    ) -> RepoResult<(usize, Option<Alarm>)> {
        let kinds = AlarmKind::MEMBERSHIP_SCOPED;
        let placeholders = vec!["?"; kinds.len()].join(", ");
        let sql = format!(
            "DELETE FROM alarms
             WHERE sc_no = ?
               AND recipient_id = ?
               AND kind IN ({placeholders});"
        );
        let mut bind_values = vec![Value::Integer(sc_no), Value::Text(member_id.to_string())];
        bind_values.extend(
            kinds
                .iter()
                .map(|kind| Value::Text(kind.as_db().to_string())),
        );

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let removed = tx.execute(&sql, params_from_iter(bind_values))?;
        let inserted = insert_alarm_on(&tx, member_id, sc_no, notice)?;
        tx.commit()?;
        Ok((removed, inserted))
    }

    fn insert_sentinels(&self, sc_no: ScheduleNo) -> RepoResult<Vec<Alarm>> {
        let mut stmt = self.conn.prepare(
            "INSERT OR IGNORE INTO alarms (recipient_id, sc_no, kind)
             SELECT t.mem_id, t.sc_no, 'schedule_deleted'
             FROM teams t
             INNER JOIN schedules s ON s.sc_no = t.sc_no
             WHERE t.sc_no = ?1
               AND s.status = 0
             RETURNING al_no, recipient_id, sc_no, kind, created_at;",
        )?;
        let mut rows = stmt.query([sc_no])?;
        let mut sentinels = Vec::new();
        while let Some(row) = rows.next()? {
            sentinels.push(parse_inserted_row(row, ScheduleStatus::Recycled)?);
        }
        Ok(sentinels)
    }

    fn delete_sentinels(&self, sc_no: ScheduleNo) -> RepoResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM alarms WHERE sc_no = ?1 AND kind = 'schedule_deleted';",
            [sc_no],
        )?;
        Ok(removed)
    }

    fn delete_for_schedule(&self, sc_no: ScheduleNo) -> RepoResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM alarms WHERE sc_no = ?1;", [sc_no])?;
        Ok(removed)
    }

    fn list_for_schedule(&self, sc_no: ScheduleNo) -> RepoResult<Vec<Alarm>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ALARM_SELECT_SQL}
             WHERE a.sc_no = ?1
             ORDER BY a.al_no ASC;"
        ))?;
        let mut rows = stmt.query([sc_no])?;
        let mut alarms = Vec::new();
        while let Some(row) = rows.next()? {
            alarms.push(parse_alarm_row(row)?);
        }
        Ok(alarms)
    }

    fn list_visible(&self, recipient_id: &str) -> RepoResult<Vec<AlarmNotice>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ALARM_SELECT_SQL}
             WHERE a.recipient_id = ?1
               AND {VISIBLE_PREDICATE_SQL}
             ORDER BY a.created_at DESC, a.al_no DESC;"
        ))?;
        let mut rows = stmt.query([recipient_id])?;
        let mut notices = Vec::new();
        while let Some(row) = rows.next()? {
            notices.push(AlarmNotice {
                alarm: parse_alarm_row(row)?,
                schedule_title: row.get("sc_title")?,
            });
        }
        Ok(notices)
    }
}

fn insert_alarm_on(
    conn: &Connection,
    recipient_id: &str,
    sc_no: ScheduleNo,
    kind: AlarmKind,
) -> RepoResult<Option<Alarm>> {
    let required_status = if kind.is_sentinel() {
        ScheduleStatus::Recycled
    } else {
        ScheduleStatus::Active
    };

    let inserted = conn
        .query_row(
            "INSERT INTO alarms (recipient_id, sc_no, kind)
             SELECT ?1, sc_no, ?3
             FROM schedules
             WHERE sc_no = ?2
               AND status = ?4
             RETURNING al_no, recipient_id, sc_no, kind, created_at;",
            params![recipient_id, sc_no, kind.as_db(), required_status.as_db()],
            |row| {
                Ok((
                    row.get::<_, AlarmNo>("al_no")?,
                    row.get::<_, String>("recipient_id")?,
                    row.get::<_, ScheduleNo>("sc_no")?,
                    row.get::<_, i64>("created_at")?,
                ))
            },
        )
        .optional()?;

    Ok(
        inserted.map(|(al_no, recipient_id, sc_no, created_at)| Alarm {
            al_no,
            recipient_id,
            sc_no,
            kind,
            created_at,
            is_visible: kind.visible_for(required_status),
        }),
    )
}

fn parse_kind(value: &str) -> RepoResult<AlarmKind> {
    AlarmKind::parse(value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid alarm kind `{value}` in alarms.kind"))
    })
}

fn parse_inserted_row(row: &Row<'_>, status: ScheduleStatus) -> RepoResult<Alarm> {
    let kind = parse_kind(&row.get::<_, String>("kind")?)?;
    Ok(Alarm {
        al_no: row.get("al_no")?,
        recipient_id: row.get("recipient_id")?,
        sc_no: row.get("sc_no")?,
        kind,
        created_at: row.get("created_at")?,
        is_visible: kind.visible_for(status),
    })
}

fn parse_alarm_row(row: &Row<'_>) -> RepoResult<Alarm> {
    let status_value: i64 = row.get("sc_status")?;
    let status = ScheduleStatus::from_db(status_value).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid status value `{status_value}` in schedules.status"
        ))
    })?;
    parse_inserted_row(row, status)
}
