//! Schedule lifecycle use-cases.
//!
//! # Responsibility
//! - Create schedules from a calendar day and read them back by number.
//! - Move schedules between active and recycled states.
//!
//! # Invariants
//! - `get` ignores status; recycled schedules stay readable by number.
//! - `hard_delete` only removes the schedule row. The facade owns the cascade.

use crate::model::schedule::{
    parse_schedule_date, Schedule, ScheduleDraft, ScheduleNo, ScheduleStatus,
    ScheduleValidationError,
};
use crate::repo::schedule_repo::{ScheduleListQuery, ScheduleRepository};
use crate::service::error::{CalendarError, CalendarResult};

/// Schedule store over a repository implementation.
pub struct ScheduleStore<R: ScheduleRepository> {
    repo: R,
}

impl<R: ScheduleRepository> ScheduleStore<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates an untitled, active schedule covering `date` (`YYYY-MM-DD`).
    pub fn create(&self, owner_id: &str, date: &str) -> CalendarResult<ScheduleNo> {
        if owner_id.trim().is_empty() {
            return Err(ScheduleValidationError::BlankOwner.into());
        }
        let day_start = parse_schedule_date(date)?;
        Ok(self.repo.insert_schedule(owner_id, day_start, day_start)?)
    }

    pub fn get(&self, sc_no: ScheduleNo) -> CalendarResult<Schedule> {
        self.repo
            .get_schedule(sc_no)?
            .ok_or(CalendarError::ScheduleNotFound(sc_no))
    }

    /// Lists active schedules visible to `member_id`.
    pub fn list_active(
        &self,
        member_id: &str,
        query: &ScheduleListQuery,
    ) -> CalendarResult<Vec<Schedule>> {
        Ok(self.repo.list_active(member_id, query)?)
    }

    pub fn list_recycled(&self, owner_id: &str) -> CalendarResult<Vec<Schedule>> {
        Ok(self.repo.list_recycled(owner_id)?)
    }

    pub fn set_status(&self, sc_no: ScheduleNo, status: ScheduleStatus) -> CalendarResult<()> {
        Ok(self.repo.set_status(sc_no, status)?)
    }

    /// Flips the owner's bookmark and returns the new flag.
    pub fn toggle_bookmark(&self, sc_no: ScheduleNo, owner_id: &str) -> CalendarResult<bool> {
        Ok(self.repo.toggle_bookmark(sc_no, owner_id)?)
    }

    /// Replaces title, content and time range, then reads the row back.
    pub fn update_details(
        &self,
        sc_no: ScheduleNo,
        draft: &ScheduleDraft,
    ) -> CalendarResult<Schedule> {
        self.repo.update_details(sc_no, draft)?;
        self.get(sc_no)
    }

    pub fn hard_delete(&self, sc_no: ScheduleNo) -> CalendarResult<()> {
        Ok(self.repo.delete_schedule(sc_no)?)
    }
}

#[cfg(test)]
mod tests {
    use super::ScheduleStore;
    use crate::db::open_db_in_memory;
    use crate::model::schedule::ScheduleValidationError;
    use crate::repo::schedule_repo::SqliteScheduleRepository;
    use crate::service::error::CalendarError;

    #[test]
    fn create_rejects_blank_owner_and_bad_date_before_insert() {
        let conn = open_db_in_memory().unwrap();
        let store = ScheduleStore::new(SqliteScheduleRepository::try_new(&conn).unwrap());

        assert!(matches!(
            store.create("  ", "2024-05-01"),
            Err(CalendarError::Validation(ScheduleValidationError::BlankOwner))
        ));
        assert!(matches!(
            store.create("host@calenkit.dev", "05/01/2024"),
            Err(CalendarError::Validation(ScheduleValidationError::InvalidDate(_)))
        ));

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM schedules;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn get_missing_schedule_is_not_found() {
        let conn = open_db_in_memory().unwrap();
        let store = ScheduleStore::new(SqliteScheduleRepository::try_new(&conn).unwrap());
        assert!(matches!(store.get(42), Err(CalendarError::ScheduleNotFound(42))));
    }
}
