//! Alarm generation and suppression.
//!
//! # Responsibility
//! - Materialize alarm rows for membership and lifecycle events.
//! - Report which alarms a member can currently see.
//!
//! # Invariants
//! - Visibility is derived from the schedule status at read time. Recycling
//!   hides every alarm of the schedule except the `schedule_deleted` sentinel;
//!   restoring retracts the sentinels and nothing else.
//! - New alarms are never created for a recycled schedule.
//! - `purge_alarms` is the only irreversible removal of schedule alarms.

use crate::directory::member::MemberDirectory;
use crate::model::alarm::{Alarm, AlarmKind, AlarmNotice};
use crate::model::schedule::ScheduleNo;
use crate::model::team::TeamLevel;
use crate::repo::alarm_repo::AlarmRepository;
use crate::service::error::{CalendarError, CalendarResult};
use log::info;

/// Alarm engine over a repository and a member directory.
pub struct AlarmEngine<R: AlarmRepository, D: MemberDirectory> {
    repo: R,
    directory: D,
}

impl<R: AlarmRepository, D: MemberDirectory> AlarmEngine<R, D> {
    pub fn new(repo: R, directory: D) -> Self {
        Self { repo, directory }
    }

    /// Records that `member_id` joined the team of `sc_no`.
    ///
    /// Returns `None` when the schedule is not active.
    pub fn notify_share_added(
        &self,
        sc_no: ScheduleNo,
        member_id: &str,
    ) -> CalendarResult<Option<Alarm>> {
        self.ensure_recipient(member_id)?;
        Ok(self
            .repo
            .insert_alarm(member_id, sc_no, AlarmKind::ShareAdded)?)
    }

    /// Records a level change. Earlier alarms of the share stay visible.
    pub fn notify_level_changed(
        &self,
        member_id: &str,
        sc_no: ScheduleNo,
        level: TeamLevel,
    ) -> CalendarResult<Option<Alarm>> {
        self.ensure_recipient(member_id)?;
        Ok(self
            .repo
            .insert_alarm(member_id, sc_no, AlarmKind::for_level(level))?)
    }

    /// Drops the alarms of a revoked share and leaves an `unshared` notice.
    ///
    /// Both effects commit together. A sentinel for the same member is
    /// schedule-scoped and survives.
    pub fn notify_unshared(
        &self,
        sc_no: ScheduleNo,
        member_id: &str,
    ) -> CalendarResult<Option<Alarm>> {
        self.ensure_recipient(member_id)?;
        let (removed, notice) =
            self.repo
                .replace_membership_alarms(sc_no, member_id, AlarmKind::Unshared)?;
        info!(
            "event=alarm_unshared module=alarm_engine status=ok sc_no={} removed={} notice={}",
            sc_no,
            removed,
            notice.is_some()
        );
        Ok(notice)
    }

    /// Emits one sentinel per team member of a recycled schedule.
    ///
    /// Calling this again for the same recycle does not duplicate sentinels.
    pub fn notify_schedule_deleted(&self, sc_no: ScheduleNo) -> CalendarResult<Vec<Alarm>> {
        let sentinels = self.repo.insert_sentinels(sc_no)?;
        let suppressed = self
            .repo
            .list_for_schedule(sc_no)?
            .iter()
            .filter(|alarm| !alarm.is_visible)
            .count();
        info!(
            "event=alarm_suppress module=alarm_engine status=ok sc_no={} sentinels={} suppressed={}",
            sc_no,
            sentinels.len(),
            suppressed
        );
        Ok(sentinels)
    }

    /// Inverse of `notify_schedule_deleted` once the schedule is active again.
    pub fn restore_alarms(&self, sc_no: ScheduleNo) -> CalendarResult<usize> {
        let retracted = self.repo.delete_sentinels(sc_no)?;
        info!(
            "event=alarm_restore module=alarm_engine status=ok sc_no={} retracted={}",
            sc_no, retracted
        );
        Ok(retracted)
    }

    /// Permanently removes every alarm of `sc_no`. Hard delete only.
    pub fn purge_alarms(&self, sc_no: ScheduleNo) -> CalendarResult<usize> {
        Ok(self.repo.delete_for_schedule(sc_no)?)
    }

    /// Visible alarms of one member, newest first.
    pub fn list_visible(&self, member_id: &str) -> CalendarResult<Vec<AlarmNotice>> {
        Ok(self.repo.list_visible(member_id)?)
    }

    /// Every alarm of a schedule, hidden ones included.
    pub fn list_for_schedule(&self, sc_no: ScheduleNo) -> CalendarResult<Vec<Alarm>> {
        Ok(self.repo.list_for_schedule(sc_no)?)
    }

    fn ensure_recipient(&self, member_id: &str) -> CalendarResult<()> {
        match self.directory.resolve(member_id)? {
            Some(_) => Ok(()),
            None => Err(CalendarError::MemberNotFound(member_id.to_string())),
        }
    }
}
