//! Notification dispatch facade.
//!
//! # Responsibility
//! - Expose calendar actions that take the acting member explicitly.
//! - Check preconditions, apply the primary mutation, then notify.
//!
//! # Invariants
//! - Validation runs before any mutation; a rejected action changes nothing.
//! - The primary mutation commits before its alarm step. Alarm failures are
//!   logged and swallowed, never rolled back into the primary mutation.
//! - Hard delete is one transaction in the order alarms, shares, schedule.
//! - Once purged, every action on the schedule number fails with
//!   `ScheduleNotFound`.

use crate::config::CoreConfig;
use crate::directory::email::{EmailDispatcher, EmailMessage};
use crate::directory::member::{is_valid_member_id, MemberDirectory, SqliteMemberDirectory};
use crate::model::alarm::{Alarm, AlarmNotice};
use crate::model::member::Member;
use crate::model::schedule::{Schedule, ScheduleDraft, ScheduleNo, ScheduleStatus};
use crate::model::team::{TeamLevel, TeamShare};
use crate::repo::alarm_repo::SqliteAlarmRepository;
use crate::repo::schedule_repo::{ScheduleListQuery, SqliteScheduleRepository};
use crate::repo::team_repo::SqliteTeamRepository;
use crate::service::alarm_engine::AlarmEngine;
use crate::service::error::{CalendarError, CalendarResult};
use crate::service::invitation::build_share_invitation;
use crate::service::schedule_store::ScheduleStore;
use crate::service::team_manager::TeamManager;
use log::{info, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Result of a share or level change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareOutcome {
    pub share: TeamShare,
    /// `None` when the alarm step produced nothing or failed.
    pub alarm: Option<Alarm>,
}

/// Rows removed by a hard delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardDeleteReport {
    pub alarms_purged: usize,
    pub shares_removed: usize,
}

type ScheduleStoreImpl<'conn> = ScheduleStore<SqliteScheduleRepository<'conn>>;
type TeamManagerImpl<'conn> = TeamManager<SqliteTeamRepository<'conn>, SqliteMemberDirectory<'conn>>;
type AlarmEngineImpl<'conn> = AlarmEngine<SqliteAlarmRepository<'conn>, SqliteMemberDirectory<'conn>>;

/// Entry point for calendar actions over one SQLite connection.
pub struct CalendarFacade<'conn, E: EmailDispatcher> {
    conn: &'conn Connection,
    schedules: ScheduleStoreImpl<'conn>,
    teams: TeamManagerImpl<'conn>,
    alarms: AlarmEngineImpl<'conn>,
    members: SqliteMemberDirectory<'conn>,
    mailer: E,
    invite_base_url: String,
}

impl<'conn, E: EmailDispatcher> CalendarFacade<'conn, E> {
    /// Builds the facade from a migrated connection.
    pub fn try_new(conn: &'conn Connection, mailer: E, config: &CoreConfig) -> CalendarResult<Self> {
        let members = SqliteMemberDirectory::try_new(conn)?;
        Ok(Self {
            conn,
            schedules: ScheduleStore::new(SqliteScheduleRepository::try_new(conn)?),
            teams: TeamManager::new(SqliteTeamRepository::try_new(conn)?, members),
            alarms: AlarmEngine::new(SqliteAlarmRepository::try_new(conn)?, members),
            members,
            mailer,
            invite_base_url: config.invite_base_url().to_string(),
        })
    }

    /// Adds or renames a member in the directory.
    pub fn register_member(&self, member: &Member) -> CalendarResult<()> {
        if !is_valid_member_id(&member.member_id) {
            return Err(CalendarError::InvalidMemberId(member.member_id.clone()));
        }
        Ok(self.members.register(member)?)
    }

    pub fn create_schedule(&self, acting: &str, date: &str) -> CalendarResult<Schedule> {
        self.ensure_member(acting)?;
        let sc_no = self.schedules.create(acting, date)?;
        info!("event=schedule_create module=facade status=ok sc_no={sc_no}");
        self.schedules.get(sc_no)
    }

    /// Edits an active schedule. Allowed for the owner and write members.
    pub fn update_schedule(
        &self,
        acting: &str,
        sc_no: ScheduleNo,
        draft: &ScheduleDraft,
    ) -> CalendarResult<Schedule> {
        let schedule = self.schedules.get(sc_no)?;
        require_status(&schedule, ScheduleStatus::Active)?;
        if !schedule.is_owned_by(acting) {
            let can_write = self
                .teams
                .level_of(sc_no, acting)?
                .is_some_and(TeamLevel::can_write);
            if !can_write {
                return Err(CalendarError::WriteDenied {
                    sc_no,
                    member_id: acting.to_string(),
                });
            }
        }
        self.schedules.update_details(sc_no, draft)
    }

    pub fn toggle_bookmark(&self, acting: &str, sc_no: ScheduleNo) -> CalendarResult<bool> {
        self.owned_schedule(acting, sc_no)?;
        self.schedules.toggle_bookmark(sc_no, acting)
    }

    /// Shares an active schedule. `level` defaults to read when absent.
    pub fn share(
        &self,
        acting: &str,
        sc_no: ScheduleNo,
        member_id: &str,
        level: Option<i64>,
    ) -> CalendarResult<ShareOutcome> {
        let member_id = member_id.trim();
        let schedule = self.owned_schedule(acting, sc_no)?;
        require_status(&schedule, ScheduleStatus::Active)?;
        if member_id == acting {
            return Err(CalendarError::SelfShare(acting.to_string()));
        }
        let level = level.map(TeamLevel::try_from).transpose()?.unwrap_or_default();

        let share = self.teams.add(sc_no, member_id, level)?;
        info!(
            "event=team_share module=facade status=ok sc_no={} level={}",
            sc_no,
            level.as_db()
        );
        let alarm = best_effort(
            "alarm_share_added",
            sc_no,
            self.alarms.notify_share_added(sc_no, member_id),
        );
        Ok(ShareOutcome { share, alarm })
    }

    /// Moves an existing share to `level` (`0` read, `1` write).
    pub fn change_level(
        &self,
        acting: &str,
        sc_no: ScheduleNo,
        member_id: &str,
        level: i64,
    ) -> CalendarResult<ShareOutcome> {
        let member_id = member_id.trim();
        let schedule = self.owned_schedule(acting, sc_no)?;
        require_status(&schedule, ScheduleStatus::Active)?;
        let level = TeamLevel::try_from(level)?;

        let share = self.teams.set_level(sc_no, member_id, level)?;
        info!(
            "event=team_level module=facade status=ok sc_no={} level={}",
            sc_no,
            level.as_db()
        );
        let alarm = best_effort(
            "alarm_level_changed",
            sc_no,
            self.alarms.notify_level_changed(member_id, sc_no, level),
        );
        Ok(ShareOutcome { share, alarm })
    }

    /// Revokes a share. The owner may remove anyone; a member may leave.
    pub fn unshare(
        &self,
        acting: &str,
        sc_no: ScheduleNo,
        member_id: &str,
    ) -> CalendarResult<Option<Alarm>> {
        let member_id = member_id.trim();
        let schedule = self.schedules.get(sc_no)?;
        if !schedule.is_owned_by(acting) && acting != member_id {
            return Err(not_owner(sc_no, acting));
        }

        self.teams.remove(sc_no, member_id)?;
        info!("event=team_unshare module=facade status=ok sc_no={sc_no}");
        Ok(best_effort(
            "alarm_unshared",
            sc_no,
            self.alarms.notify_unshared(sc_no, member_id),
        ))
    }

    /// Moves an active schedule to the recycle bin and returns the sentinels.
    pub fn recycle(&self, acting: &str, sc_no: ScheduleNo) -> CalendarResult<Vec<Alarm>> {
        let schedule = self.owned_schedule(acting, sc_no)?;
        require_status(&schedule, ScheduleStatus::Active)?;

        self.schedules.set_status(sc_no, ScheduleStatus::Recycled)?;
        info!("event=schedule_recycle module=facade status=ok sc_no={sc_no}");
        Ok(best_effort(
            "alarm_schedule_deleted",
            sc_no,
            self.alarms.notify_schedule_deleted(sc_no),
        ))
    }

    pub fn restore(&self, acting: &str, sc_no: ScheduleNo) -> CalendarResult<()> {
        let schedule = self.owned_schedule(acting, sc_no)?;
        require_status(&schedule, ScheduleStatus::Recycled)?;

        self.schedules.set_status(sc_no, ScheduleStatus::Active)?;
        info!("event=schedule_restore module=facade status=ok sc_no={sc_no}");
        best_effort("alarm_restore", sc_no, self.alarms.restore_alarms(sc_no));
        Ok(())
    }

    /// Permanently removes a schedule with its alarms and team.
    pub fn hard_delete(&self, acting: &str, sc_no: ScheduleNo) -> CalendarResult<HardDeleteReport> {
        self.owned_schedule(acting, sc_no)?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let alarms_purged = self.alarms.purge_alarms(sc_no)?;
        let shares_removed = self.teams.remove_all(sc_no)?;
        self.schedules.hard_delete(sc_no)?;
        tx.commit()?;

        info!(
            "event=schedule_purge module=facade status=ok sc_no={} alarms={} shares={}",
            sc_no, alarms_purged, shares_removed
        );
        Ok(HardDeleteReport {
            alarms_purged,
            shares_removed,
        })
    }

    /// Active schedules the member owns or is shared on.
    pub fn list_my_schedules(
        &self,
        acting: &str,
        query: &ScheduleListQuery,
    ) -> CalendarResult<Vec<Schedule>> {
        self.schedules.list_active(acting, query)
    }

    pub fn list_recycle_bin(&self, acting: &str) -> CalendarResult<Vec<Schedule>> {
        self.schedules.list_recycled(acting)
    }

    /// Reads one schedule, recycled or not, for its owner or team.
    pub fn get_schedule(&self, acting: &str, sc_no: ScheduleNo) -> CalendarResult<Schedule> {
        self.viewable_schedule(acting, sc_no)
    }

    pub fn list_team(&self, acting: &str, sc_no: ScheduleNo) -> CalendarResult<Vec<TeamShare>> {
        self.viewable_schedule(acting, sc_no)?;
        self.teams.list_shares(sc_no)
    }

    pub fn list_alarms(&self, acting: &str) -> CalendarResult<Vec<AlarmNotice>> {
        self.alarms.list_visible(acting)
    }

    /// Looks up a share candidate. The acting member never matches.
    pub fn search_member(&self, acting: &str, member_id: &str) -> CalendarResult<Option<Member>> {
        let member_id = member_id.trim();
        if !is_valid_member_id(member_id) {
            return Err(CalendarError::InvalidMemberId(member_id.to_string()));
        }
        if member_id == acting {
            return Ok(None);
        }
        Ok(self.members.resolve(member_id)?)
    }

    /// Emails a share confirmation link to `invitee`.
    ///
    /// The invitee does not have to be registered yet.
    pub fn send_share_invitation(
        &self,
        acting: &str,
        sc_no: ScheduleNo,
        invitee: &str,
    ) -> CalendarResult<EmailMessage> {
        self.owned_schedule(acting, sc_no)?;
        let invitee = invitee.trim();
        if !is_valid_member_id(invitee) {
            return Err(CalendarError::InvalidMemberId(invitee.to_string()));
        }
        if invitee == acting {
            return Err(CalendarError::SelfShare(acting.to_string()));
        }

        let message = build_share_invitation(&self.invite_base_url, sc_no, acting, invitee);
        self.mailer.send(&message)?;
        info!("event=team_invite module=facade status=ok sc_no={sc_no}");
        Ok(message)
    }

    /// Every alarm of a schedule with derived visibility. Owner only.
    pub fn schedule_alarms(&self, acting: &str, sc_no: ScheduleNo) -> CalendarResult<Vec<Alarm>> {
        self.owned_schedule(acting, sc_no)?;
        self.alarms.list_for_schedule(sc_no)
    }

    fn ensure_member(&self, member_id: &str) -> CalendarResult<()> {
        match self.members.resolve(member_id)? {
            Some(_) => Ok(()),
            None => Err(CalendarError::MemberNotFound(member_id.to_string())),
        }
    }

    fn owned_schedule(&self, acting: &str, sc_no: ScheduleNo) -> CalendarResult<Schedule> {
        let schedule = self.schedules.get(sc_no)?;
        if !schedule.is_owned_by(acting) {
            return Err(not_owner(sc_no, acting));
        }
        Ok(schedule)
    }

    fn viewable_schedule(&self, acting: &str, sc_no: ScheduleNo) -> CalendarResult<Schedule> {
        let schedule = self.schedules.get(sc_no)?;
        if schedule.is_owned_by(acting) || self.teams.level_of(sc_no, acting)?.is_some() {
            return Ok(schedule);
        }
        Err(CalendarError::AccessDenied {
            sc_no,
            member_id: acting.to_string(),
        })
    }
}

fn require_status(schedule: &Schedule, expected: ScheduleStatus) -> CalendarResult<()> {
    if schedule.status != expected {
        return Err(CalendarError::InvalidState {
            sc_no: schedule.sc_no,
            expected,
            actual: schedule.status,
        });
    }
    Ok(())
}

fn not_owner(sc_no: ScheduleNo, acting: &str) -> CalendarError {
    CalendarError::NotOwner {
        sc_no,
        member_id: acting.to_string(),
    }
}

/// Unwraps an alarm step, logging and dropping its failure.
fn best_effort<T: Default>(event: &str, sc_no: ScheduleNo, result: CalendarResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            warn!("event={event} module=facade status=skipped sc_no={sc_no} error={err}");
            T::default()
        }
    }
}
