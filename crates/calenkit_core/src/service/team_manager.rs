//! Team membership use-cases.
//!
//! # Responsibility
//! - Grant, re-level and revoke schedule access for non-owning members.
//! - Validate schedule existence and member resolution before writes.
//!
//! # Invariants
//! - `add` never upgrades an existing share; level changes go through
//!   `set_level`.
//! - Self-share and ownership checks belong to the facade, not here.
//! - A schedule purged between `ensure_schedule` and the write still reports
//!   `ScheduleNotFound`; the repository re-checks inside its transaction.

use crate::directory::member::MemberDirectory;
use crate::model::schedule::ScheduleNo;
use crate::model::team::{TeamLevel, TeamShare};
use crate::repo::team_repo::TeamRepository;
use crate::service::error::{CalendarError, CalendarResult};

/// Team membership manager over a repository and a member directory.
pub struct TeamManager<R: TeamRepository, D: MemberDirectory> {
    repo: R,
    directory: D,
}

impl<R: TeamRepository, D: MemberDirectory> TeamManager<R, D> {
    pub fn new(repo: R, directory: D) -> Self {
        Self { repo, directory }
    }

    /// Lists the team of one schedule in share order.
    pub fn list_shares(&self, sc_no: ScheduleNo) -> CalendarResult<Vec<TeamShare>> {
        self.ensure_schedule(sc_no)?;
        Ok(self.repo.list_shares(sc_no)?)
    }

    /// Shares `sc_no` with `member_id` at `level`.
    ///
    /// # Errors
    /// - `ScheduleNotFound` when the schedule does not exist.
    /// - `MemberNotFound` when the directory does not know `member_id`.
    /// - `ExistsTeam` when the member is already on the team.
    pub fn add(
        &self,
        sc_no: ScheduleNo,
        member_id: &str,
        level: TeamLevel,
    ) -> CalendarResult<TeamShare> {
        self.ensure_schedule(sc_no)?;
        if self.directory.resolve(member_id)?.is_none() {
            return Err(CalendarError::MemberNotFound(member_id.to_string()));
        }

        let share = TeamShare {
            sc_no,
            member_id: member_id.to_string(),
            level,
        };
        self.repo.insert_share(&share)?;
        Ok(share)
    }

    pub fn set_level(
        &self,
        sc_no: ScheduleNo,
        member_id: &str,
        level: TeamLevel,
    ) -> CalendarResult<TeamShare> {
        self.ensure_schedule(sc_no)?;
        self.repo.update_level(sc_no, member_id, level)?;
        Ok(TeamShare {
            sc_no,
            member_id: member_id.to_string(),
            level,
        })
    }

    pub fn remove(&self, sc_no: ScheduleNo, member_id: &str) -> CalendarResult<()> {
        self.ensure_schedule(sc_no)?;
        Ok(self.repo.delete_share(sc_no, member_id)?)
    }

    /// Removes the whole team. Part of the hard-delete cascade.
    pub fn remove_all(&self, sc_no: ScheduleNo) -> CalendarResult<usize> {
        Ok(self.repo.delete_all_shares(sc_no)?)
    }

    /// Returns the member's level, or `None` when not on the team.
    pub fn level_of(
        &self,
        sc_no: ScheduleNo,
        member_id: &str,
    ) -> CalendarResult<Option<TeamLevel>> {
        Ok(self
            .repo
            .get_share(sc_no, member_id)?
            .map(|share| share.level))
    }

    fn ensure_schedule(&self, sc_no: ScheduleNo) -> CalendarResult<()> {
        if !self.repo.schedule_exists(sc_no)? {
            return Err(CalendarError::ScheduleNotFound(sc_no));
        }
        Ok(())
    }
}
