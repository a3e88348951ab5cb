//! Core domain logic for Calenkit shared calendars.
//! This crate is the single source of truth for sharing and alarm invariants.

pub mod config;
pub mod db;
pub mod directory;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::CoreConfig;
pub use db::{open_db, open_db_in_memory, DbError};
pub use directory::email::{DispatchError, EmailDispatcher, EmailMessage, LogEmailDispatcher};
pub use directory::member::{MemberDirectory, SqliteMemberDirectory};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::alarm::{Alarm, AlarmKind, AlarmNo, AlarmNotice};
pub use model::member::{Member, MemberId};
pub use model::schedule::{Schedule, ScheduleDraft, ScheduleNo, ScheduleStatus};
pub use model::team::{InvalidTeamLevel, TeamLevel, TeamShare};
pub use repo::schedule_repo::{ScheduleListQuery, ScheduleScope};
pub use repo::{RepoError, RepoResult};
pub use service::calendar_facade::{CalendarFacade, HardDeleteReport, ShareOutcome};
pub use service::error::{CalendarError, CalendarResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
