use calenkit_core::db::open_db_in_memory;
use calenkit_core::repo::team_repo::{SqliteTeamRepository, TeamRepository};
use calenkit_core::service::team_manager::TeamManager;
use calenkit_core::{
    AlarmKind, CalendarError, CalendarFacade, CoreConfig, LogEmailDispatcher, Member, RepoError,
    RepoResult, ScheduleDraft, ScheduleNo, SqliteMemberDirectory, TeamLevel, TeamShare,
};
use rusqlite::Connection;

const HOST: &str = "host@calenkit.dev";
const GUEST: &str = "guest@calenkit.dev";
const OTHER: &str = "other@calenkit.dev";

fn facade(conn: &Connection) -> CalendarFacade<'_, LogEmailDispatcher> {
    let facade = CalendarFacade::try_new(conn, LogEmailDispatcher, &CoreConfig::default()).unwrap();
    for (id, name) in [(HOST, "Host"), (GUEST, "Guest"), (OTHER, "Other")] {
        facade.register_member(&Member::new(id, name)).unwrap();
    }
    facade
}

fn hosted_schedule(facade: &CalendarFacade<'_, LogEmailDispatcher>) -> ScheduleNo {
    facade.create_schedule(HOST, "2024-05-01").unwrap().sc_no
}

/// Team repository whose existence check still reports a schedule that was
/// purged after the check ran.
struct StaleExistence<'conn>(SqliteTeamRepository<'conn>);

impl TeamRepository for StaleExistence<'_> {
    fn schedule_exists(&self, _sc_no: ScheduleNo) -> RepoResult<bool> {
        Ok(true)
    }

    fn list_shares(&self, sc_no: ScheduleNo) -> RepoResult<Vec<TeamShare>> {
        self.0.list_shares(sc_no)
    }

    fn get_share(&self, sc_no: ScheduleNo, member_id: &str) -> RepoResult<Option<TeamShare>> {
        self.0.get_share(sc_no, member_id)
    }

    fn insert_share(&self, share: &TeamShare) -> RepoResult<()> {
        self.0.insert_share(share)
    }

    fn update_level(
        &self,
        sc_no: ScheduleNo,
        member_id: &str,
        level: TeamLevel,
    ) -> RepoResult<()> {
        self.0.update_level(sc_no, member_id, level)
    }

    fn delete_share(&self, sc_no: ScheduleNo, member_id: &str) -> RepoResult<()> {
        self.0.delete_share(sc_no, member_id)
    }

    fn delete_all_shares(&self, sc_no: ScheduleNo) -> RepoResult<usize> {
        self.0.delete_all_shares(sc_no)
    }
}

fn alarm_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM alarms;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn share_defaults_to_read_and_emits_share_added() {
    let conn = open_db_in_memory().unwrap();
    let facade = facade(&conn);
    let sc_no = hosted_schedule(&facade);

    let outcome = facade.share(HOST, sc_no, GUEST, None).unwrap();

    assert_eq!(outcome.share.level, TeamLevel::Read);
    let alarm = outcome.alarm.unwrap();
    assert_eq!(alarm.kind, AlarmKind::ShareAdded);
    assert_eq!(alarm.recipient_id, GUEST);
    assert!(alarm.is_visible);

    let team = facade.list_team(HOST, sc_no).unwrap();
    assert_eq!(team.len(), 1);
    assert_eq!(team[0].member_id, GUEST);
}

#[test]
fn duplicate_share_fails_and_leaves_state_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let facade = facade(&conn);
    let sc_no = hosted_schedule(&facade);
    facade.share(HOST, sc_no, GUEST, Some(0)).unwrap();
    let alarms_before = alarm_count(&conn);

    let err = facade.share(HOST, sc_no, GUEST, Some(1)).unwrap_err();

    assert!(matches!(err, CalendarError::ExistsTeam { .. }));
    let team = facade.list_team(HOST, sc_no).unwrap();
    assert_eq!(team.len(), 1);
    assert_eq!(team[0].level, TeamLevel::Read);
    assert_eq!(alarm_count(&conn), alarms_before);
}

#[test]
fn self_share_is_rejected_before_any_mutation() {
    let conn = open_db_in_memory().unwrap();
    let facade = facade(&conn);
    let sc_no = hosted_schedule(&facade);

    let err = facade.share(HOST, sc_no, HOST, None).unwrap_err();

    assert!(matches!(err, CalendarError::SelfShare(_)));
    assert!(facade.list_team(HOST, sc_no).unwrap().is_empty());
    assert_eq!(alarm_count(&conn), 0);
}

#[test]
fn only_the_owner_may_share_or_change_levels() {
    let conn = open_db_in_memory().unwrap();
    let facade = facade(&conn);
    let sc_no = hosted_schedule(&facade);
    facade.share(HOST, sc_no, GUEST, Some(1)).unwrap();

    assert!(matches!(
        facade.share(GUEST, sc_no, OTHER, None),
        Err(CalendarError::NotOwner { .. })
    ));
    assert!(matches!(
        facade.change_level(GUEST, sc_no, GUEST, 0),
        Err(CalendarError::NotOwner { .. })
    ));
    assert!(matches!(
        facade.recycle(GUEST, sc_no),
        Err(CalendarError::NotOwner { .. })
    ));
}

#[test]
fn share_with_unknown_member_is_member_not_found() {
    let conn = open_db_in_memory().unwrap();
    let facade = facade(&conn);
    let sc_no = hosted_schedule(&facade);

    assert!(matches!(
        facade.share(HOST, sc_no, "ghost@calenkit.dev", None),
        Err(CalendarError::MemberNotFound(_))
    ));
    assert_eq!(alarm_count(&conn), 0);
}

#[test]
fn out_of_range_level_fails_without_alarm() {
    let conn = open_db_in_memory().unwrap();
    let facade = facade(&conn);
    let sc_no = hosted_schedule(&facade);
    facade.share(HOST, sc_no, GUEST, None).unwrap();
    let alarms_before = alarm_count(&conn);

    for level in [2, -1, 7] {
        assert!(matches!(
            facade.change_level(HOST, sc_no, GUEST, level),
            Err(CalendarError::InvalidLevel(_))
        ));
    }
    assert!(matches!(
        facade.share(HOST, sc_no, OTHER, Some(3)),
        Err(CalendarError::InvalidLevel(_))
    ));

    assert_eq!(alarm_count(&conn), alarms_before);
    let team = facade.list_team(HOST, sc_no).unwrap();
    assert_eq!(team.len(), 1);
    assert_eq!(team[0].level, TeamLevel::Read);
}

#[test]
fn change_level_without_share_is_team_not_found() {
    let conn = open_db_in_memory().unwrap();
    let facade = facade(&conn);
    let sc_no = hosted_schedule(&facade);

    assert!(matches!(
        facade.change_level(HOST, sc_no, GUEST, 1),
        Err(CalendarError::TeamNotFound { .. })
    ));
    assert!(matches!(
        facade.unshare(HOST, sc_no, GUEST),
        Err(CalendarError::TeamNotFound { .. })
    ));
    assert_eq!(alarm_count(&conn), 0);
}

#[test]
fn member_may_leave_but_not_remove_others() {
    let conn = open_db_in_memory().unwrap();
    let facade = facade(&conn);
    let sc_no = hosted_schedule(&facade);
    facade.share(HOST, sc_no, GUEST, None).unwrap();
    facade.share(HOST, sc_no, OTHER, None).unwrap();

    assert!(matches!(
        facade.unshare(GUEST, sc_no, OTHER),
        Err(CalendarError::NotOwner { .. })
    ));

    let notice = facade.unshare(GUEST, sc_no, GUEST).unwrap().unwrap();
    assert_eq!(notice.kind, AlarmKind::Unshared);

    let team = facade.list_team(HOST, sc_no).unwrap();
    assert_eq!(team.len(), 1);
    assert_eq!(team[0].member_id, OTHER);
}

#[test]
fn team_changes_require_an_active_schedule() {
    let conn = open_db_in_memory().unwrap();
    let facade = facade(&conn);
    let sc_no = hosted_schedule(&facade);
    facade.share(HOST, sc_no, GUEST, None).unwrap();
    facade.recycle(HOST, sc_no).unwrap();

    assert!(matches!(
        facade.share(HOST, sc_no, OTHER, None),
        Err(CalendarError::InvalidState { .. })
    ));
    assert!(matches!(
        facade.change_level(HOST, sc_no, GUEST, 1),
        Err(CalendarError::InvalidState { .. })
    ));
}

#[test]
fn read_members_cannot_edit_and_write_members_can() {
    let conn = open_db_in_memory().unwrap();
    let facade = facade(&conn);
    let sc_no = hosted_schedule(&facade);
    facade.share(HOST, sc_no, GUEST, Some(0)).unwrap();
    let draft = ScheduleDraft {
        title: "Team lunch".to_string(),
        content: String::new(),
        start_at: 10,
        end_at: 20,
    };

    assert!(matches!(
        facade.update_schedule(GUEST, sc_no, &draft),
        Err(CalendarError::WriteDenied { .. })
    ));
    assert!(matches!(
        facade.update_schedule(OTHER, sc_no, &draft),
        Err(CalendarError::WriteDenied { .. })
    ));

    facade.change_level(HOST, sc_no, GUEST, 1).unwrap();
    let updated = facade.update_schedule(GUEST, sc_no, &draft).unwrap();
    assert_eq!(updated.title, "Team lunch");

    let owner_view = facade.update_schedule(HOST, sc_no, &draft).unwrap();
    assert_eq!(owner_view.title, "Team lunch");
}

#[test]
fn outsiders_cannot_view_schedule_or_team() {
    let conn = open_db_in_memory().unwrap();
    let facade = facade(&conn);
    let sc_no = hosted_schedule(&facade);
    facade.share(HOST, sc_no, GUEST, None).unwrap();

    assert_eq!(facade.get_schedule(GUEST, sc_no).unwrap().sc_no, sc_no);
    assert!(matches!(
        facade.get_schedule(OTHER, sc_no),
        Err(CalendarError::AccessDenied { .. })
    ));
    assert!(matches!(
        facade.list_team(OTHER, sc_no),
        Err(CalendarError::AccessDenied { .. })
    ));
}

#[test]
fn search_member_validates_and_skips_self() {
    let conn = open_db_in_memory().unwrap();
    let facade = facade(&conn);

    let found = facade.search_member(HOST, " guest@calenkit.dev ").unwrap();
    assert_eq!(found.unwrap().name, "Guest");
    assert!(facade.search_member(HOST, HOST).unwrap().is_none());
    assert!(facade
        .search_member(HOST, "nobody@calenkit.dev")
        .unwrap()
        .is_none());
    assert!(matches!(
        facade.search_member(HOST, "not-an-email"),
        Err(CalendarError::InvalidMemberId(_))
    ));
}

#[test]
fn share_writes_after_purge_report_schedule_not_found() {
    let conn = open_db_in_memory().unwrap();
    let facade = facade(&conn);
    let sc_no = hosted_schedule(&facade);
    facade.share(HOST, sc_no, GUEST, None).unwrap();
    facade.hard_delete(HOST, sc_no).unwrap();

    let repo = SqliteTeamRepository::try_new(&conn).unwrap();
    let share = TeamShare {
        sc_no,
        member_id: OTHER.to_string(),
        level: TeamLevel::Read,
    };
    assert!(matches!(
        repo.insert_share(&share),
        Err(RepoError::ScheduleNotFound(no)) if no == sc_no
    ));
    assert!(matches!(
        repo.update_level(sc_no, GUEST, TeamLevel::Write),
        Err(RepoError::ScheduleNotFound(no)) if no == sc_no
    ));
    assert!(matches!(
        repo.delete_share(sc_no, GUEST),
        Err(RepoError::ScheduleNotFound(no)) if no == sc_no
    ));
}

#[test]
fn manager_loses_race_against_hard_delete_with_schedule_not_found() {
    let conn = open_db_in_memory().unwrap();
    let facade = facade(&conn);
    let sc_no = hosted_schedule(&facade);
    facade.share(HOST, sc_no, GUEST, None).unwrap();
    facade.hard_delete(HOST, sc_no).unwrap();

    let teams = TeamManager::new(
        StaleExistence(SqliteTeamRepository::try_new(&conn).unwrap()),
        SqliteMemberDirectory::try_new(&conn).unwrap(),
    );
    let results = vec![
        teams.add(sc_no, OTHER, TeamLevel::Read).map(|_| ()),
        teams.set_level(sc_no, GUEST, TeamLevel::Write).map(|_| ()),
        teams.remove(sc_no, GUEST),
    ];
    for result in results {
        assert!(
            matches!(result, Err(CalendarError::ScheduleNotFound(no)) if no == sc_no),
            "unexpected result: {result:?}"
        );
    }
    let teams_left: i64 = conn
        .query_row("SELECT COUNT(*) FROM teams;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(teams_left, 0);
}

#[test]
fn member_ids_are_trimmed_before_team_checks() {
    let conn = open_db_in_memory().unwrap();
    let facade = facade(&conn);
    let sc_no = hosted_schedule(&facade);

    assert!(matches!(
        facade.share(HOST, sc_no, " host@calenkit.dev ", None),
        Err(CalendarError::SelfShare(_))
    ));

    let outcome = facade
        .share(HOST, sc_no, "  guest@calenkit.dev", Some(0))
        .unwrap();
    assert_eq!(outcome.share.member_id, GUEST);
    assert_eq!(outcome.alarm.unwrap().recipient_id, GUEST);

    let changed = facade
        .change_level(HOST, sc_no, "guest@calenkit.dev ", 1)
        .unwrap();
    assert_eq!(changed.share.level, TeamLevel::Write);

    facade.unshare(GUEST, sc_no, " guest@calenkit.dev ").unwrap();
    assert!(facade.list_team(HOST, sc_no).unwrap().is_empty());
}
