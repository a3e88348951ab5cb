use calenkit_core::db::open_db_in_memory;
use calenkit_core::directory::member::SqliteMemberDirectory;
use calenkit_core::model::schedule::parse_schedule_date;
use calenkit_core::repo::schedule_repo::{
    ScheduleListQuery, ScheduleScope, SqliteScheduleRepository,
};
use calenkit_core::repo::team_repo::{SqliteTeamRepository, TeamRepository};
use calenkit_core::service::schedule_store::ScheduleStore;
use calenkit_core::{
    CalendarError, Member, ScheduleDraft, ScheduleStatus, TeamLevel, TeamShare,
};
use rusqlite::Connection;

const OWNER: &str = "owner@calenkit.dev";
const VIEWER: &str = "viewer@calenkit.dev";

fn store(conn: &Connection) -> ScheduleStore<SqliteScheduleRepository<'_>> {
    let directory = SqliteMemberDirectory::try_new(conn).unwrap();
    directory.register(&Member::new(OWNER, "Owner")).unwrap();
    directory.register(&Member::new(VIEWER, "Viewer")).unwrap();
    ScheduleStore::new(SqliteScheduleRepository::try_new(conn).unwrap())
}

fn share_with_viewer(conn: &Connection, sc_no: i64) {
    SqliteTeamRepository::try_new(conn)
        .unwrap()
        .insert_share(&TeamShare {
            sc_no,
            member_id: VIEWER.to_string(),
            level: TeamLevel::Read,
        })
        .unwrap();
}

#[test]
fn create_builds_untitled_active_schedule_for_the_day() {
    let conn = open_db_in_memory().unwrap();
    let store = store(&conn);

    let sc_no = store.create(OWNER, "2023-03-01").unwrap();
    let schedule = store.get(sc_no).unwrap();

    let midnight = parse_schedule_date("2023-03-01").unwrap();
    assert_eq!(schedule.owner_id, OWNER);
    assert_eq!(schedule.title, "");
    assert_eq!(schedule.start_at, midnight);
    assert_eq!(schedule.end_at, midnight);
    assert_eq!(schedule.status, ScheduleStatus::Active);
    assert!(!schedule.bookmarked);
}

#[test]
fn schedule_numbers_are_never_reused() {
    let conn = open_db_in_memory().unwrap();
    let store = store(&conn);

    let first = store.create(OWNER, "2023-03-01").unwrap();
    store.hard_delete(first).unwrap();
    let second = store.create(OWNER, "2023-03-01").unwrap();

    assert!(second > first);
}

#[test]
fn recycled_schedules_leave_listings_but_stay_readable() {
    let conn = open_db_in_memory().unwrap();
    let store = store(&conn);
    let sc_no = store.create(OWNER, "2023-03-01").unwrap();

    store.set_status(sc_no, ScheduleStatus::Recycled).unwrap();

    let listed = store
        .list_active(OWNER, &ScheduleListQuery::default())
        .unwrap();
    assert!(listed.is_empty());
    assert!(store.get(sc_no).unwrap().is_recycled());

    let bin = store.list_recycled(OWNER).unwrap();
    assert_eq!(bin.len(), 1);
    assert_eq!(bin[0].sc_no, sc_no);
}

#[test]
fn list_active_honors_scope_and_start_order() {
    let conn = open_db_in_memory().unwrap();
    let store = store(&conn);

    let later = store.create(OWNER, "2023-03-05").unwrap();
    let earlier = store.create(OWNER, "2023-03-01").unwrap();
    let viewers_own = store.create(VIEWER, "2023-03-03").unwrap();
    share_with_viewer(&conn, later);

    let owned = store
        .list_active(OWNER, &ScheduleListQuery::default())
        .unwrap();
    let owned_ids: Vec<i64> = owned.iter().map(|s| s.sc_no).collect();
    assert_eq!(owned_ids, vec![earlier, later]);

    let viewer_all = store
        .list_active(VIEWER, &ScheduleListQuery::default())
        .unwrap();
    let viewer_ids: Vec<i64> = viewer_all.iter().map(|s| s.sc_no).collect();
    assert_eq!(viewer_ids, vec![viewers_own, later]);

    let shared_only = store
        .list_active(
            VIEWER,
            &ScheduleListQuery {
                scope: ScheduleScope::Shared,
                ..ScheduleListQuery::default()
            },
        )
        .unwrap();
    assert_eq!(shared_only.len(), 1);
    assert_eq!(shared_only[0].sc_no, later);

    let paged = store
        .list_active(
            OWNER,
            &ScheduleListQuery {
                scope: ScheduleScope::Owned,
                limit: Some(1),
                offset: 1,
                ..ScheduleListQuery::default()
            },
        )
        .unwrap();
    assert_eq!(paged.len(), 1);
    assert_eq!(paged[0].sc_no, later);
}

#[test]
fn toggle_bookmark_flips_flag_and_filters_listing() {
    let conn = open_db_in_memory().unwrap();
    let store = store(&conn);
    let marked = store.create(OWNER, "2023-03-01").unwrap();
    store.create(OWNER, "2023-03-02").unwrap();

    assert!(store.toggle_bookmark(marked, OWNER).unwrap());

    let bookmarked = store
        .list_active(
            OWNER,
            &ScheduleListQuery {
                bookmarked_only: true,
                ..ScheduleListQuery::default()
            },
        )
        .unwrap();
    assert_eq!(bookmarked.len(), 1);
    assert_eq!(bookmarked[0].sc_no, marked);

    assert!(!store.toggle_bookmark(marked, OWNER).unwrap());
    assert!(matches!(
        store.toggle_bookmark(marked, VIEWER),
        Err(CalendarError::ScheduleNotFound(_))
    ));
}

#[test]
fn update_details_validates_range_and_reads_back() {
    let conn = open_db_in_memory().unwrap();
    let store = store(&conn);
    let sc_no = store.create(OWNER, "2023-03-01").unwrap();

    let mut draft = ScheduleDraft {
        title: "Quarterly review".to_string(),
        content: "Room 4".to_string(),
        start_at: 1_000,
        end_at: 500,
    };
    assert!(matches!(
        store.update_details(sc_no, &draft),
        Err(CalendarError::Validation(_))
    ));

    draft.end_at = 2_000;
    let updated = store.update_details(sc_no, &draft).unwrap();
    assert_eq!(updated.title, "Quarterly review");
    assert_eq!(updated.content, "Room 4");
    assert_eq!((updated.start_at, updated.end_at), (1_000, 2_000));

    assert!(matches!(
        store.update_details(999, &draft),
        Err(CalendarError::ScheduleNotFound(999))
    ));
}

#[test]
fn hard_delete_of_missing_schedule_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let store = store(&conn);
    assert!(matches!(
        store.hard_delete(7),
        Err(CalendarError::ScheduleNotFound(7))
    ));
}
