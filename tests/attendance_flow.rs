use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use geoattend::config::Config;
use geoattend::error::AttendanceError;
use geoattend::model::attendance::{AttendanceStatus, GeoPoint};
use geoattend::model::user::User;
use geoattend::service::attendance::AttendanceService;
use geoattend::service::manager::ManagerService;
use geoattend::service::stats::StatsService;
use geoattend::store::memory::MemoryStore;
use geoattend::store::{AttendanceStore, UserStore};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn office_point() -> GeoPoint {
    let config = Config::default();
    GeoPoint {
        lat: config.office_lat,
        lng: config.office_lng,
    }
}

fn at(day: u32, h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, day, h, m, 0).unwrap()
}

fn service(store: &MemoryStore) -> AttendanceService<&MemoryStore, &MemoryStore> {
    AttendanceService::new(store, store, &Config::default())
}

#[test]
fn on_time_then_duplicate_then_late_next_day() {
    init_tracing();
    let store = MemoryStore::new();
    store.save_user(User::new(1, "Asha", "Development")).unwrap();
    let svc = service(&store);

    // 08:55 with a 09:00 cutoff: on time, streak starts.
    let record = svc.check_in(1, at(3, 8, 55), Some(office_point()), None).unwrap();
    assert_eq!(record.status, AttendanceStatus::Present);
    let user = store.find_user(1).unwrap().unwrap();
    assert_eq!(user.on_time_streak, 1);
    assert_eq!(user.total_present_days, 1);

    // Second check-in the same day is rejected.
    let err = svc
        .check_in(1, at(3, 10, 0), Some(office_point()), None)
        .unwrap_err();
    assert!(matches!(err, AttendanceError::DuplicateAction(_)));

    // Next day at 09:10: late, streak resets, late day counted.
    let record = svc.check_in(1, at(4, 9, 10), Some(office_point()), None).unwrap();
    assert_eq!(record.status, AttendanceStatus::Late);
    let user = store.find_user(1).unwrap().unwrap();
    assert_eq!(user.on_time_streak, 0);
    assert_eq!(user.best_on_time_streak, 1);
    assert_eq!(user.total_late_days, 1);
    assert_eq!(user.total_present_days, 2);
}

#[test]
fn full_day_with_breaks_and_checkout() {
    let store = MemoryStore::new();
    store.save_user(User::new(1, "Asha", "Development")).unwrap();
    let svc = service(&store);

    svc.check_in(1, at(3, 8, 30), Some(office_point()), None).unwrap();

    assert!(matches!(
        svc.end_break(1, at(3, 9, 0)).unwrap_err(),
        AttendanceError::NoActiveBreak
    ));

    svc.start_break(1, at(3, 12, 0)).unwrap();
    let record = svc.end_break(1, at(3, 12, 45)).unwrap();
    assert_eq!(record.breaks.len(), 1);
    assert_eq!(record.breaks[0].end_time, Some(at(3, 12, 45)));

    // 8.5 wall-clock hours; the 45-minute break is not deducted.
    let record = svc.check_out(1, at(3, 17, 0), Some(office_point()), None).unwrap();
    assert_eq!(record.total_hours, 8.5);

    assert!(matches!(
        svc.check_out(1, at(3, 18, 0), None, None).unwrap_err(),
        AttendanceError::DuplicateAction(_)
    ));
}

#[test]
fn actions_before_check_in_are_rejected() {
    let store = MemoryStore::new();
    let svc = service(&store);

    assert!(matches!(
        svc.start_break(1, at(3, 10, 0)).unwrap_err(),
        AttendanceError::PrecursorMissing(_)
    ));
    assert!(matches!(
        svc.end_break(1, at(3, 10, 0)).unwrap_err(),
        AttendanceError::PrecursorMissing(_)
    ));
    assert!(matches!(
        svc.check_out(1, at(3, 17, 0), None, None).unwrap_err(),
        AttendanceError::PrecursorMissing(_)
    ));
}

#[test]
fn exactly_one_of_two_racing_check_ins_succeeds() {
    init_tracing();
    let store = MemoryStore::new();
    store.save_user(User::new(1, "Asha", "Development")).unwrap();

    let outcomes: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let store = &store;
                scope.spawn(move || {
                    AttendanceService::new(store, store, &Config::default()).check_in(
                        1,
                        at(3, 8, 50),
                        Some(office_point()),
                        None,
                    )
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let wins = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1);
    assert!(outcomes
        .iter()
        .any(|r| matches!(r, Err(AttendanceError::DuplicateAction(_)))));
}

#[test]
fn range_summary_matches_seeded_statuses() {
    let store = MemoryStore::new();
    store.save_user(User::new(1, "Asha", "Development")).unwrap();
    let svc = service(&store);

    // Three on-time days and one late day through the lifecycle.
    for (day, check_in, check_out) in [
        (3, (8, 0), (17, 30)),
        (4, (8, 0), (17, 30)),
        (5, (8, 15), (17, 30)),
    ] {
        svc.check_in(1, at(day, check_in.0, check_in.1), Some(office_point()), None)
            .unwrap();
        svc.check_out(1, at(day, check_out.0, check_out.1), None, None).unwrap();
    }
    svc.check_in(1, at(6, 9, 30), Some(office_point()), None).unwrap();
    svc.check_out(1, at(6, 18, 45), None, None).unwrap();

    // One absent day, assigned externally rather than by any transition.
    let mut absent = svc.history(1).unwrap().remove(0);
    absent.date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
    absent.status = AttendanceStatus::Absent;
    absent.check_in_time = None;
    absent.check_out_time = None;
    absent.total_hours = 0.0;
    store.create(absent).unwrap();

    let summary = StatsService::new(&store, &store).summary(1, None).unwrap();
    assert_eq!(summary.present, 3);
    assert_eq!(summary.late, 1);
    assert_eq!(summary.absent, 1);
    // 9.5h + 9.5h + 9.25h + 9.25h of wall-clock time.
    assert_eq!(summary.total_hours, 37.5);

    let streaks = summary.streaks.unwrap();
    assert_eq!(streaks.on_time_streak, 0);
    assert_eq!(streaks.best_on_time_streak, 3);
    assert_eq!(streaks.total_late_days, 1);
}

#[test]
fn manager_rollup_over_a_small_team() {
    let store = MemoryStore::new();
    store.save_user(User::new(1, "Asha", "Development")).unwrap();
    store.save_user(User::new(2, "Ravi", "QA")).unwrap();
    let svc = service(&store);

    svc.check_in(1, at(3, 8, 0), Some(office_point()), None).unwrap();
    svc.check_out(1, at(3, 16, 0), None, None).unwrap();
    svc.check_in(2, at(3, 9, 30), Some(office_point()), None).unwrap();

    let manager = ManagerService::new(&store, &store);

    let overview = manager
        .today_overview(NaiveDate::from_ymd_opt(2025, 3, 3).unwrap())
        .unwrap();
    assert_eq!(overview.stats.present, 2);
    assert_eq!(overview.stats.late, 1);
    assert_eq!(overview.stats.absent, 0);
    assert_eq!(overview.stats.total, 2);

    let summary = manager.team_summary(None).unwrap();
    assert_eq!(summary.len(), 2);
    assert_eq!(summary[0].name, "Asha");
    assert_eq!(summary[0].present, 1);
    assert_eq!(summary[0].total_hours, 8.0);
    assert_eq!(summary[1].name, "Ravi");
    assert_eq!(summary[1].late, 1);
}

#[test]
fn streak_survives_only_through_the_lifecycle() {
    let store = MemoryStore::new();
    store.save_user(User::new(1, "Asha", "Development")).unwrap();
    let svc = service(&store);

    svc.check_in(1, at(3, 8, 0), Some(office_point()), None).unwrap();

    // Editing the stored record directly does not touch the streak; only
    // check-in transitions maintain it.
    let mut record = store
        .find_by_user_and_date(1, NaiveDate::from_ymd_opt(2025, 3, 3).unwrap())
        .unwrap()
        .unwrap();
    record.status = AttendanceStatus::Late;
    store.save(record).unwrap();

    let user = store.find_user(1).unwrap().unwrap();
    assert_eq!(user.on_time_streak, 1);
    assert_eq!(user.total_late_days, 0);
}
