//! End-to-end validation scenarios and properties.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeSet;

use u_timetable::models::{
    ConflictType, Constraint, ConstraintRule, ConstraintType, Course, DayOfWeek, Lecturer,
    Priority, ScheduleSnapshot, ScheduledSession, Severity, StudentBreakRule, StudentGroup,
    TimeWindow, Venue, WeeklyAvailability,
};
use u_timetable::validation::EntityCounts;
use u_timetable::{ConflictDetector, ConstraintEngine, EngineConfig, ValidationAggregator};

fn at(day_offset: u32, h: u32, m: u32) -> NaiveDateTime {
    // 2024-09-02 is a Monday.
    NaiveDate::from_ymd_opt(2024, 9, 2 + day_offset)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

fn session(id: &str, day: DayOfWeek, start: (u32, u32), end: (u32, u32)) -> ScheduledSession {
    let offset = DayOfWeek::ALL.iter().position(|d| *d == day).unwrap() as u32;
    let start = at(offset, start.0, start.1);
    let end = at(offset, end.0, end.1);
    ScheduledSession::new(id, day, start, end)
}

fn monday(id: &str, start: (u32, u32), end: (u32, u32)) -> ScheduledSession {
    session(id, DayOfWeek::Monday, start, end)
}

fn validate(
    sessions: &[ScheduledSession],
    snapshot: &ScheduleSnapshot,
) -> u_timetable::ValidationResult {
    ValidationAggregator::new()
        .validate(sessions, snapshot, EntityCounts::default())
}

/// A mixed week used by the property tests.
fn busy_week() -> (Vec<ScheduledSession>, ScheduleSnapshot) {
    let sessions = vec![
        monday("s0", (9, 0), (10, 0))
            .with_venue("V1")
            .with_lecturer("L1")
            .with_group("G1")
            .with_course("C1"),
        monday("s1", (9, 30), (11, 0))
            .with_venue("V1")
            .with_lecturer("L2")
            .with_group("G2")
            .with_course("C2"),
        monday("s2", (10, 0), (11, 0))
            .with_venue("V2")
            .with_lecturer("L1")
            .with_group("G1")
            .with_course("C1"),
        monday("s3", (10, 30), (12, 0))
            .with_venue("V2")
            .with_lecturer("L2")
            .with_group("G1")
            .with_course("C2"),
        monday("s4", (17, 30), (19, 0))
            .with_venue("V1")
            .with_lecturer("L1")
            .with_group("G2")
            .with_course("C1"),
        session("s5", DayOfWeek::Tuesday, (9, 0), (10, 0))
            .with_venue("V1")
            .with_lecturer("L1")
            .with_group("G1"),
        session("s6", DayOfWeek::Tuesday, (9, 0), (10, 0))
            .with_venue("V2")
            .with_lecturer("L2")
            .with_group("G1"),
        session("s7", DayOfWeek::Tuesday, (10, 5), (11, 0))
            .with_venue("V1")
            .with_lecturer("L1")
            .with_group("G1"),
    ];
    let c1 = Course::new("C1")
        .requiring("PROJECTOR")
        .with_department("ENG");
    let c2 = Course::new("C2")
        .requiring("COMPUTER")
        .with_department("ENG");
    let snapshot = ScheduleSnapshot::new()
        .with_venue(Venue::new("V1", 30).with_equipment("PROJECTOR"))
        .with_venue(Venue::new("V2", 10))
        .with_lecturer(Lecturer::new("L1"))
        .with_lecturer(Lecturer::new("L2"))
        .with_course(c1)
        .with_course(c2)
        .with_student_group(StudentGroup::new("G1", 25))
        .with_student_group(StudentGroup::new("G2", 12));
    (sessions, snapshot)
}

fn catalogue() -> Vec<Constraint> {
    vec![
        Constraint::of_kind("cap", ConstraintType::VenueCapacity),
        Constraint::of_kind("eq", ConstraintType::EquipmentRequirement),
        Constraint::of_kind("brk", ConstraintType::StudentBreak),
        Constraint::of_kind("dept", ConstraintType::DepartmentPolicy),
        Constraint::of_kind("tw", ConstraintType::TimeWindow),
        Constraint::of_kind("run", ConstraintType::ConsecutiveSessions),
    ]
}

fn with_catalogue(snapshot: ScheduleSnapshot, constraints: &[Constraint]) -> ScheduleSnapshot {
    constraints
        .iter()
        .cloned()
        .fold(snapshot, |snap, c| snap.with_constraint(c))
}

#[test]
fn test_scenario_a_venue_double_booking() {
    let sessions = vec![
        monday("session1", (9, 0), (10, 0)).with_venue("V1"),
        monday("session2", (9, 30), (10, 30)).with_venue("V1"),
    ];
    let snapshot = ScheduleSnapshot::new().with_venue(Venue::new("V1", 50));

    let r = validate(&sessions, &snapshot);
    assert!(!r.is_valid);
    assert_eq!(r.conflicts.len(), 1);
    assert_eq!(
        r.conflicts[0].conflict_type,
        ConflictType::VenueDoubleBooking
    );
    assert_eq!(r.conflicts[0].session_indices, vec![0, 1]);
    assert_eq!(r.conflicts[0].session_ids, vec!["session1", "session2"]);
}

#[test]
fn test_scenario_b_touching_sessions_do_not_conflict() {
    let sessions = vec![
        monday("session1", (9, 0), (10, 0)).with_venue("V1"),
        monday("session2", (10, 0), (11, 0)).with_venue("V1"),
    ];
    assert!(ConflictDetector::new()
        .detect_conflicts(&sessions)
        .is_empty());
}

#[test]
fn test_scenario_c_capacity() {
    let sessions = vec![monday("s", (9, 0), (10, 0))
        .with_venue("V1")
        .with_group("G1")
        .with_group("G2")];
    let snapshot = ScheduleSnapshot::new()
        .with_venue(Venue::new("V1", 30))
        .with_student_group(StudentGroup::new("G1", 20))
        .with_student_group(StudentGroup::new("G2", 15))
        .with_constraint(Constraint::of_kind("cap", ConstraintType::VenueCapacity));

    let r = validate(&sessions, &snapshot);
    assert_eq!(r.violations.len(), 1);
    let v = &r.violations[0];
    assert_eq!(v.constraint_type, ConstraintType::VenueCapacity);
    assert_eq!(v.severity, Severity::Hard);
    assert!((v.violation_score - 5.0 / 30.0).abs() < 1e-10);
    assert!(!r.is_valid);
}

#[test]
fn test_scenario_d_equipment_medium_priority() {
    let sessions = vec![monday("s", (9, 0), (10, 0))
        .with_venue("V1")
        .with_course("C1")];
    let course = Course::new("C1")
        .requiring("PROJECTOR")
        .requiring("COMPUTER");
    let equipment = Constraint::of_kind("eq", ConstraintType::EquipmentRequirement)
        .with_priority(Priority::Medium);
    let snapshot = ScheduleSnapshot::new()
        .with_venue(Venue::new("V1", 30).with_equipment("PROJECTOR"))
        .with_course(course)
        .with_constraint(equipment);

    let r = validate(&sessions, &snapshot);
    assert_eq!(r.soft_violations.len(), 1);
    assert!((r.soft_violations[0].violation_score - 0.5).abs() < 1e-10);
    assert!(r.is_valid);
}

#[test]
fn test_scenario_e_short_break() {
    let sessions = vec![
        monday("first", (9, 0), (10, 0)).with_group("G1"),
        monday("second", (10, 10), (11, 0)).with_group("G1"),
    ];
    let snapshot = ScheduleSnapshot::new()
        .with_student_group(StudentGroup::new("G1", 20))
        .with_constraint(Constraint::new(
            "brk",
            ConstraintRule::StudentBreak(StudentBreakRule {
                min_break_minutes: 15,
            }),
        ));

    let r = validate(&sessions, &snapshot);
    assert_eq!(r.violations.len(), 1);
    assert!((r.violations[0].violation_score - (1.0 - 10.0 / 15.0)).abs() < 1e-10);
}

#[test]
fn test_scenario_f_inactive_constraints_are_silent() {
    let (sessions, snapshot) = busy_week();
    let inactive: Vec<Constraint> = ConstraintType::ALL
        .into_iter()
        .map(|kind| Constraint::of_kind(kind.as_str(), kind).inactive())
        .collect();
    let snapshot = with_catalogue(snapshot, &inactive);

    let r = validate(&sessions, &snapshot);
    assert!(r.violations.is_empty());
    assert!((r.total_score - 1.0).abs() < 1e-10);
}

#[test]
fn test_overnight_session_outside_venue_window() {
    let all_monday = WeeklyAvailability::new()
        .with_window(DayOfWeek::Monday, TimeWindow::hm(0, 0, 23, 0));
    let snapshot = ScheduleSnapshot::new()
        .with_venue(Venue::new("V1", 30).with_availability(all_monday))
        .with_constraint(Constraint::of_kind("avail", ConstraintType::HardAvailability));
    // 22:00 Monday to 01:00 Tuesday.
    let late = ScheduledSession::new("late", DayOfWeek::Monday, at(0, 22, 0), at(1, 1, 0))
        .with_venue("V1");
    let sessions = vec![late];

    let v = ConstraintEngine::new().validate(&sessions, &snapshot);
    assert_eq!(v.len(), 1);
    assert_eq!(v[0].severity, Severity::Hard);
    assert_eq!(v[0].affected_entities, vec!["V1"]);
    assert!(!validate(&sessions, &snapshot).is_valid);
}

#[test]
fn test_overlap_symmetry() {
    let (sessions, _) = busy_week();
    for a in &sessions {
        for b in &sessions {
            assert_eq!(a.overlaps(b), b.overlaps(a), "{} vs {}", a.id, b.id);
        }
    }
}

#[test]
fn test_boundary_never_conflicts() {
    let sessions = vec![
        monday("a", (8, 0), (9, 0))
            .with_venue("V1")
            .with_lecturer("L1")
            .with_group("G1"),
        monday("b", (9, 0), (10, 0))
            .with_venue("V1")
            .with_lecturer("L1")
            .with_group("G1"),
        monday("c", (10, 0), (11, 0))
            .with_venue("V1")
            .with_lecturer("L1")
            .with_group("G1"),
    ];
    assert!(ConflictDetector::new()
        .detect_conflicts(&sessions)
        .is_empty());
}

#[test]
fn test_determinism() {
    let (sessions, snapshot) = busy_week();
    let snapshot = with_catalogue(snapshot, &catalogue());

    let first = validate(&sessions, &snapshot);
    let second = validate(&sessions, &snapshot);
    assert_eq!(first, second);

    let parallel = ValidationAggregator::with_config(EngineConfig::new().with_parallel(true))
        .validate(&sessions, &snapshot, EntityCounts::default());
    assert_eq!(first, parallel);
}

#[test]
fn test_monotonicity() {
    let (sessions, snapshot) = busy_week();
    let engine = ConstraintEngine::new();
    let all = catalogue();

    let mut previous = 0;
    for n in 0..=all.len() {
        let count = engine
            .validate_constraints(&sessions, &snapshot, &all[..n])
            .len();
        assert!(count >= previous, "adding constraint {n} lowered the count");
        previous = count;
    }

    for i in 0..all.len() {
        let mut reduced = all.clone();
        reduced[i].is_active = false;
        let count = engine
            .validate_constraints(&sessions, &snapshot, &reduced)
            .len();
        assert!(count <= previous);
    }
}

#[test]
fn test_conflicts_stable_under_reordering() {
    let (sessions, _) = busy_week();
    let detector = ConflictDetector::new();

    let as_id_pairs = |list: &[ScheduledSession]| -> BTreeSet<(ConflictType, String, String)> {
        let conflicts = detector.detect_conflicts(list);
        let set: BTreeSet<_> = conflicts
            .iter()
            .map(|c| {
                let mut ids = c.session_ids.clone();
                ids.sort();
                (c.conflict_type, ids[0].clone(), ids[1].clone())
            })
            .collect();
        assert_eq!(set.len(), conflicts.len(), "pair reported twice");
        set
    };

    let forward = as_id_pairs(&sessions);
    let mut reversed = sessions.clone();
    reversed.reverse();
    assert_eq!(forward, as_id_pairs(&reversed));

    let mut rotated = sessions.clone();
    rotated.rotate_left(3);
    assert_eq!(forward, as_id_pairs(&rotated));
    assert!(!forward.is_empty());
}

#[test]
fn test_bucketed_matches_naive() {
    let mut sessions = Vec::new();
    for i in 0..60u32 {
        let day = DayOfWeek::ALL[(i % 5) as usize];
        let hour = 8 + (i % 7);
        sessions.push(
            session(&format!("s{}", i), day, (hour, 0), (hour + 1, 30))
                .with_venue(format!("V{}", i % 4))
                .with_lecturer(format!("L{}", i % 6))
                .with_group(format!("G{}", i % 3))
                .with_group(format!("G{}", (i + 1) % 5)),
        );
    }

    let naive = ConflictDetector::new().detect_conflicts(&sessions);
    let bucketed = ConflictDetector::with_config(EngineConfig::new().with_bucket_threshold(0))
        .detect_conflicts(&sessions);
    assert!(!naive.is_empty());
    assert_eq!(naive, bucketed);
}
