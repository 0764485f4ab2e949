//! Timing rules: student breaks, department end-hour policy, and the
//! institution-wide teaching window.

use std::collections::BTreeSet;

use chrono::Timelike;

use super::{label, skip_missing, time_range, RuleContext};
use crate::models::{
    format_time_of_day, Constraint, ConstraintViolation, DepartmentPolicyRule, Severity,
    StudentBreakRule, TimeWindowRule,
};

/// Fixed score for a session ending past the department's end hour.
pub const DEPARTMENT_POLICY_SCORE: f64 = 0.8;
/// Fixed score for a session outside the teaching window.
pub const TIME_WINDOW_SCORE: f64 = 0.9;

/// For each in-scope group, adjacent same-day sessions must be separated
/// by at least `min_break_minutes`. A zero gap is allowed.
///
/// Score = 1 - gap / min_break.
pub(super) fn student_break(
    constraint: &Constraint,
    rule: &StudentBreakRule,
    ctx: &RuleContext<'_>,
) -> Vec<ConstraintViolation> {
    let severity = Severity::from_priority(constraint.priority);
    let min_break = f64::from(rule.min_break_minutes);
    if min_break <= 0.0 {
        return Vec::new();
    }

    let groups: BTreeSet<&str> = if constraint.entity_ids.is_empty() {
        ctx.sessions
            .iter()
            .flat_map(|s| s.student_group_ids.iter().map(String::as_str))
            .collect()
    } else {
        constraint.entity_ids.iter().map(String::as_str).collect()
    };

    let mut violations = Vec::new();
    for group_id in groups {
        let attending: Vec<usize> = ctx
            .well_formed(constraint)
            .filter(|(_, s)| s.has_group(group_id))
            .map(|(i, _)| i)
            .collect();
        let sorted = ctx.chronological(&attending);

        for pair in sorted.windows(2) {
            let (prev, next) = (&ctx.sessions[pair[0]], &ctx.sessions[pair[1]]);
            if prev.day_key() != next.day_key() {
                continue;
            }
            let gap = (next.start_time - prev.end_time).num_seconds() as f64 / 60.0;
            if gap <= 0.0 || gap >= min_break {
                continue;
            }
            let name = ctx
                .snapshot
                .student_group(group_id)
                .map(|g| label(&g.name, &g.id))
                .unwrap_or(group_id);
            violations.push(
                ConstraintViolation::new(
                    constraint,
                    severity,
                    1.0 - gap / min_break,
                    format!(
                        "Group {} has only {} minutes between sessions on {} (minimum {})",
                        name, gap, prev.day_of_week, rule.min_break_minutes
                    ),
                )
                .with_entity(group_id)
                .with_session(&prev.id)
                .with_session(&next.id),
            );
        }
    }

    violations
}

/// Sessions of courses in an in-scope department must not end in an hour
/// later than `max_end_hour`. Score is fixed at 0.8.
pub(super) fn department_policy(
    constraint: &Constraint,
    rule: &DepartmentPolicyRule,
    ctx: &RuleContext<'_>,
) -> Vec<ConstraintViolation> {
    let severity = Severity::from_priority(constraint.priority);
    let mut violations = Vec::new();

    for (_, session) in ctx.well_formed(constraint) {
        let Some(course_id) = session.course_id.as_deref() else {
            continue;
        };
        let Some(course) = ctx.snapshot.course(course_id) else {
            skip_missing(constraint, session, "course");
            continue;
        };
        let Some(department) = course.department.as_deref() else {
            continue;
        };
        if !constraint.applies_to(department) {
            continue;
        }
        if session.end_time.hour() <= rule.max_end_hour {
            continue;
        }
        violations.push(
            ConstraintViolation::new(
                constraint,
                severity,
                DEPARTMENT_POLICY_SCORE,
                format!(
                    "{} session ends at {}, after the {} department limit of {:02}:00",
                    label(&course.name, &course.id),
                    format_time_of_day(session.end_time.time()),
                    department,
                    rule.max_end_hour
                ),
            )
            .with_entity(department)
            .with_entity(course_id)
            .with_session(&session.id),
        );
    }

    violations
}

/// Sessions must start no earlier than `start` and end no later than
/// `end`. A session running past midnight always violates. Score is fixed
/// at 0.9.
pub(super) fn time_window(
    constraint: &Constraint,
    rule: &TimeWindowRule,
    ctx: &RuleContext<'_>,
) -> Vec<ConstraintViolation> {
    let severity = Severity::from_priority(constraint.priority);
    let mut violations = Vec::new();

    for (_, session) in ctx.well_formed(constraint) {
        let scope = session
            .course_id
            .iter()
            .chain(session.lecturer_id.iter())
            .chain(session.venue_id.iter())
            .chain(session.student_group_ids.iter())
            .map(String::as_str);
        if !constraint.applies_to_any(scope) {
            continue;
        }

        let starts_early = session.start_time.time() < rule.start;
        let ends_late = session.end_time.date() > session.start_time.date()
            || session.end_time.time() > rule.end;
        if !starts_early && !ends_late {
            continue;
        }
        violations.push(
            ConstraintViolation::new(
                constraint,
                severity,
                TIME_WINDOW_SCORE,
                format!(
                    "Session on {} {} falls outside the allowed window {}-{}",
                    session.day_of_week,
                    time_range(session),
                    format_time_of_day(rule.start),
                    format_time_of_day(rule.end)
                ),
            )
            .with_session(&session.id),
        );
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::super::evaluate;
    use super::super::fixtures::{monday, tuesday};
    use super::*;
    use crate::config::EngineConfig;
    use crate::models::{ConstraintRule, Course, Priority, ScheduleSnapshot, ScheduledSession};

    fn run(
        c: &Constraint,
        sessions: &[ScheduledSession],
        snap: &ScheduleSnapshot,
    ) -> Vec<ConstraintViolation> {
        let cfg = EngineConfig::default();
        evaluate(c, &RuleContext::new(sessions, snap, &cfg))
    }

    fn break_rule(minutes: u32) -> Constraint {
        Constraint::new(
            "brk",
            ConstraintRule::StudentBreak(StudentBreakRule {
                min_break_minutes: minutes,
            }),
        )
    }

    #[test]
    fn test_short_break() {
        let sessions = vec![
            monday("a", (9, 0), (10, 0)).with_group("G1"),
            monday("b", (10, 10), (11, 0)).with_group("G1"),
        ];
        let c = break_rule(15).for_entity("G1");

        let v = run(&c, &sessions, &ScheduleSnapshot::new());
        assert_eq!(v.len(), 1);
        assert!((v[0].violation_score - (1.0 - 10.0 / 15.0)).abs() < 1e-10);
        assert_eq!(v[0].affected_sessions, vec!["a", "b"]);
        assert_eq!(v[0].severity, Severity::Soft);
    }

    #[test]
    fn test_break_zero_gap_and_long_gap_ok() {
        let sessions = vec![
            monday("a", (9, 0), (10, 0)).with_group("G1"),
            monday("b", (10, 0), (11, 0)).with_group("G1"),
            monday("c", (11, 15), (12, 0)).with_group("G1"),
        ];
        let snap = ScheduleSnapshot::new();
        assert!(run(&break_rule(15), &sessions, &snap).is_empty());
    }

    #[test]
    fn test_break_sorts_without_reordering_input() {
        let sessions = vec![
            monday("b", (10, 5), (11, 0)).with_group("G1"),
            tuesday("x", (8, 0), (9, 0)).with_group("G1"),
            monday("a", (9, 0), (10, 0)).with_group("G1"),
        ];
        let v = run(&break_rule(15), &sessions, &ScheduleSnapshot::new());
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].affected_sessions, vec!["a", "b"]);
        assert_eq!(sessions[0].id, "b");
    }

    #[test]
    fn test_break_severity_follows_priority() {
        let sessions = vec![
            monday("a", (9, 0), (10, 0)).with_group("G1"),
            monday("b", (10, 5), (11, 0)).with_group("G1"),
        ];
        let c = break_rule(15).with_priority(Priority::Critical);
        let v = run(&c, &sessions, &ScheduleSnapshot::new());
        assert_eq!(v[0].severity, Severity::Hard);
    }

    #[test]
    fn test_break_other_group_out_of_scope() {
        let sessions = vec![
            monday("a", (9, 0), (10, 0)).with_group("G2"),
            monday("b", (10, 5), (11, 0)).with_group("G2"),
        ];
        let c = break_rule(15).for_entity("G1");
        assert!(run(&c, &sessions, &ScheduleSnapshot::new()).is_empty());
    }

    #[test]
    fn test_department_policy_hour_comparison() {
        let snap = ScheduleSnapshot::new()
            .with_course(Course::new("C1").with_department("ENG"))
            .with_course(Course::new("C2").with_department("ART"));
        let sessions = vec![
            monday("ok", (17, 0), (18, 45)).with_course("C1"),
            monday("late", (18, 0), (19, 30)).with_course("C1"),
            monday("other", (18, 0), (20, 0)).with_course("C2"),
        ];
        let c = Constraint::of_kind("dept", crate::models::ConstraintType::DepartmentPolicy)
            .for_entity("ENG");

        let v = run(&c, &sessions, &snap);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].affected_sessions, vec!["late"]);
        assert!((v[0].violation_score - 0.8).abs() < 1e-10);
    }

    #[test]
    fn test_department_policy_custom_hour() {
        let snap = ScheduleSnapshot::new()
            .with_course(Course::new("C1").with_department("ENG"));
        let sessions = vec![monday("s", (15, 0), (17, 0)).with_course("C1")];
        let c = Constraint::new(
            "dept",
            ConstraintRule::DepartmentPolicy(DepartmentPolicyRule { max_end_hour: 16 }),
        );
        assert_eq!(run(&c, &sessions, &snap).len(), 1);
    }

    #[test]
    fn test_time_window_default() {
        let sessions = vec![
            monday("early", (7, 30), (9, 0)),
            monday("ok", (8, 0), (18, 0)),
            monday("late", (17, 0), (18, 30)),
        ];
        let c = Constraint::of_kind("tw", crate::models::ConstraintType::TimeWindow);

        let v = run(&c, &sessions, &ScheduleSnapshot::new());
        let ids: Vec<_> = v.iter().flat_map(|x| x.affected_sessions.clone()).collect();
        assert_eq!(ids, vec!["early", "late"]);
        assert!(v.iter().all(|x| (x.violation_score - 0.9).abs() < 1e-10));
    }
}
