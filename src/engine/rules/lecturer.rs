//! Lecturer rules: teaching preferences and consecutive-session runs.

use std::collections::BTreeMap;

use super::{label, skip_missing, time_range, RuleContext};
use crate::models::{ConsecutiveRule, Constraint, ConstraintViolation, Lecturer, Severity};

/// Fixed score for a session outside the preferred windows.
pub const OUTSIDE_PREFERRED_SCORE: f64 = 0.5;
/// Fixed score for a back-to-back pair the lecturer asked to avoid.
pub const BACK_TO_BACK_SCORE: f64 = 0.7;

/// Three independent soft checks per in-scope lecturer:
/// 1. session outside preferred windows (0.5)
/// 2. back-to-back pair when the lecturer avoids them (0.7)
/// 3. daily hours above `max_hours_per_day` (min(excess / max, 1.0))
pub(super) fn lecturer_preference(
    constraint: &Constraint,
    ctx: &RuleContext<'_>,
) -> Vec<ConstraintViolation> {
    let by_lecturer = ctx.group_by(constraint, |s| {
        s.lecturer_id
            .as_deref()
            .filter(|id| constraint.applies_to(id))
    });

    let mut violations = Vec::new();
    for (lecturer_id, indices) in by_lecturer {
        let Some(lecturer) = ctx.snapshot.lecturer(lecturer_id) else {
            if let Some(&first) = indices.first() {
                skip_missing(constraint, &ctx.sessions[first], "lecturer");
            }
            continue;
        };

        outside_preferred(constraint, ctx, lecturer, &indices, &mut violations);
        if lecturer.preferences.avoid_back_to_back {
            back_to_back(constraint, ctx, lecturer, &indices, &mut violations);
        }
        if let Some(max) = lecturer.preferences.max_hours_per_day.filter(|m| *m > 0.0) {
            daily_hours(constraint, ctx, lecturer, max, &indices, &mut violations);
        }
    }

    violations
}

fn outside_preferred(
    constraint: &Constraint,
    ctx: &RuleContext<'_>,
    lecturer: &Lecturer,
    indices: &[usize],
    out: &mut Vec<ConstraintViolation>,
) {
    let prefs = &lecturer.preferences;
    for &i in indices {
        let s = &ctx.sessions[i];
        if prefs.prefers(s.day_of_week, s.start_time, s.end_time) {
            continue;
        }
        out.push(
            ConstraintViolation::new(
                constraint,
                Severity::Soft,
                OUTSIDE_PREFERRED_SCORE,
                format!(
                    "Session on {} {} is outside {}'s preferred teaching times",
                    s.day_of_week,
                    time_range(s),
                    label(&lecturer.name, &lecturer.id)
                ),
            )
            .with_entity(&lecturer.id)
            .with_session(&s.id),
        );
    }
}

fn back_to_back(
    constraint: &Constraint,
    ctx: &RuleContext<'_>,
    lecturer: &Lecturer,
    indices: &[usize],
    out: &mut Vec<ConstraintViolation>,
) {
    let window_secs = i64::from(ctx.config.back_to_back_minutes) * 60;
    let sorted = ctx.chronological(indices);

    for pair in sorted.windows(2) {
        let (prev, next) = (&ctx.sessions[pair[0]], &ctx.sessions[pair[1]]);
        if prev.day_key() != next.day_key() {
            continue;
        }
        let gap_secs = (next.start_time - prev.end_time).num_seconds();
        if !(0..window_secs).contains(&gap_secs) {
            continue;
        }
        out.push(
            ConstraintViolation::new(
                constraint,
                Severity::Soft,
                BACK_TO_BACK_SCORE,
                format!(
                    "{} has back-to-back sessions on {} ({} then {})",
                    label(&lecturer.name, &lecturer.id),
                    prev.day_of_week,
                    time_range(prev),
                    time_range(next)
                ),
            )
            .with_entity(&lecturer.id)
            .with_session(&prev.id)
            .with_session(&next.id),
        );
    }
}

fn daily_hours(
    constraint: &Constraint,
    ctx: &RuleContext<'_>,
    lecturer: &Lecturer,
    max_hours: f64,
    indices: &[usize],
    out: &mut Vec<ConstraintViolation>,
) {
    let mut by_day: BTreeMap<_, Vec<usize>> = BTreeMap::new();
    for &i in indices {
        by_day.entry(ctx.sessions[i].day_key()).or_default().push(i);
    }

    for ((day, _), day_indices) in by_day {
        let hours: f64 = day_indices
            .iter()
            .map(|&i| ctx.sessions[i].duration_hours())
            .sum();
        if hours <= max_hours {
            continue;
        }
        let excess = hours - max_hours;
        out.push(
            ConstraintViolation::new(
                constraint,
                Severity::Soft,
                (excess / max_hours).min(1.0),
                format!(
                    "{} teaches {:.1} hours on {} (preferred maximum {:.1})",
                    label(&lecturer.name, &lecturer.id),
                    hours,
                    day,
                    max_hours
                ),
            )
            .with_entity(&lecturer.id)
            .with_sessions(day_indices.iter().map(|&i| ctx.sessions[i].id.as_str())),
        );
    }
}

/// Longest run of sessions where each ends exactly when the next starts,
/// per in-scope lecturer, must not exceed `max_consecutive`.
///
/// Score = min((run - max) / max, 1.0).
pub(super) fn consecutive_sessions(
    constraint: &Constraint,
    rule: &ConsecutiveRule,
    ctx: &RuleContext<'_>,
) -> Vec<ConstraintViolation> {
    let severity = Severity::from_priority(constraint.priority);
    let max = rule.max_consecutive;
    let by_lecturer = ctx.group_by(constraint, |s| {
        s.lecturer_id
            .as_deref()
            .filter(|id| constraint.applies_to(id))
    });

    let mut violations = Vec::new();
    for (lecturer_id, indices) in by_lecturer {
        let run = longest_run(ctx, &indices);
        if run.len() <= max {
            continue;
        }
        let score = if max == 0 {
            1.0
        } else {
            ((run.len() - max) as f64 / max as f64).min(1.0)
        };
        let name = ctx
            .snapshot
            .lecturer(lecturer_id)
            .map(|l| label(&l.name, &l.id))
            .unwrap_or(lecturer_id);
        let day = ctx.sessions[run[0]].day_of_week;

        violations.push(
            ConstraintViolation::new(
                constraint,
                severity,
                score,
                format!(
                    "{} teaches {} consecutive sessions on {} (maximum {})",
                    name,
                    run.len(),
                    day,
                    max
                ),
            )
            .with_entity(lecturer_id)
            .with_sessions(run.iter().map(|&i| ctx.sessions[i].id.as_str())),
        );
    }

    violations
}

/// Longest chain of same-day sessions with `end == next.start`.
/// The earliest chain wins ties.
fn longest_run(ctx: &RuleContext<'_>, indices: &[usize]) -> Vec<usize> {
    let sorted = ctx.chronological(indices);
    let mut best: &[usize] = &[];
    let mut run_start = 0;

    for k in 0..sorted.len() {
        let continues = k > 0 && {
            let prev = &ctx.sessions[sorted[k - 1]];
            let next = &ctx.sessions[sorted[k]];
            prev.day_key() == next.day_key() && prev.end_time == next.start_time
        };
        if !continues {
            run_start = k;
        }
        let current = &sorted[run_start..=k];
        if current.len() > best.len() {
            best = current;
        }
    }

    best.to_vec()
}
