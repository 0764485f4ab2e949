//! Resource rules: availability, venue capacity, equipment.

use super::{label, skip_missing, time_range, RuleContext};
use crate::models::{Constraint, ConstraintViolation, Severity};

/// Every in-scope lecturer and venue must be available for the whole
/// session. Lecturer and venue are checked independently.
///
/// A venue without availability windows is always available; a lecturer
/// without a window on the session's day is not. A session running past
/// midnight fits in no window.
pub(super) fn hard_availability(
    constraint: &Constraint,
    ctx: &RuleContext<'_>,
) -> Vec<ConstraintViolation> {
    let mut violations = Vec::new();

    for (_, session) in ctx.well_formed(constraint) {
        let day = session.day_of_week;
        let (start, end) = (session.start_time, session.end_time);

        if let Some(lecturer_id) = session.lecturer_id.as_deref() {
            if constraint.applies_to(lecturer_id) {
                match ctx.snapshot.lecturer(lecturer_id) {
                    Some(lecturer) if !lecturer.is_available(day, start, end) => {
                        violations.push(
                            ConstraintViolation::new(
                                constraint,
                                Severity::Hard,
                                1.0,
                                format!(
                                    "Lecturer {} is not available on {} {}",
                                    label(&lecturer.name, &lecturer.id),
                                    day,
                                    time_range(session)
                                ),
                            )
                            .with_entity(lecturer_id)
                            .with_session(&session.id),
                        );
                    }
                    Some(_) => {}
                    None => skip_missing(constraint, session, "lecturer"),
                }
            }
        }

        if let Some(venue_id) = session.venue_id.as_deref() {
            if constraint.applies_to(venue_id) {
                match ctx.snapshot.venue(venue_id) {
                    Some(venue) if !venue.is_available(day, start, end) => {
                        violations.push(
                            ConstraintViolation::new(
                                constraint,
                                Severity::Hard,
                                1.0,
                                format!(
                                    "Venue {} is not available on {} {}",
                                    label(&venue.name, &venue.id),
                                    day,
                                    time_range(session)
                                ),
                            )
                            .with_entity(venue_id)
                            .with_session(&session.id),
                        );
                    }
                    Some(_) => {}
                    None => skip_missing(constraint, session, "venue"),
                }
            }
        }
    }

    violations
}

/// Total attending group size must not exceed venue capacity.
///
/// Score = min(excess / capacity, 1.0). Groups missing from the snapshot
/// are left out of the total.
pub(super) fn venue_capacity(
    constraint: &Constraint,
    ctx: &RuleContext<'_>,
) -> Vec<ConstraintViolation> {
    let mut violations = Vec::new();

    for (_, session) in ctx.well_formed(constraint) {
        let Some(venue_id) = session.venue_id.as_deref() else {
            continue;
        };
        if !constraint.applies_to(venue_id) || session.student_group_ids.is_empty() {
            continue;
        }
        let Some(venue) = ctx.snapshot.venue(venue_id) else {
            skip_missing(constraint, session, "venue");
            continue;
        };

        let mut total: u64 = 0;
        for group_id in &session.student_group_ids {
            match ctx.snapshot.student_group(group_id) {
                Some(group) => total += u64::from(group.size),
                None => skip_missing(constraint, session, "student group"),
            }
        }

        let capacity = u64::from(venue.capacity);
        if total <= capacity {
            continue;
        }
        let excess = total - capacity;
        let score = if capacity == 0 {
            1.0
        } else {
            (excess as f64 / capacity as f64).min(1.0)
        };

        violations.push(
            ConstraintViolation::new(
                constraint,
                Severity::Hard,
                score,
                format!(
                    "Venue {} holds {} students but {} are assigned ({} over capacity)",
                    label(&venue.name, &venue.id),
                    capacity,
                    total,
                    excess
                ),
            )
            .with_entity(venue_id)
            .with_session(&session.id),
        );
    }

    violations
}

/// The venue must provide every item the course requires.
///
/// Score = |missing| / |required|. Hard only for critical constraints.
pub(super) fn equipment_requirement(
    constraint: &Constraint,
    ctx: &RuleContext<'_>,
) -> Vec<ConstraintViolation> {
    let severity = Severity::from_priority(constraint.priority);
    let mut violations = Vec::new();

    for (_, session) in ctx.well_formed(constraint) {
        let (Some(course_id), Some(venue_id)) =
            (session.course_id.as_deref(), session.venue_id.as_deref())
        else {
            continue;
        };
        if !constraint.applies_to_any([course_id, venue_id].into_iter()) {
            continue;
        }
        let Some(course) = ctx.snapshot.course(course_id) else {
            skip_missing(constraint, session, "course");
            continue;
        };
        if course.required_equipment.is_empty() {
            continue;
        }
        let Some(venue) = ctx.snapshot.venue(venue_id) else {
            skip_missing(constraint, session, "venue");
            continue;
        };

        let missing: Vec<&str> = course
            .required_equipment
            .iter()
            .filter(|item| !venue.has_equipment(item))
            .map(String::as_str)
            .collect();
        if missing.is_empty() {
            continue;
        }

        let score = missing.len() as f64 / course.required_equipment.len() as f64;
        violations.push(
            ConstraintViolation::new(
                constraint,
                severity,
                score,
                format!(
                    "Venue {} is missing equipment required by {}: {}",
                    label(&venue.name, &venue.id),
                    label(&course.name, &course.id),
                    missing.join(", ")
                ),
            )
            .with_entity(course_id)
            .with_entity(venue_id)
            .with_session(&session.id),
        );
    }

    violations
}
