//! Constraint evaluators, one per constraint kind.
//!
//! [`evaluate`] is the dispatch table: an exhaustive match over
//! [`ConstraintRule`] that hands each kind its typed parameters.
//!
//! # Failure Semantics
//! Evaluators are total. A malformed session or a reference missing from
//! the snapshot skips that one check for that one session and is logged at
//! `debug`; it never aborts the pass.
//!
//! # Categories
//!
//! - **Resource**: availability, capacity, equipment
//! - **Lecturer**: preferences, consecutive runs
//! - **Timing**: student breaks, department policy, time window

mod lecturer;
mod resource;
mod timing;

use std::collections::BTreeMap;

use crate::config::EngineConfig;
use crate::models::{
    Constraint, ConstraintRule, ConstraintViolation, ScheduleSnapshot, ScheduledSession,
};

/// Read-only inputs shared by every evaluator.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub sessions: &'a [ScheduledSession],
    pub snapshot: &'a ScheduleSnapshot,
    pub config: &'a EngineConfig,
}

impl<'a> RuleContext<'a> {
    /// Bundles the inputs.
    pub fn new(
        sessions: &'a [ScheduledSession],
        snapshot: &'a ScheduleSnapshot,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            sessions,
            snapshot,
            config,
        }
    }

    /// Well-formed sessions with their indices. Malformed ones are logged
    /// and dropped.
    pub fn well_formed(
        &self,
        constraint: &'a Constraint,
    ) -> impl Iterator<Item = (usize, &'a ScheduledSession)> + 'a {
        let sessions = self.sessions;
        sessions.iter().enumerate().filter(move |(_, s)| {
            if s.is_well_formed() {
                true
            } else {
                tracing::debug!(
                    constraint_id = %constraint.id,
                    session_id = %s.id,
                    "skipping malformed session (end <= start)"
                );
                false
            }
        })
    }

    /// Indices of well-formed sessions grouped by a key, keys in order.
    pub fn group_by<K, F>(&self, constraint: &'a Constraint, mut key: F) -> BTreeMap<K, Vec<usize>>
    where
        K: Ord,
        F: FnMut(&'a ScheduledSession) -> Option<K>,
    {
        let mut groups: BTreeMap<K, Vec<usize>> = BTreeMap::new();
        for (i, s) in self.well_formed(constraint) {
            if let Some(k) = key(s) {
                groups.entry(k).or_default().push(i);
            }
        }
        groups
    }

    /// Sorts a copy of `indices` chronologically: day, start, end, index.
    ///
    /// The caller's session slice is never reordered.
    pub fn chronological(&self, indices: &[usize]) -> Vec<usize> {
        let mut sorted = indices.to_vec();
        sorted.sort_by_key(|&i| {
            let s = &self.sessions[i];
            (s.day_key(), s.start_time, s.end_time, i)
        });
        sorted
    }
}

/// Logs a check skipped because a referenced entity is absent.
pub(crate) fn skip_missing(constraint: &Constraint, session: &ScheduledSession, what: &str) {
    tracing::debug!(
        constraint_id = %constraint.id,
        session_id = %session.id,
        missing = what,
        "skipping check: referenced entity not in snapshot"
    );
}

/// Evaluates one constraint. Inactive constraints produce nothing.
pub fn evaluate(constraint: &Constraint, ctx: &RuleContext<'_>) -> Vec<ConstraintViolation> {
    if !constraint.is_active {
        return Vec::new();
    }
    match &constraint.rule {
        ConstraintRule::HardAvailability => resource::hard_availability(constraint, ctx),
        ConstraintRule::VenueCapacity => resource::venue_capacity(constraint, ctx),
        ConstraintRule::EquipmentRequirement => resource::equipment_requirement(constraint, ctx),
        ConstraintRule::LecturerPreference => lecturer::lecturer_preference(constraint, ctx),
        ConstraintRule::StudentBreak(rule) => timing::student_break(constraint, rule, ctx),
        ConstraintRule::DepartmentPolicy(rule) => {
            timing::department_policy(constraint, rule, ctx)
        }
        ConstraintRule::TimeWindow(rule) => timing::time_window(constraint, rule, ctx),
        ConstraintRule::ConsecutiveSessions(rule) => {
            lecturer::consecutive_sessions(constraint, rule, ctx)
        }
    }
}

/// `HH:MM-HH:MM` label for a session's time range.
pub(crate) fn time_range(session: &ScheduledSession) -> String {
    use crate::models::format_time_of_day;
    format!(
        "{}-{}",
        format_time_of_day(session.start_time.time()),
        format_time_of_day(session.end_time.time())
    )
}

/// Display name, falling back to the id.
pub(crate) fn label<'a>(name: &'a str, id: &'a str) -> &'a str {
    if name.is_empty() {
        id
    } else {
        name
    }
}
