//! Constraint engine.
//!
//! Evaluates every active constraint in the catalogue against a slice of
//! scheduled sessions and returns the concatenated violations.
//!
//! # Usage
//!
//! ```
//! use u_timetable::engine::ConstraintEngine;
//! use u_timetable::models::{Constraint, ConstraintType, ScheduleSnapshot};
//!
//! let snapshot = ScheduleSnapshot::new()
//!     .with_constraint(Constraint::of_kind("cap", ConstraintType::VenueCapacity));
//! let violations = ConstraintEngine::new().validate(&[], &snapshot);
//! assert!(violations.is_empty());
//! ```
//!
//! # Concurrency
//! Constraints are independent. With `parallel` enabled they are evaluated
//! on the rayon pool; results are still concatenated in catalogue order,
//! so output is identical to a sequential run.

pub mod rules;

use rayon::prelude::*;

use crate::config::EngineConfig;
use crate::models::{Constraint, ConstraintViolation, ScheduleSnapshot, ScheduledSession};
use rules::RuleContext;

/// Stateless constraint evaluator.
#[derive(Debug, Clone, Default)]
pub struct ConstraintEngine {
    config: EngineConfig,
}

impl ConstraintEngine {
    /// Creates an engine with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with the given configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// The engine's configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluates the snapshot's constraint catalogue.
    pub fn validate(
        &self,
        sessions: &[ScheduledSession],
        snapshot: &ScheduleSnapshot,
    ) -> Vec<ConstraintViolation> {
        self.validate_constraints(sessions, snapshot, snapshot.constraints())
    }

    /// Evaluates an explicit constraint list against the snapshot's
    /// entities. Inactive constraints are skipped.
    pub fn validate_constraints(
        &self,
        sessions: &[ScheduledSession],
        snapshot: &ScheduleSnapshot,
        constraints: &[Constraint],
    ) -> Vec<ConstraintViolation> {
        let _span = tracing::trace_span!(
            "constraint_engine",
            sessions = sessions.len(),
            constraints = constraints.len()
        )
        .entered();

        let ctx = RuleContext::new(sessions, snapshot, &self.config);
        let active: Vec<&Constraint> = constraints.iter().filter(|c| c.is_active).collect();

        let per_constraint: Vec<Vec<ConstraintViolation>> = if self.config.parallel {
            active
                .par_iter()
                .map(|c| rules::evaluate(c, &ctx))
                .collect()
        } else {
            active.iter().map(|c| rules::evaluate(c, &ctx)).collect()
        };

        let violations: Vec<ConstraintViolation> = per_constraint.into_iter().flatten().collect();
        tracing::trace!(
            active = active.len(),
            violations = violations.len(),
            "constraint evaluation finished"
        );
        violations
    }

    /// Evaluates a single constraint. Inactive constraints produce nothing.
    pub fn evaluate(
        &self,
        constraint: &Constraint,
        sessions: &[ScheduledSession],
        snapshot: &ScheduleSnapshot,
    ) -> Vec<ConstraintViolation> {
        let ctx = RuleContext::new(sessions, snapshot, &self.config);
        rules::evaluate(constraint, &ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::rules::fixtures::monday;
    use super::*;
    use crate::models::{ConstraintType, StudentGroup, Venue};

    fn overbooked() -> (Vec<ScheduledSession>, ScheduleSnapshot) {
        let sessions = vec![
            monday("S1", (7, 0), (9, 0))
                .with_venue("V1")
                .with_group("G1"),
            monday("S2", (9, 0), (10, 0))
                .with_venue("V1")
                .with_group("G1"),
        ];
        let off = Constraint::of_kind("off", ConstraintType::TimeWindow)
            .inactive();
        let snapshot = ScheduleSnapshot::new()
            .with_venue(Venue::new("V1", 10))
            .with_student_group(StudentGroup::new("G1", 12))
            .with_constraint(Constraint::of_kind("cap", ConstraintType::VenueCapacity))
            .with_constraint(Constraint::of_kind("tw", ConstraintType::TimeWindow))
            .with_constraint(off);
        (sessions, snapshot)
    }

    #[test]
    fn test_catalogue_order_preserved() {
        let (sessions, snapshot) = overbooked();
        let v = ConstraintEngine::new().validate(&sessions, &snapshot);
        let ids: Vec<_> = v.iter().map(|x| x.constraint_id.as_str()).collect();
        assert_eq!(ids, vec!["cap", "cap", "tw"]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let (sessions, snapshot) = overbooked();
        let seq = ConstraintEngine::new().validate(&sessions, &snapshot);
        let par = ConstraintEngine::with_config(EngineConfig::new().with_parallel(true))
            .validate(&sessions, &snapshot);
        assert_eq!(seq, par);
    }

    #[test]
    fn test_evaluate_single_inactive() {
        let (sessions, snapshot) = overbooked();
        let c = Constraint::of_kind("cap", ConstraintType::VenueCapacity)
            .inactive();
        assert!(ConstraintEngine::new()
            .evaluate(&c, &sessions, &snapshot)
            .is_empty());
    }

    #[test]
    fn test_empty_inputs() {
        let snapshot = ScheduleSnapshot::new();
        let v = ConstraintEngine::new().validate(&[], &snapshot);
        assert!(v.is_empty());
    }
}
