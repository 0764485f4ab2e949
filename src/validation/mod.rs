//! Validation aggregation.
//!
//! Merges constraint-engine violations, conflict-detector conflicts, and
//! integrity findings into one [`ValidationResult`].
//!
//! # Rules
//! - `is_valid` = no hard violations and no conflicts
//! - `total_score` = (active − distinct violated constraint ids) / active,
//!   1.0 when there are no active constraints
//! - `by_constraint_type` counts every violation once under its type
//! - entity counts come from the caller; only `schedules.conflicts` is
//!   filled in here

mod integrity;
mod result;

pub use integrity::{check_integrity, IntegrityIssue, IntegrityIssueKind, IntegrityResult};
pub use result::{
    EntityCount, EntityCounts, MessageSource, ScheduleCounts, ValidationMessage, ValidationResult,
    ValidationSummary,
};

use std::collections::HashSet;

use crate::config::EngineConfig;
use crate::conflict::ConflictDetector;
use crate::engine::ConstraintEngine;
use crate::models::{
    Constraint, ConstraintViolation, ScheduleConflict, ScheduleSnapshot, ScheduledSession,
    Severity,
};

/// Runs both evaluators and merges their output.
#[derive(Debug, Clone, Default)]
pub struct ValidationAggregator {
    engine: ConstraintEngine,
    detector: ConflictDetector,
}

impl ValidationAggregator {
    /// Creates an aggregator with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an aggregator whose engine and detector share `config`.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            engine: ConstraintEngine::with_config(config.clone()),
            detector: ConflictDetector::with_config(config),
        }
    }

    /// Validates sessions against the snapshot.
    ///
    /// `entity_counts` comes from the caller's matching step and is merged
    /// in verbatim apart from `schedules.conflicts`.
    pub fn validate(
        &self,
        sessions: &[ScheduledSession],
        snapshot: &ScheduleSnapshot,
        entity_counts: EntityCounts,
    ) -> ValidationResult {
        let (violations, conflicts) = if self.engine.config().parallel {
            rayon::join(
                || self.engine.validate(sessions, snapshot),
                || self.detector.detect_conflicts(sessions),
            )
        } else {
            (
                self.engine.validate(sessions, snapshot),
                self.detector.detect_conflicts(sessions),
            )
        };
        let issues = check_integrity(sessions, snapshot)
            .err()
            .unwrap_or_default();

        Self::aggregate(
            violations,
            conflicts,
            snapshot.constraints(),
            entity_counts,
            &issues,
        )
    }

    /// Merges precomputed evaluator output into a result.
    pub fn aggregate(
        violations: Vec<ConstraintViolation>,
        conflicts: Vec<ScheduleConflict>,
        constraints: &[Constraint],
        mut entity_counts: EntityCounts,
        issues: &[IntegrityIssue],
    ) -> ValidationResult {
        let (hard_violations, soft_violations): (Vec<_>, Vec<_>) = violations
            .iter()
            .cloned()
            .partition(|v| v.severity == Severity::Hard);

        let total_score = satisfaction_score(constraints, &violations);

        let mut by_constraint_type = ValidationSummary::empty_breakdown();
        for v in &violations {
            *by_constraint_type.entry(v.constraint_type).or_insert(0) += 1;
        }
        entity_counts.schedules.conflicts = conflicts.len();

        let errors: Vec<ValidationMessage> = hard_violations
            .iter()
            .map(ValidationMessage::from_violation)
            .chain(conflicts.iter().map(ValidationMessage::from_conflict))
            .collect();
        let warnings: Vec<ValidationMessage> = soft_violations
            .iter()
            .map(ValidationMessage::from_violation)
            .chain(
                issues
                    .iter()
                    .map(|i| ValidationMessage::integrity(i.message.clone())),
            )
            .collect();

        let is_valid = hard_violations.is_empty() && conflicts.is_empty();
        tracing::info!(
            is_valid,
            hard = hard_violations.len(),
            soft = soft_violations.len(),
            conflicts = conflicts.len(),
            integrity_issues = issues.len(),
            total_score,
            "schedule validated"
        );

        ValidationResult {
            is_valid,
            violations,
            hard_violations,
            soft_violations,
            conflicts,
            total_score,
            summary: ValidationSummary {
                by_constraint_type,
                entities: entity_counts,
            },
            errors,
            warnings,
        }
    }
}

/// (active − distinct violated ids) / active, clamped to [0, 1].
pub fn satisfaction_score(constraints: &[Constraint], violations: &[ConstraintViolation]) -> f64 {
    let active = constraints.iter().filter(|c| c.is_active).count();
    if active == 0 {
        return 1.0;
    }
    let violated: HashSet<&str> = violations
        .iter()
        .map(|v| v.constraint_id.as_str())
        .collect();
    ((active as f64 - violated.len() as f64) / active as f64).clamp(0.0, 1.0)
}
