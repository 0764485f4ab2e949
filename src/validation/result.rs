//! Aggregate validation report.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{ConstraintType, ConstraintViolation, ScheduleConflict, Severity};

/// Everything a caller needs to decide whether to accept a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// True iff there are no hard violations and no conflicts.
    pub is_valid: bool,
    /// All violations, in catalogue order.
    pub violations: Vec<ConstraintViolation>,
    pub hard_violations: Vec<ConstraintViolation>,
    pub soft_violations: Vec<ConstraintViolation>,
    pub conflicts: Vec<ScheduleConflict>,
    /// Share of active constraints with no violation at all, in [0, 1].
    pub total_score: f64,
    pub summary: ValidationSummary,
    /// Hard violations and conflicts, as user-facing messages.
    pub errors: Vec<ValidationMessage>,
    /// Soft violations and integrity findings, as user-facing messages.
    pub warnings: Vec<ValidationMessage>,
}

/// Counts for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    /// Violations per constraint type. All eight types are present.
    pub by_constraint_type: BTreeMap<ConstraintType, usize>,
    pub entities: EntityCounts,
}

impl ValidationSummary {
    /// Zero-filled breakdown over all constraint types.
    pub fn empty_breakdown() -> BTreeMap<ConstraintType, usize> {
        ConstraintType::ALL.into_iter().map(|t| (t, 0)).collect()
    }
}

/// New vs. existing counts for one entity type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCount {
    pub new: usize,
    pub existing: usize,
}

/// Session counts, with the number of detected conflicts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleCounts {
    pub new: usize,
    pub existing: usize,
    pub conflicts: usize,
}

/// Per-entity-type counts supplied by the caller's matching step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityCounts {
    pub venues: EntityCount,
    pub lecturers: EntityCount,
    pub courses: EntityCount,
    pub student_groups: EntityCount,
    pub schedules: ScheduleCounts,
}

/// Where a message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSource {
    Constraint,
    Conflict,
    Integrity,
}

/// A user-facing line for the error or warning list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationMessage {
    pub source: MessageSource,
    pub message: String,
    #[serde(default)]
    pub session_ids: Vec<String>,
}

impl ValidationMessage {
    pub(crate) fn from_violation(violation: &ConstraintViolation) -> Self {
        Self {
            source: MessageSource::Constraint,
            message: violation.description.clone(),
            session_ids: violation.affected_sessions.clone(),
        }
    }

    pub(crate) fn from_conflict(conflict: &ScheduleConflict) -> Self {
        Self {
            source: MessageSource::Conflict,
            message: conflict.description.clone(),
            session_ids: conflict.session_ids.clone(),
        }
    }

    pub(crate) fn integrity(message: impl Into<String>) -> Self {
        Self {
            source: MessageSource::Integrity,
            message: message.into(),
            session_ids: Vec::new(),
        }
    }
}

impl ValidationResult {
    /// Number of hard violations.
    pub fn hard_count(&self) -> usize {
        self.hard_violations.len()
    }

    /// Number of soft violations.
    pub fn soft_count(&self) -> usize {
        self.soft_violations.len()
    }

    /// Sum of `score × weight` over all violations, hard ones weighted 1.0.
    ///
    /// A continuous objective: lower is better, 0.0 means nothing violated.
    pub fn weighted_penalty(&self) -> f64 {
        self.violations
            .iter()
            .map(ConstraintViolation::weighted_score)
            .sum()
    }

    /// Violations that name the session.
    pub fn violations_for_session<'a>(
        &'a self,
        session_id: &'a str,
    ) -> impl Iterator<Item = &'a ConstraintViolation> + 'a {
        self.violations
            .iter()
            .filter(move |v| v.affected_sessions.iter().any(|s| s == session_id))
    }

    /// Conflicts that involve the session.
    pub fn conflicts_for_session<'a>(
        &'a self,
        session_id: &'a str,
    ) -> impl Iterator<Item = &'a ScheduleConflict> + 'a {
        self.conflicts
            .iter()
            .filter(move |c| c.session_ids.iter().any(|s| s == session_id))
    }

    /// Violations of the given severity.
    pub fn by_severity(&self, severity: Severity) -> &[ConstraintViolation] {
        match severity {
            Severity::Hard => &self.hard_violations,
            Severity::Soft => &self.soft_violations,
        }
    }
}
