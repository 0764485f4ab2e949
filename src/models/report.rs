//! Diagnostic records produced by evaluation.
//!
//! [`ConstraintViolation`] comes from the constraint engine and carries a
//! severity and a continuous score. [`ScheduleConflict`] comes from the
//! conflict detector and is always an error.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Constraint, ConstraintType, Priority, Severity};

/// One breach of one constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintViolation {
    pub constraint_id: String,
    pub constraint_type: ConstraintType,
    pub priority: Priority,
    /// User-facing explanation.
    pub description: String,
    /// Lecturers, venues, courses or groups involved.
    pub affected_entities: Vec<String>,
    pub affected_sessions: Vec<String>,
    pub severity: Severity,
    /// How badly the constraint is breached, in [0, 1].
    pub violation_score: f64,
    /// Constraint weight, set for soft violations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl ConstraintViolation {
    /// Starts a violation of `constraint` with the given severity and score.
    ///
    /// The score is clamped to [0, 1]. Soft violations inherit the
    /// constraint's weight.
    pub fn new(
        constraint: &Constraint,
        severity: Severity,
        score: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            constraint_id: constraint.id.clone(),
            constraint_type: constraint.kind(),
            priority: constraint.priority,
            description: description.into(),
            affected_entities: Vec::new(),
            affected_sessions: Vec::new(),
            severity,
            violation_score: score.clamp(0.0, 1.0),
            weight: match severity {
                Severity::Soft => Some(constraint.weight),
                Severity::Hard => None,
            },
        }
    }

    /// Adds an affected entity.
    pub fn with_entity(mut self, entity_id: impl Into<String>) -> Self {
        self.affected_entities.push(entity_id.into());
        self
    }

    /// Adds an affected session.
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.affected_sessions.push(session_id.into());
        self
    }

    /// Adds several affected sessions.
    pub fn with_sessions<I, S>(mut self, session_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.affected_sessions
            .extend(session_ids.into_iter().map(Into::into));
        self
    }

    /// Whether the violation invalidates the schedule.
    #[inline]
    pub fn is_hard(&self) -> bool {
        self.severity == Severity::Hard
    }

    /// Score times weight; hard violations count with weight 1.0.
    pub fn weighted_score(&self) -> f64 {
        self.violation_score * self.weight.unwrap_or(1.0)
    }
}

/// Kinds of double-booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    VenueDoubleBooking,
    LecturerConflict,
    StudentGroupOverlap,
}

impl ConflictType {
    /// Wire name (e.g. `"venue_double_booking"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictType::VenueDoubleBooking => "venue_double_booking",
            ConflictType::LecturerConflict => "lecturer_conflict",
            ConflictType::StudentGroupOverlap => "student_group_overlap",
        }
    }
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conflict severity. Double-booking has no soft variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictSeverity {
    #[default]
    Error,
}

/// Two sessions competing for the same venue, lecturer or group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleConflict {
    #[serde(rename = "type")]
    pub conflict_type: ConflictType,
    /// Indices into the evaluated session slice, ascending.
    pub session_indices: Vec<usize>,
    /// Ids of the same sessions, in index order.
    pub session_ids: Vec<String>,
    /// The shared resource: venue id, lecturer id, or the shared group ids.
    pub resource_ids: Vec<String>,
    pub description: String,
    pub severity: ConflictSeverity,
}

impl ScheduleConflict {
    /// Composite dedupe key: type plus sorted indices.
    pub fn key(&self) -> (ConflictType, Vec<usize>) {
        let mut indices = self.session_indices.clone();
        indices.sort_unstable();
        (self.conflict_type, indices)
    }
}
