//! Snapshot integrity checks.
//!
//! Checks the structural soundness of imported data before (or alongside)
//! evaluation. Detects:
//! - Duplicate ids within an entity type
//! - Sessions referencing venues, lecturers, courses or groups that do not
//!   exist
//! - Sessions whose end is not after their start
//! - Venues with zero capacity and groups with zero size
//!
//! Findings never fail validation; they surface as warnings because the
//! affected checks are skipped rather than reported as violations.

use std::collections::HashSet;

use crate::models::{ScheduleSnapshot, ScheduledSession};

/// Integrity check result.
pub type IntegrityResult = Result<(), Vec<IntegrityIssue>>;

/// A structural problem in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrityIssue {
    /// Issue category.
    pub kind: IntegrityIssueKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of integrity issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityIssueKind {
    /// Two entities of one type share an id.
    DuplicateId,
    /// A session references an entity that doesn't exist.
    InvalidReference,
    /// A session ends at or before its start.
    MalformedInterval,
    /// A venue capacity or group size of zero.
    NonPositiveSize,
}

impl IntegrityIssue {
    fn new(kind: IntegrityIssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Checks the sessions and snapshot for structural problems.
///
/// Checks:
/// 1. No duplicate venue, lecturer, course, group or session ids
/// 2. Venue capacities and group sizes are positive
/// 3. Every session reference points at an existing entity
/// 4. Every session ends after it starts
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(issues)` with all detected issues.
pub fn check_integrity(
    sessions: &[ScheduledSession],
    snapshot: &ScheduleSnapshot,
) -> IntegrityResult {
    let mut issues = Vec::new();

    duplicates(
        "venue",
        snapshot.venues().iter().map(|v| v.id.as_str()),
        &mut issues,
    );
    duplicates(
        "lecturer",
        snapshot.lecturers().iter().map(|l| l.id.as_str()),
        &mut issues,
    );
    duplicates(
        "course",
        snapshot.courses().iter().map(|c| c.id.as_str()),
        &mut issues,
    );
    duplicates(
        "student group",
        snapshot.student_groups().iter().map(|g| g.id.as_str()),
        &mut issues,
    );
    duplicates(
        "session",
        sessions.iter().map(|s| s.id.as_str()),
        &mut issues,
    );

    for venue in snapshot.venues().iter().filter(|v| v.capacity == 0) {
        issues.push(IntegrityIssue::new(
            IntegrityIssueKind::NonPositiveSize,
            format!("Venue '{}' has zero capacity", venue.id),
        ));
    }
    for group in snapshot.student_groups().iter().filter(|g| g.size == 0) {
        issues.push(IntegrityIssue::new(
            IntegrityIssueKind::NonPositiveSize,
            format!("Student group '{}' has zero size", group.id),
        ));
    }

    for session in sessions {
        if !session.is_well_formed() {
            issues.push(IntegrityIssue::new(
                IntegrityIssueKind::MalformedInterval,
                format!("Session '{}' ends at or before its start", session.id),
            ));
        }
        if let Some(id) = session.venue_id.as_deref() {
            if snapshot.venue(id).is_none() {
                issues.push(unknown(session, "venue", id));
            }
        }
        if let Some(id) = session.lecturer_id.as_deref() {
            if snapshot.lecturer(id).is_none() {
                issues.push(unknown(session, "lecturer", id));
            }
        }
        if let Some(id) = session.course_id.as_deref() {
            if snapshot.course(id).is_none() {
                issues.push(unknown(session, "course", id));
            }
        }
        for id in &session.student_group_ids {
            if snapshot.student_group(id).is_none() {
                issues.push(unknown(session, "student group", id));
            }
        }
    }

    for issue in &issues {
        tracing::warn!(kind = ?issue.kind, "{}", issue.message);
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

fn duplicates<'a>(
    what: &str,
    ids: impl Iterator<Item = &'a str>,
    issues: &mut Vec<IntegrityIssue>,
) {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            issues.push(IntegrityIssue::new(
                IntegrityIssueKind::DuplicateId,
                format!("Duplicate {what} ID: {id}"),
            ));
        }
    }
}

fn unknown(session: &ScheduledSession, what: &str, id: &str) -> IntegrityIssue {
    IntegrityIssue::new(
        IntegrityIssueKind::InvalidReference,
        format!("Session '{}' references unknown {what} '{id}'", session.id),
    )
}
