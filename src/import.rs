//! Import pipeline boundary.
//!
//! Bulk import maps spreadsheet rows onto entities, matches each row
//! against what already exists, and validates the result before anything
//! is persisted. This module holds the mapped data and match results and
//! runs the full validation in one call.
//!
//! # Counting
//! A row counts as *existing* when its match confidence is at least
//! [`EngineConfig::match_confidence_threshold`]; every other row,
//! including rows with no match entry, counts as *new*.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::EngineConfig;
use crate::models::{
    Constraint, Course, Lecturer, ScheduleSnapshot, ScheduledSession, StudentGroup, Venue,
};
use crate::validation::{
    EntityCount, EntityCounts, ScheduleCounts, ValidationAggregator, ValidationResult,
};

/// Entities mapped from an import file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MappedImportData {
    pub venues: Vec<Venue>,
    pub lecturers: Vec<Lecturer>,
    pub courses: Vec<Course>,
    pub student_groups: Vec<StudentGroup>,
    pub schedules: Vec<ScheduledSession>,
}

impl MappedImportData {
    /// Snapshot of the mapped entities with the given catalogue.
    pub fn snapshot(&self, constraints: &[Constraint]) -> ScheduleSnapshot {
        ScheduleSnapshot::from_parts(
            self.venues.clone(),
            self.lecturers.clone(),
            self.courses.clone(),
            self.student_groups.clone(),
            constraints.to_vec(),
        )
    }
}

/// An existing entity a row was matched to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMatch {
    pub existing_id: String,
    /// Match confidence in [0, 1].
    pub confidence: f64,
}

impl EntityMatch {
    pub fn new(existing_id: impl Into<String>, confidence: f64) -> Self {
        Self {
            existing_id: existing_id.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// Row index to optional match, per entity type.
pub type RowMatches = BTreeMap<usize, Option<EntityMatch>>;

/// Match results for every entity type in an import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntityMatchResults {
    pub venues: RowMatches,
    pub lecturers: RowMatches,
    pub courses: RowMatches,
    pub student_groups: RowMatches,
    pub schedules: RowMatches,
}

fn count_rows(rows: usize, matches: &RowMatches, threshold: f64) -> EntityCount {
    let existing = (0..rows)
        .filter(|i| {
            matches
                .get(i)
                .and_then(Option::as_ref)
                .is_some_and(|m| m.confidence >= threshold)
        })
        .count();
    EntityCount {
        new: rows - existing,
        existing,
    }
}

impl EntityCounts {
    /// Counts new and existing rows per entity type.
    ///
    /// `schedules.conflicts` is left at zero; the aggregator fills it in.
    pub fn from_matches(
        data: &MappedImportData,
        matches: &EntityMatchResults,
        threshold: f64,
    ) -> Self {
        let schedules = count_rows(data.schedules.len(), &matches.schedules, threshold);
        Self {
            venues: count_rows(data.venues.len(), &matches.venues, threshold),
            lecturers: count_rows(data.lecturers.len(), &matches.lecturers, threshold),
            courses: count_rows(data.courses.len(), &matches.courses, threshold),
            student_groups: count_rows(
                data.student_groups.len(),
                &matches.student_groups,
                threshold,
            ),
            schedules: ScheduleCounts {
                new: schedules.new,
                existing: schedules.existing,
                conflicts: 0,
            },
        }
    }
}

/// Validates an import: integrity checks, constraints, conflicts, and
/// entity counts in one result.
pub fn validate_import(
    data: &MappedImportData,
    matches: &EntityMatchResults,
    constraints: &[Constraint],
    config: &EngineConfig,
) -> ValidationResult {
    let _span = tracing::debug_span!(
        "validate_import",
        sessions = data.schedules.len(),
        constraints = constraints.len()
    )
    .entered();

    let counts = EntityCounts::from_matches(data, matches, config.match_confidence_threshold);
    let snapshot = data.snapshot(constraints);
    let aggregator = ValidationAggregator::with_config(config.clone());
    aggregator.validate(&data.schedules, &snapshot, counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rules::fixtures::monday;
    use crate::models::ConstraintType;

    fn data() -> MappedImportData {
        MappedImportData {
            venues: vec![Venue::new("V1", 40), Venue::new("V2", 20)],
            lecturers: vec![Lecturer::new("L1")],
            courses: vec![Course::new("C1")],
            student_groups: vec![StudentGroup::new("G1", 30)],
            schedules: vec![
                monday("S1", (9, 0), (10, 0))
                    .with_venue("V1")
                    .with_group("G1"),
                monday("S2", (9, 30), (10, 30)).with_venue("V1"),
            ],
        }
    }

    #[test]
    fn test_counts_respect_threshold() {
        let mut matches = EntityMatchResults::default();
        matches.venues.insert(0, Some(EntityMatch::new("v1", 0.95)));
        matches.venues.insert(1, Some(EntityMatch::new("v2", 0.6)));
        matches.lecturers.insert(0, None);

        let counts = EntityCounts::from_matches(&data(), &matches, 0.8);
        assert_eq!(counts.venues.new, 1);
        assert_eq!(counts.venues.existing, 1);
        assert_eq!(counts.lecturers.new, 1);
        assert_eq!(counts.lecturers.existing, 0);
        assert_eq!(counts.schedules.new, 2);
        assert_eq!(counts.schedules.conflicts, 0);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let mut matches = EntityMatchResults::default();
        matches.courses.insert(0, Some(EntityMatch::new("c", 0.8)));
        let counts = EntityCounts::from_matches(&data(), &matches, 0.8);
        assert_eq!(counts.courses.existing, 1);
    }

    #[test]
    fn test_validate_import() {
        let constraints = vec![Constraint::of_kind("cap", ConstraintType::VenueCapacity)];
        let mut matches = EntityMatchResults::default();
        let existing = Some(EntityMatch::new("old", 0.9));
        matches.schedules.insert(1, existing);

        let r = validate_import(&data(), &matches, &constraints, &EngineConfig::default());
        assert!(!r.is_valid);
        assert_eq!(r.conflicts.len(), 1);
        assert!(r.violations.is_empty());
        assert_eq!(r.summary.entities.schedules.conflicts, 1);
        assert_eq!(r.summary.entities.schedules.existing, 1);
        assert_eq!(r.summary.entities.venues.new, 2);
    }

    #[test]
    fn test_mapped_data_from_json() {
        let data: MappedImportData = serde_json::from_value(serde_json::json!({
            "venues": [{"id": "V1", "name": "Hall", "capacity": 100}]
        }))
        .unwrap();
        assert_eq!(data.venues.len(), 1);
        assert!(data.schedules.is_empty());
    }
}
