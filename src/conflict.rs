//! Double-booking detection.
//!
//! Three independent pairwise scans over session pairs `i < j`:
//! - **Venue**: same venue, same day, overlapping time
//! - **Lecturer**: same lecturer, same day, overlapping time
//! - **Student group**: at least one shared group, same day, overlapping time
//!
//! Overlap is half-open (`start1 < end2 && start2 < end1`), so sessions that
//! touch at an endpoint never conflict. Each unordered pair is reported at
//! most once per conflict type; the same pair may appear under all three.
//!
//! # Algorithm
//! Small inputs use the direct O(n²) scan. Above the configured threshold,
//! sessions are bucketed by (day, resource id) and only same-bucket pairs
//! are compared. Both paths produce identical output, ordered by `(i, j)`.

use std::collections::{BTreeSet, HashMap};

use crate::config::EngineConfig;
use crate::engine::rules::time_range;
use crate::models::{
    intervals_overlap, ConflictSeverity, ConflictType, DayOfWeek, ScheduleConflict,
    ScheduledSession,
};

/// Stateless double-booking detector.
#[derive(Debug, Clone, Default)]
pub struct ConflictDetector {
    config: EngineConfig,
}

impl ConflictDetector {
    /// Creates a detector with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detector with the given configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Runs all three scans. Venue conflicts come first, then lecturer,
    /// then student group.
    pub fn detect_conflicts(&self, sessions: &[ScheduledSession]) -> Vec<ScheduleConflict> {
        let _span = tracing::trace_span!("conflict_detector", sessions = sessions.len())
            .entered();
        let bucketed = sessions.len() > self.config.bucket_threshold;

        let (venue, (lecturer, group)) = if self.config.parallel {
            rayon::join(
                || scan(sessions, ConflictType::VenueDoubleBooking, bucketed),
                || {
                    rayon::join(
                        || scan(sessions, ConflictType::LecturerConflict, bucketed),
                        || scan(sessions, ConflictType::StudentGroupOverlap, bucketed),
                    )
                },
            )
        } else {
            (
                scan(sessions, ConflictType::VenueDoubleBooking, bucketed),
                (
                    scan(sessions, ConflictType::LecturerConflict, bucketed),
                    scan(sessions, ConflictType::StudentGroupOverlap, bucketed),
                ),
            )
        };

        let mut conflicts = venue;
        conflicts.extend(lecturer);
        conflicts.extend(group);
        tracing::trace!(
            conflicts = conflicts.len(),
            bucketed,
            "conflict scan finished"
        );
        conflicts
    }

    /// Venue double-bookings only.
    pub fn venue_conflicts(&self, sessions: &[ScheduledSession]) -> Vec<ScheduleConflict> {
        scan(
            sessions,
            ConflictType::VenueDoubleBooking,
            sessions.len() > self.config.bucket_threshold,
        )
    }

    /// Lecturer conflicts only.
    pub fn lecturer_conflicts(&self, sessions: &[ScheduledSession]) -> Vec<ScheduleConflict> {
        scan(
            sessions,
            ConflictType::LecturerConflict,
            sessions.len() > self.config.bucket_threshold,
        )
    }

    /// Student group overlaps only.
    pub fn student_group_conflicts(&self, sessions: &[ScheduledSession]) -> Vec<ScheduleConflict> {
        scan(
            sessions,
            ConflictType::StudentGroupOverlap,
            sessions.len() > self.config.bucket_threshold,
        )
    }
}

/// Resource ids a session contributes to a scan. Empty = not eligible.
fn resource_keys(session: &ScheduledSession, kind: ConflictType) -> Vec<&str> {
    if !session.is_well_formed() {
        return Vec::new();
    }
    match kind {
        ConflictType::VenueDoubleBooking => session.venue_id.as_deref().into_iter().collect(),
        ConflictType::LecturerConflict => session.lecturer_id.as_deref().into_iter().collect(),
        ConflictType::StudentGroupOverlap => session
            .student_group_ids
            .iter()
            .map(String::as_str)
            .collect(),
    }
}

/// Shared resource ids of two sessions, in `a`'s order, deduplicated.
fn shared_keys<'a>(a: &'a [&'a str], b: &[&str]) -> Vec<&'a str> {
    let mut shared: Vec<&str> = Vec::new();
    for &key in a {
        if b.contains(&key) && !shared.contains(&key) {
            shared.push(key);
        }
    }
    shared
}

fn clashes(a: &ScheduledSession, b: &ScheduledSession) -> bool {
    a.day_of_week == b.day_of_week
        && intervals_overlap(a.start_time, a.end_time, b.start_time, b.end_time)
}

fn scan(
    sessions: &[ScheduledSession],
    kind: ConflictType,
    bucketed: bool,
) -> Vec<ScheduleConflict> {
    let keys: Vec<Vec<&str>> = sessions.iter().map(|s| resource_keys(s, kind)).collect();
    let pairs = if bucketed {
        bucketed_pairs(sessions, &keys)
    } else {
        naive_pairs(sessions, &keys)
    };

    pairs
        .into_iter()
        .map(|(i, j)| build_conflict(sessions, kind, i, j, shared_keys(&keys[i], &keys[j])))
        .collect()
}

fn naive_pairs(sessions: &[ScheduledSession], keys: &[Vec<&str>]) -> BTreeSet<(usize, usize)> {
    let mut pairs = BTreeSet::new();
    for i in 0..sessions.len() {
        if keys[i].is_empty() {
            continue;
        }
        for j in (i + 1)..sessions.len() {
            if keys[j].is_empty() || !clashes(&sessions[i], &sessions[j]) {
                continue;
            }
            if keys[i].iter().any(|k| keys[j].contains(k)) {
                pairs.insert((i, j));
            }
        }
    }
    pairs
}

fn bucketed_pairs(sessions: &[ScheduledSession], keys: &[Vec<&str>]) -> BTreeSet<(usize, usize)> {
    let mut buckets: HashMap<(DayOfWeek, &str), Vec<usize>> = HashMap::new();
    for (i, session_keys) in keys.iter().enumerate() {
        for &key in session_keys {
            let bucket = buckets.entry((sessions[i].day_of_week, key)).or_default();
            // A session listing the same group twice lands here once.
            if bucket.last() != Some(&i) {
                bucket.push(i);
            }
        }
    }

    let mut pairs = BTreeSet::new();
    for members in buckets.values() {
        for (a, &i) in members.iter().enumerate() {
            for &j in &members[a + 1..] {
                if clashes(&sessions[i], &sessions[j]) {
                    pairs.insert((i, j));
                }
            }
        }
    }
    pairs
}

fn build_conflict(
    sessions: &[ScheduledSession],
    kind: ConflictType,
    i: usize,
    j: usize,
    shared: Vec<&str>,
) -> ScheduleConflict {
    let (a, b) = (&sessions[i], &sessions[j]);
    let ids = shared.join(", ");
    let what = match kind {
        ConflictType::VenueDoubleBooking => format!("Venue {ids} is double-booked"),
        ConflictType::LecturerConflict => format!("Lecturer {ids} is scheduled twice"),
        ConflictType::StudentGroupOverlap => {
            format!("Student group {ids} has overlapping sessions")
        }
    };

    ScheduleConflict {
        conflict_type: kind,
        session_indices: vec![i, j],
        session_ids: vec![a.id.clone(), b.id.clone()],
        resource_ids: shared.into_iter().map(String::from).collect(),
        description: format!(
            "{} on {}: {} ({}) overlaps {} ({})",
            what,
            a.day_of_week,
            a.id,
            time_range(a),
            b.id,
            time_range(b)
        ),
        severity: ConflictSeverity::Error,
    }
}
