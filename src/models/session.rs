//! Scheduled session model.
//!
//! A session is one placed teaching event: a course taught by a lecturer
//! in a venue to one or more student groups over a time interval.
//!
//! Sessions are immutable value objects. Moving a session means removing
//! it and inserting a replacement.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::DayOfWeek;

/// A placed teaching event.
///
/// References to course, lecturer and venue are optional because imported
/// rows are often incomplete. Checks that need a missing reference skip
/// the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledSession {
    /// Unique session identifier.
    pub id: String,
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub lecturer_id: Option<String>,
    #[serde(default)]
    pub venue_id: Option<String>,
    /// Attending student groups, in declaration order.
    #[serde(default)]
    pub student_group_ids: Vec<String>,
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    #[serde(default = "default_week")]
    pub week_number: u32,
}

fn default_week() -> u32 {
    1
}

/// Key identifying "the same day" for break and run-length checks.
pub type DayKey = (DayOfWeek, NaiveDate);

impl ScheduledSession {
    /// Creates a session with no references attached.
    pub fn new(
        id: impl Into<String>,
        day_of_week: DayOfWeek,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            course_id: None,
            lecturer_id: None,
            venue_id: None,
            student_group_ids: Vec::new(),
            day_of_week,
            start_time,
            end_time,
            week_number: 1,
        }
    }

    /// Sets the course.
    pub fn with_course(mut self, course_id: impl Into<String>) -> Self {
        self.course_id = Some(course_id.into());
        self
    }

    /// Sets the lecturer.
    pub fn with_lecturer(mut self, lecturer_id: impl Into<String>) -> Self {
        self.lecturer_id = Some(lecturer_id.into());
        self
    }

    /// Sets the venue.
    pub fn with_venue(mut self, venue_id: impl Into<String>) -> Self {
        self.venue_id = Some(venue_id.into());
        self
    }

    /// Attaches a student group.
    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.student_group_ids.push(group_id.into());
        self
    }

    /// Sets the week number.
    pub fn with_week(mut self, week_number: u32) -> Self {
        self.week_number = week_number;
        self
    }

    /// Whether `end_time > start_time`.
    #[inline]
    pub fn is_well_formed(&self) -> bool {
        self.end_time > self.start_time
    }

    /// Length in minutes (negative for malformed sessions).
    #[inline]
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    /// Length in fractional hours.
    #[inline]
    pub fn duration_hours(&self) -> f64 {
        (self.end_time - self.start_time).num_seconds() as f64 / 3600.0
    }

    /// Day of week plus calendar date of the start.
    #[inline]
    pub fn day_key(&self) -> DayKey {
        (self.day_of_week, self.start_time.date())
    }

    /// Whether the session is attended by the group.
    pub fn has_group(&self, group_id: &str) -> bool {
        self.student_group_ids.iter().any(|g| g == group_id)
    }

    /// Whether two sessions occupy overlapping time on the same day.
    ///
    /// Half-open intervals: touching endpoints do not overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.day_of_week == other.day_of_week
            && intervals_overlap(
                self.start_time,
                self.end_time,
                other.start_time,
                other.end_time,
            )
    }
}

/// Half-open interval overlap: `start1 < end2 && start2 < end1`.
#[inline]
pub fn intervals_overlap(
    start1: NaiveDateTime,
    end1: NaiveDateTime,
    start2: NaiveDateTime,
    end2: NaiveDateTime,
) -> bool {
    start1 < end2 && start2 < end1
}
