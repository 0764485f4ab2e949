//! Timetable domain models.
//!
//! Provides the reference data (venues, lecturers, courses, student
//! groups), the placed sessions being evaluated, the constraint catalogue,
//! and the diagnostic records evaluation produces.
//!
//! # Time Model
//!
//! | Type | Granularity |
//! |------|-------------|
//! | ScheduledSession | absolute `NaiveDateTime` start/end |
//! | WeeklyAvailability | repeating day + time-of-day windows |
//! | TimeWindowRule | time of day only |

pub(crate) mod calendar;
mod constraint;
mod course;
mod lecturer;
mod report;
mod session;
mod snapshot;
mod venue;

pub use calendar::{
    format_time_of_day, parse_time_of_day, DayOfWeek, DayWindow, TimeWindow, WeeklyAvailability,
};
pub use constraint::{
    ConsecutiveRule, Constraint, ConstraintRule, ConstraintType, DepartmentPolicyRule, Priority,
    Severity, StudentBreakRule, TimeWindowRule, DEFAULT_MAX_CONSECUTIVE, DEFAULT_MAX_END_HOUR,
    DEFAULT_MIN_BREAK_MINUTES,
};
pub use course::{Course, StudentGroup};
pub use lecturer::{Lecturer, LecturerPreferences};
pub use report::{ConflictSeverity, ConflictType, ConstraintViolation, ScheduleConflict};
pub use session::{intervals_overlap, DayKey, ScheduledSession};
pub use snapshot::ScheduleSnapshot;
pub use venue::Venue;
