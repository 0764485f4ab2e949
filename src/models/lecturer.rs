//! Lecturer model.
//!
//! Lecturers carry a strict weekly availability pattern and a block of
//! soft preferences used by the preference and consecutive-session rules.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{DayOfWeek, WeeklyAvailability};

/// A lecturer who teaches sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lecturer {
    /// Unique lecturer identifier.
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub department: Option<String>,
    /// Weekly availability. A day without windows is unavailable.
    #[serde(default)]
    pub availability: WeeklyAvailability,
    #[serde(default)]
    pub preferences: LecturerPreferences,
}

/// Soft teaching preferences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LecturerPreferences {
    /// Preferred teaching windows. Empty = no preference.
    #[serde(default)]
    pub preferred_times: WeeklyAvailability,
    #[serde(default)]
    pub max_hours_per_day: Option<f64>,
    #[serde(default)]
    pub max_hours_per_week: Option<f64>,
    /// Minimum break between classes, in minutes.
    #[serde(default)]
    pub min_break_between_classes: Option<u32>,
    #[serde(default)]
    pub avoid_back_to_back: bool,
}

impl Lecturer {
    /// Creates a lecturer with no availability and default preferences.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            department: None,
            availability: WeeklyAvailability::new(),
            preferences: LecturerPreferences::default(),
        }
    }

    /// Sets the lecturer name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the department.
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// Sets the availability pattern.
    pub fn with_availability(mut self, availability: WeeklyAvailability) -> Self {
        self.availability = availability;
        self
    }

    /// Sets the preference block.
    pub fn with_preferences(mut self, preferences: LecturerPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// Whether some availability window on `day` covers the interval.
    /// An interval running past midnight is never covered.
    pub fn is_available(&self, day: DayOfWeek, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.availability.covers_span(day, start, end)
    }
}

impl LecturerPreferences {
    /// Sets the preferred windows.
    pub fn with_preferred_times(mut self, preferred: WeeklyAvailability) -> Self {
        self.preferred_times = preferred;
        self
    }

    /// Sets the daily teaching cap.
    pub fn with_max_hours_per_day(mut self, hours: f64) -> Self {
        self.max_hours_per_day = Some(hours);
        self
    }

    /// Sets the weekly teaching cap.
    pub fn with_max_hours_per_week(mut self, hours: f64) -> Self {
        self.max_hours_per_week = Some(hours);
        self
    }

    /// Sets the minimum break between classes.
    pub fn with_min_break(mut self, minutes: u32) -> Self {
        self.min_break_between_classes = Some(minutes);
        self
    }

    /// Opts into avoiding back-to-back sessions.
    pub fn avoiding_back_to_back(mut self) -> Self {
        self.avoid_back_to_back = true;
        self
    }

    /// Whether the interval sits inside a preferred window.
    ///
    /// Always `true` when no preferred windows are set. Otherwise an
    /// interval running past midnight is never preferred.
    pub fn prefers(&self, day: DayOfWeek, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.preferred_times.is_empty() || self.preferred_times.covers_span(day, start, end)
    }
}
