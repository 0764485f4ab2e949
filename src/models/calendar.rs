//! Weekly calendar models.
//!
//! Defines days of the week, time-of-day windows, and weekly availability
//! patterns for venues and lecturers.
//!
//! # Time Model
//! Session timestamps are full `NaiveDateTime` values, but availability and
//! preference windows repeat weekly, so they are expressed as a day plus a
//! time-of-day range.
//!
//! # Precedence
//! An empty availability list means "always available". Otherwise a session
//! is covered iff one window on the session's day contains the whole
//! session interval.

use chrono::{NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PayloadError;

/// Day of the week a session is held on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    /// All days, Monday first.
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    /// Upper-case name as used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "MONDAY",
            DayOfWeek::Tuesday => "TUESDAY",
            DayOfWeek::Wednesday => "WEDNESDAY",
            DayOfWeek::Thursday => "THURSDAY",
            DayOfWeek::Friday => "FRIDAY",
            DayOfWeek::Saturday => "SATURDAY",
            DayOfWeek::Sunday => "SUNDAY",
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

impl FromStr for DayOfWeek {
    type Err = PayloadError;

    /// Accepts full names and three-letter abbreviations, any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let day = match lower.as_str() {
            "monday" | "mon" => DayOfWeek::Monday,
            "tuesday" | "tue" => DayOfWeek::Tuesday,
            "wednesday" | "wed" => DayOfWeek::Wednesday,
            "thursday" | "thu" => DayOfWeek::Thursday,
            "friday" | "fri" => DayOfWeek::Friday,
            "saturday" | "sat" => DayOfWeek::Saturday,
            "sunday" | "sun" => DayOfWeek::Sunday,
            _ => return Err(PayloadError::UnknownDay(s.to_string())),
        };
        Ok(day)
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A time-of-day interval [start, end).
///
/// Half-open interval: includes start, excludes end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    /// Interval start (inclusive).
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    /// Interval end (exclusive).
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
}

impl TimeWindow {
    /// Creates a new time window.
    pub fn new(start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            start_time,
            end_time,
        }
    }

    /// Creates a window from whole hours and minutes.
    ///
    /// Out-of-range values saturate to midnight.
    pub fn hm(start_hour: u32, start_min: u32, end_hour: u32, end_min: u32) -> Self {
        Self::new(
            time_or_midnight(start_hour, start_min),
            time_or_midnight(end_hour, end_min),
        )
    }

    /// Duration of this window in minutes.
    #[inline]
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    /// Whether a time of day falls within this window.
    #[inline]
    pub fn contains(&self, time: NaiveTime) -> bool {
        time >= self.start_time && time < self.end_time
    }

    /// Whether the interval [start, end] lies entirely inside this window.
    ///
    /// The session end may coincide with the window end.
    #[inline]
    pub fn covers(&self, start: NaiveTime, end: NaiveTime) -> bool {
        start >= self.start_time && end <= self.end_time
    }

    /// Whether two windows overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start_time < other.end_time && other.start_time < self.end_time
    }
}

/// A time window bound to a day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayWindow {
    pub day_of_week: DayOfWeek,
    #[serde(flatten)]
    pub window: TimeWindow,
}

impl DayWindow {
    /// Creates a window on the given day.
    pub fn new(day_of_week: DayOfWeek, window: TimeWindow) -> Self {
        Self {
            day_of_week,
            window,
        }
    }
}

/// Weekly availability pattern.
///
/// Whether an empty pattern means "always" or "never" is decided by the
/// caller; see [`WeeklyAvailability::covers`] and
/// [`WeeklyAvailability::covers_strict`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklyAvailability {
    windows: Vec<DayWindow>,
}

impl WeeklyAvailability {
    /// Creates an empty pattern.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a window on a day.
    pub fn with_window(mut self, day: DayOfWeek, window: TimeWindow) -> Self {
        self.windows.push(DayWindow::new(day, window));
        self
    }

    /// All windows, in insertion order.
    pub fn windows(&self) -> &[DayWindow] {
        &self.windows
    }

    /// Windows on a given day.
    pub fn windows_on(&self, day: DayOfWeek) -> impl Iterator<Item = &TimeWindow> {
        self.windows
            .iter()
            .filter(move |w| w.day_of_week == day)
            .map(|w| &w.window)
    }

    /// Whether no windows are defined.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Whether the interval is covered, treating an empty pattern as
    /// always available.
    pub fn covers(&self, day: DayOfWeek, start: NaiveTime, end: NaiveTime) -> bool {
        self.is_empty() || self.covers_strict(day, start, end)
    }

    /// Whether some window on `day` covers the interval. An empty pattern
    /// covers nothing.
    pub fn covers_strict(&self, day: DayOfWeek, start: NaiveTime, end: NaiveTime) -> bool {
        self.windows_on(day).any(|w| w.covers(start, end))
    }

    /// [`covers_strict`](Self::covers_strict) for absolute times. An
    /// interval ending on a later date than it starts fits in no window.
    pub fn covers_span(&self, day: DayOfWeek, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        start.date() == end.date() && self.covers_strict(day, start.time(), end.time())
    }
}

impl FromIterator<DayWindow> for WeeklyAvailability {
    fn from_iter<I: IntoIterator<Item = DayWindow>>(iter: I) -> Self {
        Self {
            windows: iter.into_iter().collect(),
        }
    }
}

fn time_or_midnight(hour: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, min, 0)
        .unwrap_or(NaiveTime::MIN)
}

/// Parses `"HH:MM"` or `"HH:MM:SS"`.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime, PayloadError> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| PayloadError::InvalidTime(s.to_string()))
}

/// Formats a time of day as `"HH:MM"`.
pub fn format_time_of_day(time: NaiveTime) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

/// Serde adapter for `"HH:MM"` times.
pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_time_of_day(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_time_of_day(&s).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_time_window() {
        let w = TimeWindow::hm(9, 0, 12, 0);
        assert_eq!(w.duration_minutes(), 180);
        assert!(w.contains(t(9, 0)));
        assert!(w.contains(t(11, 59)));
        assert!(!w.contains(t(12, 0))); // exclusive end
        assert!(!w.contains(t(8, 30)));
    }

    #[test]
    fn test_time_window_covers_boundary() {
        let w = TimeWindow::hm(9, 0, 12, 0);
        assert!(w.covers(t(9, 0), t(12, 0)));
        assert!(w.covers(t(10, 0), t(11, 0)));
        assert!(!w.covers(t(8, 59), t(10, 0)));
        assert!(!w.covers(t(11, 0), t(12, 1)));
    }

    #[test]
    fn test_time_window_overlap() {
        let a = TimeWindow::hm(9, 0, 10, 0);
        let b = TimeWindow::hm(9, 30, 10, 30);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));

        let c = TimeWindow::hm(10, 0, 11, 0); // touching but not overlapping
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_weekly_availability_empty_is_always() {
        let avail = WeeklyAvailability::new();
        assert!(avail.covers(DayOfWeek::Sunday, t(3, 0), t(4, 0)));
        assert!(!avail.covers_strict(DayOfWeek::Sunday, t(3, 0), t(4, 0)));
    }

    #[test]
    fn test_weekly_availability_day_matching() {
        let avail = WeeklyAvailability::new()
            .with_window(DayOfWeek::Monday, TimeWindow::hm(8, 0, 12, 0))
            .with_window(DayOfWeek::Monday, TimeWindow::hm(13, 0, 17, 0));

        assert!(avail.covers(DayOfWeek::Monday, t(9, 0), t(10, 0)));
        assert!(avail.covers(DayOfWeek::Monday, t(13, 0), t(17, 0)));
        // Spans the lunch gap: no single window covers it.
        assert!(!avail.covers(DayOfWeek::Monday, t(11, 0), t(14, 0)));
        assert!(!avail.covers(DayOfWeek::Tuesday, t(9, 0), t(10, 0)));
        assert_eq!(avail.windows_on(DayOfWeek::Monday).count(), 2);
    }

    #[test]
    fn test_covers_span_rejects_next_day_end() {
        let avail = WeeklyAvailability::new()
            .with_window(DayOfWeek::Monday, TimeWindow::hm(0, 0, 23, 0));
        let monday = chrono::NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
        let tuesday = chrono::NaiveDate::from_ymd_opt(2024, 9, 3).unwrap();

        let evening = monday.and_time(t(20, 0));
        let late = monday.and_time(t(22, 0));
        assert!(avail.covers_span(DayOfWeek::Monday, evening, late));
        // 22:00 Mon to 01:00 Tue: both times of day fall inside 00:00-23:00.
        let past_midnight = tuesday.and_time(t(1, 0));
        assert!(!avail.covers_span(DayOfWeek::Monday, late, past_midnight));
    }

    #[test]
    fn test_day_parsing() {
        assert_eq!("MONDAY".parse::<DayOfWeek>().unwrap(), DayOfWeek::Monday);
        assert_eq!("fri".parse::<DayOfWeek>().unwrap(), DayOfWeek::Friday);
        assert_eq!(" Sunday ".parse::<DayOfWeek>().unwrap(), DayOfWeek::Sunday);
        assert!("someday".parse::<DayOfWeek>().is_err());
        assert_eq!(DayOfWeek::from(Weekday::Wed), DayOfWeek::Wednesday);
    }

    #[test]
    fn test_time_of_day_parsing() {
        assert_eq!(parse_time_of_day("08:30").unwrap(), t(8, 30));
        assert_eq!(parse_time_of_day("18:00:00").unwrap(), t(18, 0));
        assert!(parse_time_of_day("25:00").is_err());
        assert_eq!(format_time_of_day(t(7, 5)), "07:05");
    }

    #[test]
    fn test_day_window_serde() {
        let w = DayWindow::new(DayOfWeek::Tuesday, TimeWindow::hm(9, 0, 11, 30));
        let json = serde_json::to_value(w).unwrap();
        assert_eq!(json["dayOfWeek"], "TUESDAY");
        assert_eq!(json["startTime"], "09:00");
        assert_eq!(json["endTime"], "11:30");

        let back: DayWindow = serde_json::from_value(json).unwrap();
        assert_eq!(back, w);
    }
}
