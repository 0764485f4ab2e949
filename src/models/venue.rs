//! Venue model.
//!
//! Venues are the rooms sessions are held in. Each has a seating capacity,
//! an equipment set, and an optional weekly availability pattern.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{DayOfWeek, WeeklyAvailability};

/// A room that can host sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    /// Unique venue identifier.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Number of seats.
    pub capacity: u32,
    /// Installed equipment (e.g. "PROJECTOR", "COMPUTER").
    #[serde(default)]
    pub equipment: BTreeSet<String>,
    /// Weekly availability. Empty = always available.
    #[serde(default)]
    pub availability: WeeklyAvailability,
    /// Building or campus, if known.
    #[serde(default)]
    pub building: Option<String>,
}

impl Venue {
    /// Creates a venue with the given capacity.
    pub fn new(id: impl Into<String>, capacity: u32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            capacity,
            equipment: BTreeSet::new(),
            availability: WeeklyAvailability::new(),
            building: None,
        }
    }

    /// Sets the venue name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds an equipment item.
    pub fn with_equipment(mut self, item: impl Into<String>) -> Self {
        self.equipment.insert(item.into());
        self
    }

    /// Sets the availability pattern.
    pub fn with_availability(mut self, availability: WeeklyAvailability) -> Self {
        self.availability = availability;
        self
    }

    /// Sets the building.
    pub fn with_building(mut self, building: impl Into<String>) -> Self {
        self.building = Some(building.into());
        self
    }

    /// Whether the venue has an equipment item.
    pub fn has_equipment(&self, item: &str) -> bool {
        self.equipment.contains(item)
    }

    /// Whether the venue is open for the whole interval.
    ///
    /// Returns `true` if no availability is configured. Otherwise an
    /// interval running past midnight is never covered.
    pub fn is_available(&self, day: DayOfWeek, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.availability.is_empty() || self.availability.covers_span(day, start, end)
    }
}
