//! Timetable constraints.
//!
//! A constraint is a configured rule instance: one of eight kinds, a
//! priority, an active flag, a soft-constraint weight, the entities it is
//! scoped to, and a kind-specific parameter block.
//!
//! Each kind carries its own typed parameters in [`ConstraintRule`], with
//! explicit defaults. Loosely-typed records are converted by
//! [`crate::payload`].

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::calendar::hhmm;

/// The eight constraint kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintType {
    /// Lecturer/venue must be available for the whole session.
    HardAvailability,
    /// Attending groups must fit in the venue.
    VenueCapacity,
    /// Venue must have the course's required equipment.
    EquipmentRequirement,
    /// Lecturer preferred windows, back-to-back avoidance, daily cap.
    LecturerPreference,
    /// Minimum gap between a student group's sessions.
    StudentBreak,
    /// Department latest end hour.
    DepartmentPolicy,
    /// Institution-wide teaching window.
    TimeWindow,
    /// Cap on a lecturer's run of back-to-back sessions.
    ConsecutiveSessions,
}

impl ConstraintType {
    /// All kinds, in declaration order.
    pub const ALL: [ConstraintType; 8] = [
        ConstraintType::HardAvailability,
        ConstraintType::VenueCapacity,
        ConstraintType::EquipmentRequirement,
        ConstraintType::LecturerPreference,
        ConstraintType::StudentBreak,
        ConstraintType::DepartmentPolicy,
        ConstraintType::TimeWindow,
        ConstraintType::ConsecutiveSessions,
    ];

    /// Wire name (e.g. `"VENUE_CAPACITY"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintType::HardAvailability => "HARD_AVAILABILITY",
            ConstraintType::VenueCapacity => "VENUE_CAPACITY",
            ConstraintType::EquipmentRequirement => "EQUIPMENT_REQUIREMENT",
            ConstraintType::LecturerPreference => "LECTURER_PREFERENCE",
            ConstraintType::StudentBreak => "STUDENT_BREAK",
            ConstraintType::DepartmentPolicy => "DEPARTMENT_POLICY",
            ConstraintType::TimeWindow => "TIME_WINDOW",
            ConstraintType::ConsecutiveSessions => "CONSECUTIVE_SESSIONS",
        }
    }

    /// Looks up a kind by wire name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|t| t.as_str() == upper)
    }
}

impl fmt::Display for ConstraintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constraint priority, ordered `Low < Medium < High < Critical`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    /// Looks up a priority by name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "LOW" => Some(Priority::Low),
            "MEDIUM" => Some(Priority::Medium),
            "HIGH" => Some(Priority::High),
            "CRITICAL" => Some(Priority::Critical),
            _ => None,
        }
    }
}

/// Whether a violation invalidates the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Hard,
    Soft,
}

impl Severity {
    /// `Hard` for critical constraints, `Soft` otherwise.
    pub fn from_priority(priority: Priority) -> Self {
        if priority == Priority::Critical {
            Severity::Hard
        } else {
            Severity::Soft
        }
    }
}

/// Default minimum break between a group's sessions (minutes).
pub const DEFAULT_MIN_BREAK_MINUTES: u32 = 15;
/// Default latest end hour for department policies.
pub const DEFAULT_MAX_END_HOUR: u32 = 18;
/// Default longest allowed run of consecutive sessions.
pub const DEFAULT_MAX_CONSECUTIVE: usize = 3;

/// Parameters for [`ConstraintType::StudentBreak`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentBreakRule {
    pub min_break_minutes: u32,
}

impl Default for StudentBreakRule {
    fn default() -> Self {
        Self {
            min_break_minutes: DEFAULT_MIN_BREAK_MINUTES,
        }
    }
}

/// Parameters for [`ConstraintType::DepartmentPolicy`].
///
/// A session violates when the hour of its end time is greater than
/// `max_end_hour`, so 18:45 passes an 18:00 policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentPolicyRule {
    pub max_end_hour: u32,
}

impl Default for DepartmentPolicyRule {
    fn default() -> Self {
        Self {
            max_end_hour: DEFAULT_MAX_END_HOUR,
        }
    }
}

/// Parameters for [`ConstraintType::TimeWindow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindowRule {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl Default for TimeWindowRule {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN),
            end: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

/// Parameters for [`ConstraintType::ConsecutiveSessions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsecutiveRule {
    pub max_consecutive: usize,
}

impl Default for ConsecutiveRule {
    fn default() -> Self {
        Self {
            max_consecutive: DEFAULT_MAX_CONSECUTIVE,
        }
    }
}

/// Kind plus typed parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintRule {
    HardAvailability,
    VenueCapacity,
    EquipmentRequirement,
    LecturerPreference,
    StudentBreak(StudentBreakRule),
    DepartmentPolicy(DepartmentPolicyRule),
    TimeWindow(TimeWindowRule),
    ConsecutiveSessions(ConsecutiveRule),
}

impl ConstraintRule {
    /// The rule's kind.
    pub fn kind(&self) -> ConstraintType {
        match self {
            ConstraintRule::HardAvailability => ConstraintType::HardAvailability,
            ConstraintRule::VenueCapacity => ConstraintType::VenueCapacity,
            ConstraintRule::EquipmentRequirement => ConstraintType::EquipmentRequirement,
            ConstraintRule::LecturerPreference => ConstraintType::LecturerPreference,
            ConstraintRule::StudentBreak(_) => ConstraintType::StudentBreak,
            ConstraintRule::DepartmentPolicy(_) => ConstraintType::DepartmentPolicy,
            ConstraintRule::TimeWindow(_) => ConstraintType::TimeWindow,
            ConstraintRule::ConsecutiveSessions(_) => ConstraintType::ConsecutiveSessions,
        }
    }

    /// The default rule for a kind.
    pub fn default_for(kind: ConstraintType) -> Self {
        match kind {
            ConstraintType::HardAvailability => ConstraintRule::HardAvailability,
            ConstraintType::VenueCapacity => ConstraintRule::VenueCapacity,
            ConstraintType::EquipmentRequirement => ConstraintRule::EquipmentRequirement,
            ConstraintType::LecturerPreference => ConstraintRule::LecturerPreference,
            ConstraintType::StudentBreak => ConstraintRule::StudentBreak(Default::default()),
            ConstraintType::DepartmentPolicy => {
                ConstraintRule::DepartmentPolicy(Default::default())
            }
            ConstraintType::TimeWindow => ConstraintRule::TimeWindow(Default::default()),
            ConstraintType::ConsecutiveSessions => {
                ConstraintRule::ConsecutiveSessions(Default::default())
            }
        }
    }
}

/// A configured rule instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraint {
    /// Unique constraint identifier.
    pub id: String,
    #[serde(flatten)]
    pub rule: ConstraintRule,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Weight in [0, 1]; only meaningful for soft violations.
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Lecturers, venues, courses, groups or departments in scope.
    /// Empty = every entity.
    #[serde(default)]
    pub entity_ids: BTreeSet<String>,
}

fn default_active() -> bool {
    true
}

fn default_weight() -> f64 {
    1.0
}

impl Constraint {
    /// Creates an active, medium-priority constraint with weight 1.0.
    pub fn new(id: impl Into<String>, rule: ConstraintRule) -> Self {
        Self {
            id: id.into(),
            rule,
            priority: Priority::default(),
            is_active: true,
            weight: 1.0,
            entity_ids: BTreeSet::new(),
        }
    }

    /// Creates a constraint of the given kind with default parameters.
    pub fn of_kind(id: impl Into<String>, kind: ConstraintType) -> Self {
        Self::new(id, ConstraintRule::default_for(kind))
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the weight, clamped to [0, 1].
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight.clamp(0.0, 1.0);
        self
    }

    /// Adds an entity to the scope.
    pub fn for_entity(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_ids.insert(entity_id.into());
        self
    }

    /// Marks the constraint inactive.
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// The constraint's kind.
    #[inline]
    pub fn kind(&self) -> ConstraintType {
        self.rule.kind()
    }

    /// Whether the entity is in scope. An empty scope matches everything.
    pub fn applies_to(&self, entity_id: &str) -> bool {
        self.entity_ids.is_empty() || self.entity_ids.contains(entity_id)
    }

    /// Like [`applies_to`](Self::applies_to) for an optional reference.
    /// A missing reference is only in scope when the scope is empty.
    pub fn applies_to_opt(&self, entity_id: Option<&str>) -> bool {
        match entity_id {
            Some(id) => self.applies_to(id),
            None => self.entity_ids.is_empty(),
        }
    }

    /// Whether any of the entities is in scope.
    pub fn applies_to_any<'a>(&self, mut ids: impl Iterator<Item = &'a str>) -> bool {
        self.entity_ids.is_empty() || ids.any(|id| self.entity_ids.contains(id))
    }
}
