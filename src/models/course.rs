//! Course and student group models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A course that sessions teach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Unique course identifier.
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub department: Option<String>,
    /// Equipment every venue hosting this course must have.
    #[serde(default)]
    pub required_equipment: BTreeSet<String>,
    /// Nominal session length in minutes.
    #[serde(default)]
    pub duration_minutes: Option<u32>,
}

impl Course {
    /// Creates a course with no requirements.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            department: None,
            required_equipment: BTreeSet::new(),
            duration_minutes: None,
        }
    }

    /// Sets the course name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the department.
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// Adds a required equipment item.
    pub fn requiring(mut self, item: impl Into<String>) -> Self {
        self.required_equipment.insert(item.into());
        self
    }

    /// Sets the nominal duration.
    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }
}

/// A cohort of students attending sessions together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentGroup {
    /// Unique group identifier.
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Number of students.
    pub size: u32,
    #[serde(default)]
    pub department: Option<String>,
}

impl StudentGroup {
    /// Creates a group of the given size.
    pub fn new(id: impl Into<String>, size: u32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            size,
            department: None,
        }
    }

    /// Sets the group name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the department.
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }
}
