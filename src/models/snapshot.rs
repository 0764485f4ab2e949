//! Immutable reference data for one evaluation call.
//!
//! A snapshot bundles venues, lecturers, courses, student groups and the
//! constraint catalogue, indexed by id. Evaluators only read from it, so a
//! single snapshot can be shared across threads.

use std::collections::HashMap;

use super::{Constraint, Course, Lecturer, StudentGroup, Venue};

/// Entities and constraints an evaluation runs against.
///
/// When two entities of the same type share an id, lookups resolve to the
/// first one added. Duplicates are reported by
/// [`check_integrity`](crate::validation::check_integrity).
#[derive(Debug, Clone, Default)]
pub struct ScheduleSnapshot {
    venues: Vec<Venue>,
    lecturers: Vec<Lecturer>,
    courses: Vec<Course>,
    student_groups: Vec<StudentGroup>,
    constraints: Vec<Constraint>,
    venue_index: HashMap<String, usize>,
    lecturer_index: HashMap<String, usize>,
    course_index: HashMap<String, usize>,
    group_index: HashMap<String, usize>,
}

impl ScheduleSnapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from entity lists.
    pub fn from_parts(
        venues: Vec<Venue>,
        lecturers: Vec<Lecturer>,
        courses: Vec<Course>,
        student_groups: Vec<StudentGroup>,
        constraints: Vec<Constraint>,
    ) -> Self {
        let mut snapshot = Self::new();
        venues.into_iter().for_each(|v| snapshot.add_venue(v));
        lecturers.into_iter().for_each(|l| snapshot.add_lecturer(l));
        courses.into_iter().for_each(|c| snapshot.add_course(c));
        student_groups
            .into_iter()
            .for_each(|g| snapshot.add_student_group(g));
        snapshot.constraints = constraints;
        snapshot
    }

    /// Adds a venue.
    pub fn add_venue(&mut self, venue: Venue) {
        self.venue_index
            .entry(venue.id.clone())
            .or_insert(self.venues.len());
        self.venues.push(venue);
    }

    /// Adds a lecturer.
    pub fn add_lecturer(&mut self, lecturer: Lecturer) {
        self.lecturer_index
            .entry(lecturer.id.clone())
            .or_insert(self.lecturers.len());
        self.lecturers.push(lecturer);
    }

    /// Adds a course.
    pub fn add_course(&mut self, course: Course) {
        self.course_index
            .entry(course.id.clone())
            .or_insert(self.courses.len());
        self.courses.push(course);
    }

    /// Adds a student group.
    pub fn add_student_group(&mut self, group: StudentGroup) {
        self.group_index
            .entry(group.id.clone())
            .or_insert(self.student_groups.len());
        self.student_groups.push(group);
    }

    /// Adds a constraint to the catalogue.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Builder: adds a venue.
    pub fn with_venue(mut self, venue: Venue) -> Self {
        self.add_venue(venue);
        self
    }

    /// Builder: adds a lecturer.
    pub fn with_lecturer(mut self, lecturer: Lecturer) -> Self {
        self.add_lecturer(lecturer);
        self
    }

    /// Builder: adds a course.
    pub fn with_course(mut self, course: Course) -> Self {
        self.add_course(course);
        self
    }

    /// Builder: adds a student group.
    pub fn with_student_group(mut self, group: StudentGroup) -> Self {
        self.add_student_group(group);
        self
    }

    /// Builder: adds a constraint.
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.add_constraint(constraint);
        self
    }

    pub fn venue(&self, id: &str) -> Option<&Venue> {
        self.venue_index.get(id).map(|&i| &self.venues[i])
    }

    pub fn lecturer(&self, id: &str) -> Option<&Lecturer> {
        self.lecturer_index.get(id).map(|&i| &self.lecturers[i])
    }

    pub fn course(&self, id: &str) -> Option<&Course> {
        self.course_index.get(id).map(|&i| &self.courses[i])
    }

    pub fn student_group(&self, id: &str) -> Option<&StudentGroup> {
        self.group_index.get(id).map(|&i| &self.student_groups[i])
    }

    pub fn venues(&self) -> &[Venue] {
        &self.venues
    }

    pub fn lecturers(&self) -> &[Lecturer] {
        &self.lecturers
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn student_groups(&self) -> &[StudentGroup] {
        &self.student_groups
    }

    /// The full catalogue, including inactive constraints.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Active constraints only.
    pub fn active_constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(|c| c.is_active)
    }
}
