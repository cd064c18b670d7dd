//! Schedule (solution) model.
//!
//! A schedule is an ordered collection of assignments, one per section once
//! complete. During construction it is partial; the constraint layer decides
//! what may be added, the schedule itself is plain data.
//!
//! # Reference
//! Schaerf (1999), "A Survey of Automated Timetabling", Sec. 2

use serde::{Deserialize, Serialize};

/// A section placed in a room, at a starting slot, with an instructor.
///
/// Sections longer than one slot occupy `duration_slots` consecutive periods
/// beginning at `slot_id`; the assignment records only the start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Assigned section ID.
    pub section_id: String,
    /// Assigned room ID.
    pub room_id: String,
    /// Starting slot ID.
    pub slot_id: String,
    /// Assigned instructor ID.
    pub instructor_id: String,
}

impl Assignment {
    /// Creates a new assignment.
    pub fn new(
        section_id: impl Into<String>,
        room_id: impl Into<String>,
        slot_id: impl Into<String>,
        instructor_id: impl Into<String>,
    ) -> Self {
        Self {
            section_id: section_id.into(),
            room_id: room_id.into(),
            slot_id: slot_id.into(),
            instructor_id: instructor_id.into(),
        }
    }
}

/// An ordered collection of assignments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Assignments in placement order.
    pub assignments: Vec<Assignment>,
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an assignment.
    pub fn add_assignment(&mut self, assignment: Assignment) {
        self.assignments.push(assignment);
    }

    /// Removes and returns the most recently added assignment.
    pub fn pop_assignment(&mut self) -> Option<Assignment> {
        self.assignments.pop()
    }

    /// Finds the assignment for a given section.
    pub fn assignment_for_section(&self, section_id: &str) -> Option<&Assignment> {
        self.assignments
            .iter()
            .find(|a| a.section_id == section_id)
    }

    /// Whether a section is already placed.
    pub fn contains_section(&self, section_id: &str) -> bool {
        self.assignment_for_section(section_id).is_some()
    }

    /// Returns all assignments for a given instructor.
    pub fn assignments_for_instructor(&self, instructor_id: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.instructor_id == instructor_id)
            .collect()
    }

    /// Returns all assignments for a given room.
    pub fn assignments_for_room(&self, room_id: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.room_id == room_id)
            .collect()
    }

    /// Number of assignments.
    #[inline]
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }

    /// Whether the schedule holds no assignments.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}
