//! Course section model.
//!
//! A section is the schedulable unit: one offering of a course that needs a
//! room, a starting slot, and an instructor. Sections spanning more than one
//! slot occupy consecutive periods of a single day.
//!
//! # Reference
//! Schaerf (1999), "A Survey of Automated Timetabling", Sec. 3

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A schedulable unit of a course.
///
/// `eligible_rooms` and `eligible_instructors` must be non-empty; catalog
/// validation rejects sections that cannot be placed anywhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Unique section identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Parent course code (e.g., "CS-101").
    pub course_code: String,
    /// Number of consecutive slots the section occupies (>= 1).
    pub duration_slots: u32,
    /// Expected enrollment; assigned rooms must seat at least this many.
    pub enrollment: u32,
    /// Rooms this section may use, in preference-free catalog order.
    pub eligible_rooms: Vec<String>,
    /// Instructors qualified to teach this section.
    pub eligible_instructors: Vec<String>,
    /// Starting slots the section would prefer (soft).
    pub preferred_slots: Vec<String>,
    /// Domain-specific metadata (e.g., program, semester).
    pub attributes: HashMap<String, String>,
}

impl Section {
    /// Creates a new single-slot section.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            course_code: String::new(),
            duration_slots: 1,
            enrollment: 0,
            eligible_rooms: Vec::new(),
            eligible_instructors: Vec::new(),
            preferred_slots: Vec::new(),
            attributes: HashMap::new(),
        }
    }

    /// Sets the section name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the parent course code.
    pub fn with_course_code(mut self, code: impl Into<String>) -> Self {
        self.course_code = code.into();
        self
    }

    /// Sets the duration in slot units.
    pub fn with_duration(mut self, slots: u32) -> Self {
        self.duration_slots = slots;
        self
    }

    /// Sets the expected enrollment.
    pub fn with_enrollment(mut self, enrollment: u32) -> Self {
        self.enrollment = enrollment;
        self
    }

    /// Adds an eligible room.
    pub fn with_eligible_room(mut self, room_id: impl Into<String>) -> Self {
        self.eligible_rooms.push(room_id.into());
        self
    }

    /// Adds several eligible rooms.
    pub fn with_eligible_rooms<I, S>(mut self, room_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.eligible_rooms
            .extend(room_ids.into_iter().map(Into::into));
        self
    }

    /// Adds an eligible instructor.
    pub fn with_eligible_instructor(mut self, instructor_id: impl Into<String>) -> Self {
        self.eligible_instructors.push(instructor_id.into());
        self
    }

    /// Adds several eligible instructors.
    pub fn with_eligible_instructors<I, S>(mut self, instructor_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.eligible_instructors
            .extend(instructor_ids.into_iter().map(Into::into));
        self
    }

    /// Adds a preferred starting slot.
    pub fn with_preferred_slot(mut self, slot_id: impl Into<String>) -> Self {
        self.preferred_slots.push(slot_id.into());
        self
    }

    /// Adds a domain-specific attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Whether a room id is in the eligible set.
    pub fn allows_room(&self, room_id: &str) -> bool {
        self.eligible_rooms.iter().any(|r| r == room_id)
    }

    /// Whether an instructor id is in the eligible set.
    pub fn allows_instructor(&self, instructor_id: &str) -> bool {
        self.eligible_instructors.iter().any(|i| i == instructor_id)
    }

    /// Whether a slot id is among the preferred starting slots.
    pub fn prefers(&self, slot_id: &str) -> bool {
        self.preferred_slots.iter().any(|s| s == slot_id)
    }

    /// Number of eligible room x instructor combinations.
    ///
    /// A rough tightness measure: sections with fewer combinations have
    /// fewer ways to be placed.
    #[inline]
    pub fn placement_combinations(&self) -> usize {
        self.eligible_rooms.len() * self.eligible_instructors.len()
    }
}
