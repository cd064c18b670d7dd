//! Catalog model.
//!
//! The catalog bundles the immutable inputs of one scheduling run: sections
//! to place, rooms, the weekly slot grid, and the teaching staff. It is
//! loaded once per run and shared by reference across every episode.

use serde::{Deserialize, Serialize};

use super::{Day, Instructor, Room, Section, TimeSlot};

/// Immutable input set for a scheduling run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Sections to be placed.
    pub sections: Vec<Section>,
    /// Available rooms.
    pub rooms: Vec<Room>,
    /// The weekly slot grid.
    pub slots: Vec<TimeSlot>,
    /// Teaching staff.
    pub instructors: Vec<Instructor>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a section.
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Adds a room.
    pub fn with_room(mut self, room: Room) -> Self {
        self.rooms.push(room);
        self
    }

    /// Adds a time slot.
    pub fn with_slot(mut self, slot: TimeSlot) -> Self {
        self.slots.push(slot);
        self
    }

    /// Adds an instructor.
    pub fn with_instructor(mut self, instructor: Instructor) -> Self {
        self.instructors.push(instructor);
        self
    }

    /// Finds a section by id.
    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Finds a room by id.
    pub fn room(&self, id: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    /// Finds a slot by id.
    pub fn slot(&self, id: &str) -> Option<&TimeSlot> {
        self.slots.iter().find(|s| s.id == id)
    }

    /// Finds an instructor by id.
    pub fn instructor(&self, id: &str) -> Option<&Instructor> {
        self.instructors.iter().find(|i| i.id == id)
    }

    /// Total teaching demand across all sections, in slot units.
    pub fn total_demand_slots(&self) -> u64 {
        self.sections.iter().map(|s| s.duration_slots as u64).sum()
    }

    /// Slots touching a `[start, end)` minute window on a day.
    ///
    /// Useful for campus-wide blocked windows (e.g., a lunch break): build
    /// the grid without the returned slots, or mark instructors unavailable
    /// in them.
    pub fn slots_overlapping(&self, day: Day, start_minute: u32, end_minute: u32) -> Vec<&TimeSlot> {
        self.slots
            .iter()
            .filter(|s| s.overlaps_range(day, start_minute, end_minute))
            .collect()
    }
}
