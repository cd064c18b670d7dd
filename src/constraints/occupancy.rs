//! Incremental occupancy indices.
//!
//! Tracks which (room, slot) and (instructor, slot) pairs a partial
//! schedule occupies, plus per-instructor load and per-section placement.
//! Apply and remove are exact inverses, which is what lets the repair
//! search backtrack without rebuilding state.

use std::collections::HashSet;

use super::{ActionKey, CatalogIndex};

/// Mutable per-episode occupancy state.
///
/// Cloned once per episode; the catalog index it refers to is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupancy {
    room_busy: HashSet<(usize, usize)>,
    instructor_busy: HashSet<(usize, usize)>,
    instructor_load: Vec<u32>,
    section_placed: Vec<bool>,
    placed_count: usize,
}

impl Occupancy {
    /// Creates empty occupancy state sized for a catalog.
    pub fn new(index: &CatalogIndex) -> Self {
        Self {
            room_busy: HashSet::new(),
            instructor_busy: HashSet::new(),
            instructor_load: vec![0; index.instructor_count()],
            section_placed: vec![false; index.section_count()],
            placed_count: 0,
        }
    }

    /// Records a placement across its full slot span.
    ///
    /// The action must have passed the constraint check; `apply` does not
    /// re-validate.
    pub fn apply(&mut self, index: &CatalogIndex, section: usize, action: &ActionKey) {
        let duration = index.section_duration(section);
        let span = match index.slot_span(action.slot, duration) {
            Some(span) => span,
            None => {
                debug_assert!(false, "apply called with an invalid slot span");
                return;
            }
        };
        for &slot in span {
            let fresh_room = self.room_busy.insert((action.room, slot));
            let fresh_instructor = self.instructor_busy.insert((action.instructor, slot));
            debug_assert!(fresh_room && fresh_instructor, "double-booked occupancy");
        }
        self.instructor_load[action.instructor] += duration;
        debug_assert!(!self.section_placed[section]);
        self.section_placed[section] = true;
        self.placed_count += 1;
    }

    /// Reverts a placement recorded by [`apply`](Self::apply).
    pub fn remove(&mut self, index: &CatalogIndex, section: usize, action: &ActionKey) {
        let duration = index.section_duration(section);
        let span = match index.slot_span(action.slot, duration) {
            Some(span) => span,
            None => {
                debug_assert!(false, "remove called with an invalid slot span");
                return;
            }
        };
        for &slot in span {
            self.room_busy.remove(&(action.room, slot));
            self.instructor_busy.remove(&(action.instructor, slot));
        }
        self.instructor_load[action.instructor] =
            self.instructor_load[action.instructor].saturating_sub(duration);
        debug_assert!(self.section_placed[section]);
        self.section_placed[section] = false;
        self.placed_count = self.placed_count.saturating_sub(1);
    }

    /// Whether a room is free in a slot.
    #[inline]
    pub fn is_room_free(&self, room: usize, slot: usize) -> bool {
        !self.room_busy.contains(&(room, slot))
    }

    /// Whether an instructor is free in a slot.
    #[inline]
    pub fn is_instructor_free(&self, instructor: usize, slot: usize) -> bool {
        !self.instructor_busy.contains(&(instructor, slot))
    }

    /// Current load of an instructor, in slot units.
    #[inline]
    pub fn load(&self, instructor: usize) -> u32 {
        self.instructor_load[instructor]
    }

    /// Loads of all instructors, indexed densely.
    #[inline]
    pub fn loads(&self) -> &[u32] {
        &self.instructor_load
    }

    /// Whether a section has been placed.
    #[inline]
    pub fn is_placed(&self, section: usize) -> bool {
        self.section_placed[section]
    }

    /// Number of placed sections.
    #[inline]
    pub fn placed_count(&self) -> usize {
        self.placed_count
    }

    /// Whether an instructor already teaches somewhere on a day.
    pub fn instructor_busy_on_day(&self, index: &CatalogIndex, instructor: usize, day: usize) -> bool {
        index
            .day_slots(day)
            .iter()
            .any(|&slot| !self.is_instructor_free(instructor, slot))
    }
}
