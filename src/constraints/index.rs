//! Dense catalog view.
//!
//! The engine never touches id strings on its hot paths. [`CatalogIndex`]
//! validates a catalog once, interns every id to a dense index, and
//! precomputes the per-day slot order, eligibility lists, and the
//! capacity-filtered room candidates each section can actually use.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::models::{Catalog, Day, Instructor, Room, Section, TimeSlot};
use crate::validation::{validate_catalog, CatalogError};

/// A validated catalog with dense indices and derived lookup tables.
///
/// Construction runs full catalog validation; an index can therefore only
/// exist for a well-formed catalog. Shared across episodes via `Arc`.
#[derive(Debug)]
pub struct CatalogIndex {
    catalog: Arc<Catalog>,
    section_ix: HashMap<String, usize>,
    room_ix: HashMap<String, usize>,
    slot_ix: HashMap<String, usize>,
    instructor_ix: HashMap<String, usize>,
    /// Slot indices per day, in grid order.
    day_slots: Vec<Vec<usize>>,
    /// For each slot: (day index, position within the day).
    slot_pos: Vec<(usize, usize)>,
    /// Per section: eligible rooms as declared.
    eligible_rooms: Vec<Vec<usize>>,
    /// Per section: eligible rooms that also seat the enrollment.
    candidate_rooms: Vec<Vec<usize>>,
    /// Per section: eligible instructors as declared.
    eligible_instructors: Vec<Vec<usize>>,
    /// Per section: preferred starting slots.
    preferred_slots: Vec<HashSet<usize>>,
    /// Per instructor: unavailable slots.
    unavailable: Vec<HashSet<usize>>,
}

impl CatalogIndex {
    /// Validates the catalog and builds the dense view.
    pub fn build(catalog: Catalog) -> Result<Self, CatalogError> {
        validate_catalog(&catalog)?;
        let catalog = Arc::new(catalog);

        let section_ix: HashMap<String, usize> = catalog
            .sections
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();
        let room_ix: HashMap<String, usize> = catalog
            .rooms
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.clone(), i))
            .collect();
        let slot_ix: HashMap<String, usize> = catalog
            .slots
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();
        let instructor_ix: HashMap<String, usize> = catalog
            .instructors
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.clone(), i))
            .collect();

        let mut day_slots: Vec<Vec<usize>> = vec![Vec::new(); Day::ALL.len()];
        for (i, slot) in catalog.slots.iter().enumerate() {
            day_slots[slot.day.index()].push(i);
        }
        for list in &mut day_slots {
            list.sort_by(|&a, &b| catalog.slots[a].cmp(&catalog.slots[b]));
        }
        let mut slot_pos = vec![(0, 0); catalog.slots.len()];
        for (day, list) in day_slots.iter().enumerate() {
            for (pos, &slot) in list.iter().enumerate() {
                slot_pos[slot] = (day, pos);
            }
        }

        let mut eligible_rooms = Vec::with_capacity(catalog.sections.len());
        let mut candidate_rooms = Vec::with_capacity(catalog.sections.len());
        let mut eligible_instructors = Vec::with_capacity(catalog.sections.len());
        let mut preferred_slots = Vec::with_capacity(catalog.sections.len());
        for section in &catalog.sections {
            let rooms: Vec<usize> = section
                .eligible_rooms
                .iter()
                .map(|id| room_ix[id.as_str()])
                .collect();
            let fitting: Vec<usize> = rooms
                .iter()
                .copied()
                .filter(|&r| catalog.rooms[r].fits(section.enrollment))
                .collect();
            let instructors: Vec<usize> = section
                .eligible_instructors
                .iter()
                .map(|id| instructor_ix[id.as_str()])
                .collect();
            let preferred: HashSet<usize> = section
                .preferred_slots
                .iter()
                .map(|id| slot_ix[id.as_str()])
                .collect();
            eligible_rooms.push(rooms);
            candidate_rooms.push(fitting);
            eligible_instructors.push(instructors);
            preferred_slots.push(preferred);
        }

        let unavailable: Vec<HashSet<usize>> = catalog
            .instructors
            .iter()
            .map(|i| {
                i.unavailable_slots
                    .iter()
                    .map(|id| slot_ix[id.as_str()])
                    .collect()
            })
            .collect();

        Ok(Self {
            catalog,
            section_ix,
            room_ix,
            slot_ix,
            instructor_ix,
            day_slots,
            slot_pos,
            eligible_rooms,
            candidate_rooms,
            eligible_instructors,
            preferred_slots,
            unavailable,
        })
    }

    /// The underlying catalog.
    #[inline]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[inline]
    pub fn section_count(&self) -> usize {
        self.catalog.sections.len()
    }

    #[inline]
    pub fn room_count(&self) -> usize {
        self.catalog.rooms.len()
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.catalog.slots.len()
    }

    #[inline]
    pub fn instructor_count(&self) -> usize {
        self.catalog.instructors.len()
    }

    #[inline]
    pub fn section(&self, ix: usize) -> &Section {
        &self.catalog.sections[ix]
    }

    #[inline]
    pub fn room(&self, ix: usize) -> &Room {
        &self.catalog.rooms[ix]
    }

    #[inline]
    pub fn slot(&self, ix: usize) -> &TimeSlot {
        &self.catalog.slots[ix]
    }

    #[inline]
    pub fn instructor(&self, ix: usize) -> &Instructor {
        &self.catalog.instructors[ix]
    }

    /// Dense index of a section id.
    pub fn section_index(&self, id: &str) -> Option<usize> {
        self.section_ix.get(id).copied()
    }

    /// Dense index of a room id.
    pub fn room_index(&self, id: &str) -> Option<usize> {
        self.room_ix.get(id).copied()
    }

    /// Dense index of a slot id.
    pub fn slot_index(&self, id: &str) -> Option<usize> {
        self.slot_ix.get(id).copied()
    }

    /// Dense index of an instructor id.
    pub fn instructor_index(&self, id: &str) -> Option<usize> {
        self.instructor_ix.get(id).copied()
    }

    /// Section duration in slot units.
    #[inline]
    pub fn section_duration(&self, section: usize) -> u32 {
        self.catalog.sections[section].duration_slots
    }

    /// Slot indices of one day, in grid order.
    #[inline]
    pub fn day_slots(&self, day: usize) -> &[usize] {
        &self.day_slots[day]
    }

    /// (day index, position within day) of a slot.
    #[inline]
    pub fn slot_position(&self, slot: usize) -> (usize, usize) {
        self.slot_pos[slot]
    }

    /// The `duration` consecutive grid slots starting at `start`.
    ///
    /// Returns `None` when the span would run off the end of the day.
    /// Consecutive means adjacent in the day's slot sequence; short breaks
    /// between periods do not interrupt a span.
    pub fn slot_span(&self, start: usize, duration: u32) -> Option<&[usize]> {
        let (day, pos) = self.slot_pos[start];
        let list = &self.day_slots[day];
        let end = pos.checked_add(duration as usize)?;
        if duration == 0 || end > list.len() {
            return None;
        }
        Some(&list[pos..end])
    }

    /// Grid neighbors of a slot within its day: (previous, next).
    pub fn slot_neighbors(&self, slot: usize) -> (Option<usize>, Option<usize>) {
        let (day, pos) = self.slot_pos[slot];
        let list = &self.day_slots[day];
        let prev = pos.checked_sub(1).map(|p| list[p]);
        let next = list.get(pos + 1).copied();
        (prev, next)
    }

    /// Eligible rooms of a section, as declared.
    #[inline]
    pub fn eligible_rooms(&self, section: usize) -> &[usize] {
        &self.eligible_rooms[section]
    }

    /// Eligible rooms that also seat the section's enrollment.
    #[inline]
    pub fn candidate_rooms(&self, section: usize) -> &[usize] {
        &self.candidate_rooms[section]
    }

    /// Eligible instructors of a section.
    #[inline]
    pub fn eligible_instructors(&self, section: usize) -> &[usize] {
        &self.eligible_instructors[section]
    }

    /// Whether a section prefers a starting slot.
    #[inline]
    pub fn prefers(&self, section: usize, slot: usize) -> bool {
        self.preferred_slots[section].contains(&slot)
    }

    /// Whether an instructor can teach in a slot.
    #[inline]
    pub fn instructor_available(&self, instructor: usize, slot: usize) -> bool {
        !self.unavailable[instructor].contains(&slot)
    }

    /// Maximum teaching load of an instructor, in slot units.
    #[inline]
    pub fn instructor_max_load(&self, instructor: usize) -> u32 {
        self.catalog.instructors[instructor].max_load_slots
    }

    /// Total teaching demand across all sections, in slot units.
    pub fn total_demand_slots(&self) -> u64 {
        self.catalog.total_demand_slots()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Day, Instructor, Room, Section, TimeSlot};

    fn sample_catalog() -> Catalog {
        Catalog::new()
            .with_slot(TimeSlot::new("mon-2", Day::Monday, 600, 650))
            .with_slot(TimeSlot::new("mon-1", Day::Monday, 540, 590))
            .with_slot(TimeSlot::new("tue-1", Day::Tuesday, 540, 590))
            .with_room(Room::new("R101", 40))
            .with_room(Room::new("R201", 20))
            .with_instructor(Instructor::new("smith").with_unavailable_slot("tue-1"))
            .with_section(
                Section::new("CS101-A")
                    .with_duration(2)
                    .with_enrollment(30)
                    .with_eligible_rooms(["R101", "R201"])
                    .with_eligible_instructor("smith")
                    .with_preferred_slot("mon-1"),
            )
    }

    #[test]
    fn test_build_rejects_invalid_catalog() {
        let catalog = Catalog::new().with_section(Section::new("orphan"));
        assert!(CatalogIndex::build(catalog).is_err());
    }

    #[test]
    fn test_day_slots_sorted_by_grid_order() {
        let ix = CatalogIndex::build(sample_catalog()).unwrap();
        let monday = ix.day_slots(Day::Monday.index());
        let ids: Vec<&str> = monday.iter().map(|&s| ix.slot(s).id.as_str()).collect();
        assert_eq!(ids, vec!["mon-1", "mon-2"]);
    }

    #[test]
    fn test_slot_span() {
        let ix = CatalogIndex::build(sample_catalog()).unwrap();
        let mon1 = ix.slot_index("mon-1").unwrap();
        let mon2 = ix.slot_index("mon-2").unwrap();
        let tue1 = ix.slot_index("tue-1").unwrap();

        let span = ix.slot_span(mon1, 2).unwrap();
        assert_eq!(span, &[mon1, mon2]);

        // Off the end of the day.
        assert!(ix.slot_span(mon2, 2).is_none());
        assert!(ix.slot_span(tue1, 2).is_none());
        assert!(ix.slot_span(mon1, 0).is_none());
    }

    #[test]
    fn test_slot_neighbors() {
        let ix = CatalogIndex::build(sample_catalog()).unwrap();
        let mon1 = ix.slot_index("mon-1").unwrap();
        let mon2 = ix.slot_index("mon-2").unwrap();
        let tue1 = ix.slot_index("tue-1").unwrap();

        assert_eq!(ix.slot_neighbors(mon1), (None, Some(mon2)));
        assert_eq!(ix.slot_neighbors(mon2), (Some(mon1), None));
        assert_eq!(ix.slot_neighbors(tue1), (None, None));
    }

    #[test]
    fn test_candidate_rooms_filtered_by_capacity() {
        let ix = CatalogIndex::build(sample_catalog()).unwrap();
        let sec = ix.section_index("CS101-A").unwrap();
        let r101 = ix.room_index("R101").unwrap();

        // R201 seats 20 < 30 enrolled, so only R101 survives.
        assert_eq!(ix.eligible_rooms(sec).len(), 2);
        assert_eq!(ix.candidate_rooms(sec), &[r101]);
    }

    #[test]
    fn test_availability_and_preference() {
        let ix = CatalogIndex::build(sample_catalog()).unwrap();
        let sec = ix.section_index("CS101-A").unwrap();
        let smith = ix.instructor_index("smith").unwrap();
        let mon1 = ix.slot_index("mon-1").unwrap();
        let tue1 = ix.slot_index("tue-1").unwrap();

        assert!(ix.instructor_available(smith, mon1));
        assert!(!ix.instructor_available(smith, tue1));
        assert!(ix.prefers(sec, mon1));
        assert!(!ix.prefers(sec, tue1));
    }
}
