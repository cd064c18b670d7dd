//! Time slot model.
//!
//! The scheduling horizon is a discrete grid of teaching periods. Slots are
//! totally ordered within a day by start time; slots on different days never
//! overlap but still compare for load-spread purposes via the day order.
//!
//! # Reference
//! Schaerf (1999), "A Survey of Automated Timetabling", Sec. 2

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Day of the week, ordered Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    /// All days in order.
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    /// Zero-based position in the week (Monday = 0).
    #[inline]
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Short display label.
    pub fn label(&self) -> &'static str {
        match self {
            Day::Monday => "Mon",
            Day::Tuesday => "Tue",
            Day::Wednesday => "Wed",
            Day::Thursday => "Thu",
            Day::Friday => "Fri",
            Day::Saturday => "Sat",
            Day::Sunday => "Sun",
        }
    }
}

/// A teaching period on the weekly grid.
///
/// The interval is half-open: `[start_minute, end_minute)`. Two slots whose
/// boundaries touch do not overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Unique slot identifier.
    pub id: String,
    /// Day this slot belongs to.
    pub day: Day,
    /// Start, in minutes from midnight.
    pub start_minute: u32,
    /// End, in minutes from midnight (exclusive).
    pub end_minute: u32,
}

impl TimeSlot {
    /// Creates a new time slot.
    pub fn new(id: impl Into<String>, day: Day, start_minute: u32, end_minute: u32) -> Self {
        Self {
            id: id.into(),
            day,
            start_minute,
            end_minute,
        }
    }

    /// Slot length in minutes.
    #[inline]
    pub fn duration_minutes(&self) -> u32 {
        self.end_minute.saturating_sub(self.start_minute)
    }

    /// Whether two slots occupy overlapping wall-clock time.
    ///
    /// Slots on different days never overlap.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.day == other.day
            && self.start_minute < other.end_minute
            && other.start_minute < self.end_minute
    }

    /// Whether two slots are back-to-back on the same day.
    pub fn is_adjacent_to(&self, other: &TimeSlot) -> bool {
        self.day == other.day
            && (self.end_minute == other.start_minute || other.end_minute == self.start_minute)
    }

    /// Whether a `[start, end)` minute range on a day touches this slot.
    pub fn overlaps_range(&self, day: Day, start_minute: u32, end_minute: u32) -> bool {
        self.day == day && self.start_minute < end_minute && start_minute < self.end_minute
    }
}

impl PartialOrd for TimeSlot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeSlot {
    /// Grid order: by day, then start time, then end time, then id.
    fn cmp(&self, other: &Self) -> Ordering {
        (self.day, self.start_minute, self.end_minute, &self.id).cmp(&(
            other.day,
            other.start_minute,
            other.end_minute,
            &other.id,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_order_and_index() {
        assert!(Day::Monday < Day::Friday);
        assert_eq!(Day::Monday.index(), 0);
        assert_eq!(Day::Sunday.index(), 6);
        assert_eq!(Day::Wednesday.label(), "Wed");
    }

    #[test]
    fn test_slot_duration() {
        let s = TimeSlot::new("mon-1", Day::Monday, 540, 590);
        assert_eq!(s.duration_minutes(), 50);
    }

    #[test]
    fn test_overlap_same_day() {
        let a = TimeSlot::new("a", Day::Monday, 540, 590);
        let b = TimeSlot::new("b", Day::Monday, 560, 610);
        let c = TimeSlot::new("c", Day::Monday, 590, 640);

        assert!(a.overlaps(&b));
        // Half-open: touching boundaries do not overlap.
        assert!(!a.overlaps(&c));
        assert!(a.is_adjacent_to(&c));
    }

    #[test]
    fn test_overlap_cross_day() {
        let a = TimeSlot::new("a", Day::Monday, 540, 590);
        let b = TimeSlot::new("b", Day::Tuesday, 540, 590);
        assert!(!a.overlaps(&b));
        assert!(!a.is_adjacent_to(&b));
    }

    #[test]
    fn test_overlaps_range() {
        let s = TimeSlot::new("mon-lunch", Day::Monday, 720, 770);
        assert!(s.overlaps_range(Day::Monday, 720, 750));
        assert!(s.overlaps_range(Day::Monday, 700, 721));
        assert!(!s.overlaps_range(Day::Monday, 770, 800));
        assert!(!s.overlaps_range(Day::Tuesday, 720, 750));
    }

    #[test]
    fn test_grid_order() {
        let mut slots = vec![
            TimeSlot::new("tue-1", Day::Tuesday, 540, 590),
            TimeSlot::new("mon-2", Day::Monday, 600, 650),
            TimeSlot::new("mon-1", Day::Monday, 540, 590),
        ];
        slots.sort();
        let ids: Vec<&str> = slots.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["mon-1", "mon-2", "tue-1"]);
    }
}
