//! Soft scheduling objectives.
//!
//! Each objective scores one candidate placement against the schedule built
//! so far, on a 0.0..=1.0 scale. Objectives never veto: hard feasibility is
//! the constraint layer's job, these only rank among legal placements.

use crate::constraints::{ActionKey, CatalogIndex, Occupancy};

/// A named soft objective over placement deltas.
///
/// Implementations must be pure: the same delta always scores the same.
pub trait SoftObjective: Send + Sync {
    /// Stable objective name, used in logs.
    fn name(&self) -> &str;

    /// Scores a candidate placement, higher is better.
    fn score(&self, delta: &ScheduleDelta<'_>) -> f64;
}

/// A candidate placement against the occupancy state it would extend.
///
/// `occupancy` reflects the schedule before the action is applied.
#[derive(Clone, Copy)]
pub struct ScheduleDelta<'a> {
    pub index: &'a CatalogIndex,
    pub occupancy: &'a Occupancy,
    pub section: usize,
    pub action: &'a ActionKey,
}

/// Scores 1.0 when the starting slot is one the section prefers.
#[derive(Debug, Default)]
pub struct TimePreference;

impl SoftObjective for TimePreference {
    fn name(&self) -> &str {
        "time_preference"
    }

    fn score(&self, delta: &ScheduleDelta<'_>) -> f64 {
        if delta.index.prefers(delta.section, delta.action.slot) {
            1.0
        } else {
            0.0
        }
    }
}

/// Favors assigning work to the currently least-loaded instructor.
///
/// Scores 1.0 for the instructor with the lowest teaching load so far and
/// 0.0 for the highest, interpolating linearly in between. When all loads
/// are equal any choice scores 1.0.
#[derive(Debug, Default)]
pub struct LoadBalance;

impl SoftObjective for LoadBalance {
    fn name(&self) -> &str {
        "load_balance"
    }

    fn score(&self, delta: &ScheduleDelta<'_>) -> f64 {
        let loads = delta.occupancy.loads();
        let mut min = u32::MAX;
        let mut max = 0u32;
        for &l in loads {
            min = min.min(l);
            max = max.max(l);
        }
        if max == min {
            return 1.0;
        }
        let own = loads[delta.action.instructor];
        1.0 - f64::from(own - min) / f64::from(max - min)
    }
}

/// Favors placements adjacent to existing bookings.
///
/// Back-to-back teaching blocks and consecutive room usage cut idle gaps
/// for instructors and setup churn for rooms. Half the score comes from
/// instructor adjacency, half from room adjacency: each is 1.0 when the
/// span borders a slot the same instructor (or room) already occupies.
#[derive(Debug, Default)]
pub struct Compactness;

impl SoftObjective for Compactness {
    fn name(&self) -> &str {
        "compactness"
    }

    fn score(&self, delta: &ScheduleDelta<'_>) -> f64 {
        let ix = delta.index;
        let duration = ix.section_duration(delta.section);
        let span = match ix.slot_span(delta.action.slot, duration) {
            Some(span) => span,
            None => return 0.0,
        };
        let first = span[0];
        let last = span[span.len() - 1];
        let (before, _) = ix.slot_neighbors(first);
        let (_, after) = ix.slot_neighbors(last);
        let neighbors = [before, after];

        let occ = delta.occupancy;
        let instructor_adjacent = neighbors
            .iter()
            .flatten()
            .any(|&slot| !occ.is_instructor_free(delta.action.instructor, slot));
        let room_adjacent = neighbors
            .iter()
            .flatten()
            .any(|&slot| !occ.is_room_free(delta.action.room, slot));

        0.5 * f64::from(u8::from(instructor_adjacent)) + 0.5 * f64::from(u8::from(room_adjacent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Catalog, Day, Instructor, Room, Section, TimeSlot};

    fn sample_index() -> CatalogIndex {
        let catalog = Catalog::new()
            .with_slot(TimeSlot::new("mon-1", Day::Monday, 540, 590))
            .with_slot(TimeSlot::new("mon-2", Day::Monday, 600, 650))
            .with_slot(TimeSlot::new("mon-3", Day::Monday, 660, 710))
            .with_slot(TimeSlot::new("tue-1", Day::Tuesday, 540, 590))
            .with_room(Room::new("R101", 40))
            .with_room(Room::new("R201", 40))
            .with_instructor(Instructor::new("smith"))
            .with_instructor(Instructor::new("jones"))
            .with_section(
                Section::new("CS101-A")
                    .with_enrollment(20)
                    .with_eligible_rooms(["R101", "R201"])
                    .with_eligible_instructors(["smith", "jones"])
                    .with_preferred_slot("mon-1"),
            )
            .with_section(
                Section::new("CS101-B")
                    .with_enrollment(20)
                    .with_eligible_rooms(["R101", "R201"])
                    .with_eligible_instructors(["smith", "jones"]),
            );
        CatalogIndex::build(catalog).unwrap()
    }

    #[test]
    fn test_time_preference_scores_preferred_start() {
        let ix = sample_index();
        let occ = Occupancy::new(&ix);
        let sec = ix.section_index("CS101-A").unwrap();
        let preferred = ActionKey {
            room: 0,
            slot: ix.slot_index("mon-1").unwrap(),
            instructor: 0,
        };
        let other = ActionKey {
            room: 0,
            slot: ix.slot_index("mon-2").unwrap(),
            instructor: 0,
        };

        let obj = TimePreference;
        let delta = |action| ScheduleDelta {
            index: &ix,
            occupancy: &occ,
            section: sec,
            action,
        };
        assert!((obj.score(&delta(&preferred)) - 1.0).abs() < 1e-10);
        assert!(obj.score(&delta(&other)).abs() < 1e-10);
    }

    #[test]
    fn test_load_balance_prefers_idle_instructor() {
        let ix = sample_index();
        let mut occ = Occupancy::new(&ix);
        let sec_a = ix.section_index("CS101-A").unwrap();
        let sec_b = ix.section_index("CS101-B").unwrap();
        let smith = ix.instructor_index("smith").unwrap();
        let jones = ix.instructor_index("jones").unwrap();
        occ.apply(
            &ix,
            sec_a,
            &ActionKey {
                room: 0,
                slot: ix.slot_index("mon-1").unwrap(),
                instructor: smith,
            },
        );

        let obj = LoadBalance;
        let slot = ix.slot_index("mon-2").unwrap();
        let to_smith = ActionKey {
            room: 0,
            slot,
            instructor: smith,
        };
        let to_jones = ActionKey {
            room: 0,
            slot,
            instructor: jones,
        };
        let delta = |action| ScheduleDelta {
            index: &ix,
            occupancy: &occ,
            section: sec_b,
            action,
        };
        assert!((obj.score(&delta(&to_jones)) - 1.0).abs() < 1e-10);
        assert!(obj.score(&delta(&to_smith)).abs() < 1e-10);
    }

    #[test]
    fn test_load_balance_equal_loads() {
        let ix = sample_index();
        let occ = Occupancy::new(&ix);
        let sec = ix.section_index("CS101-A").unwrap();
        let action = ActionKey {
            room: 0,
            slot: 0,
            instructor: 0,
        };
        let delta = ScheduleDelta {
            index: &ix,
            occupancy: &occ,
            section: sec,
            action: &action,
        };
        assert!((LoadBalance.score(&delta) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_compactness_rewards_adjacency() {
        let ix = sample_index();
        let mut occ = Occupancy::new(&ix);
        let sec_a = ix.section_index("CS101-A").unwrap();
        let sec_b = ix.section_index("CS101-B").unwrap();
        let smith = ix.instructor_index("smith").unwrap();
        occ.apply(
            &ix,
            sec_a,
            &ActionKey {
                room: 0,
                slot: ix.slot_index("mon-1").unwrap(),
                instructor: smith,
            },
        );

        let obj = Compactness;
        // Same room and instructor, right after the existing booking.
        let back_to_back = ActionKey {
            room: 0,
            slot: ix.slot_index("mon-2").unwrap(),
            instructor: smith,
        };
        // Same instructor only, with a one-slot gap.
        let gapped = ActionKey {
            room: 1,
            slot: ix.slot_index("mon-3").unwrap(),
            instructor: smith,
        };
        // Different day entirely.
        let isolated = ActionKey {
            room: 1,
            slot: ix.slot_index("tue-1").unwrap(),
            instructor: ix.instructor_index("jones").unwrap(),
        };
        let delta = |action| ScheduleDelta {
            index: &ix,
            occupancy: &occ,
            section: sec_b,
            action,
        };
        assert!((obj.score(&delta(&back_to_back)) - 1.0).abs() < 1e-10);
        assert!(obj.score(&delta(&gapped)).abs() < 1e-10);
        assert!(obj.score(&delta(&isolated)).abs() < 1e-10);
    }

    #[test]
    fn test_objectives_are_pure() {
        let ix = sample_index();
        let occ = Occupancy::new(&ix);
        let sec = ix.section_index("CS101-A").unwrap();
        let action = ActionKey {
            room: 0,
            slot: ix.slot_index("mon-1").unwrap(),
            instructor: 0,
        };
        let delta = ScheduleDelta {
            index: &ix,
            occupancy: &occ,
            section: sec,
            action: &action,
        };
        for obj in [
            &TimePreference as &dyn SoftObjective,
            &LoadBalance,
            &Compactness,
        ] {
            let first = obj.score(&delta);
            let second = obj.score(&delta);
            assert!(
                (first - second).abs() < 1e-10,
                "{} not pure",
                obj.name()
            );
        }
    }
}
