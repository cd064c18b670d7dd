//! Constraint checking and legal-action enumeration.

use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{Assignment, Day, Schedule};

use super::{ActionKey, CatalogIndex, Occupancy, ReasonCount, RejectReason};

/// Side-effect-free validator for candidate placements.
///
/// Holds a shared catalog index; all mutable state comes in as
/// [`Occupancy`] arguments, so one checker serves any number of
/// concurrent episodes.
#[derive(Debug, Clone)]
pub struct ConstraintChecker {
    index: Arc<CatalogIndex>,
}

impl ConstraintChecker {
    /// Creates a checker over a validated catalog index.
    pub fn new(index: Arc<CatalogIndex>) -> Self {
        Self { index }
    }

    /// The catalog index this checker validates against.
    #[inline]
    pub fn index(&self) -> &CatalogIndex {
        &self.index
    }

    /// Checks one candidate assignment against the hard constraints.
    ///
    /// Accepts id-based assignments from the outside world; ids not in the
    /// catalog reject with [`RejectReason::UnknownEntity`]. The candidate's
    /// section must not already be placed in `occupancy`.
    pub fn check(&self, occupancy: &Occupancy, candidate: &Assignment) -> Result<(), RejectReason> {
        let section = self
            .index
            .section_index(&candidate.section_id)
            .ok_or(RejectReason::UnknownEntity)?;
        let room = self
            .index
            .room_index(&candidate.room_id)
            .ok_or(RejectReason::UnknownEntity)?;
        let slot = self
            .index
            .slot_index(&candidate.slot_id)
            .ok_or(RejectReason::UnknownEntity)?;
        let instructor = self
            .index
            .instructor_index(&candidate.instructor_id)
            .ok_or(RejectReason::UnknownEntity)?;
        self.check_key(
            occupancy,
            section,
            &ActionKey {
                room,
                slot,
                instructor,
            },
        )
    }

    /// Dense-index fast path of [`check`](Self::check).
    ///
    /// Constraint order: eligibility, capacity, span, then the occupancy
    /// checks across every slot of the span, then load.
    pub fn check_key(
        &self,
        occupancy: &Occupancy,
        section: usize,
        action: &ActionKey,
    ) -> Result<(), RejectReason> {
        debug_assert!(
            !occupancy.is_placed(section),
            "checking a candidate for an already-placed section"
        );
        let ix = &self.index;
        if !ix.eligible_rooms(section).contains(&action.room) {
            return Err(RejectReason::RoomIneligible);
        }
        if !ix.eligible_instructors(section).contains(&action.instructor) {
            return Err(RejectReason::InstructorIneligible);
        }
        let sec = ix.section(section);
        if !ix.room(action.room).fits(sec.enrollment) {
            return Err(RejectReason::CapacityExceeded);
        }
        let span = ix
            .slot_span(action.slot, sec.duration_slots)
            .ok_or(RejectReason::SlotSpanUnavailable)?;
        for &slot in span {
            if !ix.instructor_available(action.instructor, slot) {
                return Err(RejectReason::InstructorUnavailable);
            }
            if !occupancy.is_room_free(action.room, slot) {
                return Err(RejectReason::RoomTimeConflict);
            }
            if !occupancy.is_instructor_free(action.instructor, slot) {
                return Err(RejectReason::InstructorTimeConflict);
            }
        }
        let load = occupancy.load(action.instructor);
        if !ix
            .instructor(action.instructor)
            .load_allows(load, sec.duration_slots)
        {
            return Err(RejectReason::LoadExceeded);
        }
        Ok(())
    }

    /// Whether every catalog section is placed exactly once.
    pub fn is_complete(&self, schedule: &Schedule) -> bool {
        let mut seen = vec![false; self.index.section_count()];
        let mut distinct = 0;
        for a in &schedule.assignments {
            match self.index.section_index(&a.section_id) {
                Some(s) if !seen[s] => {
                    seen[s] = true;
                    distinct += 1;
                }
                _ => return false,
            }
        }
        distinct == self.index.section_count()
    }

    /// Enumerates every placement the hard constraints accept for a section.
    ///
    /// Walks the per-day slot grid and intersects the section's candidate
    /// rooms and eligible instructors with the occupancy indices, so the
    /// cost scales with the eligible sets rather than the full
    /// rooms x slots x instructors cube. Output order is deterministic:
    /// day, start position, room, instructor.
    pub fn legal_actions(&self, occupancy: &Occupancy, section: usize) -> Vec<ActionKey> {
        let ix = &self.index;
        let duration = ix.section_duration(section) as usize;
        let rooms = ix.candidate_rooms(section);
        let instructors = ix.eligible_instructors(section);
        let mut actions = Vec::new();
        if rooms.is_empty() || instructors.is_empty() || duration == 0 {
            return actions;
        }

        for day in 0..Day::ALL.len() {
            let day_list = ix.day_slots(day);
            if day_list.len() < duration {
                continue;
            }
            for pos in 0..=(day_list.len() - duration) {
                let span = &day_list[pos..pos + duration];
                let start = span[0];

                let free_rooms: Vec<usize> = rooms
                    .iter()
                    .copied()
                    .filter(|&r| span.iter().all(|&t| occupancy.is_room_free(r, t)))
                    .collect();
                if free_rooms.is_empty() {
                    continue;
                }

                let ok_instructors: Vec<usize> = instructors
                    .iter()
                    .copied()
                    .filter(|&i| {
                        span.iter().all(|&t| {
                            ix.instructor_available(i, t) && occupancy.is_instructor_free(i, t)
                        }) && ix
                            .instructor(i)
                            .load_allows(occupancy.load(i), duration as u32)
                    })
                    .collect();
                if ok_instructors.is_empty() {
                    continue;
                }

                for &room in &free_rooms {
                    for &instructor in &ok_instructors {
                        actions.push(ActionKey {
                            room,
                            slot: start,
                            instructor,
                        });
                    }
                }
            }
        }
        actions
    }

    /// Counts, per reject reason, how many candidate placements a section
    /// loses under the current occupancy.
    ///
    /// Walks the section's declared eligible sets against every start slot,
    /// recording the first failing constraint of each candidate. Sorted
    /// most-blocking first. Diagnostic path only.
    pub fn diagnose(&self, occupancy: &Occupancy, section: usize) -> Vec<ReasonCount> {
        let ix = &self.index;
        let mut counts: HashMap<RejectReason, u32> = HashMap::new();
        for &room in ix.eligible_rooms(section) {
            for slot in 0..ix.slot_count() {
                for &instructor in ix.eligible_instructors(section) {
                    let action = ActionKey {
                        room,
                        slot,
                        instructor,
                    };
                    if let Err(reason) = self.check_key(occupancy, section, &action) {
                        *counts.entry(reason).or_insert(0) += 1;
                    }
                }
            }
        }
        let mut out: Vec<ReasonCount> = counts
            .into_iter()
            .map(|(reason, count)| ReasonCount { reason, count })
            .collect();
        out.sort_by(|a, b| b.count.cmp(&a.count).then(a.reason.code().cmp(b.reason.code())));
        out
    }

    /// Converts a dense action back to an id-based assignment.
    pub fn to_assignment(&self, section: usize, action: &ActionKey) -> Assignment {
        let ix = &self.index;
        Assignment::new(
            ix.section(section).id.clone(),
            ix.room(action.room).id.clone(),
            ix.slot(action.slot).id.clone(),
            ix.instructor(action.instructor).id.clone(),
        )
    }
}
