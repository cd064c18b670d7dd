//! Action feature extraction.
//!
//! Parametric agents generalize across placements through a fixed-width
//! numeric view of each candidate action. Features are computed once, when
//! the environment enumerates the legal actions of a decision point, and
//! travel with the action through episode traces.

use serde::{Deserialize, Serialize};

use crate::constraints::{ActionKey, CatalogIndex, Occupancy};

/// Number of features per action.
pub const FEATURE_DIM: usize = 9;

/// Fixed-width feature vector of one candidate placement.
///
/// All features are scaled to roughly 0.0..=1.0 so a linear value function
/// starts on an even footing:
///
/// 0. bias, always 1.0
/// 1. seat utilization: enrollment over room capacity
/// 2. preferred starting slot flag
/// 3. instructor load after placing, over total demand
/// 4. instructor teaches an adjacent slot
/// 5. room is booked in an adjacent slot
/// 6. start position within the day grid
/// 7. instructor already teaches that day
/// 8. episode progress: share of sections already placed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionFeatures([f64; FEATURE_DIM]);

impl ActionFeatures {
    /// Wraps a raw feature vector.
    #[inline]
    pub fn from_values(values: [f64; FEATURE_DIM]) -> Self {
        Self(values)
    }

    /// Extracts features for one candidate action.
    ///
    /// `occupancy` is the state before the action; the action itself must
    /// already have passed the hard constraints.
    pub fn extract(
        index: &CatalogIndex,
        occupancy: &Occupancy,
        section: usize,
        action: &ActionKey,
    ) -> Self {
        let sec = index.section(section);
        let room = index.room(action.room);
        let duration = sec.duration_slots;

        let seat_utilization = if room.capacity > 0 {
            f64::from(sec.enrollment) / f64::from(room.capacity)
        } else {
            0.0
        };
        let preferred = f64::from(u8::from(index.prefers(section, action.slot)));

        let demand = index.total_demand_slots().max(1) as f64;
        let load_after = f64::from(occupancy.load(action.instructor) + duration) / demand;

        let (instructor_adjacent, room_adjacent) = match index.slot_span(action.slot, duration) {
            Some(span) => {
                let (before, _) = index.slot_neighbors(span[0]);
                let (_, after) = index.slot_neighbors(span[span.len() - 1]);
                let neighbors = [before, after];
                let instructor = neighbors
                    .iter()
                    .flatten()
                    .any(|&s| !occupancy.is_instructor_free(action.instructor, s));
                let room = neighbors
                    .iter()
                    .flatten()
                    .any(|&s| !occupancy.is_room_free(action.room, s));
                (f64::from(u8::from(instructor)), f64::from(u8::from(room)))
            }
            None => (0.0, 0.0),
        };

        let (day, pos) = index.slot_position(action.slot);
        let day_len = index.day_slots(day).len();
        let start_position = if day_len > 1 {
            pos as f64 / (day_len - 1) as f64
        } else {
            0.0
        };
        let same_day = f64::from(u8::from(occupancy.instructor_busy_on_day(
            index,
            action.instructor,
            day,
        )));

        let total = index.section_count().max(1) as f64;
        let progress = occupancy.placed_count() as f64 / total;

        Self([
            1.0,
            seat_utilization,
            preferred,
            load_after,
            instructor_adjacent,
            room_adjacent,
            start_position,
            same_day,
            progress,
        ])
    }

    /// The raw feature values.
    #[inline]
    pub fn values(&self) -> &[f64; FEATURE_DIM] {
        &self.0
    }

    /// Dot product with a weight vector of the same width.
    #[inline]
    pub fn dot(&self, weights: &[f64; FEATURE_DIM]) -> f64 {
        self.0
            .iter()
            .zip(weights.iter())
            .map(|(x, w)| x * w)
            .sum()
    }
}
