//! Reward shaping for the scheduling environment.
//!
//! The reward function turns terminal outcomes and per-step placement
//! quality into a single scalar signal:
//!
//! - **Success bonus**: flat reward when every section gets placed.
//! - **Deadlock penalty**: scales with the number of sections left
//!   unscheduled, so deeper progress always dominates an earlier stall.
//! - **Step shaping**: a weighted sum of named soft objectives scored on
//!   each accepted placement.
//!
//! The function is pure: scores depend only on the inputs passed in, never
//! on interior mutable state.
//!
//! # Reference
//! Sutton & Barto (2018), "Reinforcement Learning: An Introduction", Ch. 3

mod objectives;

pub use objectives::{Compactness, LoadBalance, ScheduleDelta, SoftObjective, TimePreference};

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constraints::{ActionKey, CatalogIndex, Occupancy};
use crate::models::Schedule;

/// Tunable weights of the reward signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardWeights {
    /// Flat bonus for reaching a complete schedule.
    pub success_bonus: f64,
    /// Penalty per unscheduled section on deadlock.
    pub deadlock_penalty_per_unscheduled: f64,
    /// Weight of the preferred-slot objective.
    pub time_preference_weight: f64,
    /// Weight of the instructor load-balance objective.
    pub load_balance_weight: f64,
    /// Weight of the schedule-compactness objective.
    pub compactness_weight: f64,
}

impl Default for RewardWeights {
    fn default() -> Self {
        Self {
            success_bonus: 10.0,
            deadlock_penalty_per_unscheduled: 2.0,
            time_preference_weight: 0.3,
            load_balance_weight: 0.3,
            compactness_weight: 0.2,
        }
    }
}

/// Weighted composition of soft objectives plus the terminal rewards.
///
/// Built from [`RewardWeights`] with the three standard objectives;
/// additional objectives can be stacked with
/// [`with_objective`](Self::with_objective).
#[derive(Clone)]
pub struct RewardFunction {
    weights: RewardWeights,
    objectives: Vec<(Arc<dyn SoftObjective>, f64)>,
}

impl RewardFunction {
    /// Builds the standard reward function from a weight set.
    pub fn from_weights(weights: RewardWeights) -> Self {
        let objectives: Vec<(Arc<dyn SoftObjective>, f64)> = vec![
            (Arc::new(TimePreference), weights.time_preference_weight),
            (Arc::new(LoadBalance), weights.load_balance_weight),
            (Arc::new(Compactness), weights.compactness_weight),
        ];
        Self {
            weights,
            objectives,
        }
    }

    /// Adds a custom soft objective with its weight.
    pub fn with_objective(mut self, objective: Arc<dyn SoftObjective>, weight: f64) -> Self {
        self.objectives.push((objective, weight));
        self
    }

    /// The weight set this function was built from.
    #[inline]
    pub fn weights(&self) -> &RewardWeights {
        &self.weights
    }

    /// Shaping reward for one accepted placement.
    pub fn step_score(&self, delta: &ScheduleDelta<'_>) -> f64 {
        self.objectives
            .iter()
            .map(|(objective, weight)| weight * objective.score(delta))
            .sum()
    }

    /// Terminal reward for a complete schedule.
    #[inline]
    pub fn success_bonus(&self) -> f64 {
        self.weights.success_bonus
    }

    /// Terminal reward for a deadlock with `unscheduled` sections left.
    #[inline]
    pub fn deadlock_penalty(&self, unscheduled: usize) -> f64 {
        -self.weights.deadlock_penalty_per_unscheduled * unscheduled as f64
    }

    /// Total shaping score of a schedule, replayed placement by placement.
    ///
    /// Used to rank complete schedules from different rollouts. Assignments
    /// whose ids are not in the catalog contribute nothing.
    pub fn schedule_score(&self, index: &CatalogIndex, schedule: &Schedule) -> f64 {
        let mut occupancy = Occupancy::new(index);
        let mut total = 0.0;
        for assignment in &schedule.assignments {
            let resolved = (
                index.section_index(&assignment.section_id),
                index.room_index(&assignment.room_id),
                index.slot_index(&assignment.slot_id),
                index.instructor_index(&assignment.instructor_id),
            );
            let (Some(section), Some(room), Some(slot), Some(instructor)) = resolved else {
                debug_assert!(false, "schedule references ids outside the catalog");
                continue;
            };
            let action = ActionKey {
                room,
                slot,
                instructor,
            };
            total += self.step_score(&ScheduleDelta {
                index,
                occupancy: &occupancy,
                section,
                action: &action,
            });
            occupancy.apply(index, section, &action);
        }
        total
    }
}
