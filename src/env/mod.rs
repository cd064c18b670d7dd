//! Scheduling environment.
//!
//! Frames timetable construction as an episodic decision process:
//!
//! - [`SchedulingEnv`] visits sections in a configurable order and asks the
//!   agent to place each one.
//! - [`DecisionPoint`] carries the legal placements of the current section,
//!   each with a precomputed [`ActionFeatures`] view.
//! - [`Terminal`] distinguishes complete schedules from deadlocks.
//!
//! # Reference
//! Sutton & Barto (2018), "Reinforcement Learning: An Introduction", Ch. 3

mod environment;
mod features;
mod ordering;

pub use environment::{
    CandidateAction, DecisionPoint, EnvConfig, SchedulingEnv, StateKey, StepOutcome, StepResult,
    Terminal,
};
pub use features::{ActionFeatures, FEATURE_DIM};
pub use ordering::{
    CatalogOrder, LargestFirst, MostConstrainedFirst, OrderingStrategy, SectionOrdering,
};
