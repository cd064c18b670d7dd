//! Reinforcement-learning course timetabling engine.
//!
//! Builds weekly course schedules by treating timetabling as an episodic
//! decision process: sections are placed one at a time, a learned policy
//! picks among the placements the hard constraints accept, and repeated
//! rollouts plus a bounded repair search turn good episodes into complete
//! schedules.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Catalog`, `Section`, `Room`, `TimeSlot`,
//!   `Instructor`, `Schedule`, `Assignment`
//! - **`validation`**: Catalog integrity checks (duplicate IDs, dangling
//!   references, empty eligibility sets)
//! - **`constraints`**: Hard-constraint checking, reject reasons, the
//!   catalog index and occupancy state behind `legal_actions`
//! - **`reward`**: Terminal rewards and weighted soft objectives
//! - **`env`**: The episodic scheduling environment and section ordering
//! - **`agent`**: Tabular and linear policies with epsilon-greedy selection
//! - **`training`**: Batched Monte-Carlo training and convergence metrics
//! - **`generator`**: Greedy rollouts, repair, and the final schedule
//! - **`pipeline`**: One-call validate/train/generate surface
//! - **`error`**: `SchedulerError` and the infeasibility report
//!
//! # Architecture
//!
//! Everything downstream of `validation` works on a [`constraints::CatalogIndex`],
//! an immutable, id-resolved view of the catalog shared across threads. The
//! environment and the generator never produce an assignment the checker
//! rejects, so any schedule leaving this crate satisfies every hard
//! constraint by construction; infeasibility is reported, never papered over
//! with a silently partial result.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Sutton & Barto (2018), "Reinforcement Learning: An Introduction"
//! - Haralick & Elliott (1980), "Increasing Tree Search Efficiency for
//!   Constraint Satisfaction Problems"

pub mod agent;
pub mod constraints;
pub mod env;
pub mod error;
pub mod generator;
pub mod models;
pub mod pipeline;
pub mod reward;
pub mod training;
pub mod validation;
