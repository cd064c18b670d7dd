//! Training orchestration.
//!
//! [`Trainer`] drives the episode loop: batches of episodes run in
//! parallel against a shared policy snapshot, the agent updates once per
//! batch, and [`TrainingStatus`] exposes moving-average reward, success
//! rate, and trend so callers can watch for convergence. Convergence and
//! divergence are reported, never enforced; the run completes its budget
//! unless explicitly configured to stop on plateau.

mod metrics;
mod trainer;

pub use metrics::{trend_slope, MovingAverage, TrainingStatus};
pub use trainer::{run_episode, run_episode_with, Trainer, TrainingConfig};
