//! Error taxonomy of the scheduling engine.
//!
//! Catalog problems surface before any episode runs; feasibility problems
//! surface after generation has exhausted its rollouts and repair budget,
//! always carrying the best partial schedule and the constraints that
//! blocked the rest. Training divergence is deliberately not an error:
//! it is reported through `TrainingStatus` and the run continues.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constraints::ReasonCount;
use crate::models::Schedule;
use crate::validation::CatalogError;

/// A section the generator could not place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockedSection {
    pub section_id: String,
    /// Per-reason counts of rejected candidate placements, most
    /// blocking first.
    pub reasons: Vec<ReasonCount>,
}

/// Best partial schedule plus the sections that would not fit.
///
/// Returned inside errors so a caller can surface "what we got and why
/// not more" instead of a bare failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfeasibleReport {
    /// The most complete partial schedule any attempt reached.
    pub scheduled: Schedule,
    /// Sections left out, in visit order.
    pub unscheduled: Vec<BlockedSection>,
}

impl InfeasibleReport {
    /// Number of sections left unscheduled.
    #[inline]
    pub fn unscheduled_count(&self) -> usize {
        self.unscheduled.len()
    }
}

/// Errors surfaced by generation and the pipeline.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The catalog failed validation; no episode was attempted.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Rollouts and repair both ended short of a complete schedule.
    #[error("no complete schedule found, {} section(s) unplaced", report.unscheduled_count())]
    Infeasible { report: InfeasibleReport },

    /// The wall-clock budget ran out during generation.
    #[error("schedule generation timed out after {elapsed_ms} ms")]
    Timeout {
        elapsed_ms: u64,
        /// Best partial state at the moment the budget expired.
        report: InfeasibleReport,
    },
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, SchedulerError>;
