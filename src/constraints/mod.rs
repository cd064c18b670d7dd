//! Hard-constraint layer.
//!
//! Everything that decides whether a placement is allowed lives here:
//!
//! - [`RejectReason`]: why a candidate assignment was refused
//! - [`CatalogIndex`]: dense, validated view of a catalog
//! - [`Occupancy`]: incremental room/instructor occupancy indices
//! - [`ConstraintChecker`]: `check` / `is_complete` / `legal_actions`
//!
//! The checker is side-effect-free; occupancy is the only mutable piece
//! and supports exact undo, which the repair search relies on.
//!
//! # Reference
//! Schaerf (1999), "A Survey of Automated Timetabling", Sec. 2.2

mod checker;
mod index;
mod occupancy;

pub use checker::ConstraintChecker;
pub use index::CatalogIndex;
pub use occupancy::Occupancy;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a candidate assignment was rejected.
///
/// The first seven reasons are the hard constraints of the domain; the
/// remaining two mark malformed candidates that `legal_actions` never
/// produces (they appear only when `check` is handed an arbitrary
/// assignment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    /// The room already hosts another section in an occupied slot.
    RoomTimeConflict,
    /// The instructor already teaches in an occupied slot.
    InstructorTimeConflict,
    /// The room seats fewer students than the section enrolls.
    CapacityExceeded,
    /// The instructor is unavailable in one of the occupied slots.
    InstructorUnavailable,
    /// The instructor is not in the section's eligible set.
    InstructorIneligible,
    /// The room is not in the section's eligible set.
    RoomIneligible,
    /// The assignment would push the instructor past their load cap.
    LoadExceeded,
    /// The start slot cannot host the section's duration on its day.
    SlotSpanUnavailable,
    /// An id in the candidate does not exist in the catalog.
    UnknownEntity,
}

impl RejectReason {
    /// Stable wire code for reports and logs.
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::RoomTimeConflict => "ROOM_TIME_CONFLICT",
            RejectReason::InstructorTimeConflict => "INSTRUCTOR_TIME_CONFLICT",
            RejectReason::CapacityExceeded => "CAPACITY_EXCEEDED",
            RejectReason::InstructorUnavailable => "INSTRUCTOR_UNAVAILABLE",
            RejectReason::InstructorIneligible => "INSTRUCTOR_INELIGIBLE",
            RejectReason::RoomIneligible => "ROOM_INELIGIBLE",
            RejectReason::LoadExceeded => "LOAD_EXCEEDED",
            RejectReason::SlotSpanUnavailable => "SLOT_SPAN_UNAVAILABLE",
            RejectReason::UnknownEntity => "UNKNOWN_ENTITY",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A candidate placement in dense index form: (room, start slot, instructor).
///
/// Indices refer to a [`CatalogIndex`]; use
/// [`ConstraintChecker::to_assignment`] to recover the id-based form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionKey {
    /// Room index.
    pub room: usize,
    /// Starting slot index.
    pub slot: usize,
    /// Instructor index.
    pub instructor: usize,
}

/// How often one reject reason blocked a section's candidate placements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonCount {
    /// The blocking reason.
    pub reason: RejectReason,
    /// Number of candidate placements it rejected.
    pub count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes_are_stable() {
        assert_eq!(RejectReason::RoomTimeConflict.code(), "ROOM_TIME_CONFLICT");
        assert_eq!(
            RejectReason::InstructorTimeConflict.code(),
            "INSTRUCTOR_TIME_CONFLICT"
        );
        assert_eq!(RejectReason::CapacityExceeded.code(), "CAPACITY_EXCEEDED");
        assert_eq!(
            RejectReason::InstructorUnavailable.code(),
            "INSTRUCTOR_UNAVAILABLE"
        );
        assert_eq!(
            RejectReason::InstructorIneligible.code(),
            "INSTRUCTOR_INELIGIBLE"
        );
        assert_eq!(RejectReason::RoomIneligible.code(), "ROOM_INELIGIBLE");
        assert_eq!(RejectReason::LoadExceeded.code(), "LOAD_EXCEEDED");
    }

    #[test]
    fn test_reason_serde_uses_wire_codes() {
        let json = serde_json::to_string(&RejectReason::RoomTimeConflict).unwrap();
        assert_eq!(json, "\"ROOM_TIME_CONFLICT\"");
        let back: RejectReason = serde_json::from_str("\"LOAD_EXCEEDED\"").unwrap();
        assert_eq!(back, RejectReason::LoadExceeded);
    }

    #[test]
    fn test_display_matches_code() {
        assert_eq!(
            RejectReason::SlotSpanUnavailable.to_string(),
            "SLOT_SPAN_UNAVAILABLE"
        );
    }
}
