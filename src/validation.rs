//! Catalog validation.
//!
//! Checks structural integrity of a catalog before any episode runs.
//! Detects:
//! - Duplicate IDs
//! - Unknown room/instructor/slot references
//! - Sections with no eligible room or instructor
//! - Zero-duration sections and degenerate slots
//! - Durations that fit no day of the grid
//!
//! A catalog that fails here can never produce a legal placement for at
//! least one section, so the engine rejects it up front instead of
//! discovering the problem mid-episode.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::models::Catalog;

/// A single problem found in a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogIssue {
    /// Issue category.
    pub kind: CatalogIssueKind,
    /// ID of the entity the issue concerns.
    pub entity: String,
    /// Human-readable description.
    pub message: String,
}

/// Categories of catalog issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatalogIssueKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A section references a room that doesn't exist.
    UnknownRoom,
    /// A section references an instructor that doesn't exist.
    UnknownInstructor,
    /// A section or instructor references a slot that doesn't exist.
    UnknownSlot,
    /// A section has no eligible rooms.
    EmptyEligibleRooms,
    /// A section has no eligible instructors.
    EmptyEligibleInstructors,
    /// A section has duration zero.
    ZeroDuration,
    /// A slot ends at or before its start.
    DegenerateSlot,
    /// A section's duration exceeds every day's slot count.
    UnsatisfiableDuration,
}

impl CatalogIssue {
    fn new(kind: CatalogIssueKind, entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            entity: entity.into(),
            message: message.into(),
        }
    }
}

/// Malformed catalog, rejected before any episode runs.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("invalid catalog: {} issue(s) found", issues.len())]
pub struct CatalogError {
    /// Every issue found, not just the first.
    pub issues: Vec<CatalogIssue>,
}

impl CatalogError {
    /// Whether any issue has the given kind.
    pub fn has_kind(&self, kind: CatalogIssueKind) -> bool {
        self.issues.iter().any(|i| i.kind == kind)
    }
}

/// Validates a catalog.
///
/// Checks:
/// 1. No duplicate section/room/slot/instructor IDs
/// 2. Slots are non-degenerate (end after start)
/// 3. Sections have non-zero duration
/// 4. Sections have at least one eligible room and instructor
/// 5. All eligible-room/-instructor references exist
/// 6. All preferred-slot and unavailable-slot references exist
/// 7. Every section's duration fits at least one day of the grid
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(CatalogError)` with all detected issues.
pub fn validate_catalog(catalog: &Catalog) -> Result<(), CatalogError> {
    let mut issues = Vec::new();

    let mut room_ids = HashSet::new();
    for r in &catalog.rooms {
        if !room_ids.insert(r.id.as_str()) {
            issues.push(CatalogIssue::new(
                CatalogIssueKind::DuplicateId,
                &r.id,
                format!("Duplicate room ID: {}", r.id),
            ));
        }
    }

    let mut instructor_ids = HashSet::new();
    for i in &catalog.instructors {
        if !instructor_ids.insert(i.id.as_str()) {
            issues.push(CatalogIssue::new(
                CatalogIssueKind::DuplicateId,
                &i.id,
                format!("Duplicate instructor ID: {}", i.id),
            ));
        }
    }

    let mut slot_ids = HashSet::new();
    let mut day_lengths: HashMap<usize, u32> = HashMap::new();
    for s in &catalog.slots {
        if !slot_ids.insert(s.id.as_str()) {
            issues.push(CatalogIssue::new(
                CatalogIssueKind::DuplicateId,
                &s.id,
                format!("Duplicate slot ID: {}", s.id),
            ));
        }
        if s.end_minute <= s.start_minute {
            issues.push(CatalogIssue::new(
                CatalogIssueKind::DegenerateSlot,
                &s.id,
                format!(
                    "Slot '{}' ends at or before its start ({}..{})",
                    s.id, s.start_minute, s.end_minute
                ),
            ));
        }
        *day_lengths.entry(s.day.index()).or_insert(0) += 1;
    }
    let longest_day = day_lengths.values().copied().max().unwrap_or(0);

    let mut section_ids = HashSet::new();
    for sec in &catalog.sections {
        if !section_ids.insert(sec.id.as_str()) {
            issues.push(CatalogIssue::new(
                CatalogIssueKind::DuplicateId,
                &sec.id,
                format!("Duplicate section ID: {}", sec.id),
            ));
        }

        if sec.duration_slots == 0 {
            issues.push(CatalogIssue::new(
                CatalogIssueKind::ZeroDuration,
                &sec.id,
                format!("Section '{}' has duration zero", sec.id),
            ));
        } else if sec.duration_slots > longest_day {
            issues.push(CatalogIssue::new(
                CatalogIssueKind::UnsatisfiableDuration,
                &sec.id,
                format!(
                    "Section '{}' needs {} consecutive slots but the longest day has {}",
                    sec.id, sec.duration_slots, longest_day
                ),
            ));
        }

        if sec.eligible_rooms.is_empty() {
            issues.push(CatalogIssue::new(
                CatalogIssueKind::EmptyEligibleRooms,
                &sec.id,
                format!("Section '{}' has no eligible rooms", sec.id),
            ));
        }
        if sec.eligible_instructors.is_empty() {
            issues.push(CatalogIssue::new(
                CatalogIssueKind::EmptyEligibleInstructors,
                &sec.id,
                format!("Section '{}' has no eligible instructors", sec.id),
            ));
        }

        for room in &sec.eligible_rooms {
            if !room_ids.contains(room.as_str()) {
                issues.push(CatalogIssue::new(
                    CatalogIssueKind::UnknownRoom,
                    &sec.id,
                    format!("Section '{}' references unknown room '{}'", sec.id, room),
                ));
            }
        }
        for instr in &sec.eligible_instructors {
            if !instructor_ids.contains(instr.as_str()) {
                issues.push(CatalogIssue::new(
                    CatalogIssueKind::UnknownInstructor,
                    &sec.id,
                    format!(
                        "Section '{}' references unknown instructor '{}'",
                        sec.id, instr
                    ),
                ));
            }
        }
        for slot in &sec.preferred_slots {
            if !slot_ids.contains(slot.as_str()) {
                issues.push(CatalogIssue::new(
                    CatalogIssueKind::UnknownSlot,
                    &sec.id,
                    format!("Section '{}' prefers unknown slot '{}'", sec.id, slot),
                ));
            }
        }
    }

    for instr in &catalog.instructors {
        for slot in &instr.unavailable_slots {
            if !slot_ids.contains(slot.as_str()) {
                issues.push(CatalogIssue::new(
                    CatalogIssueKind::UnknownSlot,
                    &instr.id,
                    format!(
                        "Instructor '{}' is unavailable in unknown slot '{}'",
                        instr.id, slot
                    ),
                ));
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(CatalogError { issues })
    }
}
