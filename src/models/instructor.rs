//! Instructor model.
//!
//! An instructor carries availability (slots they cannot teach) and a
//! maximum teaching load for the scheduling horizon, measured in slot
//! units. A freshly built instructor is available everywhere and
//! effectively unbounded until a load limit is set.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A member of the teaching staff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instructor {
    /// Unique instructor identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Slots in which this instructor cannot teach.
    pub unavailable_slots: HashSet<String>,
    /// Maximum teaching load in slot units per horizon.
    pub max_load_slots: u32,
    /// Domain-specific metadata.
    pub attributes: HashMap<String, String>,
}

impl Instructor {
    /// Creates a new instructor with no unavailability and no load cap.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            unavailable_slots: HashSet::new(),
            max_load_slots: u32::MAX,
            attributes: HashMap::new(),
        }
    }

    /// Sets the instructor name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Marks one slot as unavailable.
    pub fn with_unavailable_slot(mut self, slot_id: impl Into<String>) -> Self {
        self.unavailable_slots.insert(slot_id.into());
        self
    }

    /// Marks several slots as unavailable.
    pub fn with_unavailable_slots<I, S>(mut self, slot_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unavailable_slots
            .extend(slot_ids.into_iter().map(Into::into));
        self
    }

    /// Sets the maximum teaching load in slot units.
    pub fn with_max_load(mut self, slots: u32) -> Self {
        self.max_load_slots = slots;
        self
    }

    /// Adds a domain-specific attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Whether the instructor can teach in a given slot.
    #[inline]
    pub fn is_available(&self, slot_id: &str) -> bool {
        !self.unavailable_slots.contains(slot_id)
    }

    /// Whether taking on `additional` slot units stays within the load cap.
    pub fn load_allows(&self, current_load: u32, additional: u32) -> bool {
        current_load as u64 + additional as u64 <= self.max_load_slots as u64
    }
}
