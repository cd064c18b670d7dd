//! Room model.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A teaching room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Seating capacity.
    pub capacity: u32,
    /// Feature tags (e.g., "lab", "projector").
    pub features: Vec<String>,
    /// Domain-specific metadata.
    pub attributes: HashMap<String, String>,
}

impl Room {
    /// Creates a new room with the given capacity.
    pub fn new(id: impl Into<String>, capacity: u32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            capacity,
            features: Vec::new(),
            attributes: HashMap::new(),
        }
    }

    /// Sets the room name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a feature tag.
    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.features.push(feature.into());
        self
    }

    /// Adds a domain-specific attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Whether the room carries a feature tag.
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }

    /// Whether the room seats at least `enrollment` students.
    #[inline]
    pub fn fits(&self, enrollment: u32) -> bool {
        self.capacity >= enrollment
    }
}
