//! Section visit order.
//!
//! The environment schedules sections one at a time in a fixed order chosen
//! before the episode starts. Order matters: placing the tightest sections
//! first keeps their options open and fails fast when the instance is
//! overconstrained.
//!
//! # Reference
//! Haralick & Elliott (1980), "Increasing tree search efficiency for
//! constraint satisfaction problems"

use serde::{Deserialize, Serialize};

use crate::constraints::CatalogIndex;

/// A rule producing the order sections are visited in.
///
/// Implementations must be deterministic for a given catalog.
pub trait OrderingStrategy: Send + Sync {
    /// Stable strategy name, used in logs.
    fn name(&self) -> &str;

    /// Section indices in visit order; a permutation of `0..section_count`.
    fn order(&self, index: &CatalogIndex) -> Vec<usize>;
}

/// Visits sections with the fewest feasible placements first.
///
/// Tightness is approximated statically as seatable rooms times eligible
/// instructors, with longer sections ranked tighter on ties.
#[derive(Debug, Default)]
pub struct MostConstrainedFirst;

impl OrderingStrategy for MostConstrainedFirst {
    fn name(&self) -> &str {
        "most_constrained_first"
    }

    fn order(&self, index: &CatalogIndex) -> Vec<usize> {
        let mut order: Vec<usize> = (0..index.section_count()).collect();
        order.sort_by_key(|&s| {
            let combinations = index.candidate_rooms(s).len() * index.eligible_instructors(s).len();
            (combinations, std::cmp::Reverse(index.section_duration(s)), s)
        });
        order
    }
}

/// Visits sections with the largest enrollment first.
#[derive(Debug, Default)]
pub struct LargestFirst;

impl OrderingStrategy for LargestFirst {
    fn name(&self) -> &str {
        "largest_first"
    }

    fn order(&self, index: &CatalogIndex) -> Vec<usize> {
        let mut order: Vec<usize> = (0..index.section_count()).collect();
        order.sort_by_key(|&s| (std::cmp::Reverse(index.section(s).enrollment), s));
        order
    }
}

/// Visits sections in catalog order.
#[derive(Debug, Default)]
pub struct CatalogOrder;

impl OrderingStrategy for CatalogOrder {
    fn name(&self) -> &str {
        "catalog_order"
    }

    fn order(&self, index: &CatalogIndex) -> Vec<usize> {
        (0..index.section_count()).collect()
    }
}

/// Configuration tag selecting one of the built-in strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionOrdering {
    #[default]
    MostConstrainedFirst,
    LargestFirst,
    CatalogOrder,
}

impl SectionOrdering {
    /// The strategy this tag selects.
    pub fn strategy(self) -> &'static dyn OrderingStrategy {
        match self {
            Self::MostConstrainedFirst => &MostConstrainedFirst,
            Self::LargestFirst => &LargestFirst,
            Self::CatalogOrder => &CatalogOrder,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Catalog, Day, Instructor, Room, Section, TimeSlot};

    fn sample_index() -> CatalogIndex {
        let catalog = Catalog::new()
            .with_slot(TimeSlot::new("mon-1", Day::Monday, 540, 590))
            .with_slot(TimeSlot::new("mon-2", Day::Monday, 600, 650))
            .with_room(Room::new("R101", 40))
            .with_room(Room::new("R201", 40))
            .with_instructor(Instructor::new("smith"))
            .with_instructor(Instructor::new("jones"))
            // Loose: two rooms, two instructors, small class.
            .with_section(
                Section::new("loose")
                    .with_enrollment(10)
                    .with_eligible_rooms(["R101", "R201"])
                    .with_eligible_instructors(["smith", "jones"]),
            )
            // Tight: one room, one instructor, big class.
            .with_section(
                Section::new("tight")
                    .with_enrollment(35)
                    .with_eligible_room("R101")
                    .with_eligible_instructor("smith"),
            );
        CatalogIndex::build(catalog).unwrap()
    }

    #[test]
    fn test_most_constrained_first() {
        let ix = sample_index();
        let order = MostConstrainedFirst.order(&ix);
        let tight = ix.section_index("tight").unwrap();
        assert_eq!(order[0], tight);
        assert_eq!(order.len(), ix.section_count());
    }

    #[test]
    fn test_largest_first() {
        let ix = sample_index();
        let order = LargestFirst.order(&ix);
        let tight = ix.section_index("tight").unwrap();
        // "tight" also has the larger enrollment.
        assert_eq!(order[0], tight);
    }

    #[test]
    fn test_catalog_order_is_identity() {
        let ix = sample_index();
        assert_eq!(CatalogOrder.order(&ix), vec![0, 1]);
    }

    #[test]
    fn test_ordering_tag_serde() {
        let json = serde_json::to_string(&SectionOrdering::MostConstrainedFirst).unwrap();
        assert_eq!(json, "\"most_constrained_first\"");
        let back: SectionOrdering = serde_json::from_str("\"largest_first\"").unwrap();
        assert_eq!(back, SectionOrdering::LargestFirst);
    }

    #[test]
    fn test_strategies_are_deterministic() {
        let ix = sample_index();
        for tag in [
            SectionOrdering::MostConstrainedFirst,
            SectionOrdering::LargestFirst,
            SectionOrdering::CatalogOrder,
        ] {
            let strategy = tag.strategy();
            assert_eq!(strategy.order(&ix), strategy.order(&ix), "{}", strategy.name());
        }
    }
}
