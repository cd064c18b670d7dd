//! Timetabling domain models.
//!
//! Provides the core data types for representing a course-scheduling
//! problem and its solution: what must be taught ([`Section`]), where
//! ([`Room`]), when ([`TimeSlot`]), by whom ([`Instructor`]), and the
//! resulting placements ([`Assignment`], [`Schedule`]). A [`Catalog`]
//! bundles the immutable inputs of one scheduling run.
//!
//! All models are plain serde-serializable data; constraint semantics
//! live in the [`constraints`](crate::constraints) layer.

mod catalog;
mod instructor;
mod room;
mod schedule;
mod section;
mod timeslot;

pub use catalog::Catalog;
pub use instructor::Instructor;
pub use room::Room;
pub use schedule::{Assignment, Schedule};
pub use section::Section;
pub use timeslot::{Day, TimeSlot};
