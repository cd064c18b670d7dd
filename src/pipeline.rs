//! End-to-end scheduling pipeline.
//!
//! [`run_pipeline`] is the one-call surface: validate the catalog, build
//! the configured agent, optionally train it, then generate a schedule.
//! Each stage is available on its own through the underlying modules;
//! the pipeline just wires them in the standard order.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::agent::AgentConfig;
use crate::agent::SharedAgent;
use crate::constraints::CatalogIndex;
use crate::env::{EnvConfig, SchedulingEnv};
use crate::error::Result;
use crate::generator::{GenerationOutcome, GeneratorConfig, ScheduleGenerator};
use crate::models::Catalog;
use crate::training::{Trainer, TrainingConfig, TrainingStatus};

/// Everything configurable about a scheduling run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingOptions {
    pub env: EnvConfig,
    pub agent: AgentConfig,
    /// Training round before generation; `None` generates with the
    /// untrained policy.
    pub training: Option<TrainingConfig>,
    pub generator: GeneratorConfig,
}

/// A catalog plus the options to schedule it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingRequest {
    pub catalog: Catalog,
    #[serde(default)]
    pub options: SchedulingOptions,
}

impl SchedulingRequest {
    /// Creates a request with default options.
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            options: SchedulingOptions::default(),
        }
    }

    /// Replaces the options.
    pub fn with_options(mut self, options: SchedulingOptions) -> Self {
        self.options = options;
        self
    }
}

/// What a pipeline run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub outcome: GenerationOutcome,
    /// Final training status, when training ran.
    pub training: Option<TrainingStatus>,
}

/// Validates, optionally trains, and generates in one call.
///
/// Catalog problems fail here, before any episode runs.
pub fn run_pipeline(request: &SchedulingRequest) -> Result<PipelineOutput> {
    let index = Arc::new(CatalogIndex::build(request.catalog.clone())?);
    tracing::info!(
        sections = index.section_count(),
        rooms = index.room_count(),
        slots = index.slot_count(),
        instructors = index.instructor_count(),
        "catalog validated"
    );

    let env = SchedulingEnv::new(index, &request.options.env);
    let shared = SharedAgent::new(request.options.agent.build());

    let training = request.options.training.as_ref().map(|config| {
        let mut trainer = Trainer::with_shared(env.clone(), shared.clone(), *config);
        trainer.run()
    });

    let generator = ScheduleGenerator::new(env, shared, request.options.generator);
    let outcome = generator.generate()?;
    Ok(PipelineOutput { outcome, training })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentConfig, LinearConfig};
    use crate::constraints::{ActionKey, Occupancy};
    use crate::error::SchedulerError;
    use crate::models::{Day, Instructor, Room, Schedule, Section, TimeSlot};

    fn campus_catalog() -> Catalog {
        Catalog::new()
            .with_slot(TimeSlot::new("mon-1", Day::Monday, 540, 590))
            .with_slot(TimeSlot::new("mon-2", Day::Monday, 600, 650))
            .with_slot(TimeSlot::new("tue-1", Day::Tuesday, 540, 590))
            .with_slot(TimeSlot::new("tue-2", Day::Tuesday, 600, 650))
            .with_room(Room::new("R101", 40).with_name("Lecture Hall"))
            .with_room(Room::new("R201", 24))
            .with_instructor(Instructor::new("smith").with_max_load(3))
            .with_instructor(Instructor::new("jones").with_unavailable_slot("tue-2"))
            .with_section(
                Section::new("CS101-A")
                    .with_course_code("CS-101")
                    .with_enrollment(32)
                    .with_eligible_room("R101")
                    .with_eligible_instructors(["smith", "jones"])
                    .with_preferred_slot("mon-1"),
            )
            .with_section(
                Section::new("CS101-B")
                    .with_course_code("CS-101")
                    .with_enrollment(20)
                    .with_eligible_rooms(["R101", "R201"])
                    .with_eligible_instructors(["smith", "jones"]),
            )
            .with_section(
                Section::new("MA201-A")
                    .with_course_code("MA-201")
                    .with_duration(2)
                    .with_enrollment(18)
                    .with_eligible_rooms(["R101", "R201"])
                    .with_eligible_instructor("smith"),
            )
    }

    fn assert_schedule_valid(catalog: Catalog, schedule: &Schedule) {
        let index = Arc::new(CatalogIndex::build(catalog).unwrap());
        let checker = crate::constraints::ConstraintChecker::new(Arc::clone(&index));
        let mut occ = Occupancy::new(&index);
        for assignment in &schedule.assignments {
            checker
                .check(&occ, assignment)
                .unwrap_or_else(|reason| panic!("invalid assignment {assignment:?}: {reason}"));
            let key = ActionKey {
                room: index.room_index(&assignment.room_id).unwrap(),
                slot: index.slot_index(&assignment.slot_id).unwrap(),
                instructor: index.instructor_index(&assignment.instructor_id).unwrap(),
            };
            let section = index.section_index(&assignment.section_id).unwrap();
            occ.apply(&index, section, &key);
        }
    }

    fn trained_options() -> SchedulingOptions {
        SchedulingOptions {
            training: Some(TrainingConfig {
                episodes: 96,
                batch_size: 16,
                seed: 5,
                ..TrainingConfig::default()
            }),
            ..SchedulingOptions::default()
        }
    }

    #[test]
    fn test_pipeline_produces_complete_valid_schedule() {
        let request = SchedulingRequest::new(campus_catalog()).with_options(trained_options());
        let output = run_pipeline(&request).unwrap();

        assert_eq!(output.outcome.schedule.assignment_count(), 3);
        assert_schedule_valid(campus_catalog(), &output.outcome.schedule);

        let training = output.training.unwrap();
        assert_eq!(training.episodes_run, 96);
        assert!(training.agent_version > 0);
    }

    #[test]
    fn test_pipeline_is_seed_deterministic() {
        let request = SchedulingRequest::new(campus_catalog()).with_options(trained_options());
        let a = run_pipeline(&request).unwrap();
        let b = run_pipeline(&request).unwrap();
        assert_eq!(a.outcome.schedule, b.outcome.schedule);
        assert_eq!(a.training, b.training);
    }

    #[test]
    fn test_invalid_catalog_fails_before_training() {
        // Duplicate section ids never reach the trainer.
        let catalog = campus_catalog().with_section(
            Section::new("CS101-A")
                .with_eligible_room("R101")
                .with_eligible_instructor("smith"),
        );
        let request = SchedulingRequest::new(catalog).with_options(trained_options());
        match run_pipeline(&request) {
            Err(SchedulerError::Catalog(err)) => assert!(!err.issues.is_empty()),
            other => panic!("expected Catalog error, got {other:?}"),
        }
    }

    #[test]
    fn test_untrained_pipeline_handles_trivial_catalog() {
        let catalog = Catalog::new()
            .with_slot(TimeSlot::new("mon-1", Day::Monday, 540, 590))
            .with_room(Room::new("R101", 30))
            .with_instructor(Instructor::new("smith"))
            .with_section(
                Section::new("only")
                    .with_enrollment(10)
                    .with_eligible_room("R101")
                    .with_eligible_instructor("smith"),
            );
        let mut options = SchedulingOptions::default();
        options.generator.rollouts = 1;
        let request = SchedulingRequest::new(catalog).with_options(options);

        let output = run_pipeline(&request).unwrap();
        assert!(output.training.is_none());
        assert_eq!(output.outcome.summary.successes, 1);
    }

    #[test]
    fn test_oversubscribed_pipeline_reports_infeasible() {
        let catalog = Catalog::new()
            .with_slot(TimeSlot::new("mon-1", Day::Monday, 540, 590))
            .with_room(Room::new("R101", 30))
            .with_instructor(Instructor::new("smith"))
            .with_section(
                Section::new("a")
                    .with_enrollment(10)
                    .with_eligible_room("R101")
                    .with_eligible_instructor("smith"),
            )
            .with_section(
                Section::new("b")
                    .with_enrollment(10)
                    .with_eligible_room("R101")
                    .with_eligible_instructor("smith"),
            );
        let request = SchedulingRequest::new(catalog);
        match run_pipeline(&request) {
            Err(SchedulerError::Infeasible { report }) => {
                assert_eq!(report.scheduled.assignment_count(), 1);
                assert_eq!(report.unscheduled_count(), 1);
            }
            other => panic!("expected Infeasible, got {other:?}"),
        }
    }

    #[test]
    fn test_linear_agent_end_to_end() {
        let options = SchedulingOptions {
            agent: AgentConfig::Linear(LinearConfig::default()),
            training: Some(TrainingConfig {
                episodes: 64,
                batch_size: 16,
                ..TrainingConfig::default()
            }),
            ..SchedulingOptions::default()
        };
        let request = SchedulingRequest::new(campus_catalog()).with_options(options);
        let output = run_pipeline(&request).unwrap();
        assert_eq!(output.outcome.schedule.assignment_count(), 3);
        assert_schedule_valid(campus_catalog(), &output.outcome.schedule);
    }

    #[test]
    fn test_request_parses_from_json() {
        let raw = r#"{
            "catalog": {
                "sections": [{
                    "id": "CS101-A",
                    "name": "",
                    "course_code": "CS-101",
                    "duration_slots": 1,
                    "enrollment": 20,
                    "eligible_rooms": ["R101"],
                    "eligible_instructors": ["smith"],
                    "preferred_slots": [],
                    "attributes": {}
                }],
                "rooms": [{
                    "id": "R101",
                    "name": "",
                    "capacity": 40,
                    "features": [],
                    "attributes": {}
                }],
                "slots": [{
                    "id": "mon-1",
                    "day": "Monday",
                    "start_minute": 540,
                    "end_minute": 590
                }],
                "instructors": [{
                    "id": "smith",
                    "name": "",
                    "unavailable_slots": [],
                    "max_load_slots": 4294967295,
                    "attributes": {}
                }]
            },
            "options": {
                "agent": {"kind": "tabular", "learning_rate": 0.2},
                "generator": {"rollouts": 2}
            }
        }"#;
        let request: SchedulingRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(request.catalog.sections.len(), 1);
        assert_eq!(request.options.generator.rollouts, 2);

        let output = run_pipeline(&request).unwrap();
        assert_eq!(output.outcome.schedule.assignment_count(), 1);
    }
}
