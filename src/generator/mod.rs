//! Schedule generation.
//!
//! [`ScheduleGenerator`] turns a trained (or untrained) policy into an
//! actual timetable: it plays several greedy rollouts in parallel, each
//! with its own tie-breaking seed, keeps the best complete schedule by
//! soft objective score, and falls back to bounded backtracking repair on
//! the deepest partial when every rollout deadlocks. A run that still ends
//! short of a complete schedule reports the partial it reached and the
//! constraints that blocked the rest; it never passes a partial off as a
//! result.

mod repair;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::agent::{Agent, EpisodeTrace, SelectionMode, SharedAgent};
use crate::env::SchedulingEnv;
use crate::error::{BlockedSection, InfeasibleReport, Result, SchedulerError};
use crate::models::Schedule;
use crate::training::run_episode_with;

/// Wall-clock and cooperative-cancellation bounds on a generation run.
///
/// Checked between environment steps, so a stop always lands on a clean
/// episode state.
#[derive(Clone, Copy, Default)]
pub(crate) struct StopSignal<'a> {
    deadline: Option<Instant>,
    cancel: Option<&'a AtomicBool>,
}

impl StopSignal<'_> {
    fn cancelled(&self) -> bool {
        self.cancel.map_or(false, |c| c.load(Ordering::Relaxed))
    }

    pub(crate) fn should_continue(&self) -> bool {
        !self.cancelled() && self.deadline.map_or(true, |d| Instant::now() < d)
    }
}

/// Generation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Greedy rollouts per attempt.
    pub rollouts: usize,
    /// Base seed; rollout `i` seeds its RNG with `seed + i`.
    pub seed: u64,
    /// Placements repair may unwind below a branch point.
    pub backtrack_depth: usize,
    /// Total placements repair may apply.
    pub repair_budget: usize,
    /// Wall-clock budget for the whole generation.
    pub timeout: Option<Duration>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            rollouts: 8,
            seed: 1,
            backtrack_depth: 4,
            repair_budget: 200,
            timeout: None,
        }
    }
}

/// How the returned schedule was found.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    /// Rollouts that reached a terminal before any deadline.
    pub rollouts_run: usize,
    /// Rollouts that ended in a complete schedule.
    pub successes: usize,
    /// Soft objective score of the returned schedule.
    pub soft_score: f64,
    /// Whether the schedule came out of repair rather than a rollout.
    pub repaired: bool,
    /// Placements repair applied, when it ran.
    pub repair_attempts: usize,
    /// Wall-clock time spent.
    pub elapsed_ms: u64,
    /// Parameter generation of the policy that produced the schedule.
    pub agent_version: u64,
}

/// A complete schedule and its generation summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub schedule: Schedule,
    pub summary: GenerationSummary,
}

/// Rollout-and-repair schedule generator.
pub struct ScheduleGenerator<A: Agent> {
    env: SchedulingEnv,
    agent: SharedAgent<A>,
    config: GeneratorConfig,
    cancel: Option<Arc<AtomicBool>>,
}

impl<A: Agent> ScheduleGenerator<A> {
    /// Creates a generator over an environment and a policy handle.
    pub fn new(env: SchedulingEnv, agent: SharedAgent<A>, config: GeneratorConfig) -> Self {
        Self {
            env,
            agent,
            config,
            cancel: None,
        }
    }

    /// Installs a cooperative cancellation flag.
    ///
    /// Setting the flag stops generation at the next step boundary; a run
    /// stopped without a complete schedule in hand reports `Timeout`.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// The generation configuration.
    #[inline]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Produces one complete schedule, or explains why none exists.
    pub fn generate(&self) -> Result<GenerationOutcome> {
        let started = Instant::now();
        let stop = StopSignal {
            deadline: self.config.timeout.map(|t| started + t),
            cancel: self.cancel.as_deref(),
        };
        let rollouts = self.config.rollouts.max(1);

        let env = &self.env;
        let agent = &self.agent;
        let seed = self.config.seed;
        let finished: Vec<Option<(EpisodeTrace, SchedulingEnv)>> = (0..rollouts)
            .into_par_iter()
            .map(|i| {
                let mut env = env.clone();
                let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(i as u64));
                let policy = agent.read();
                let trace = run_episode_with(
                    &mut env,
                    &*policy,
                    SelectionMode::Greedy,
                    &mut rng,
                    || stop.should_continue(),
                )?;
                Some((trace, env))
            })
            .collect();

        let rollouts_run = finished.iter().flatten().count();
        let successes = finished
            .iter()
            .flatten()
            .filter(|(t, _)| t.succeeded())
            .count();

        let mut best: Option<(f64, &SchedulingEnv)> = None;
        for (trace, rollout_env) in finished.iter().flatten() {
            if !trace.succeeded() {
                continue;
            }
            let score = rollout_env
                .reward()
                .schedule_score(rollout_env.index(), rollout_env.schedule());
            if best.as_ref().map_or(true, |(b, _)| score > *b) {
                best = Some((score, rollout_env));
            }
        }
        if let Some((soft_score, found)) = best {
            tracing::info!(
                rollouts = rollouts_run,
                successes,
                soft_score,
                "rollout produced a complete schedule"
            );
            return Ok(GenerationOutcome {
                schedule: found.schedule().clone(),
                summary: GenerationSummary {
                    rollouts_run,
                    successes,
                    soft_score,
                    repaired: false,
                    repair_attempts: 0,
                    elapsed_ms: elapsed_ms(started),
                    agent_version: self.agent.version(),
                },
            });
        }

        // Every finished rollout deadlocked. Repair works on the deepest
        // partial; a deeper stall has fewer sections left to rescue.
        let deepest = finished
            .iter()
            .flatten()
            .max_by_key(|(_, e)| e.cursor())
            .map(|(_, e)| e);
        if let Some(partial) = deepest {
            let mut work = partial.clone();
            let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(rollouts as u64));
            let outcome = {
                let policy = self.agent.read();
                repair::repair(
                    &mut work,
                    &*policy,
                    self.config.backtrack_depth,
                    self.config.repair_budget,
                    stop,
                    &mut rng,
                )
            };
            if let Some(schedule) = outcome.schedule {
                let soft_score = self.env.reward().schedule_score(self.env.index(), &schedule);
                tracing::info!(
                    attempts = outcome.attempts,
                    soft_score,
                    "repair completed the schedule"
                );
                return Ok(GenerationOutcome {
                    schedule,
                    summary: GenerationSummary {
                        rollouts_run,
                        successes,
                        soft_score,
                        repaired: true,
                        repair_attempts: outcome.attempts,
                        elapsed_ms: elapsed_ms(started),
                        agent_version: self.agent.version(),
                    },
                });
            }
            let report = report_from(partial);
            return Err(self.final_error(started, stop, report));
        }

        // Not one rollout reached a terminal; the stop signal must have
        // fired immediately. Report against a fresh episode state.
        let mut probe = self.env.clone();
        probe.reset();
        let report = report_from(&probe);
        Err(self.final_error(started, stop, report))
    }

    fn final_error(
        &self,
        started: Instant,
        stop: StopSignal<'_>,
        report: InfeasibleReport,
    ) -> SchedulerError {
        tracing::warn!(
            scheduled = report.scheduled.assignment_count(),
            unscheduled = report.unscheduled_count(),
            "no complete schedule found"
        );
        if !stop.should_continue() {
            SchedulerError::Timeout {
                elapsed_ms: elapsed_ms(started),
                report,
            }
        } else {
            SchedulerError::Infeasible { report }
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

/// Snapshot of an environment's unplaced tail, with blocking reasons.
fn report_from(env: &SchedulingEnv) -> InfeasibleReport {
    let index = env.index();
    let checker = env.checker();
    let unscheduled = env.order()[env.cursor()..]
        .iter()
        .map(|&section| BlockedSection {
            section_id: index.section(section).id.clone(),
            reasons: checker.diagnose(env.occupancy(), section),
        })
        .collect();
    InfeasibleReport {
        scheduled: env.schedule().clone(),
        unscheduled,
    }
}
