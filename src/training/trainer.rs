//! Batch-synchronous training orchestration.

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::agent::{Agent, EpisodeTrace, SelectionMode, SharedAgent, Step, UpdateSummary};
use crate::env::{SchedulingEnv, StepOutcome, Terminal};

use super::{trend_slope, MovingAverage, TrainingStatus};

/// Plays one episode to its terminal and records the trace.
///
/// The agent is consulted once per decision; all randomness comes from
/// `rng`, so a fixed seed reproduces the episode exactly.
pub fn run_episode<A: Agent + ?Sized>(
    env: &mut SchedulingEnv,
    agent: &A,
    mode: SelectionMode,
    rng: &mut dyn RngCore,
) -> EpisodeTrace {
    let mut outcome = env.reset();
    let mut steps = Vec::new();
    let mut total = 0.0;
    loop {
        match outcome {
            StepOutcome::Continue(decision) => {
                let choice = agent.select_action(&decision.state, &decision.actions, mode, rng);
                let choice = choice.min(decision.actions.len() - 1);
                let chosen = decision.actions[choice];
                let result = env.step(choice);
                total += result.reward;
                steps.push(Step {
                    state: decision.state,
                    action: chosen.key,
                    features: chosen.features,
                    reward: result.reward,
                });
                outcome = result.outcome;
            }
            StepOutcome::Done(terminal) => {
                if steps.is_empty() {
                    // Terminal straight out of reset; give the trace the
                    // terminal reward so metrics see the outcome.
                    total = match terminal {
                        Terminal::Success => env.reward().success_bonus(),
                        Terminal::Deadlock { unscheduled } => {
                            env.reward().deadlock_penalty(unscheduled)
                        }
                    };
                }
                return EpisodeTrace {
                    steps,
                    terminal,
                    total_reward: total,
                };
            }
        }
    }
}

/// Like [`run_episode`], but checks `keep_going` before every decision and
/// abandons the episode with `None` once it reports false.
pub fn run_episode_with<A, F>(
    env: &mut SchedulingEnv,
    agent: &A,
    mode: SelectionMode,
    rng: &mut dyn RngCore,
    mut keep_going: F,
) -> Option<EpisodeTrace>
where
    A: Agent + ?Sized,
    F: FnMut() -> bool,
{
    let mut outcome = env.reset();
    let mut steps = Vec::new();
    let mut total = 0.0;
    loop {
        match outcome {
            StepOutcome::Continue(decision) => {
                if !keep_going() {
                    return None;
                }
                let choice = agent.select_action(&decision.state, &decision.actions, mode, rng);
                let choice = choice.min(decision.actions.len() - 1);
                let chosen = decision.actions[choice];
                let result = env.step(choice);
                total += result.reward;
                steps.push(Step {
                    state: decision.state,
                    action: chosen.key,
                    features: chosen.features,
                    reward: result.reward,
                });
                outcome = result.outcome;
            }
            StepOutcome::Done(terminal) => {
                if steps.is_empty() {
                    total = match terminal {
                        Terminal::Success => env.reward().success_bonus(),
                        Terminal::Deadlock { unscheduled } => {
                            env.reward().deadlock_penalty(unscheduled)
                        }
                    };
                }
                return Some(EpisodeTrace {
                    steps,
                    terminal,
                    total_reward: total,
                });
            }
        }
    }
}

/// Orchestration parameters for a training run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Episodes one `run` call plays.
    pub episodes: usize,
    /// Episodes played in parallel between agent updates.
    pub batch_size: usize,
    /// Base seed; episode `i` seeds its RNG with `seed + i`.
    pub seed: u64,
    /// Window length for success rate, mean reward, and trend.
    pub window: usize,
    /// Trend magnitude below which a full window counts as plateaued.
    pub plateau_tolerance: f64,
    /// Downward trend beyond which the run counts as diverged.
    pub collapse_tolerance: f64,
    /// Stop `run` early once the reward plateaus.
    pub stop_on_plateau: bool,
    /// Emit a progress event every this many episodes.
    pub log_every: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: 500,
            batch_size: 16,
            seed: 1,
            window: 50,
            plateau_tolerance: 0.01,
            collapse_tolerance: 1.0,
            stop_on_plateau: false,
            log_every: 50,
        }
    }
}

/// Batch-synchronous trainer over one environment.
///
/// Each batch plays its episodes in parallel against the same policy
/// snapshot, then applies one learning update under the write lock.
/// Traces are collected in episode order and every episode derives its
/// RNG from the base seed, so a run is reproducible regardless of how
/// the worker pool interleaves.
pub struct Trainer<A: Agent> {
    env: SchedulingEnv,
    agent: SharedAgent<A>,
    config: TrainingConfig,
    rewards: Vec<f64>,
    reward_window: MovingAverage,
    success_window: MovingAverage,
    episodes_run: usize,
    success_count: usize,
    best_reward: f64,
    last_summary: Option<UpdateSummary>,
    diverged: bool,
}

impl<A: Agent> Trainer<A> {
    /// Creates a trainer owning the agent.
    pub fn new(env: SchedulingEnv, agent: A, config: TrainingConfig) -> Self {
        Self::with_shared(env, SharedAgent::new(agent), config)
    }

    /// Creates a trainer over an agent that is shared elsewhere too.
    pub fn with_shared(env: SchedulingEnv, agent: SharedAgent<A>, config: TrainingConfig) -> Self {
        Self {
            env,
            agent,
            config,
            rewards: Vec::new(),
            reward_window: MovingAverage::new(config.window),
            success_window: MovingAverage::new(config.window),
            episodes_run: 0,
            success_count: 0,
            best_reward: f64::NEG_INFINITY,
            last_summary: None,
            diverged: false,
        }
    }

    /// Plays the configured number of episodes in batches.
    ///
    /// Calling `run` again continues training for another round of
    /// `episodes` on top of what has been learned.
    pub fn run(&mut self) -> TrainingStatus {
        let target = self.episodes_run + self.config.episodes;
        while self.episodes_run < target {
            let batch = self
                .config
                .batch_size
                .max(1)
                .min(target - self.episodes_run);
            self.run_batch(batch);
            if self.config.stop_on_plateau && self.status().converged {
                tracing::info!(episodes = self.episodes_run, "reward plateaued, stopping early");
                break;
            }
        }
        self.status()
    }

    /// Plays one batch of episodes and applies a single update.
    pub fn run_batch(&mut self, count: usize) -> UpdateSummary {
        let start = self.episodes_run;
        let seed = self.config.seed;
        let env = &self.env;
        let agent = &self.agent;
        let traces: Vec<EpisodeTrace> = (0..count)
            .into_par_iter()
            .map(|i| {
                let mut env = env.clone();
                let mut rng = SmallRng::seed_from_u64(seed.wrapping_add((start + i) as u64));
                let policy = agent.read();
                run_episode(&mut env, &*policy, SelectionMode::Exploratory, &mut rng)
            })
            .collect();

        for trace in &traces {
            self.rewards.push(trace.total_reward);
            self.reward_window.push(trace.total_reward);
            self.success_window
                .push(f64::from(u8::from(trace.succeeded())));
            if trace.succeeded() {
                self.success_count += 1;
            }
            if trace.total_reward > self.best_reward {
                self.best_reward = trace.total_reward;
            }
        }
        let summary = self.agent.update(&traces);
        self.episodes_run += count;
        self.last_summary = Some(summary);
        self.detect_divergence();
        self.maybe_log(start, &summary);
        summary
    }

    fn detect_divergence(&mut self) {
        if self.diverged {
            return;
        }
        let mean = self.reward_window.mean().unwrap_or(0.0);
        if !mean.is_finite() {
            self.diverged = true;
            tracing::warn!(
                episodes = self.episodes_run,
                "training diverged: non-finite rewards"
            );
            return;
        }
        if self.reward_window.is_full() {
            let slope = trend_slope(self.reward_window.iter());
            if slope < -self.config.collapse_tolerance {
                self.diverged = true;
                tracing::warn!(
                    episodes = self.episodes_run,
                    slope,
                    "training diverged: reward collapsing"
                );
            }
        }
    }

    fn maybe_log(&self, start: usize, summary: &UpdateSummary) {
        let every = self.config.log_every.max(1);
        if start / every == self.episodes_run / every {
            return;
        }
        let status = self.status();
        tracing::info!(
            episodes = status.episodes_run,
            mean_reward = status.mean_reward,
            success_rate = status.success_rate,
            exploration = summary.exploration_rate,
            "training progress"
        );
    }

    /// Current progress snapshot.
    ///
    /// `exploration_rate` reports 1.0 until the first update has run.
    pub fn status(&self) -> TrainingStatus {
        let mean_reward = self.reward_window.mean().unwrap_or(0.0);
        let reward_trend = trend_slope(self.reward_window.iter());
        let converged = !self.diverged
            && self.reward_window.is_full()
            && reward_trend.abs() <= self.config.plateau_tolerance;
        TrainingStatus {
            episodes_run: self.episodes_run,
            success_count: self.success_count,
            success_rate: self.success_window.mean().unwrap_or(0.0),
            mean_reward,
            best_reward: if self.rewards.is_empty() {
                0.0
            } else {
                self.best_reward
            },
            reward_trend,
            exploration_rate: self.last_summary.map_or(1.0, |s| s.exploration_rate),
            converged,
            diverged: self.diverged,
            agent_version: self.agent.version(),
        }
    }

    /// Total reward of every episode played, in order.
    pub fn reward_history(&self) -> &[f64] {
        &self.rewards
    }

    /// Episodes played so far.
    #[inline]
    pub fn episodes_run(&self) -> usize {
        self.episodes_run
    }

    /// A handle to the agent being trained.
    pub fn shared_agent(&self) -> SharedAgent<A> {
        self.agent.clone()
    }

    /// The training configuration.
    #[inline]
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// The environment episodes are cloned from.
    #[inline]
    pub fn env(&self) -> &SchedulingEnv {
        &self.env
    }
}
