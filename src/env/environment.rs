//! Episodic scheduling environment.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constraints::{ActionKey, CatalogIndex, ConstraintChecker, Occupancy};
use crate::models::Schedule;
use crate::reward::{RewardFunction, RewardWeights, ScheduleDelta};

use super::{ActionFeatures, SectionOrdering};

/// Environment construction parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Order sections are visited in.
    pub ordering: SectionOrdering,
    /// Reward signal weights.
    pub weights: RewardWeights,
}

/// Compact state identity for tabular value functions.
///
/// Captures which section is being decided and how far the episode has
/// progressed. Placements made so far are folded into the progress count
/// rather than enumerated, keeping the table small.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateKey {
    /// Section being decided.
    pub section: usize,
    /// Sections already placed.
    pub placed: usize,
}

/// One legal placement with its feature view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateAction {
    pub key: ActionKey,
    pub features: ActionFeatures,
}

/// A state the agent must act in: the current section and every placement
/// the hard constraints accept for it. The action list is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionPoint {
    pub state: StateKey,
    pub actions: Vec<CandidateAction>,
}

/// How an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Terminal {
    /// Every section is placed.
    Success,
    /// The current section has no legal placement left.
    Deadlock {
        /// Sections still unplaced, the current one included.
        unscheduled: usize,
    },
}

/// What the environment presents after a reset or step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The episode continues; the agent must choose among the actions.
    Continue(DecisionPoint),
    /// The episode is over.
    Done(Terminal),
}

impl StepOutcome {
    /// The terminal, if the episode ended.
    pub fn terminal(&self) -> Option<Terminal> {
        match self {
            Self::Continue(_) => None,
            Self::Done(t) => Some(*t),
        }
    }
}

/// Reward and resulting outcome of one step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Shaping reward of the placement, plus the terminal reward when the
    /// step ended the episode.
    pub reward: f64,
    pub outcome: StepOutcome,
}

/// Sequential decision process over one catalog.
///
/// An episode visits sections in a fixed order; each step places the
/// current section into one of its legal placements, or the episode ends
/// in a deadlock when none remain. State is rebuilt by [`reset`](Self::reset)
/// and the environment is freely cloneable, so rollouts can run in parallel
/// against a shared catalog index.
#[derive(Clone)]
pub struct SchedulingEnv {
    index: Arc<CatalogIndex>,
    checker: ConstraintChecker,
    reward: RewardFunction,
    order: Vec<usize>,
    schedule: Schedule,
    occupancy: Occupancy,
    cursor: usize,
    applied: Vec<ActionKey>,
    pending: Vec<CandidateAction>,
}

impl SchedulingEnv {
    /// Creates an environment over a validated catalog index.
    pub fn new(index: Arc<CatalogIndex>, config: &EnvConfig) -> Self {
        Self::with_reward(
            index,
            RewardFunction::from_weights(config.weights),
            config.ordering,
        )
    }

    /// Creates an environment with a caller-assembled reward function.
    pub fn with_reward(
        index: Arc<CatalogIndex>,
        reward: RewardFunction,
        ordering: SectionOrdering,
    ) -> Self {
        let checker = ConstraintChecker::new(Arc::clone(&index));
        let order = ordering.strategy().order(&index);
        let occupancy = Occupancy::new(&index);
        Self {
            index,
            checker,
            reward,
            order,
            schedule: Schedule::new(),
            occupancy,
            cursor: 0,
            applied: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Starts a fresh episode.
    ///
    /// May end the episode immediately: a catalog where the first section
    /// has no legal placement deadlocks at step zero.
    pub fn reset(&mut self) -> StepOutcome {
        self.schedule = Schedule::new();
        self.occupancy = Occupancy::new(&self.index);
        self.cursor = 0;
        self.applied.clear();
        self.observe()
    }

    /// Applies the pending decision's `choice`-th action.
    ///
    /// `choice` indexes the action list of the last emitted decision point.
    /// An out-of-range choice changes nothing and re-emits the decision.
    pub fn step(&mut self, choice: usize) -> StepResult {
        let Some(chosen) = self.pending.get(choice).copied() else {
            debug_assert!(false, "action choice {choice} out of range");
            return StepResult {
                reward: 0.0,
                outcome: self.observe(),
            };
        };
        self.apply_key(&chosen.key)
    }

    /// Applies a specific action of the pending decision, by key.
    ///
    /// Returns `None` when the key is not among the pending actions. Used
    /// by repair, which works on filtered candidate lists.
    pub fn step_key(&mut self, key: &ActionKey) -> Option<StepResult> {
        if !self.pending.iter().any(|c| c.key == *key) {
            return None;
        }
        Some(self.apply_key(key))
    }

    fn apply_key(&mut self, key: &ActionKey) -> StepResult {
        let section = self.order[self.cursor];
        let shaping = self.reward.step_score(&ScheduleDelta {
            index: &self.index,
            occupancy: &self.occupancy,
            section,
            action: key,
        });
        self.occupancy.apply(&self.index, section, key);
        self.schedule
            .add_assignment(self.checker.to_assignment(section, key));
        self.applied.push(*key);
        self.cursor += 1;

        let outcome = self.observe();
        let reward = shaping
            + match outcome.terminal() {
                Some(Terminal::Success) => self.reward.success_bonus(),
                Some(Terminal::Deadlock { unscheduled }) => {
                    self.reward.deadlock_penalty(unscheduled)
                }
                None => 0.0,
            };
        StepResult { reward, outcome }
    }

    /// Re-derives the outcome at the current cursor.
    ///
    /// Enumerates the legal actions of the current section and caches them
    /// as the pending decision. Idempotent between steps.
    pub fn observe(&mut self) -> StepOutcome {
        if self.cursor >= self.order.len() {
            self.pending.clear();
            return StepOutcome::Done(Terminal::Success);
        }
        let section = self.order[self.cursor];
        let actions = self.checker.legal_actions(&self.occupancy, section);
        if actions.is_empty() {
            self.pending.clear();
            return StepOutcome::Done(Terminal::Deadlock {
                unscheduled: self.order.len() - self.cursor,
            });
        }
        let state = StateKey {
            section,
            placed: self.occupancy.placed_count(),
        };
        let pending: Vec<CandidateAction> = {
            let index = &self.index;
            let occupancy = &self.occupancy;
            actions
                .into_iter()
                .map(|key| CandidateAction {
                    key,
                    features: ActionFeatures::extract(index, occupancy, section, &key),
                })
                .collect()
        };
        self.pending = pending;
        StepOutcome::Continue(DecisionPoint {
            state,
            actions: self.pending.clone(),
        })
    }

    /// Reverts the most recent placement and rewinds the cursor.
    ///
    /// Returns the undone action, or `None` on a fresh episode. The pending
    /// decision is stale afterwards; call [`observe`](Self::observe) before
    /// stepping again.
    pub fn undo_last(&mut self) -> Option<ActionKey> {
        let key = self.applied.pop()?;
        let popped = self.schedule.pop_assignment();
        debug_assert!(popped.is_some());
        self.cursor -= 1;
        let section = self.order[self.cursor];
        self.occupancy.remove(&self.index, section, &key);
        Some(key)
    }

    /// The catalog index this environment runs over.
    #[inline]
    pub fn index(&self) -> &Arc<CatalogIndex> {
        &self.index
    }

    /// The constraint checker in use.
    #[inline]
    pub fn checker(&self) -> &ConstraintChecker {
        &self.checker
    }

    /// The reward function in use.
    #[inline]
    pub fn reward(&self) -> &RewardFunction {
        &self.reward
    }

    /// The schedule built so far this episode.
    #[inline]
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// The occupancy state built so far this episode.
    #[inline]
    pub fn occupancy(&self) -> &Occupancy {
        &self.occupancy
    }

    /// Section visit order of this environment.
    #[inline]
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Position of the next section to decide.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The section currently being decided, if the episode is mid-flight.
    pub fn current_section(&self) -> Option<usize> {
        self.order.get(self.cursor).copied()
    }

    /// Sections not yet placed, the current one included.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.order.len() - self.cursor
    }
}
