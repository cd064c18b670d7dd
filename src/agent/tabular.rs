//! Tabular Monte-Carlo control agent.

use std::collections::HashMap;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::constraints::ActionKey;
use crate::env::{CandidateAction, StateKey};

use super::{argmax_with_ties, Agent, EpisodeTrace, SelectionMode, UpdateSummary};

/// Tabular agent hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabularConfig {
    /// Step size toward the observed return, in (0, 1].
    pub learning_rate: f64,
    /// Discount factor for returns, in [0, 1].
    pub discount: f64,
    /// Initial exploration rate, in [0, 1].
    pub epsilon: f64,
    /// Multiplicative exploration decay per episode.
    pub epsilon_decay: f64,
    /// Exploration floor.
    pub min_epsilon: f64,
}

impl Default for TabularConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount: 0.95,
            epsilon: 1.0,
            epsilon_decay: 0.995,
            min_epsilon: 0.01,
        }
    }
}

/// Q-table agent using every-visit Monte-Carlo updates.
///
/// Values are keyed by (state, action) and start at zero, which is
/// optimistic relative to deadlock penalties and mildly pessimistic
/// relative to success, nudging early exploration toward unvisited
/// placements. Updates move each visited entry toward the discounted
/// return observed from that step onward.
#[derive(Debug, Clone)]
pub struct TabularAgent {
    config: TabularConfig,
    q: HashMap<(StateKey, ActionKey), f64>,
    epsilon: f64,
    version: u64,
}

impl TabularAgent {
    /// Creates a fresh agent with an empty table.
    pub fn new(config: TabularConfig) -> Self {
        let epsilon = config.epsilon.clamp(0.0, 1.0);
        Self {
            config,
            q: HashMap::new(),
            epsilon,
            version: 0,
        }
    }

    /// Current Q-value of a (state, action) pair; unvisited pairs are 0.
    pub fn q_value(&self, state: &StateKey, action: &ActionKey) -> f64 {
        self.q.get(&(*state, *action)).copied().unwrap_or(0.0)
    }

    /// Number of (state, action) entries learned so far.
    #[inline]
    pub fn table_len(&self) -> usize {
        self.q.len()
    }

    /// Current exploration rate.
    #[inline]
    pub fn exploration_rate(&self) -> f64 {
        self.epsilon
    }
}

impl Agent for TabularAgent {
    fn kind(&self) -> &str {
        "tabular"
    }

    fn select_action(
        &self,
        state: &StateKey,
        actions: &[CandidateAction],
        mode: SelectionMode,
        rng: &mut dyn RngCore,
    ) -> usize {
        if mode == SelectionMode::Exploratory && rng.random_bool(self.epsilon) {
            return rng.random_range(0..actions.len());
        }
        let values: Vec<f64> = actions
            .iter()
            .map(|c| self.q_value(state, &c.key))
            .collect();
        argmax_with_ties(&values, rng)
    }

    fn update(&mut self, traces: &[EpisodeTrace]) -> UpdateSummary {
        let mut steps = 0;
        let mut abs_error = 0.0;
        for trace in traces {
            let returns = trace.returns(self.config.discount);
            for (step, g) in trace.steps.iter().zip(returns) {
                let entry = self.q.entry((step.state, step.action)).or_insert(0.0);
                let error = g - *entry;
                *entry += self.config.learning_rate * error;
                abs_error += error.abs();
                steps += 1;
            }
            self.epsilon = (self.epsilon * self.config.epsilon_decay)
                .max(self.config.min_epsilon)
                .clamp(0.0, 1.0);
        }
        self.version += 1;
        UpdateSummary {
            episodes: traces.len(),
            steps,
            mean_abs_error: if steps > 0 {
                abs_error / steps as f64
            } else {
                0.0
            },
            exploration_rate: self.epsilon,
        }
    }

    fn version(&self) -> u64 {
        self.version
    }
}
