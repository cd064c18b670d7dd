//! Linear value-function agent.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::env::{CandidateAction, StateKey, FEATURE_DIM};

use super::{argmax_with_ties, Agent, EpisodeTrace, SelectionMode, UpdateSummary};

/// Linear agent hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearConfig {
    /// Gradient step size.
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

impl Default for LinearConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            discount: 0.95,
            epsilon: 1.0,
            epsilon_decay: 0.995,
            min_epsilon: 0.01,
        }
    }
}

/// Agent valuing actions as a linear function of their features.
///
/// A single weight vector scores every action regardless of which section
/// or catalog produced it, so experience transfers across states the
/// tabular agent would treat as unrelated. Trained by Monte-Carlo
/// semi-gradient regression of feature values onto observed returns.
#[derive(Debug, Clone)]
pub struct LinearAgent {
    config: LinearConfig,
    weights: [f64; FEATURE_DIM],
    epsilon: f64,
    version: u64,
}

impl LinearAgent {
    /// Creates a fresh agent with zero weights.
    pub fn new(config: LinearConfig) -> Self {
        let epsilon = config.epsilon.clamp(0.0, 1.0);
        Self {
            config,
            weights: [0.0; FEATURE_DIM],
            epsilon,
            version: 0,
        }
    }

    /// Current weight vector.
    #[inline]
    pub fn weights(&self) -> &[f64; FEATURE_DIM] {
        &self.weights
    }

    /// Current exploration rate.
    #[inline]
    pub fn exploration_rate(&self) -> f64 {
        self.epsilon
    }
}

impl Agent for LinearAgent {
    fn kind(&self) -> &str {
        "linear"
    }

    fn select_action(
        &self,
        _state: &StateKey,
        actions: &[CandidateAction],
        mode: SelectionMode,
        rng: &mut dyn RngCore,
    ) -> usize {
        if mode == SelectionMode::Exploratory && rng.random_bool(self.epsilon) {
            return rng.random_range(0..actions.len());
        }
        let values: Vec<f64> = actions
            .iter()
            .map(|c| c.features.dot(&self.weights))
            .collect();
        argmax_with_ties(&values, rng)
    }

    fn update(&mut self, traces: &[EpisodeTrace]) -> UpdateSummary {
        let mut steps = 0;
        let mut abs_error = 0.0;
        for trace in traces {
            let returns = trace.returns(self.config.discount);
            for (step, g) in trace.steps.iter().zip(returns) {
                let prediction = step.features.dot(&self.weights);
                let error = g - prediction;
                // A non-finite error would poison the whole vector.
                if !error.is_finite() {
                    continue;
                }
                for (w, x) in self.weights.iter_mut().zip(step.features.values()) {
                    *w += self.config.learning_rate * error * x;
                }
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
