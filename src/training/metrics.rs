//! Training progress metrics.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Fixed-capacity moving average over recent values.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    capacity: usize,
    values: VecDeque<f64>,
    sum: f64,
}

impl MovingAverage {
    /// Creates a window holding up to `capacity` values (at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
            sum: 0.0,
        }
    }

    /// Pushes a value, evicting the oldest when full.
    pub fn push(&mut self, value: f64) {
        if self.values.len() == self.capacity {
            if let Some(evicted) = self.values.pop_front() {
                self.sum -= evicted;
            }
        }
        self.values.push_back(value);
        self.sum += value;
    }

    /// Mean of the windowed values; `None` when empty.
    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.sum / self.values.len() as f64)
        }
    }

    /// Number of values currently windowed.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the window holds no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether the window is at capacity.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    /// Windowed values, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }
}

/// Least-squares slope of a series against its position.
///
/// Series shorter than two points have no trend and return 0.
pub fn trend_slope(values: impl Iterator<Item = f64>) -> f64 {
    let values: Vec<f64> = values.collect();
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let n_f = n as f64;
    let mean_x = (n_f - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / n_f;
    let mut covariance = 0.0;
    let mut variance = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        covariance += dx * (y - mean_y);
        variance += dx * dx;
    }
    covariance / variance
}

/// Point-in-time snapshot of a training run.
///
/// `converged` and `diverged` are advisory signals; the trainer keeps
/// running regardless unless configured to stop on plateau.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingStatus {
    /// Episodes completed so far.
    pub episodes_run: usize,
    /// Episodes that ended in a complete schedule, over the whole run.
    pub success_count: usize,
    /// Share of windowed episodes ending in a complete schedule.
    pub success_rate: f64,
    /// Mean episode reward over the window.
    pub mean_reward: f64,
    /// Highest single-episode reward seen, 0 before any episode.
    pub best_reward: f64,
    /// Least-squares slope of the windowed rewards.
    pub reward_trend: f64,
    /// Exploration rate after the latest update.
    pub exploration_rate: f64,
    /// Reward has plateaued over a full window.
    pub converged: bool,
    /// Reward collapsed or became non-finite.
    pub diverged: bool,
    /// Policy generation these numbers describe.
    pub agent_version: u64,
}
