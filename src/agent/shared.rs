//! Shared agent handle for parallel rollouts.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use super::{Agent, EpisodeTrace, UpdateSummary};

/// Clonable, thread-safe handle to one agent.
///
/// Rollout workers take read guards and act against a consistent policy
/// snapshot; learning goes through [`update`](Self::update), which takes
/// the single write lock. The agent's version counter tells readers which
/// policy generation they are seeing.
pub struct SharedAgent<A: Agent> {
    inner: Arc<RwLock<A>>,
}

impl<A: Agent> Clone for SharedAgent<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: Agent> SharedAgent<A> {
    /// Wraps an agent for sharing.
    pub fn new(agent: A) -> Self {
        Self {
            inner: Arc::new(RwLock::new(agent)),
        }
    }

    /// Read access to the current policy snapshot.
    ///
    /// Hold the guard for the duration of one episode so the policy cannot
    /// change mid-episode.
    pub fn read(&self) -> RwLockReadGuard<'_, A> {
        self.inner.read()
    }

    /// Applies a learning update under the write lock.
    pub fn update(&self, traces: &[EpisodeTrace]) -> UpdateSummary {
        self.inner.write().update(traces)
    }

    /// Version of the current policy snapshot.
    pub fn version(&self) -> u64 {
        self.inner.read().version()
    }

    /// Unwraps the agent when this is the last handle.
    pub fn try_into_inner(self) -> Result<A, Self> {
        Arc::try_unwrap(self.inner)
            .map(RwLock::into_inner)
            .map_err(|inner| Self { inner })
    }
}
