//! Deadlock repair by bounded backtracking.
//!
//! When every rollout ends in a deadlock, the generator hands its deepest
//! partial here. Repair reopens the most recent placements one frame at a
//! time, bans the choice that led into the dead end at the frame where it
//! was made, and greedily rolls forward along each alternative branch.
//! The search is depth-first and doubly bounded: it never unwinds more
//! than `backtrack_depth` frames below the current branch point and never
//! applies more than `repair_budget` placements in total.

use rand::RngCore;

use crate::agent::{Agent, SelectionMode};
use crate::env::{CandidateAction, SchedulingEnv, StepOutcome, Terminal};
use crate::models::Schedule;

use super::StopSignal;

/// What a repair attempt produced.
#[derive(Debug, Clone)]
pub(crate) struct RepairOutcome {
    /// The completed schedule, when repair found one.
    pub schedule: Option<Schedule>,
    /// Placements applied while searching.
    pub attempts: usize,
}

struct RepairCtx<'a> {
    attempts: usize,
    budget: usize,
    stop: StopSignal<'a>,
}

impl RepairCtx<'_> {
    fn allow(&self) -> bool {
        self.attempts < self.budget && self.stop.should_continue()
    }
}

/// Attempts to complete the partial schedule held by `env`.
///
/// A partial that is already complete comes back unchanged with zero
/// attempts. On failure the environment is left in an intermediate search
/// state; callers keep their own pristine copy for reporting.
pub(crate) fn repair<A: Agent + ?Sized>(
    env: &mut SchedulingEnv,
    policy: &A,
    backtrack_depth: usize,
    repair_budget: usize,
    stop: StopSignal<'_>,
    rng: &mut dyn RngCore,
) -> RepairOutcome {
    let mut ctx = RepairCtx {
        attempts: 0,
        budget: repair_budget,
        stop,
    };
    let repaired = match env.observe() {
        StepOutcome::Done(Terminal::Success) => true,
        StepOutcome::Done(Terminal::Deadlock { .. }) => {
            backtrack(&mut ctx, env, policy, rng, backtrack_depth)
        }
        StepOutcome::Continue(_) => {
            roll_to_terminal(&mut ctx, env, policy, rng)
                || backtrack(&mut ctx, env, policy, rng, backtrack_depth)
        }
    };
    RepairOutcome {
        schedule: repaired.then(|| env.schedule().clone()),
        attempts: ctx.attempts,
    }
}

/// Greedily plays the episode out from the current cursor.
///
/// Returns true on success, false on deadlock or an exhausted budget.
fn roll_to_terminal<A: Agent + ?Sized>(
    ctx: &mut RepairCtx<'_>,
    env: &mut SchedulingEnv,
    policy: &A,
    rng: &mut dyn RngCore,
) -> bool {
    let mut outcome = env.observe();
    loop {
        match outcome {
            StepOutcome::Done(Terminal::Success) => return true,
            StepOutcome::Done(Terminal::Deadlock { .. }) => return false,
            StepOutcome::Continue(decision) => {
                if !ctx.allow() {
                    return false;
                }
                let choice =
                    policy.select_action(&decision.state, &decision.actions, SelectionMode::Greedy, rng);
                let choice = choice.min(decision.actions.len() - 1);
                ctx.attempts += 1;
                outcome = env.step(choice).outcome;
            }
        }
    }
}

/// Reopens the most recent placement and tries its alternatives.
///
/// The undone action is banned at this frame only; re-deciding the same
/// section under a different prefix may legitimately pick it again. Each
/// alternative branch rolls forward greedily and may itself backtrack,
/// one frame shallower. When a frame runs out of alternatives the next
/// placement up is reopened until the depth bound is spent.
fn backtrack<A: Agent + ?Sized>(
    ctx: &mut RepairCtx<'_>,
    env: &mut SchedulingEnv,
    policy: &A,
    rng: &mut dyn RngCore,
    depth_left: usize,
) -> bool {
    if depth_left == 0 {
        return false;
    }
    let Some(banned) = env.undo_last() else {
        return false;
    };
    let anchor = env.cursor();
    let mut excluded = vec![banned];

    loop {
        if !ctx.allow() {
            return false;
        }
        let StepOutcome::Continue(decision) = env.observe() else {
            return false;
        };
        let available: Vec<CandidateAction> = decision
            .actions
            .iter()
            .filter(|c| !excluded.contains(&c.key))
            .copied()
            .collect();
        if available.is_empty() {
            break;
        }

        let pick = policy.select_action(&decision.state, &available, SelectionMode::Greedy, rng);
        let chosen = available[pick.min(available.len() - 1)];
        ctx.attempts += 1;
        if env.step_key(&chosen.key).is_none() {
            excluded.push(chosen.key);
            continue;
        }
        if roll_to_terminal(ctx, env, policy, rng) {
            return true;
        }
        if backtrack(ctx, env, policy, rng, depth_left - 1) {
            return true;
        }
        // The whole branch under this alternative failed; rewind to the
        // frame and cross the alternative off.
        while env.cursor() > anchor {
            if env.undo_last().is_none() {
                break;
            }
        }
        excluded.push(chosen.key);
    }

    // Frame exhausted; reopen the next placement up.
    backtrack(ctx, env, policy, rng, depth_left - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use crate::agent::{TabularAgent, TabularConfig};
    use crate::constraints::CatalogIndex;
    use crate::env::EnvConfig;
    use crate::models::{Catalog, Day, Instructor, Room, Section, TimeSlot};
    use crate::training::run_episode;

    fn trap_env() -> SchedulingEnv {
        let catalog = Catalog::new()
            .with_slot(TimeSlot::new("mon-1", Day::Monday, 540, 590))
            .with_slot(TimeSlot::new("mon-2", Day::Monday, 600, 650))
            .with_room(Room::new("R101", 40))
            .with_instructor(Instructor::new("flexible"))
            .with_instructor(Instructor::new("morning-only").with_unavailable_slot("mon-2"))
            .with_section(
                Section::new("free")
                    .with_enrollment(10)
                    .with_eligible_room("R101")
                    .with_eligible_instructor("flexible"),
            )
            .with_section(
                Section::new("pinned")
                    .with_enrollment(10)
                    .with_eligible_room("R101")
                    .with_eligible_instructor("morning-only"),
            );
        let index = Arc::new(CatalogIndex::build(catalog).unwrap());
        SchedulingEnv::new(index, &EnvConfig::default())
    }

    fn agent() -> TabularAgent {
        TabularAgent::new(TabularConfig::default())
    }

    /// Plays greedy episodes over fresh seeds until one deadlocks and
    /// returns the deadlocked environment.
    fn deadlocked_env() -> (SchedulingEnv, SmallRng) {
        let policy = agent();
        for seed in 0..64 {
            let mut env = trap_env();
            let mut rng = SmallRng::seed_from_u64(seed);
            let trace = run_episode(&mut env, &policy, SelectionMode::Greedy, &mut rng);
            if !trace.succeeded() {
                return (env, rng);
            }
        }
        panic!("expected at least one greedy rollout to deadlock");
    }

    #[test]
    fn test_repair_completes_deadlocked_partial() {
        let (mut env, mut rng) = deadlocked_env();
        let policy = agent();
        let outcome = repair(&mut env, &policy, 4, 200, StopSignal::default(), &mut rng);
        let schedule = outcome.schedule.expect("repair should fix a one-bad-choice deadlock");
        assert!(env.checker().is_complete(&schedule));
        assert!(outcome.attempts > 0);
    }

    #[test]
    fn test_repair_is_noop_on_complete_schedule() {
        let policy = agent();
        let mut env = trap_env();
        let mut rng = SmallRng::seed_from_u64(0);
        // Drive to success by hand: free -> mon-2, pinned -> mon-1.
        loop {
            match env.observe() {
                StepOutcome::Done(Terminal::Success) => break,
                StepOutcome::Done(Terminal::Deadlock { .. }) => {
                    panic!("manual drive should not deadlock")
                }
                StepOutcome::Continue(decision) => {
                    let pick = decision
                        .actions
                        .iter()
                        .position(|c| {
                            let slot_id = &env.index().slot(c.key.slot).id;
                            let section = env.index().section(decision.state.section);
                            (section.id == "free") == (slot_id == "mon-2")
                        })
                        .unwrap();
                    env.step(pick);
                }
            }
        }
        let before = env.schedule().clone();

        let outcome = repair(&mut env, &policy, 4, 200, StopSignal::default(), &mut rng);
        assert_eq!(outcome.schedule, Some(before));
        assert_eq!(outcome.attempts, 0);
    }

    #[test]
    fn test_repair_respects_zero_depth() {
        let (mut env, mut rng) = deadlocked_env();
        let policy = agent();
        let outcome = repair(&mut env, &policy, 0, 200, StopSignal::default(), &mut rng);
        assert!(outcome.schedule.is_none());
        assert_eq!(outcome.attempts, 0);
    }

    #[test]
    fn test_repair_respects_budget() {
        let (mut env, mut rng) = deadlocked_env();
        let policy = agent();
        let outcome = repair(&mut env, &policy, 4, 0, StopSignal::default(), &mut rng);
        assert!(outcome.schedule.is_none());
        assert_eq!(outcome.attempts, 0);
    }

    #[test]
    fn test_repair_gives_up_on_truly_infeasible() {
        // Two sections, one slot: no amount of backtracking helps.
        let catalog = Catalog::new()
            .with_slot(TimeSlot::new("mon-1", Day::Monday, 540, 590))
            .with_room(Room::new("R101", 40))
            .with_instructor(Instructor::new("smith"))
            .with_section(
                Section::new("first")
                    .with_enrollment(10)
                    .with_eligible_room("R101")
                    .with_eligible_instructor("smith"),
            )
            .with_section(
                Section::new("second")
                    .with_enrollment(10)
                    .with_eligible_room("R101")
                    .with_eligible_instructor("smith"),
            );
        let index = Arc::new(CatalogIndex::build(catalog).unwrap());
        let mut env = SchedulingEnv::new(index, &EnvConfig::default());
        let policy = agent();
        let mut rng = SmallRng::seed_from_u64(1);
        let trace = run_episode(&mut env, &policy, SelectionMode::Greedy, &mut rng);
        assert!(!trace.succeeded());

        let outcome = repair(&mut env, &policy, 8, 500, StopSignal::default(), &mut rng);
        assert!(outcome.schedule.is_none());
    }
}
