use std::collections::VecDeque;

use log::warn;
use rand::{seq::index, Rng};

use crate::{util::ensure_interval, GoalSet, Model, Result};

/// Order in which episode start states are produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EpisodeMode {
    /// Ascending state indices from 0
    #[default]
    Uniform,
    /// Breadth-first expansion outward from the goal states
    Bfs,
}

/// Produce the start states for `floor(num_states * coverage)` episodes
///
/// In [`EpisodeMode::Bfs`], states are yielded in breadth-first order from the goals (highest
/// index first) through the transition relation, with neighbours visited in action order. If the frontier runs dry before
/// the budget is met, the remainder is drawn without replacement from the states already
/// enqueued. The fallback cannot draw more states than have been enqueued, so it may fall short.
///
/// **Errors** if `coverage` is not in the interval `[0, 1]`
pub fn episodes<R: Rng + ?Sized>(
    model: &Model,
    goals: &GoalSet,
    coverage: f64,
    mode: EpisodeMode,
    rng: &mut R,
) -> Result<Vec<usize>> {
    ensure_interval!(coverage, 0.0, 1.0);
    let num = (model.num_states() as f64 * coverage) as usize;

    match mode {
        EpisodeMode::Uniform => Ok((0..num).collect()),
        EpisodeMode::Bfs => Ok(bfs(model, goals, num, rng)),
    }
}

fn bfs<R: Rng + ?Sized>(model: &Model, goals: &GoalSet, num: usize, rng: &mut R) -> Vec<usize> {
    let mut enqueued = vec![false; model.num_states()];
    let mut frontier = VecDeque::with_capacity(model.num_states());
    // Highest-index goal is expanded first
    for g in goals.iter().rev() {
        enqueued[g] = true;
        frontier.push_back(g);
    }

    let mut starts = Vec::with_capacity(num);
    while starts.len() < num {
        let Some(state) = frontier.pop_front() else {
            break;
        };
        for n in model.neighbours(state) {
            if !enqueued[n] {
                enqueued[n] = true;
                frontier.push_back(n);
            }
        }
        starts.push(state);
    }

    if starts.len() < num {
        let pool = enqueued
            .iter()
            .enumerate()
            .filter_map(|(s, &e)| e.then_some(s))
            .collect::<Vec<_>>();
        let wanted = num - starts.len();
        let amount = wanted.min(pool.len());
        if amount < wanted {
            warn!(
                "breadth-first schedule reached {} states, {} short of {num} episodes",
                starts.len() + amount,
                wanted - amount,
            );
        }
        starts.extend(index::sample(rng, pool.len(), amount).iter().map(|i| pool[i]));
    }

    starts
}

#[cfg(test)]
mod tests {
    use ndarray::{array, Array2};
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::Goal;

    fn ring() -> Model {
        let transitions = Array2::from_shape_fn((4, 2), |(s, a)| match a {
            0 => (s + 1) % 4,
            _ => (s + 3) % 4,
        });
        Model::from_matrix(Array2::zeros((4, 2)), Some(transitions)).unwrap()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0)
    }

    #[test]
    fn uniform_covers_prefix() {
        let model = ring();
        let goals = GoalSet::new(Goal::states([0]), 4).unwrap();
        let starts = episodes(&model, &goals, 0.5, EpisodeMode::Uniform, &mut rng()).unwrap();
        assert_eq!(starts, [0, 1]);

        let starts = episodes(&model, &goals, 1.0, EpisodeMode::Uniform, &mut rng()).unwrap();
        assert_eq!(starts, [0, 1, 2, 3]);

        let starts = episodes(&model, &goals, 0.0, EpisodeMode::Uniform, &mut rng()).unwrap();
        assert!(starts.is_empty());
    }

    #[test]
    fn rejects_bad_coverage() {
        let model = ring();
        let goals = GoalSet::new(Goal::states([0]), 4).unwrap();
        for coverage in [-0.5, 1.5, f64::NAN] {
            assert!(episodes(&model, &goals, coverage, EpisodeMode::Bfs, &mut rng()).is_err());
        }
    }

    #[test]
    fn bfs_over_ring() {
        let model = ring();
        let goals = GoalSet::new(Goal::states([0]), 4).unwrap();
        let starts = episodes(&model, &goals, 1.0, EpisodeMode::Bfs, &mut rng()).unwrap();
        // 0 enqueues 1 (action 0) then 3 (action 1); 1 enqueues 2
        assert_eq!(starts, [0, 1, 3, 2]);
    }

    #[test]
    fn bfs_expands_highest_goal_first() {
        let model = ring();
        let goals = GoalSet::new(Goal::states([0, 2]), 4).unwrap();
        let starts = episodes(&model, &goals, 1.0, EpisodeMode::Bfs, &mut rng()).unwrap();
        // 2 enqueues 3 then 1; 0 finds both already enqueued
        assert_eq!(starts, [2, 0, 3, 1]);
    }

    #[test]
    fn bfs_respects_budget() {
        let model = ring();
        let goals = GoalSet::new(Goal::states([2]), 4).unwrap();
        let starts = episodes(&model, &goals, 0.5, EpisodeMode::Bfs, &mut rng()).unwrap();
        assert_eq!(starts, [2, 3]);
    }

    #[test]
    fn bfs_fallback_resamples_enqueued_states() {
        // 0 <-> 1 is closed; 2 and 3 are never reachable from the goal
        let model = Model::from_matrix(
            Array2::zeros((4, 2)),
            Some(array![[1, 0], [0, 1], [3, 2], [2, 3]]),
        )
        .unwrap();
        let goals = GoalSet::new(Goal::states([0]), 4).unwrap();
        let starts = episodes(&model, &goals, 1.0, EpisodeMode::Bfs, &mut rng()).unwrap();

        assert_eq!(&starts[..2], [0, 1]);
        assert_eq!(starts.len(), 4);
        let mut tail = starts[2..].to_vec();
        tail.sort();
        assert_eq!(tail, [0, 1], "drawn without replacement from the enqueued states");
    }

    #[test]
    fn bfs_fallback_falls_short_without_goals() {
        let model = ring();
        let goals = GoalSet::new(Goal::predicate(|_| false), 4).unwrap();
        let starts = episodes(&model, &goals, 1.0, EpisodeMode::Bfs, &mut rng()).unwrap();
        assert!(starts.is_empty());
    }
}
