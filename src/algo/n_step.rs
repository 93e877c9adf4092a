use log::trace;

use crate::{agent::Agent, env::Environment, trace::Trace};

type EpisodeTrace<A> = Trace<
    <<A as Agent>::Env as Environment>::State,
    <<A as Agent>::Env as Environment>::Action,
>;

/// Run one episode of off-policy n-step Q-learning, returning the reward earned at every step
///
/// Each state/action pair visited at time `tau` is updated once, with the return
///
/// `G = r[tau] + discount * r[tau+1] + ... + discount^n * r[tau+n] + discount^(n+1) * max V(s[tau+n+1])`
///
/// where `n = steps`, truncated at the end of the episode. A terminal state contributes no
/// bootstrap value; the last state of an episode the environment reports as
/// [truncated](Environment::truncated) still does. If the episode ends within `steps` steps, the window shrinks to the episode
/// length and the partial returns are used. `steps = 0` is the one-step Q-learning target.
///
/// The returns are not normalized, so long windows with `discount` near 1 give returns that grow
/// with the window. No importance sampling is applied, and convergence is not guaranteed with
/// non-tabular value functions.
pub fn n_step<A: Agent>(agent: &mut A, discount: f64, steps: usize) -> Vec<f64> {
    let mut steps = steps;
    let mut trace = Trace::new(agent.env().reset());
    let mut horizon: Option<usize> = None;
    let mut terminal = false;
    let mut t = 0;

    loop {
        if horizon.map_or(true, |h| t < h) {
            let state = trace.last_state().clone();
            let action = agent.next_action(&state);
            let (next, reward, done) = agent.env().step(action.clone());
            trace.push(action, next, reward);

            if done {
                let h = t + 1;
                horizon = Some(h);
                steps = steps.min(h);
                terminal = !agent.env().truncated();
            }
        }

        if let Some(tau) = t.checked_sub(steps) {
            let ret = window_return(agent, &trace, discount, tau, steps, horizon, terminal);
            trace!("n-step return at tau={tau}: {ret}");
            agent.update(&trace.states[tau], &trace.actions[tau], ret);

            if horizon.is_some_and(|h| tau + 1 >= h) {
                break;
            }
        }
        t += 1;
    }

    trace.rewards
}

/// Discounted return over `rewards[tau..=tau+steps]`, bootstrapped from the state that follows
fn window_return<A: Agent>(
    agent: &A,
    trace: &EpisodeTrace<A>,
    discount: f64,
    tau: usize,
    steps: usize,
    horizon: Option<usize>,
    terminal: bool,
) -> f64 {
    let last = match horizon {
        Some(h) => (tau + steps).min(h - 1),
        None => tau + steps,
    };

    let mut ret = trace.rewards[tau..=last]
        .iter()
        .zip(0..)
        .map(|(r, i)| discount.powi(i) * r)
        .sum::<f64>();

    if !terminal || horizon.map_or(true, |h| last + 1 < h) {
        let (value, _) = agent.maximum(&trace.states[last + 1]);
        ret += discount.powi((last + 1 - tau) as i32) * value;
    }
    ret
}

#[cfg(test)]
mod tests {
    use ndarray::Array2;

    use super::*;
    use crate::{
        algo::{QLearner, QLearnerConfig, QTable},
        env::{tests::Corridor, MatrixEnv},
        Goal, GoalSet, Model,
    };

    /// Always takes the same action and records every update without applying it
    struct Recorder<E> {
        env: E,
        values: QTable,
        action: usize,
        updates: Vec<(usize, usize, f64)>,
    }

    impl<E> Recorder<E> {
        fn new(env: E, values: QTable) -> Self {
            Self {
                env,
                values,
                action: 0,
                updates: Vec::new(),
            }
        }

        fn with_action(mut self, action: usize) -> Self {
            self.action = action;
            self
        }
    }

    impl<E: Environment<State = usize, Action = usize>> Agent for Recorder<E> {
        type Env = E;

        fn env(&mut self) -> &mut E {
            &mut self.env
        }

        fn next_action(&mut self, _state: &usize) -> usize {
            self.action
        }

        fn maximum(&self, state: &usize) -> (f64, usize) {
            self.values.best_action(*state)
        }

        fn update(&mut self, state: &usize, action: &usize, target: f64) {
            self.updates.push((*state, *action, target));
        }
    }

    /// Values where `V(s) = s + 1`
    fn ramp(num_states: usize) -> QTable {
        let mut q = QTable::new(num_states, 2);
        for s in 0..num_states {
            q.update(s, 0, s as f64 + 1.0);
        }
        q
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn returns_reward_history() {
        let mut agent = Recorder::new(Corridor::new(vec![1.0, 2.0, 3.0]), ramp(4));
        let rewards = n_step(&mut agent, 0.9, 1);
        assert_eq!(rewards, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn one_step_targets() {
        let mut agent = Recorder::new(Corridor::new(vec![1.0, 2.0, 3.0]), ramp(4));
        n_step(&mut agent, 0.5, 0);

        let expected = [
            (0, 0, 1.0 + 0.5 * 2.0),
            (1, 0, 2.0 + 0.5 * 3.0),
            (2, 0, 3.0), // state 3 is terminal
        ];
        assert_eq!(agent.updates.len(), expected.len());
        for (got, want) in agent.updates.iter().zip(expected) {
            assert_eq!((got.0, got.1), (want.0, want.1));
            assert!(close(got.2, want.2), "{got:?} != {want:?}");
        }
    }

    #[test]
    fn multi_step_targets() {
        let mut agent = Recorder::new(Corridor::new(vec![1.0, 2.0, 3.0, 4.0]), ramp(5));
        n_step(&mut agent, 0.5, 1);

        let targets = agent.updates.iter().map(|u| u.2).collect::<Vec<_>>();
        let expected = [
            1.0 + 0.5 * 2.0 + 0.25 * 3.0,
            2.0 + 0.5 * 3.0 + 0.25 * 4.0,
            3.0 + 0.5 * 4.0,
            4.0,
        ];
        assert_eq!(targets.len(), expected.len());
        for (got, want) in targets.iter().zip(expected) {
            assert!(close(*got, want), "{got} != {want}");
        }
        let states = agent.updates.iter().map(|u| u.0).collect::<Vec<_>>();
        assert_eq!(states, [0, 1, 2, 3], "each visited pair updated exactly once");
    }

    #[test]
    fn short_episode_salvages_partial_returns() {
        // Corridor asserts if stepped after termination; ramp(2) panics on a read of terminal state 2
        let mut agent = Recorder::new(Corridor::new(vec![1.0, 2.0]), ramp(2));
        let rewards = n_step(&mut agent, 0.5, 5);

        assert_eq!(rewards, [1.0, 2.0]);
        assert_eq!(agent.updates.len(), 2);
        assert!(close(agent.updates[0].2, 1.0 + 0.5 * 2.0));
        assert!(close(agent.updates[1].2, 2.0));
    }

    /// A 4-state chain where action 0 advances and action 1 stays put, with the goal at state 3
    fn chain() -> (QLearner, MatrixEnv) {
        let rewards = Array2::from_shape_fn((4, 2), |(s, a)| (s * 2 + a) as f64);
        let transitions = Array2::from_shape_fn((4, 2), |(s, a)| if a == 0 { s + 1 } else { s });
        let transitions = transitions.mapv(|n| n.min(3));
        let model = Model::from_matrix(rewards, Some(transitions)).unwrap();

        let learner = QLearner::new(
            model.clone(),
            Goal::states([3]),
            QLearnerConfig {
                lrate: 1.0,
                discount: 0.9,
                seed: Some(0),
                ..Default::default()
            },
        )
        .unwrap();

        let goals = GoalSet::new(Goal::states([3]), 4).unwrap();
        let env = MatrixEnv::new(model, goals, 0).unwrap();
        (learner, env)
    }

    #[test]
    fn single_step_window_matches_q_learning_target() {
        let (learner, env) = chain();
        let mut agent = Recorder::new(env, learner.q_table().clone());
        n_step(&mut agent, 0.9, 0);

        assert_eq!(agent.updates.len(), 3);
        for &(s, a, target) in &agent.updates {
            let (expected, _) = learner.utility(s, a);
            assert!(close(target, expected), "({s}, {a}): {target} != {expected}");
        }
    }

    #[test]
    fn truncated_episode_bootstraps_from_last_state() {
        // Staying at state 0 never reaches the goal, so the episode is cut off after 4 steps
        let (learner, env) = chain();
        let mut agent = Recorder::new(env, learner.q_table().clone()).with_action(1);
        let rewards = n_step(&mut agent, 0.9, 0);

        assert_eq!(rewards, [1.0; 4]);
        assert_eq!(agent.updates.len(), 4);
        for &(s, a, target) in &agent.updates {
            assert_eq!((s, a), (0, 1));
            let (expected, _) = learner.utility(s, a);
            assert!(close(target, expected), "({s}, {a}): {target} != {expected}");
        }
        assert!(close(agent.updates[3].2, 1.0 + 0.9 * 1.0));
    }
}
