use std::path::Path;

use log::{debug, info, trace};
use ndarray::Array2;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    exploration::{Mode, PolicyConfig, Selector},
    schedule::{self, EpisodeMode},
    util::ensure_interval,
    Goal, GoalSet, Model, Result,
};

use super::QTable;

/// Configuration for the [`QLearner`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QLearnerConfig {
    /// Learning rate, in `[0, 1]`
    ///
    /// **Default**: `0.25`
    pub lrate: f64,
    /// Discount factor for future rewards, in `[0, 1]`
    ///
    /// **Default**: `1.0`
    pub discount: f64,
    /// Probability that [`QLearner::recommend`] explores instead of exploiting, in `[0, 1]`
    ///
    /// **Default**: `0.0`
    pub exploration: f64,
    /// Action selection policy used while learning and exploring
    ///
    /// **Default**: uniform, offline
    pub policy: PolicyConfig,
    /// Seed for the learner's random number generator, or `None` to seed from entropy
    ///
    /// **Default**: `None`
    pub seed: Option<u64>,
}

impl Default for QLearnerConfig {
    fn default() -> Self {
        Self {
            lrate: 0.25,
            discount: 1.0,
            exploration: 0.0,
            policy: PolicyConfig::default(),
            seed: None,
        }
    }
}

/// Outcome of a [`QLearner::learn`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Number of episodes run
    pub episodes: usize,
    /// Number of value updates made across all episodes
    pub updates: usize,
    /// Number of episodes that ended at a goal state
    pub goals_reached: usize,
}

/// Single-step off-policy temporal difference learner over a [`Model`]
///
/// Learns a [`QTable`] by running episodes from scheduled start states. Each step takes an
/// exploratory action and moves `Q(s, a)` toward `reward + discount * max Q(s', .)`. Goal states
/// are terminal, so their bootstrap term is zero. Each episode stops at a goal or after
/// `num_states` steps, whichever comes first.
#[derive(Debug, Clone)]
pub struct QLearner {
    model: Model,
    goals: GoalSet,
    q_table: QTable,
    selector: Selector,
    lrate: f64,
    discount: f64,
    exploration: f64,
    rng: StdRng,
}

impl QLearner {
    /// Initialize a learner over a model
    ///
    /// **Errors** if any parameter is out of range, the policy is misconfigured, or a goal index
    /// is not a state of the model
    pub fn new(model: Model, goal: Goal, config: QLearnerConfig) -> Result<Self> {
        ensure_interval!(config.lrate, 0.0, 1.0);
        ensure_interval!(config.discount, 0.0, 1.0);
        ensure_interval!(config.exploration, 0.0, 1.0);

        let goals = GoalSet::new(goal, model.num_states())?;
        let selector = Selector::new(config.policy, model.num_actions())?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            q_table: QTable::new(model.num_states(), model.num_actions()),
            model,
            goals,
            selector,
            lrate: config.lrate,
            discount: config.discount,
            exploration: config.exploration,
            rng,
        })
    }

    /// Initialize a learner from in-memory reward and optional transition matrices
    pub fn from_matrix(
        rewards: Array2<f64>,
        transitions: Option<Array2<usize>>,
        goal: Goal,
        config: QLearnerConfig,
    ) -> Result<Self> {
        Self::new(Model::from_matrix(rewards, transitions)?, goal, config)
    }

    /// Initialize a learner from whitespace-delimited reward and optional transition matrix files
    pub fn from_file(
        rewards: impl AsRef<Path>,
        transitions: Option<&Path>,
        goal: Goal,
        config: QLearnerConfig,
    ) -> Result<Self> {
        Self::new(Model::from_file(rewards, transitions)?, goal, config)
    }

    /// Replace the action selection policy, discarding any cached policy state
    ///
    /// On error the current policy is kept.
    pub fn set_policy(&mut self, config: PolicyConfig) -> Result<()> {
        self.selector = Selector::new(config, self.model.num_actions())?;
        Ok(())
    }

    /// Replace the goal states
    ///
    /// On error the current goals are kept.
    pub fn set_goal(&mut self, goal: Goal) -> Result<()> {
        self.goals = GoalSet::new(goal, self.model.num_states())?;
        Ok(())
    }

    /// Run learning episodes from the states produced by [`schedule::episodes`]
    ///
    /// **Errors** if `coverage` is not in the interval `[0, 1]`, before any episode runs
    pub fn learn(&mut self, coverage: f64, mode: EpisodeMode) -> Result<Summary> {
        let starts = self.episodes(coverage, mode)?;
        let mut summary = Summary::default();

        for start in starts {
            if self.selector.mode() == Mode::Offline {
                self.selector.refresh(&self.q_table);
            }

            let (state, steps) = self.episode(start);
            let reached = self.goals.contains(state);
            debug!("episode from {start}: {steps} updates, ended at {state} (goal: {reached})");

            summary.episodes += 1;
            summary.updates += steps;
            summary.goals_reached += reached as usize;
        }

        info!(
            "learned over {} episodes: {} updates, {} reached a goal",
            summary.episodes, summary.updates, summary.goals_reached
        );
        Ok(summary)
    }

    /// Run one episode, returning the final state and the number of updates made
    fn episode(&mut self, mut state: usize) -> (usize, usize) {
        let limit = self.model.num_states();
        let mut steps = 0;
        while !self.goals.contains(state) && steps < limit {
            let action = self.next_action(state);
            state = self.step(state, action);
            steps += 1;
        }
        (state, steps)
    }

    /// Apply one TD update for `(state, action)` and return the next state
    fn step(&mut self, state: usize, action: usize) -> usize {
        let (value, next) = self.utility(state, action);
        trace!("Q({state}, {action}) <- {value}");
        self.q_table.update(state, action, value);
        next
    }

    /// Start states for a [`learn`](Self::learn) call with the same arguments
    pub fn episodes(&mut self, coverage: f64, mode: EpisodeMode) -> Result<Vec<usize>> {
        schedule::episodes(&self.model, &self.goals, coverage, mode, &mut self.rng)
    }

    /// Choose an exploratory action from `state` using the configured policy
    pub fn next_action(&mut self, state: usize) -> usize {
        self.selector.select(state, &self.q_table, &mut self.rng)
    }

    /// The updated estimate for taking `action` from `state`, and the state it leads to
    ///
    /// `Q(s, a) + lrate * (reward + discount * max Q(s', .) - Q(s, a))`, with no bootstrap term
    /// when `s'` is a goal.
    pub fn utility(&self, state: usize, action: usize) -> (f64, usize) {
        let next = self.model.next_state(state, action);
        let future = if self.goals.contains(next) {
            0.0
        } else {
            self.q_table.best_action(next).0
        };
        let q = self.q_table.get(state, action);
        let reward = self.model.reward(state, action, next);
        (q + self.lrate * (reward + self.discount * future - q), next)
    }

    /// Recommend an action from `state`
    ///
    /// With probability `exploration`, takes an exploratory step (updating the value table) and
    /// returns its action. Otherwise returns the best known action without learning.
    pub fn recommend(&mut self, state: usize) -> usize {
        if self.rng.gen::<f64>() < self.exploration {
            let action = self.next_action(state);
            self.step(state, action);
            action
        } else {
            self.q_table.best_action(state).1
        }
    }

    /// Restore the value table to its initial state, keeping all other configuration
    pub fn reset(&mut self) {
        self.q_table.reset();
        self.selector.clear();
    }

    /// The value of `state` and the action achieving it
    pub fn value(&self, state: usize) -> (f64, usize) {
        self.q_table.best_action(state)
    }

    pub fn reward(&self, state: usize, action: usize, next_state: usize) -> f64 {
        self.model.reward(state, action, next_state)
    }

    pub fn next_state(&self, state: usize, action: usize) -> usize {
        self.model.next_state(state, action)
    }

    pub fn is_goal(&self, state: usize) -> bool {
        self.goals.contains(state)
    }

    pub fn num_states(&self) -> usize {
        self.model.num_states()
    }

    pub fn num_actions(&self) -> usize {
        self.model.num_actions()
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn goals(&self) -> &GoalSet {
        &self.goals
    }

    pub fn policy(&self) -> PolicyConfig {
        self.selector.config()
    }

    pub fn lrate(&self) -> f64 {
        self.lrate
    }

    pub fn discount(&self) -> f64 {
        self.discount
    }

    pub fn exploration(&self) -> f64 {
        self.exploration
    }
}
