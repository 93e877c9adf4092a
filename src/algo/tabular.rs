use rand::{rngs::StdRng, SeedableRng};

use crate::{
    agent::Agent,
    env::Environment,
    exploration::{Mode, PolicyConfig, Selector},
    util::ensure_interval,
    Result,
};

use super::{n_step, QTable};

/// Configuration for the [`TabularAgent`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TabularAgentConfig {
    /// Step size toward each n-step return, in `[0, 1]`
    ///
    /// **Default**: `0.25`
    pub lrate: f64,
    /// Exploratory action selection policy
    ///
    /// **Default**: uniform, offline
    pub policy: PolicyConfig,
    /// **Default**: `None`
    pub seed: Option<u64>,
}

impl Default for TabularAgentConfig {
    fn default() -> Self {
        Self {
            lrate: 0.25,
            policy: PolicyConfig::default(),
            seed: None,
        }
    }
}

/// An [`Agent`] backed by a [`QTable`], for running [`n_step`] learning over any environment with
/// indexed states and actions
#[derive(Debug, Clone)]
pub struct TabularAgent<E> {
    env: E,
    q_table: QTable,
    selector: Selector,
    lrate: f64,
    rng: StdRng,
}

impl<E> TabularAgent<E>
where
    E: Environment<State = usize, Action = usize>,
{
    pub fn new(
        env: E,
        num_states: usize,
        num_actions: usize,
        config: TabularAgentConfig,
    ) -> Result<Self> {
        ensure_interval!(config.lrate, 0.0, 1.0);
        Ok(Self {
            env,
            q_table: QTable::new(num_states, num_actions),
            selector: Selector::new(config.policy, num_actions)?,
            lrate: config.lrate,
            rng: match config.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            },
        })
    }

    /// Run one n-step learning episode, returning its reward history
    ///
    /// Offline policies snapshot the value table once before the episode starts.
    pub fn episode(&mut self, discount: f64, steps: usize) -> Vec<f64> {
        if self.selector.mode() == Mode::Offline {
            self.selector.refresh(&self.q_table);
        }
        n_step(self, discount, steps)
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn reset(&mut self) {
        self.q_table.reset();
        self.selector.clear();
    }
}

impl<E> Agent for TabularAgent<E>
where
    E: Environment<State = usize, Action = usize>,
{
    type Env = E;

    fn env(&mut self) -> &mut E {
        &mut self.env
    }

    fn next_action(&mut self, state: &usize) -> usize {
        self.selector.select(*state, &self.q_table, &mut self.rng)
    }

    fn maximum(&self, state: &usize) -> (f64, usize) {
        self.q_table.best_action(*state)
    }

    fn update(&mut self, state: &usize, action: &usize, target: f64) {
        let q = self.q_table.get(*state, *action);
        self.q_table
            .update(*state, *action, q + self.lrate * (target - q));
    }
}
