mod greedy;
mod softmax;

use rand::Rng;
use rand_distr::{Distribution, Uniform};

pub use greedy::Greedy;
pub use softmax::Softmax;

use crate::{algo::QTable, Error, Result};

/// Action selection strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PolicyKind {
    /// Every action is equally likely
    #[default]
    Uniform = 0,
    /// The best action is favoured with a configured probability
    Greedy = 1,
    /// Actions are drawn in proportion to their values
    Softmax = 2,
}

impl TryFrom<u8> for PolicyKind {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Self::Uniform),
            1 => Ok(Self::Greedy),
            2 => Ok(Self::Softmax),
            _ => Err(Error::UnknownCode {
                kind: "policy",
                code,
            }),
        }
    }
}

/// How often a [`Selector`] looks at the value table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Snapshot once per episode
    #[default]
    Offline = 0,
    /// Read live values on every selection
    Online = 1,
}

impl TryFrom<u8> for Mode {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Self::Offline),
            1 => Ok(Self::Online),
            _ => Err(Error::UnknownCode { kind: "mode", code }),
        }
    }
}

/// Configuration for a [`Selector`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PolicyConfig {
    pub kind: PolicyKind,
    pub mode: Mode,
    /// Probability of choosing the best action, in `[0, 1)`
    ///
    /// Required by [`PolicyKind::Greedy`], ignored otherwise.
    pub max_prob: Option<f64>,
}

impl PolicyConfig {
    pub fn uniform(mode: Mode) -> Self {
        Self {
            kind: PolicyKind::Uniform,
            mode,
            max_prob: None,
        }
    }

    pub fn greedy(max_prob: f64, mode: Mode) -> Self {
        Self {
            kind: PolicyKind::Greedy,
            mode,
            max_prob: Some(max_prob),
        }
    }

    pub fn softmax(mode: Mode) -> Self {
        Self {
            kind: PolicyKind::Softmax,
            mode,
            max_prob: None,
        }
    }
}

#[derive(Debug, Clone)]
enum Strategy {
    Uniform,
    Greedy(Greedy),
    Softmax(Softmax),
}

/// Stateful exploratory action selector
///
/// Chooses the action taken at each step of a learning episode. In [`Mode::Online`] it reads the
/// live value table on every selection; in [`Mode::Offline`] it works from a snapshot rebuilt once
/// per episode via [`Selector::refresh`].
#[derive(Debug, Clone)]
pub struct Selector {
    config: PolicyConfig,
    strategy: Strategy,
    actions: Uniform<usize>,
}

impl Selector {
    /// Build a selector over `num_actions` actions
    ///
    /// **Errors** if the greedy strategy is missing `max_prob` or it lies outside `[0, 1)`
    pub fn new(config: PolicyConfig, num_actions: usize) -> Result<Self> {
        if num_actions == 0 {
            return Err(Error::EmptyMatrix);
        }

        let strategy = match config.kind {
            PolicyKind::Uniform => Strategy::Uniform,
            PolicyKind::Greedy => {
                let max_prob = config.max_prob.ok_or(Error::MissingMaxProb)?;
                Strategy::Greedy(Greedy::new(max_prob, num_actions)?)
            }
            PolicyKind::Softmax => Strategy::Softmax(Softmax::new()),
        };

        Ok(Self {
            config,
            strategy,
            actions: Uniform::new(0, num_actions),
        })
    }

    pub fn config(&self) -> PolicyConfig {
        self.config
    }

    pub fn kind(&self) -> PolicyKind {
        self.config.kind
    }

    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    /// Rebuild the offline snapshot from the current value table
    ///
    /// Does nothing in [`Mode::Online`].
    pub fn refresh(&mut self, q: &QTable) {
        if self.config.mode == Mode::Online {
            return;
        }
        match &mut self.strategy {
            Strategy::Uniform => {}
            Strategy::Greedy(g) => g.refresh(q),
            Strategy::Softmax(s) => s.refresh(q),
        }
    }

    /// Drop any cached snapshot
    pub fn clear(&mut self) {
        match &mut self.strategy {
            Strategy::Uniform => {}
            Strategy::Greedy(g) => g.clear(),
            Strategy::Softmax(s) => s.clear(),
        }
    }

    fn is_stale(&self) -> bool {
        match &self.strategy {
            Strategy::Uniform => false,
            Strategy::Greedy(g) => !g.is_cached(),
            Strategy::Softmax(s) => !s.is_cached(),
        }
    }

    /// Choose an exploratory action from `state`
    ///
    /// In [`Mode::Offline`] a missing snapshot is built on first use.
    pub fn select<R: Rng + ?Sized>(&mut self, state: usize, q: &QTable, rng: &mut R) -> usize {
        let online = self.config.mode == Mode::Online;
        if !online && self.is_stale() {
            self.refresh(q);
        }

        match &self.strategy {
            Strategy::Uniform => self.actions.sample(rng),
            Strategy::Greedy(g) => {
                let best = if online {
                    q.best_action(state).1
                } else {
                    g.cached_best(state)
                };
                g.choose(best, rng)
                    .unwrap_or_else(|| self.actions.sample(rng))
            }
            Strategy::Softmax(s) => {
                if online {
                    softmax::sample_row(q.row(state).iter().copied(), rng)
                } else {
                    s.sample_cached(state, rng)
                }
            }
        }
    }
}
