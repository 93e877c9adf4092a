use rand::Rng;
use rand_distr::{Bernoulli, Distribution};

use crate::{algo::QTable, util::ensure_interval, Result};

/// Greedy exploration: pick the best known action with a fixed probability, otherwise fall back
/// to a uniformly random action
///
/// The configured `max_prob` is discounted by the chance that the uniform fallback lands on the
/// best action anyway, so the effective probability of the best action is
/// `max_prob - (1 - max_prob) / num_actions`.
#[derive(Debug, Clone)]
pub struct Greedy {
    threshold: f64,
    coin: Bernoulli,
    best: Vec<usize>,
}

impl Greedy {
    /// **Errors** if `max_prob` is not in the interval `[0, 1)`
    pub fn new(max_prob: f64, num_actions: usize) -> Result<Self> {
        ensure_interval!(max_prob, 0.0, 1.0, open);
        let threshold = max_prob - (1.0 - max_prob) / num_actions as f64;
        let coin = Bernoulli::new(threshold.max(0.0)).expect("threshold is below 1");
        Ok(Self {
            threshold,
            coin,
            best: Vec::new(),
        })
    }

    /// Effective probability of taking the best action
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub(super) fn refresh(&mut self, q: &QTable) {
        self.best = (0..q.num_states()).map(|s| q.best_action(s).1).collect();
    }

    pub(super) fn clear(&mut self) {
        self.best.clear();
    }

    pub(super) fn is_cached(&self) -> bool {
        !self.best.is_empty()
    }

    pub(super) fn cached_best(&self, state: usize) -> usize {
        self.best[state]
    }

    /// Flip the greedy coin, returning `best` on success
    pub(super) fn choose<R: Rng + ?Sized>(&self, best: usize, rng: &mut R) -> Option<usize> {
        self.coin.sample(rng).then_some(best)
    }
}
