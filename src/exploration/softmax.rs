use ndarray::{Array2, Axis};
use rand::Rng;

use crate::algo::QTable;

/// Value-proportional exploration
///
/// Actions are drawn by inverse-CDF sampling over the running sum of a state's action values.
/// Values are used as-is, so they are expected to be non-negative.
#[derive(Debug, Clone, Default)]
pub struct Softmax {
    cumulative: Option<Array2<f64>>,
}

impl Softmax {
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) fn refresh(&mut self, q: &QTable) {
        let mut cumulative = q.values().clone();
        cumulative.accumulate_axis_inplace(Axis(1), |&prev, curr| *curr += prev);
        self.cumulative = Some(cumulative);
    }

    pub(super) fn clear(&mut self) {
        self.cumulative = None;
    }

    pub(super) fn is_cached(&self) -> bool {
        self.cumulative.is_some()
    }

    pub(super) fn sample_cached<R: Rng + ?Sized>(&self, state: usize, rng: &mut R) -> usize {
        let cumulative = self
            .cumulative
            .as_ref()
            .expect("snapshot is built before sampling");
        let row = cumulative.row(state);
        let total = row[row.len() - 1];
        search(row.iter().copied(), rng.gen::<f64>() * total)
    }
}

/// Draw an action from a row of live values
pub(super) fn sample_row<R, I>(values: I, rng: &mut R) -> usize
where
    R: Rng + ?Sized,
    I: IntoIterator<Item = f64>,
{
    let cumulative = values
        .into_iter()
        .scan(0.0, |sum, v| {
            *sum += v;
            Some(*sum)
        })
        .collect::<Vec<_>>();
    let total = cumulative.last().copied().unwrap_or(0.0);
    search(cumulative, rng.gen::<f64>() * total)
}

/// First index whose cumulative sum reaches `u`, clamped to the last index
fn search(cumulative: impl IntoIterator<Item = f64>, u: f64) -> usize {
    let mut last = 0;
    for (i, c) in cumulative.into_iter().enumerate() {
        if c >= u {
            return i;
        }
        last = i;
    }
    last
}
