use ndarray::{Array2, ArrayView1};

/// Initial value of every entry in a fresh [`QTable`]
pub const SEED_VALUE: f64 = 1.0;

/// Dense `[states x actions]` table of action-value estimates
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    values: Array2<f64>,
}

impl QTable {
    /// Initialize a table with every entry set to [`SEED_VALUE`]
    pub fn new(num_states: usize, num_actions: usize) -> Self {
        Self {
            values: Array2::from_elem((num_states, num_actions), SEED_VALUE),
        }
    }

    pub fn get(&self, state: usize, action: usize) -> f64 {
        self.values[[state, action]]
    }

    /// The highest value in a state's row and the action achieving it
    ///
    /// Ties resolve to the lowest action index.
    pub fn best_action(&self, state: usize) -> (f64, usize) {
        best_in_row(self.values.row(state))
    }

    pub fn update(&mut self, state: usize, action: usize, value: f64) {
        self.values[[state, action]] = value;
    }

    /// Restore every entry to [`SEED_VALUE`]
    pub fn reset(&mut self) {
        self.values.fill(SEED_VALUE);
    }

    pub fn row(&self, state: usize) -> ArrayView1<'_, f64> {
        self.values.row(state)
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn num_states(&self) -> usize {
        self.values.nrows()
    }

    pub fn num_actions(&self) -> usize {
        self.values.ncols()
    }
}

/// Argmax over a row of values, keeping the first index on ties
pub(crate) fn best_in_row(row: ArrayView1<'_, f64>) -> (f64, usize) {
    row.iter()
        .enumerate()
        .fold((f64::NEG_INFINITY, 0), |(best, arg), (i, &v)| {
            if v > best {
                (v, i)
            } else {
                (best, arg)
            }
        })
}
