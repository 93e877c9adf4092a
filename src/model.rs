use std::path::Path;

use ndarray::Array2;

use crate::{matrix, Error, Result};

/// Reward and transition lookup for a finite state/action space
///
/// Rows index states and columns index actions. Without a transition matrix, taking action `a`
/// moves the system to state `a`, so the reward matrix must be square.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    rewards: Array2<f64>,
    transitions: Option<Array2<usize>>,
}

impl Model {
    /// Build a model from in-memory matrices
    ///
    /// ### Parameters
    /// - `rewards` - `[states x actions]` matrix where `rewards[[s, a]]` is the reward for taking `a` from `s`
    /// - `transitions` - Optional `[states x actions]` matrix where `transitions[[s, a]]` is the next state
    pub fn from_matrix(rewards: Array2<f64>, transitions: Option<Array2<usize>>) -> Result<Self> {
        let (rows, cols) = rewards.dim();
        if rows == 0 || cols == 0 {
            return Err(Error::EmptyMatrix);
        }

        match &transitions {
            Some(t) => {
                if t.dim() != rewards.dim() {
                    return Err(Error::ShapeMismatch {
                        rewards: rewards.dim(),
                        transitions: t.dim(),
                    });
                }
                if let Some(((state, action), &next)) = t.indexed_iter().find(|(_, &n)| n >= rows) {
                    return Err(Error::InvalidTransition {
                        state,
                        action,
                        next,
                        num_states: rows,
                    });
                }
            }
            None if rows != cols => return Err(Error::NonSquareRewards { rows, cols }),
            None => {}
        }

        Ok(Self {
            rewards,
            transitions,
        })
    }

    /// Build a model from whitespace-delimited matrix files
    ///
    /// Transition entries are validated as integers at load time.
    pub fn from_file(rewards: impl AsRef<Path>, transitions: Option<&Path>) -> Result<Self> {
        let rewards = matrix::read_matrix(rewards)?;
        let transitions = transitions.map(matrix::read_index_matrix).transpose()?;
        Self::from_matrix(rewards, transitions)
    }

    pub fn num_states(&self) -> usize {
        self.rewards.nrows()
    }

    pub fn num_actions(&self) -> usize {
        self.rewards.ncols()
    }

    /// Reward for taking `action` from `state`
    ///
    /// `next_state` does not take part in the lookup. It is kept so that rewards depending on the
    /// full transition can be supported without changing callers.
    pub fn reward(&self, state: usize, action: usize, _next_state: usize) -> f64 {
        self.rewards[[state, action]]
    }

    /// The state reached by taking `action` from `state`
    pub fn next_state(&self, state: usize, action: usize) -> usize {
        match &self.transitions {
            Some(t) => t[[state, action]],
            None => action,
        }
    }

    /// States reachable from `state` in one step, in action order
    pub fn neighbours(&self, state: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.num_actions()).map(move |a| self.next_state(state, a))
    }

    pub fn rewards(&self) -> &Array2<f64> {
        &self.rewards
    }

    pub fn transitions(&self) -> Option<&Array2<usize>> {
        self.transitions.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use ndarray::array;

    use super::*;

    #[test]
    fn square_rewards_use_action_as_next_state() {
        let model = Model::from_matrix(array![[0.0, 1.0], [1.0, 0.0]], None).unwrap();
        assert_eq!(model.num_states(), 2);
        assert_eq!(model.num_actions(), 2);
        assert_eq!(model.next_state(0, 1), 1);
        assert_eq!(model.next_state(1, 0), 0);
        assert_eq!(model.reward(0, 1, 1), 1.0);
        assert_eq!(model.reward(0, 1, 0), 1.0, "next state does not affect reward");
    }

    #[test]
    fn transitions_drive_next_state() {
        let model = Model::from_matrix(
            array![[0.0, 0.0], [0.0, 5.0], [1.0, 0.0]],
            Some(array![[1, 2], [0, 2], [2, 2]]),
        )
        .unwrap();
        assert_eq!(model.next_state(0, 1), 2);
        assert_eq!(model.neighbours(1).collect::<Vec<_>>(), [0, 2]);
        assert_eq!(model.reward(1, 1, 2), 5.0);
    }

    #[test]
    fn rejects_non_square_rewards_without_transitions() {
        let err = Model::from_matrix(array![[0.0, 1.0, 2.0], [1.0, 0.0, 2.0]], None).unwrap_err();
        assert!(matches!(err, Error::NonSquareRewards { rows: 2, cols: 3 }));
    }

    #[test]
    fn rejects_shape_mismatch() {
        let err = Model::from_matrix(array![[0.0, 1.0], [1.0, 0.0]], Some(array![[0], [1]]))
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn rejects_out_of_range_transition() {
        let err = Model::from_matrix(array![[0.0, 1.0], [1.0, 0.0]], Some(array![[0, 1], [2, 0]]))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTransition {
                state: 1,
                action: 0,
                next: 2,
                num_states: 2
            }
        ));
    }

    #[test]
    fn loads_from_files() {
        let mut r = tempfile::NamedTempFile::new().unwrap();
        let mut t = tempfile::NamedTempFile::new().unwrap();
        writeln!(r, "0 1 0\n0 0 10").unwrap();
        writeln!(t, "1 1 0\n0 1 1").unwrap();

        let model = Model::from_file(r.path(), Some(t.path())).unwrap();
        assert_eq!(model.num_states(), 2);
        assert_eq!(model.num_actions(), 3);
        assert_eq!(model.next_state(1, 2), 1);
        assert_eq!(model.reward(1, 2, 1), 10.0);
    }

    #[test]
    fn file_transitions_must_be_integers() {
        let mut r = tempfile::NamedTempFile::new().unwrap();
        let mut t = tempfile::NamedTempFile::new().unwrap();
        writeln!(r, "0 1\n1 0").unwrap();
        writeln!(t, "1 0\n0 1.0").unwrap();

        let err = Model::from_file(r.path(), Some(t.path())).unwrap_err();
        assert!(matches!(err, Error::NonIntegerTransition { .. }));
    }
}
