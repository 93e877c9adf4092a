use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while configuring or running a learner
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("matrix has no entries")]
    EmptyMatrix,

    #[error("row {row} has {got} columns, expected {expected}")]
    RaggedMatrix {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("invalid number '{token}' at row {row}, column {col}")]
    InvalidNumber {
        row: usize,
        col: usize,
        token: String,
    },

    #[error("transition entry '{token}' at row {row}, column {col} is not an integer")]
    NonIntegerTransition {
        row: usize,
        col: usize,
        token: String,
    },

    #[error("transition matrix is {transitions:?} but reward matrix is {rewards:?}")]
    ShapeMismatch {
        rewards: (usize, usize),
        transitions: (usize, usize),
    },

    #[error("reward matrix must be square without a transition matrix, got {rows}x{cols}")]
    NonSquareRewards { rows: usize, cols: usize },

    #[error("transition ({state}, {action}) leads to {next}, but there are only {num_states} states")]
    InvalidTransition {
        state: usize,
        action: usize,
        next: usize,
        num_states: usize,
    },

    #[error("goal state {state} is out of range for {num_states} states")]
    InvalidGoal { state: usize, num_states: usize },

    #[error("start state {state} is out of range for {num_states} states")]
    InvalidStart { state: usize, num_states: usize },

    #[error("greedy policy requires `max_prob`")]
    MissingMaxProb,

    #[error("invalid value for `{name}`: {value}. Must be in the interval {interval}.")]
    OutOfRange {
        name: &'static str,
        value: f64,
        interval: &'static str,
    },

    #[error("unknown {kind} code {code}")]
    UnknownCode { kind: &'static str, code: u8 },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
