//! Temporal-difference value iteration over discrete state and action spaces
//!
//! [`QLearner`](algo::QLearner) learns a table of action values from a reward matrix (and an
//! optional transition matrix) with single-step off-policy Q-learning, then recommends actions by
//! exploiting it. [`n_step`](algo::n_step) generalizes the same update to multi-step returns over
//! any [`Agent`](agent::Agent).

/// Implemented RL algorithms
pub mod algo;

/// Agent capabilities for multi-step learning
pub mod agent;

/// Environment
pub mod env;

/// Error types
mod error;

/// Exploration policies
pub mod exploration;

/// Terminal states
pub mod goal;

/// Matrix file I/O
pub mod matrix;

/// Reward and transition lookup
pub mod model;

/// Episode scheduling
pub mod schedule;

/// Episode history
pub mod trace;

mod util;

pub use error::{Error, Result};
pub use goal::{Goal, GoalSet};
pub use model::Model;
