use std::{collections::BTreeSet, fmt};

use log::warn;

use crate::{Error, Result};

/// How the terminal states of a learner are specified
pub enum Goal {
    /// Explicit goal state indices
    States(Vec<usize>),
    /// A predicate evaluated once for every state index
    Predicate(Box<dyn Fn(usize) -> bool>),
}

impl Goal {
    pub fn states(states: impl IntoIterator<Item = usize>) -> Self {
        Self::States(states.into_iter().collect())
    }

    pub fn predicate(f: impl Fn(usize) -> bool + 'static) -> Self {
        Self::Predicate(Box::new(f))
    }
}

impl fmt::Debug for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::States(states) => f.debug_tuple("States").field(states).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// The resolved set of terminal states, in ascending order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalSet {
    states: BTreeSet<usize>,
}

impl GoalSet {
    /// Resolve a [`Goal`] over a domain of `num_states` states
    ///
    /// A predicate that matches nothing produces an empty set rather than an error, in which case
    /// every episode runs until its iteration cap.
    pub fn new(goal: Goal, num_states: usize) -> Result<Self> {
        let states = match goal {
            Goal::States(states) => {
                if let Some(&state) = states.iter().find(|&&s| s >= num_states) {
                    return Err(Error::InvalidGoal { state, num_states });
                }
                states.into_iter().collect()
            }
            Goal::Predicate(f) => (0..num_states).filter(|&s| f(s)).collect::<BTreeSet<_>>(),
        };

        if states.is_empty() {
            warn!("goal specification matches none of the {num_states} states");
        }

        Ok(Self { states })
    }

    pub fn contains(&self, state: usize) -> bool {
        self.states.contains(&state)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = usize> + '_ {
        self.states.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
