use crate::{Error, GoalSet, Model, Result};

/// Represents a Markov decision process, defining the dynamics of an environment
/// in which an agent can operate.
///
/// Calls are synchronous; however long `step` takes, the learner waits for it.
pub trait Environment {
    /// A representation of the state of the environment to be passed to an agent
    type State: Clone;

    /// A representation of an action that an agent can take to affect the environment
    type Action: Clone;

    /// Reset the environment to an initial state
    ///
    /// **Returns** the state
    fn reset(&mut self) -> Self::State;

    /// Update the environment in response to an action taken by an agent
    ///
    /// **Returns** `(next_state, reward, done)`, where `done` marks the end of the episode
    fn step(&mut self, action: Self::Action) -> (Self::State, f64, bool);

    /// Whether the last episode ended because it was cut short rather than by reaching a terminal
    /// state
    ///
    /// A truncated episode's final state still has a value worth bootstrapping from.
    fn truncated(&self) -> bool {
        false
    }
}

/// An [`Environment`] that walks a [`Model`]
///
/// Episodes begin at a fixed start state and end on reaching a goal, or are truncated after as
/// many steps as there are states.
#[derive(Debug, Clone)]
pub struct MatrixEnv {
    model: Model,
    goals: GoalSet,
    start: usize,
    state: usize,
    steps: usize,
    truncated: bool,
}

impl MatrixEnv {
    /// **Errors** if `start` is not a state of `model`
    pub fn new(model: Model, goals: GoalSet, start: usize) -> Result<Self> {
        check_start(&model, start)?;
        Ok(Self {
            model,
            goals,
            start,
            state: start,
            steps: 0,
            truncated: false,
        })
    }

    /// Change the state future episodes begin from
    ///
    /// **Errors** if `start` is not a state of the model, leaving the current start in place
    pub fn set_start(&mut self, start: usize) -> Result<()> {
        check_start(&self.model, start)?;
        self.start = start;
        Ok(())
    }

    pub fn state(&self) -> usize {
        self.state
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn goals(&self) -> &GoalSet {
        &self.goals
    }
}

fn check_start(model: &Model, start: usize) -> Result<()> {
    if start >= model.num_states() {
        return Err(Error::InvalidStart {
            state: start,
            num_states: model.num_states(),
        });
    }
    Ok(())
}

impl Environment for MatrixEnv {
    type State = usize;
    type Action = usize;

    fn reset(&mut self) -> usize {
        self.state = self.start;
        self.steps = 0;
        self.truncated = false;
        self.state
    }

    fn step(&mut self, action: usize) -> (usize, f64, bool) {
        let next = self.model.next_state(self.state, action);
        let reward = self.model.reward(self.state, action, next);
        self.state = next;
        self.steps += 1;

        let terminal = self.goals.contains(next);
        self.truncated = !terminal && self.steps >= self.model.num_states();
        (next, reward, terminal || self.truncated)
    }

    fn truncated(&self) -> bool {
        self.truncated
    }
}
