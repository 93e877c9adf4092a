/// The history of one live episode: `states[t]` is the state action `actions[t]` was taken from,
/// earning `rewards[t]` and leading to `states[t + 1]`
#[derive(Debug, Clone, PartialEq)]
pub struct Trace<S, A> {
    pub states: Vec<S>,
    pub actions: Vec<A>,
    pub rewards: Vec<f64>,
}

impl<S, A> Trace<S, A> {
    /// Begin a trace at the initial state
    pub fn new(initial: S) -> Self {
        Self {
            states: vec![initial],
            actions: Vec::new(),
            rewards: Vec::new(),
        }
    }

    /// Record one transition
    pub fn push(&mut self, action: A, next_state: S, reward: f64) {
        self.actions.push(action);
        self.states.push(next_state);
        self.rewards.push(reward);
    }

    /// The most recently observed state
    pub fn last_state(&self) -> &S {
        self.states.last().expect("a trace always holds its initial state")
    }

    /// Number of transitions recorded
    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }
}
