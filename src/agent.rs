use crate::env::Environment;

type State<A> = <<A as Agent>::Env as Environment>::State;
type Action<A> = <<A as Agent>::Env as Environment>::Action;

/// The capabilities a multi-step learner needs from an agent: an environment to act in, an
/// exploratory policy, and a value function to read and update
pub trait Agent: Sized {
    type Env: Environment;

    fn env(&mut self) -> &mut Self::Env;

    /// Choose an exploratory action from `state`
    fn next_action(&mut self, state: &State<Self>) -> Action<Self>;

    /// The best value reachable from `state` and the action achieving it
    fn maximum(&self, state: &State<Self>) -> (f64, Action<Self>);

    /// Move the estimate for `(state, action)` toward `target`
    fn update(&mut self, state: &State<Self>, action: &Action<Self>, target: f64);
}
