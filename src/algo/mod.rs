mod n_step;
pub mod q_learner;
pub mod q_table;
pub mod tabular;

pub use n_step::n_step;
pub use q_learner::{QLearner, QLearnerConfig, Summary};
pub use q_table::QTable;
pub use tabular::{TabularAgent, TabularAgentConfig};
