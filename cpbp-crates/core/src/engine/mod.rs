pub(crate) mod assignments;
mod belief_propagation;
pub(crate) mod notifications;
pub(crate) mod propagator_queue;
pub(crate) mod state;
#[cfg(test)]
pub(crate) mod test_solver;
mod variable_names;
pub(crate) mod variables;

pub use assignments::Assignments;
pub use belief_propagation::BeliefPropagationOptions;
pub use belief_propagation::BeliefPropagationReport;
pub(crate) use state::State;
pub use variable_names::VariableNames;
