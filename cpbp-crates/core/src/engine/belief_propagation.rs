/// Configures the belief propagation phase of the engine.
///
/// The loop always stops after [`BeliefPropagationOptions::max_iterations`] rounds; when a
/// convergence threshold is set it stops earlier once no belief changed (in probability space) by
/// more than the threshold during a round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeliefPropagationOptions {
    /// The maximum number of rounds of message passing.
    pub max_iterations: usize,
    /// Stop once the largest change of a belief during a round is below this value.
    pub convergence_threshold: Option<f64>,
    /// The share of the previous message kept in every new message, in `[0, 1)`.
    pub damping: f64,
}

impl Default for BeliefPropagationOptions {
    fn default() -> Self {
        BeliefPropagationOptions {
            max_iterations: 5,
            convergence_threshold: None,
            damping: 0.0,
        }
    }
}

/// A summary of a call to [`crate::Solver::belief_propagation`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BeliefPropagationReport {
    /// The number of rounds which were performed.
    pub iterations: usize,
    /// Whether the loop stopped because the convergence threshold was reached.
    pub converged: bool,
    /// The largest change of a belief during the last round.
    pub max_delta: f64,
}
