use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::belief::BeliefRepresentation;
use crate::engine::BeliefPropagationOptions;
#[cfg(doc)]
use crate::Solver;

/// Options which can be provided to the [`Solver`].
#[derive(Debug, Clone)]
pub struct SolverOptions {
    /// How beliefs are stored; fixed for the lifetime of the solver.
    pub belief_representation: BeliefRepresentation,
    /// The options used by [`Solver::belief_propagation`].
    pub belief_propagation: BeliefPropagationOptions,
    /// The random generator used by [`Solver::random_value`] and [`Solver::sample_value`].
    pub random_generator: SmallRng,
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            belief_representation: BeliefRepresentation::default(),
            belief_propagation: BeliefPropagationOptions::default(),
            random_generator: SmallRng::seed_from_u64(42),
        }
    }
}
