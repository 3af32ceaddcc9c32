use thiserror::Error;

use crate::propagation::PropagatorId;

/// Raised when a mutation leaves a variable without admissible values, or when a value is
/// assigned which is not in the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("the domain of a variable became empty")]
pub struct EmptyDomain;

/// The reason the engine could not reach a consistent fixpoint.
///
/// It carries no partial result: the solver which returned it stays inconsistent, and the caller
/// is expected to start over with a fresh [`crate::Solver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Inconsistency {
    #[error("the domain of a variable became empty")]
    EmptyDomain,
    #[error("{0} detected a conflict")]
    Conflict(PropagatorId),
}

impl From<EmptyDomain> for Inconsistency {
    fn from(_: EmptyDomain) -> Self {
        Inconsistency::EmptyDomain
    }
}

/// The result of invoking a propagator, or of running the engine to a fixpoint.
pub type PropagationStatus = Result<(), Inconsistency>;
