use super::Constraint;
use crate::cpbp_assert_simple;
use crate::propagation::PropagatorId;
use crate::Solver;

/// A structure which is responsible for adding the created [`Constraint`]s to the [`Solver`].
/// For an example on how to use this, see [`crate::constraints`].
#[derive(Debug)]
#[must_use = "a constraint is only added to the solver once it is posted"]
pub struct ConstraintPoster<'solver, ConstraintImpl> {
    solver: &'solver mut Solver,
    constraint: ConstraintImpl,
    weight: f64,
}

impl<'solver, ConstraintImpl: Constraint> ConstraintPoster<'solver, ConstraintImpl> {
    pub(crate) fn new(solver: &'solver mut Solver, constraint: ConstraintImpl) -> Self {
        ConstraintPoster {
            solver,
            constraint,
            weight: 1.0,
        }
    }

    /// Sets the weight of the constraint: its messages are raised to this power. A weight of zero
    /// leaves the beliefs untouched while the constraint still filters the domains.
    pub fn with_weight(mut self, weight: f64) -> Self {
        cpbp_assert_simple!(
            weight >= 0.0 && weight.is_finite(),
            "the weight of a constraint has to be a non-negative number, got {weight}"
        );
        self.weight = weight;
        self
    }

    /// Add the [`Constraint`] to the [`Solver`] and return the propagator which enforces it.
    pub fn post(self) -> PropagatorId {
        self.constraint.post(self.solver, self.weight)
    }
}
