//! Defines the constraints which can be added to the [`Solver`].
//!
//! A constraint is a relation over variables. In the solver, a constraint is enforced by a
//! propagator which both filters the domains of its variables and sends belief messages to them;
//! the influence of these messages is controlled by the weight of the constraint.
//!
//! # Example
//! ```
//! # use cpbp_core::constraints;
//! # use cpbp_core::Solver;
//! let mut solver = Solver::default();
//!
//! let a = solver.new_bounded_integer(0, 3);
//! let b = solver.new_bounded_integer(0, 3);
//! let c = solver.new_bounded_integer(0, 3);
//!
//! let _ = solver
//!     .add_constraint(constraints::all_different([a, b, c]))
//!     .post();
//! let _ = solver
//!     .add_constraint(constraints::sum([a, b], c))
//!     .with_weight(0.5)
//!     .post();
//! ```

mod all_different;
mod among;
mod arithmetic;
mod constraint_poster;
mod oracle;

pub use all_different::*;
pub use among::*;
pub use arithmetic::*;
pub use constraint_poster::*;
pub use oracle::*;

use crate::propagation::PropagatorConstructor;
use crate::propagation::PropagatorId;
use crate::Solver;

/// A [`Constraint`] is a relation over variables. It disqualifies certain assignments of making it
/// into a solution of the problem, and shapes the beliefs of the values of its variables.
///
/// For example, the constraint `a = b` over two variables `a` and `b` only allows assignments to
/// `a` and `b` of the same value, and rejects any assignment where `a` and `b` differ.
pub trait Constraint {
    /// Add the [`Constraint`] to the [`Solver`] with the given weight, and return the propagator
    /// which enforces it.
    ///
    /// Posting does not propagate; the new propagator runs during the next call to
    /// [`Solver::fixed_point`] or [`Solver::belief_propagation`].
    fn post(self, solver: &mut Solver, weight: f64) -> PropagatorId;
}

impl<ConcretePropagator> Constraint for ConcretePropagator
where
    ConcretePropagator: PropagatorConstructor + 'static,
{
    fn post(self, solver: &mut Solver, weight: f64) -> PropagatorId {
        solver.add_propagator(self, weight).propagator_id()
    }
}
