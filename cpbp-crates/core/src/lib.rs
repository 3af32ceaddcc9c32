//! # cpbp-core
//! A constraint propagation engine which, next to removing inconsistent values from the domains of
//! variables, computes a belief (an estimated marginal probability) for every remaining value by
//! means of loopy belief propagation over the constraints.
//!
//! A model is built by creating variables on a [`Solver`] and posting [`constraints`] on them.
//! [`Solver::fixed_point`] then filters the domains, and [`Solver::belief_propagation`] exchanges
//! messages between the constraints and the variables until the beliefs settle:
//! ```rust
//! # use cpbp_core::constraints;
//! # use cpbp_core::Solver;
//! let mut solver = Solver::default();
//!
//! let x = solver.new_bounded_integer(0, 2);
//! let y = solver.new_bounded_integer(0, 2);
//!
//! let _ = solver.add_constraint(constraints::less_or_equal(x, y)).post();
//! let _ = solver
//!     .add_constraint(constraints::oracle(x, [0, 1, 2], [0.1, 0.2, 0.7]))
//!     .with_weight(0.5)
//!     .post();
//!
//! solver.fixed_point().expect("the model is consistent");
//! let _ = solver.belief_propagation().expect("the model is consistent");
//!
//! let most_likely = solver.value_with_max_marginal(&x);
//! assert!(solver.contains(&x, most_likely));
//! ```
//!
//! The beliefs can be stored as probabilities or as their logarithm, see
//! [`belief::BeliefRepresentation`]; the choice is made through [`SolverOptions`] and is invisible
//! to the code which builds and queries the model.
pub(crate) mod basic_types;
pub mod belief;
pub mod containers;
pub(crate) mod engine;
pub(crate) mod math;
pub(crate) mod propagators;

#[doc(hidden)]
pub mod asserts;

pub mod constraints;
pub mod propagation;
pub mod statistics;

pub use convert_case;
pub use rand;

// We declare a private module with public use, so that all exports from API are exports directly
// from the crate.
mod api;

pub use api::*;

pub use crate::api::solver::PropagatorHandle;
pub use crate::api::solver::Solver;
pub use crate::basic_types::EmptyDomain;
pub use crate::basic_types::Inconsistency;
pub use crate::basic_types::PropagationStatus;
pub use crate::basic_types::Random;
pub use crate::engine::BeliefPropagationOptions;
pub use crate::engine::BeliefPropagationReport;
