//! The numeric algebra used for beliefs (per-value marginals and messages).
//!
//! Every belief stored by the engine is a [`Belief`] interpreted by the
//! [`BeliefRepresentation`] selected when the solver is created; a solver never mixes
//! representations.
mod belief_representation;

pub use belief_representation::*;

/// A belief value; its interpretation depends on the active [`BeliefRepresentation`].
pub type Belief = f64;
