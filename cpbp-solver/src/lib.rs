//! # cpbp-solver
//! Constraint propagation with belief propagation, applied to guiding the sampling of generative
//! models of music.
//!
//! The engine itself lives in `cpbp-core` and is re-exported from this crate. On top of it, the
//! [`models`] module contains the models of the command line tool: given the tokens a generative
//! model has produced so far and its scores for the next token, a model computes beliefs for the
//! next token which respect the structural constraints of the piece.
//!
//! ```rust
//! # use cpbp_solver::models::RhythmConstraint;
//! # use cpbp_solver::models::RhythmModel;
//! # use cpbp_solver::models::SampleOptions;
//! # use cpbp_solver::models::TokenReader;
//! # use cpbp_solver::SolverOptions;
//! let options = SampleOptions {
//!     samples: 1,
//!     index: 0,
//!     oracle_weight: 1.0,
//!     group_size: 2,
//!     abort_on_inconsistency: false,
//! };
//! let input = TokenReader::new("0.2 0.3 0.5");
//! let mut model = RhythmModel::new(RhythmConstraint::IncreasingReset, input, &options)
//!     .expect("valid options");
//!
//! let mut output = Vec::new();
//! let summary = cpbp_solver::models::run(
//!     &mut model,
//!     &SolverOptions::default(),
//!     &options,
//!     &mut output,
//! )
//! .expect("no input errors");
//!
//! assert_eq!(summary.samples, 1);
//! assert_eq!(String::from_utf8(output).unwrap().lines().count(), 1);
//! ```
pub mod models;
mod result;

pub use cpbp_core::*;
pub use result::CpbpError;
pub use result::CpbpResult;
