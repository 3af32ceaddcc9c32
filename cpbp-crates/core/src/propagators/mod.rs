//! Contains the propagators which enforce the constraints of [`crate::constraints`].
//!
//! See [`crate::propagation`] for info on propagators.

mod all_different;
mod among;
mod less_or_equal;
mod linear_sum;
mod oracle;
mod procedure;

pub(crate) use all_different::*;
pub(crate) use among::*;
pub(crate) use less_or_equal::*;
pub(crate) use linear_sum::*;
pub(crate) use oracle::*;
pub(crate) use procedure::*;
