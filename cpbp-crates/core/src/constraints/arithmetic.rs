use super::Constraint;
use crate::propagators::LessOrEqualPropagatorArgs;
use crate::propagators::LinearSumPropagatorArgs;
use crate::variables::IntegerVariable;

/// Creates the [`Constraint`] `\sum terms = total`.
///
/// To bound a sum rather than fix it, introduce a variable for the total and constrain it further,
/// e.g. with [`less_or_equal`].
pub fn sum<Var: IntegerVariable + 'static, TotalVar: IntegerVariable + 'static>(
    terms: impl Into<Box<[Var]>>,
    total: TotalVar,
) -> impl Constraint {
    LinearSumPropagatorArgs {
        x: terms.into(),
        total,
    }
}

/// Creates the [`Constraint`] `lhs <= rhs`.
///
/// Strict inequalities and scaled comparisons are expressed through views, e.g. `x <= y - 1` is
/// `less_or_equal(x, y.offset(-1))`.
pub fn less_or_equal<VX: IntegerVariable + 'static, VY: IntegerVariable + 'static>(
    lhs: VX,
    rhs: VY,
) -> impl Constraint {
    LessOrEqualPropagatorArgs { x: lhs, y: rhs }
}
