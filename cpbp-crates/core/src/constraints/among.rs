use super::Constraint;
use crate::propagators::AmongPropagatorArgs;
use crate::variables::IntegerVariable;

/// Creates the [`Constraint`] `count = |{ i | x_i ∈ values }|`.
pub fn among<Var: IntegerVariable + 'static, CountVar: IntegerVariable + 'static>(
    x: impl Into<Box<[Var]>>,
    values: impl Into<Box<[i32]>>,
    count: CountVar,
) -> impl Constraint {
    AmongPropagatorArgs {
        x: x.into(),
        values: values.into(),
        count,
    }
}
