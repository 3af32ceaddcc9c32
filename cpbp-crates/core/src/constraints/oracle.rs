use super::Constraint;
use crate::cpbp_assert_simple;
use crate::propagators::OraclePropagatorArgs;
use crate::variables::IntegerVariable;

/// Creates the [`Constraint`] which injects external beliefs into `x`: value `values[i]` receives
/// the (unnormalised) probability `probabilities[i]`, values which are not listed receive zero.
///
/// The oracle never removes values; combined with a weight below one it biases, rather than
/// dictates, the beliefs of `x`.
pub fn oracle<Var: IntegerVariable + 'static>(
    x: Var,
    values: impl Into<Box<[i32]>>,
    probabilities: impl Into<Box<[f64]>>,
) -> impl Constraint {
    let values = values.into();
    let probabilities = probabilities.into();
    cpbp_assert_simple!(
        values.len() == probabilities.len(),
        "every value needs exactly one probability"
    );
    cpbp_assert_simple!(
        probabilities
            .iter()
            .all(|probability| *probability >= 0.0 && probability.is_finite()),
        "probabilities have to be non-negative numbers"
    );

    OraclePropagatorArgs {
        x,
        values,
        probabilities,
    }
}
