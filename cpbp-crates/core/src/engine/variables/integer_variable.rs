use std::fmt::Debug;

use enumset::EnumSet;

use super::TransformableVariable;
use crate::basic_types::EmptyDomain;
use crate::basic_types::Random;
use crate::belief::Belief;
use crate::cpbp_assert_simple;
use crate::engine::notifications::DomainEvent;
use crate::engine::notifications::Watchers;
use crate::engine::Assignments;
use crate::engine::VariableNames;

/// A trait specifying the required behaviour of an integer variable: reading and narrowing its
/// domain, and reading and updating the belief of every value in its domain.
///
/// The state of a variable lives in the [`Assignments`] of the solver; implementors are cheap
/// handles. Mutations which would leave a domain empty are rejected with [`EmptyDomain`].
pub trait IntegerVariable:
    Clone + Debug + 'static + TransformableVariable<Self::AffineView>
{
    type AffineView: IntegerVariable;

    /// Get the lower bound of the variable.
    fn lower_bound(&self, assignments: &Assignments) -> i32;

    /// Get the upper bound of the variable.
    fn upper_bound(&self, assignments: &Assignments) -> i32;

    /// The number of values in the domain.
    fn size(&self, assignments: &Assignments) -> usize;

    /// Whether the domain consists of a single value.
    fn is_fixed(&self, assignments: &Assignments) -> bool {
        self.size(assignments) == 1
    }

    /// Determine whether the value is in the domain of this variable.
    fn contains(&self, assignments: &Assignments, value: i32) -> bool;

    /// Iterate over the values of the domain in ascending order.
    fn iterate_domain(&self, assignments: &Assignments) -> impl Iterator<Item = i32>;

    /// Writes the values of the domain in ascending order into `destination` and returns how many
    /// were written. `destination` has to hold at least [`IntegerVariable::size`] values.
    fn fill_array(&self, assignments: &Assignments, destination: &mut [i32]) -> usize {
        cpbp_assert_simple!(destination.len() >= self.size(assignments));

        let mut count = 0;
        for (slot, value) in destination.iter_mut().zip(self.iterate_domain(assignments)) {
            *slot = value;
            count += 1;
        }
        count
    }

    /// Removes `value` from the domain; nothing happens if it is not part of the domain.
    fn remove(&self, assignments: &mut Assignments, value: i32) -> Result<(), EmptyDomain>;

    /// Narrows the domain to exactly `value`; fails if `value` is not part of the domain.
    fn assign(&self, assignments: &mut Assignments, value: i32) -> Result<(), EmptyDomain>;

    /// Removes every value strictly smaller than `value`.
    fn remove_below(&self, assignments: &mut Assignments, value: i32) -> Result<(), EmptyDomain>;

    /// Removes every value strictly larger than `value`.
    fn remove_above(&self, assignments: &mut Assignments, value: i32) -> Result<(), EmptyDomain>;

    /// A value of the domain chosen uniformly at random.
    fn random_value(&self, assignments: &Assignments, rng: &mut dyn Random) -> i32;

    /// The belief of `value`; values outside of the domain have belief zero.
    fn marginal(&self, assignments: &Assignments, value: i32) -> Belief;

    /// Overwrites the belief of `value`, which has to be part of the domain.
    fn set_marginal(&self, assignments: &mut Assignments, value: i32, belief: Belief);

    /// Sets the belief of every value in the domain to one.
    fn reset_marginals(&self, assignments: &mut Assignments);

    /// Rescales the beliefs of the domain so that they sum to one; if all of them are zero the
    /// beliefs become uniform.
    fn normalize_marginals(&self, assignments: &mut Assignments);

    fn max_marginal(&self, assignments: &Assignments) -> Belief {
        self.marginal(assignments, self.value_with_max_marginal(assignments))
    }

    fn min_marginal(&self, assignments: &Assignments) -> Belief {
        self.marginal(assignments, self.value_with_min_marginal(assignments))
    }

    /// The value with the largest belief; ties are broken towards the smallest value.
    fn value_with_max_marginal(&self, assignments: &Assignments) -> i32 {
        let mut best: Option<(i32, Belief)> = None;
        for value in self.iterate_domain(assignments) {
            let belief = self.marginal(assignments, value);
            if !best.is_some_and(|(_, best_belief)| belief <= best_belief) {
                best = Some((value, belief));
            }
        }
        best.map_or(self.lower_bound(assignments), |(value, _)| value)
    }

    /// The value with the smallest belief; ties are broken towards the smallest value.
    fn value_with_min_marginal(&self, assignments: &Assignments) -> i32 {
        let mut best: Option<(i32, Belief)> = None;
        for value in self.iterate_domain(assignments) {
            let belief = self.marginal(assignments, value);
            if !best.is_some_and(|(_, best_belief)| belief >= best_belief) {
                best = Some((value, belief));
            }
        }
        best.map_or(self.lower_bound(assignments), |(value, _)| value)
    }

    /// The difference in probability between the two most likely values; `0` for a fixed
    /// variable.
    fn max_marginal_regret(&self, assignments: &Assignments) -> f64 {
        let representation = assignments.representation();
        let mut first = f64::NEG_INFINITY;
        let mut second = f64::NEG_INFINITY;

        for value in self.iterate_domain(assignments) {
            let probability = representation.to_probability(self.marginal(assignments, value));
            if probability > first {
                second = first;
                first = probability;
            } else if probability > second {
                second = probability;
            }
        }

        if second == f64::NEG_INFINITY {
            0.0
        } else {
            first - second
        }
    }

    /// The belief of `value` with the contribution `incoming` of the recipient divided out.
    fn send_message(&self, assignments: &Assignments, value: i32, incoming: Belief) -> Belief {
        let representation = assignments.representation();
        let marginal = self.marginal(assignments, value);
        cpbp_assert_simple!(
            representation.is_in_range(incoming) && representation.is_in_range(marginal),
            "message {incoming} and belief {marginal} for value {value} have to be in range"
        );

        if representation.is_zero(incoming) {
            marginal
        } else {
            representation.divide(marginal, incoming)
        }
    }

    /// Multiplies `belief` into the belief of `value`.
    fn receive_message(&self, assignments: &mut Assignments, value: i32, belief: Belief) {
        let representation = assignments.representation();
        let marginal = self.marginal(assignments, value);
        cpbp_assert_simple!(
            representation.is_in_range(belief) && representation.is_in_range(marginal),
            "message {belief} and belief {marginal} for value {value} have to be in range"
        );

        self.set_marginal(
            assignments,
            value,
            representation.multiply(marginal, belief),
        );
    }

    /// Register a watch for this variable on the given domain events.
    fn watch_all(&self, watchers: &mut Watchers<'_>, events: EnumSet<DomainEvent>);

    /// A human-readable name of the variable.
    fn describe(&self, names: &VariableNames) -> String;
}
