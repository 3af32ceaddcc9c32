use std::fmt::Display;

use super::Belief;
use crate::cpbp_assert_simple;

/// The tolerance used when checking whether a belief lies in `[zero, one]`.
pub const BELIEF_TOLERANCE: f64 = 1e-9;

/// Determines how beliefs are stored and combined.
///
/// Consumers only use the operations of this type, so that switching between the two
/// representations does not require changes in the propagators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum BeliefRepresentation {
    /// Beliefs are probabilities in `[0, 1]`.
    #[default]
    Linear,
    /// Beliefs are natural logarithms of probabilities, in `[-inf, 0]`.
    Log,
}

impl Display for BeliefRepresentation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BeliefRepresentation::Linear => write!(f, "linear"),
            BeliefRepresentation::Log => write!(f, "log"),
        }
    }
}

impl BeliefRepresentation {
    /// The belief of an impossible value.
    pub fn zero(self) -> Belief {
        match self {
            BeliefRepresentation::Linear => 0.0,
            BeliefRepresentation::Log => f64::NEG_INFINITY,
        }
    }

    /// The belief of a certain value; also the neutral element of [`Self::multiply`].
    pub fn one(self) -> Belief {
        match self {
            BeliefRepresentation::Linear => 1.0,
            BeliefRepresentation::Log => 0.0,
        }
    }

    pub fn is_zero(self, belief: Belief) -> bool {
        match self {
            BeliefRepresentation::Linear => belief == 0.0,
            BeliefRepresentation::Log => belief == f64::NEG_INFINITY,
        }
    }

    pub fn multiply(self, lhs: Belief, rhs: Belief) -> Belief {
        match self {
            BeliefRepresentation::Linear => lhs * rhs,
            BeliefRepresentation::Log => lhs + rhs,
        }
    }

    /// Divides `lhs` by `rhs`; `rhs` may not be [`Self::zero`].
    pub fn divide(self, lhs: Belief, rhs: Belief) -> Belief {
        cpbp_assert_simple!(!self.is_zero(rhs), "division of a belief by zero");
        match self {
            BeliefRepresentation::Linear => lhs / rhs,
            BeliefRepresentation::Log => lhs - rhs,
        }
    }

    pub fn add(self, lhs: Belief, rhs: Belief) -> Belief {
        match self {
            BeliefRepresentation::Linear => lhs + rhs,
            BeliefRepresentation::Log => {
                if lhs == f64::NEG_INFINITY {
                    return rhs;
                }
                if rhs == f64::NEG_INFINITY {
                    return lhs;
                }
                let max = lhs.max(rhs);
                max + ((lhs - max).exp() + (rhs - max).exp()).ln()
            }
        }
    }

    /// Sums the provided beliefs.
    pub fn summation(self, beliefs: impl IntoIterator<Item = Belief>) -> Belief {
        beliefs
            .into_iter()
            .fold(self.zero(), |total, belief| self.add(total, belief))
    }

    /// Raises `belief` to the power `exponent`; an exponent of `0` always yields [`Self::one`],
    /// including for [`Self::zero`].
    pub fn pow(self, belief: Belief, exponent: f64) -> Belief {
        if exponent == 0.0 {
            return self.one();
        }
        match self {
            BeliefRepresentation::Linear => belief.powf(exponent),
            BeliefRepresentation::Log => belief * exponent,
        }
    }

    pub fn from_probability(self, probability: f64) -> Belief {
        match self {
            BeliefRepresentation::Linear => probability,
            BeliefRepresentation::Log => probability.ln(),
        }
    }

    pub fn to_probability(self, belief: Belief) -> f64 {
        match self {
            BeliefRepresentation::Linear => belief,
            BeliefRepresentation::Log => belief.exp(),
        }
    }

    /// Whether `belief` lies in `[zero, one]` up to [`BELIEF_TOLERANCE`].
    pub fn is_in_range(self, belief: Belief) -> bool {
        match self {
            BeliefRepresentation::Linear => {
                (-BELIEF_TOLERANCE..=1.0 + BELIEF_TOLERANCE).contains(&belief)
            }
            BeliefRepresentation::Log => belief <= BELIEF_TOLERANCE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BeliefRepresentation;

    const REPRESENTATIONS: [BeliefRepresentation; 2] =
        [BeliefRepresentation::Linear, BeliefRepresentation::Log];

    #[test]
    fn dividing_by_one_is_the_identity() {
        for representation in REPRESENTATIONS {
            let belief = representation.from_probability(0.3);
            assert_eq!(representation.divide(belief, representation.one()), belief);
        }
    }

    #[test]
    fn multiplying_by_zero_gives_zero() {
        for representation in REPRESENTATIONS {
            let belief = representation.from_probability(0.3);
            let product = representation.multiply(belief, representation.zero());
            assert!(representation.is_zero(product));
        }
    }

    #[test]
    fn log_summation_matches_linear_summation() {
        let probabilities = [0.1, 0.25, 0.4];
        let log = BeliefRepresentation::Log;
        let sum = log.summation(probabilities.iter().map(|&p| log.from_probability(p)));

        assert!((log.to_probability(sum) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn summation_ignores_zero_beliefs() {
        for representation in REPRESENTATIONS {
            let sum = representation.summation([
                representation.zero(),
                representation.from_probability(0.5),
                representation.zero(),
            ]);
            assert!((representation.to_probability(sum) - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn zero_exponent_yields_one() {
        for representation in REPRESENTATIONS {
            assert_eq!(
                representation.pow(representation.zero(), 0.0),
                representation.one()
            );
            assert_eq!(
                representation.pow(representation.from_probability(0.2), 0.0),
                representation.one()
            );
        }
    }

    #[test]
    fn pow_agrees_between_representations() {
        let linear = BeliefRepresentation::Linear.pow(0.5, 2.0);
        let log = BeliefRepresentation::Log;
        let through_log = log.to_probability(log.pow(log.from_probability(0.5), 2.0));

        assert!((linear - 0.25).abs() < 1e-12);
        assert!((through_log - 0.25).abs() < 1e-12);
    }

    #[test]
    fn range_check_rejects_beliefs_above_one() {
        assert!(!BeliefRepresentation::Linear.is_in_range(1.5));
        assert!(!BeliefRepresentation::Log.is_in_range(0.5));
        assert!(BeliefRepresentation::Log.is_in_range(f64::NEG_INFINITY));
        assert!(!BeliefRepresentation::Linear.is_in_range(f64::NAN));
    }
}
