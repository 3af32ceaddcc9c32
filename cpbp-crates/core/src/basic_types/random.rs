use std::fmt::Debug;
use std::ops::Range;

use rand::Rng;
use rand::SeedableRng;

/// Abstraction for randomness, in order to swap out different sources of randomness.
///
/// This is especially useful when testing, to control which values are generated when random
/// values are required.
pub trait Random: Debug {
    /// Generates a random usize in the provided range with equal probability.
    ///
    /// ```rust
    /// # use rand::rngs::SmallRng;
    /// # use rand::SeedableRng;
    /// # use cpbp_core::Random;
    /// let mut rng = SmallRng::seed_from_u64(42);
    /// let elements = vec!["This", "is", "a", "test"];
    /// let selected_index = rng.generate_usize_in_range(0..elements.len());
    /// assert!(selected_index < elements.len());
    /// ```
    fn generate_usize_in_range(&mut self, range: Range<usize>) -> usize;

    /// Generate a random float in the range 0..1.
    fn generate_f64(&mut self) -> f64;

    /// Given a slice of weights, select an index with probability proportional to its weight.
    ///
    /// Returns `None` if there are no weights or if they sum to zero.
    fn get_weighted_choice(&mut self, weights: &[f64]) -> Option<usize>;
}

impl<T> Random for T
where
    T: SeedableRng + Rng + Debug,
{
    fn generate_usize_in_range(&mut self, range: Range<usize>) -> usize {
        self.gen_range(range)
    }

    fn generate_f64(&mut self) -> f64 {
        self.gen_range(0.0..1.0)
    }

    fn get_weighted_choice(&mut self, weights: &[f64]) -> Option<usize> {
        let sum = weights.iter().sum::<f64>();
        if weights.is_empty() || sum <= 0.0 {
            return None;
        }

        let spin = self.generate_f64() * sum;

        let mut accumulated_weight = 0.0;
        for (index, weight) in weights.iter().enumerate() {
            accumulated_weight += weight;
            if spin < accumulated_weight {
                return Some(index);
            }
        }

        // Rounding can leave the spin just above the accumulated total.
        weights.iter().rposition(|&weight| weight > 0.0)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::ops::Range;

    use super::Random;
    use crate::cpbp_assert_simple;

    /// A test "random" generator which returns the provided values in order. Generating more
    /// values than provided results in a panic.
    #[derive(Debug, Default)]
    pub(crate) struct TestRandom {
        pub(crate) usizes: Vec<usize>,
        pub(crate) floats: Vec<f64>,
    }

    impl Random for TestRandom {
        fn generate_usize_in_range(&mut self, range: Range<usize>) -> usize {
            let selected = self.usizes.remove(0);
            cpbp_assert_simple!(
                range.contains(&selected),
                "The selected element by `TestRandom` ({selected}) is not in the provided range ({range:?})"
            );
            selected
        }

        fn generate_f64(&mut self) -> f64 {
            self.floats.remove(0)
        }

        fn get_weighted_choice(&mut self, weights: &[f64]) -> Option<usize> {
            let sum = weights.iter().sum::<f64>();
            let spin = self.generate_f64() * sum;
            let mut accumulated_weight = 0.0;
            weights.iter().position(|weight| {
                accumulated_weight += weight;
                spin < accumulated_weight
            })
        }
    }

    #[test]
    fn weighted_choice_skips_zero_weights() {
        use rand::rngs::SmallRng;
        use rand::SeedableRng;

        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..100 {
            assert_eq!(rng.get_weighted_choice(&[0.0, 1.0, 0.0]), Some(1));
        }
        assert_eq!(rng.get_weighted_choice(&[0.0, 0.0]), None);
    }
}
