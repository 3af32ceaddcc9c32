/// Rescales `distribution` so that it sums to one; it is left untouched when it sums to zero.
///
/// The dynamic programs of the propagators rescale their intermediate tables with this to avoid
/// underflow on long scopes; only ratios within one table matter to the messages.
pub(crate) fn normalize(distribution: &mut [f64]) {
    let total = distribution.iter().sum::<f64>();
    if total > 0.0 && total.is_finite() {
        distribution
            .iter_mut()
            .for_each(|probability| *probability /= total);
    }
}

/// The distribution of `a + b` for independent `a` and `b`, where entry `i` of a distribution is the
/// probability of its `offset + i`. Returns the offset and the values of the result.
pub(crate) fn convolve(
    (a_offset, a): (i32, &[f64]),
    (b_offset, b): (i32, &[f64]),
) -> (i32, Vec<f64>) {
    if a.is_empty() || b.is_empty() {
        return (a_offset + b_offset, Vec::new());
    }

    let mut result = vec![0.0; a.len() + b.len() - 1];
    for (i, &p) in a.iter().enumerate() {
        if p == 0.0 {
            continue;
        }
        for (j, &q) in b.iter().enumerate() {
            result[i + j] += p * q;
        }
    }
    (a_offset + b_offset, result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalisation_rescales_to_one() {
        let mut distribution = [1.0, 3.0];
        normalize(&mut distribution);
        assert_eq!(distribution, [0.25, 0.75]);
    }

    #[test]
    fn zero_distributions_are_left_alone() {
        let mut distribution = [0.0, 0.0];
        normalize(&mut distribution);
        assert_eq!(distribution, [0.0, 0.0]);
    }

    #[test]
    fn convolution_of_two_dice() {
        let die = [0.5, 0.5];
        let (offset, sum) = convolve((1, &die), (3, &die));

        assert_eq!(offset, 4);
        assert_eq!(sum, vec![0.25, 0.5, 0.25]);
    }
}
