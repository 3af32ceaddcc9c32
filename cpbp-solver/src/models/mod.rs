//! The models which guide the sampling of a piece of music, one token at a time.
//!
//! A piece consists of [`NUM_TOKENS`] tokens, grouped in bars of [`TOKENS_PER_BAR`]. For every
//! sample, the input provides the tokens which were already generated and the scores a generative
//! model assigns to each value of the next token. The scores are injected into the model through an
//! oracle, after which belief propagation yields beliefs for the next token which take the
//! structural constraints of the piece into account.
//!
//! Each model builds a fresh [`Solver`] per sample; see [`run`] for the sampling loop.
mod pitch_key;
mod rhythm;
mod runner;
mod token_reader;

use cpbp_core::constraints;
use cpbp_core::variables::DomainId;
use cpbp_core::variables::IntegerVariable;
use cpbp_core::EmptyDomain;
use cpbp_core::Solver;
pub use pitch_key::*;
pub use rhythm::*;
pub use runner::*;
pub use token_reader::TokenReader;

/// The number of tokens in a piece.
pub const NUM_TOKENS: usize = 128;
/// The number of tokens in a bar.
pub const TOKENS_PER_BAR: usize = 16;
/// The number of bars in a piece.
pub const NUM_BARS: usize = NUM_TOKENS / TOKENS_PER_BAR;

/// Creates the token variables `x[0]` to `x[NUM_TOKENS - 1]`, each with the values
/// `0..num_values`.
fn token_variables(solver: &mut Solver, num_values: usize) -> Vec<DomainId> {
    (0..NUM_TOKENS)
        .map(|index| solver.new_named_integer(0, num_values as i32 - 1, format!("x[{index}]")))
        .collect()
}

/// Fixes the tokens which were generated before the current one.
fn assign_previous_tokens(
    solver: &mut Solver,
    x: &[DomainId],
    previous_tokens: &[i32],
) -> Result<(), EmptyDomain> {
    for (variable, &token) in x.iter().zip(previous_tokens) {
        solver.assign(variable, token)?;
    }
    Ok(())
}

/// Uses the scores as the beliefs of `variable` and posts an oracle which keeps pushing the
/// resulting probabilities into the model with the given weight.
///
/// Values which are not in the domain of `variable` are ignored; when none of the remaining values
/// has a positive score the beliefs become uniform.
fn post_oracle(solver: &mut Solver, variable: DomainId, scores: &[f64], weight: f64) {
    let representation = solver.representation();
    let admissible = scores
        .iter()
        .enumerate()
        .filter(|&(value, _)| solver.contains(&variable, value as i32))
        .map(|(value, &score)| (value as i32, score))
        .collect::<Vec<_>>();
    let total = admissible.iter().map(|&(_, score)| score).sum::<f64>();

    for &(value, score) in &admissible {
        let probability = if total > 0.0 { score / total } else { 0.0 };
        solver.set_marginal(&variable, value, representation.from_probability(probability));
    }
    solver.normalize_marginals(&variable);

    let values = (0..scores.len() as i32).collect::<Vec<_>>();
    let probabilities = values
        .iter()
        .map(|&value| solver.probability(&variable, value))
        .collect::<Vec<_>>();

    let _ = solver
        .add_constraint(constraints::oracle(variable, values, probabilities))
        .with_weight(weight)
        .post();
}

/// The probability of every value `0..num_values` of `variable`; pruned values get zero.
fn beliefs(solver: &Solver, variable: &impl IntegerVariable, num_values: usize) -> Vec<f64> {
    (0..num_values as i32)
        .map(|value| {
            if solver.contains(variable, value) {
                solver.probability(variable, value)
            } else {
                0.0
            }
        })
        .collect()
}
