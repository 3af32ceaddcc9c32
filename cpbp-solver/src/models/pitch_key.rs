use cpbp_core::constraints;
use cpbp_core::variables::DomainId;
use cpbp_core::EmptyDomain;
use cpbp_core::Inconsistency;
use cpbp_core::Solver;

use super::assign_previous_tokens;
use super::post_oracle;
use super::token_variables;
use super::Model;
use super::SampleOptions;
use super::TokenReader;
use super::NUM_TOKENS;
use super::ONSET_TOKEN;
use super::TOKENS_PER_BAR;
use crate::CpbpError;
use crate::CpbpResult;

/// Pitch tokens `0..48` are notes, followed by the hold and the rest token.
pub const PITCH_VALUES: usize = 50;
pub const PITCH_HOLD_TOKEN: i32 = 48;
pub const PITCH_REST_TOKEN: i32 = 49;

const RHYTHM_REST_TOKEN: i32 = 0;
const RHYTHM_HOLD_TOKEN: i32 = 1;

const NUM_PITCH_CLASSES: i32 = 12;
/// The pitch classes of C major.
const KEY_PITCH_CLASSES: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

/// The pitches of a piece whose rhythm is already known.
///
/// The rhythm decides which tokens are notes: a hold or a rest in the rhythm fixes the pitch token
/// to [`PITCH_HOLD_TOKEN`] or [`PITCH_REST_TOKEN`], an onset requires a note. Within the first
/// group of bars, every pitch class of the key is played at least `min_occurrences` times, and
/// the occurrences of all pitch classes together do not exceed the number of onsets.
///
/// The input consists of two streams. The rhythm stream holds the [`NUM_TOKENS`] rhythm tokens of
/// every sample; the pitch stream holds the `index` pitch tokens generated so far followed by a
/// score for each of the [`PITCH_VALUES`] values of the next token.
#[derive(Debug)]
pub struct PitchKeyModel {
    pitches: TokenReader,
    rhythm: TokenReader,
    index: usize,
    group_size: usize,
    oracle_weight: f64,
    min_occurrences: i32,
}

impl PitchKeyModel {
    pub fn new(
        pitches: TokenReader,
        rhythm: TokenReader,
        options: &SampleOptions,
        min_occurrences: i32,
    ) -> CpbpResult<Self> {
        options.validate()?;
        if min_occurrences < 0 {
            return Err(CpbpError::invalid_argument(format!(
                "the minimum number of occurrences cannot be negative, got {min_occurrences}"
            )));
        }

        Ok(PitchKeyModel {
            pitches,
            rhythm,
            index: options.index,
            group_size: options.group_size,
            oracle_weight: options.oracle_weight,
            min_occurrences,
        })
    }

    /// The number of tokens which are subject to the key.
    fn num_constrained_tokens(&self) -> usize {
        self.group_size * TOKENS_PER_BAR
    }

    fn apply_rhythm(
        &self,
        solver: &mut Solver,
        x: &[DomainId],
        rhythm: &[i32],
    ) -> Result<(), EmptyDomain> {
        for (variable, &token) in x.iter().zip(rhythm).skip(self.index) {
            match token {
                RHYTHM_HOLD_TOKEN => solver.assign(variable, PITCH_HOLD_TOKEN)?,
                RHYTHM_REST_TOKEN => solver.assign(variable, PITCH_REST_TOKEN)?,
                _ => {
                    solver.remove(variable, PITCH_HOLD_TOKEN)?;
                    solver.remove(variable, PITCH_REST_TOKEN)?;
                }
            }
        }
        Ok(())
    }
}

/// The input of one sample of a [`PitchKeyModel`].
#[derive(Debug, Clone, PartialEq)]
pub struct PitchKeySample {
    pub rhythm: Vec<i32>,
    pub previous_tokens: Vec<i32>,
    pub scores: Vec<f64>,
}

impl Model for PitchKeyModel {
    type Sample = PitchKeySample;

    fn num_values(&self) -> usize {
        PITCH_VALUES
    }

    fn read_sample(&mut self) -> CpbpResult<PitchKeySample> {
        let mut rhythm = Vec::with_capacity(NUM_TOKENS);
        for _ in 0..NUM_TOKENS {
            let position = self.rhythm.position();
            let token = self.rhythm.next_integer()?;
            if !(RHYTHM_REST_TOKEN..=ONSET_TOKEN).contains(&token) {
                return Err(CpbpError::malformed_input(
                    position,
                    format!("{token} is not a rhythm token"),
                ));
            }
            rhythm.push(token);
        }

        let previous_tokens = (0..self.index)
            .map(|_| self.pitches.next_integer())
            .collect::<CpbpResult<Vec<_>>>()?;
        let scores = (0..PITCH_VALUES)
            .map(|_| self.pitches.next_score())
            .collect::<CpbpResult<Vec<_>>>()?;

        Ok(PitchKeySample {
            rhythm,
            previous_tokens,
            scores,
        })
    }

    fn post(
        &self,
        solver: &mut Solver,
        sample: &PitchKeySample,
    ) -> Result<DomainId, Inconsistency> {
        let num_constrained = self.num_constrained_tokens();
        let onset_count = sample.rhythm[..num_constrained]
            .iter()
            .filter(|&&token| token == ONSET_TOKEN)
            .count() as i32;
        if self.min_occurrences > onset_count {
            return Err(Inconsistency::EmptyDomain);
        }

        let x = token_variables(solver, PITCH_VALUES);
        assign_previous_tokens(solver, &x, &sample.previous_tokens)?;
        self.apply_rhythm(solver, &x, &sample.rhythm)?;
        let target = x[self.index];

        let occurrences = (0..NUM_PITCH_CLASSES)
            .map(|pitch_class| {
                let lower_bound = if KEY_PITCH_CLASSES.contains(&pitch_class) {
                    self.min_occurrences
                } else {
                    0
                };
                solver.new_named_integer(lower_bound, onset_count, format!("o[{pitch_class}]"))
            })
            .collect::<Vec<_>>();

        let octaves = (PITCH_VALUES as i32 - 2) / NUM_PITCH_CLASSES;
        for (pitch_class, &count) in (0..NUM_PITCH_CLASSES).zip(&occurrences) {
            let pitches = (0..octaves)
                .map(|octave| octave * NUM_PITCH_CLASSES + pitch_class)
                .collect::<Vec<_>>();
            let _ = solver
                .add_constraint(constraints::among(&x[..num_constrained], pitches, count))
                .post();
        }

        let lower_bound = occurrences
            .iter()
            .map(|count| solver.lower_bound(count))
            .sum();
        let upper_bound = occurrences
            .iter()
            .map(|count| solver.upper_bound(count))
            .sum();
        let total = solver.new_named_integer(lower_bound, upper_bound, "sum(o)");
        let onsets = solver.new_named_integer(onset_count, onset_count, "onsets");
        let _ = solver
            .add_constraint(constraints::sum(occurrences, total))
            .post();
        let _ = solver
            .add_constraint(constraints::less_or_equal(total, onsets))
            .post();

        let oracle_weight = if self.index >= num_constrained {
            1.0
        } else {
            self.oracle_weight
        };
        post_oracle(solver, target, &sample.scores, oracle_weight);

        Ok(target)
    }
}
