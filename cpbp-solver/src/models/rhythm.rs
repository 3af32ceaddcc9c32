use cpbp_core::constraints;
use cpbp_core::variables::DomainId;
use cpbp_core::variables::TransformableVariable;
use cpbp_core::Inconsistency;
use cpbp_core::Solver;

use super::assign_previous_tokens;
use super::post_oracle;
use super::token_variables;
use super::Model;
use super::SampleOptions;
use super::TokenReader;
use super::NUM_BARS;
use super::TOKENS_PER_BAR;
use crate::CpbpResult;

/// The values of a rhythm token are `0` (rest), `1` (hold) and `2` (onset).
pub const RHYTHM_VALUES: usize = 3;
/// The rhythm token which starts a note.
pub const ONSET_TOKEN: i32 = 2;

/// How the onset counts of the bars within a group relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RhythmConstraint {
    /// Every bar of a group has strictly more onsets than the previous one; the count starts over
    /// in the next group.
    IncreasingReset,
    /// The bars of a group have pairwise distinct onset counts, and the last bar of a group has
    /// exactly twice the onsets of the bar before it.
    AllDifferentLastBar,
}

/// The rhythm of a piece: every token is a rest, a hold or an onset, and the number of onsets per
/// bar follows a [`RhythmConstraint`].
///
/// The input of a sample consists of the `index` tokens generated so far followed by a score for
/// each of the [`RHYTHM_VALUES`] values of the next token.
#[derive(Debug)]
pub struct RhythmModel {
    constraint: RhythmConstraint,
    input: TokenReader,
    index: usize,
    group_size: usize,
    oracle_weight: f64,
}

impl RhythmModel {
    pub fn new(
        constraint: RhythmConstraint,
        input: TokenReader,
        options: &SampleOptions,
    ) -> CpbpResult<Self> {
        options.validate()?;

        Ok(RhythmModel {
            constraint,
            input,
            index: options.index,
            group_size: options.group_size,
            oracle_weight: options.oracle_weight,
        })
    }

    fn post_onset_counts(&self, solver: &mut Solver, onsets: &[DomainId]) {
        match self.constraint {
            RhythmConstraint::IncreasingReset => {
                for bar in 0..NUM_BARS - 1 {
                    if (bar + 1) % self.group_size == 0 {
                        continue;
                    }
                    let _ = solver
                        .add_constraint(constraints::less_or_equal(
                            onsets[bar],
                            onsets[bar + 1].offset(-1),
                        ))
                        .post();
                }
            }
            RhythmConstraint::AllDifferentLastBar => {
                for start in (0..NUM_BARS).step_by(self.group_size) {
                    let end = (start + self.group_size).min(NUM_BARS);
                    let _ = solver
                        .add_constraint(constraints::all_different(&onsets[start..end]))
                        .post();

                    if self.group_size != 1 {
                        let (before_last, last) = (onsets[end - 2], onsets[end - 1]);
                        let _ = solver
                            .add_constraint(constraints::less_or_equal(before_last.scaled(2), last))
                            .post();
                        let _ = solver
                            .add_constraint(constraints::less_or_equal(last, before_last.scaled(2)))
                            .post();
                    }
                }
            }
        }
    }
}

/// The input of one sample of a [`RhythmModel`].
#[derive(Debug, Clone, PartialEq)]
pub struct RhythmSample {
    pub previous_tokens: Vec<i32>,
    pub scores: Vec<f64>,
}

impl Model for RhythmModel {
    type Sample = RhythmSample;

    fn num_values(&self) -> usize {
        RHYTHM_VALUES
    }

    fn read_sample(&mut self) -> CpbpResult<RhythmSample> {
        let previous_tokens = (0..self.index)
            .map(|_| self.input.next_integer())
            .collect::<CpbpResult<Vec<_>>>()?;
        let scores = (0..RHYTHM_VALUES)
            .map(|_| self.input.next_score())
            .collect::<CpbpResult<Vec<_>>>()?;

        Ok(RhythmSample {
            previous_tokens,
            scores,
        })
    }

    fn post(&self, solver: &mut Solver, sample: &RhythmSample) -> Result<DomainId, Inconsistency> {
        let x = token_variables(solver, RHYTHM_VALUES);
        assign_previous_tokens(solver, &x, &sample.previous_tokens)?;
        let target = x[self.index];

        let onsets = (0..NUM_BARS)
            .map(|bar| solver.new_named_integer(0, TOKENS_PER_BAR as i32, format!("o[{bar}]")))
            .collect::<Vec<_>>();
        for (bar, tokens) in x.chunks(TOKENS_PER_BAR).enumerate() {
            let _ = solver
                .add_constraint(constraints::among(tokens, [ONSET_TOKEN], onsets[bar]))
                .post();
        }
        self.post_onset_counts(solver, &onsets);

        post_oracle(solver, target, &sample.scores, self.oracle_weight);

        Ok(target)
    }
}
