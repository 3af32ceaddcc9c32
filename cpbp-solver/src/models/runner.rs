use std::io::Write;

use cpbp_core::statistics::log_statistic_postfix;
use cpbp_core::statistics::should_log_statistics;
use cpbp_core::statistics::Statistic;
use cpbp_core::statistics::StatisticLogger;
use cpbp_core::variables::DomainId;
use cpbp_core::BeliefPropagationReport;
use cpbp_core::Inconsistency;
use cpbp_core::Solver;
use cpbp_core::SolverOptions;
use log::debug;
use log::info;
use log::warn;

use super::beliefs;
use super::NUM_BARS;
use super::NUM_TOKENS;
use crate::CpbpError;
use crate::CpbpResult;

/// A model of a piece which is solved once per sample of the input.
pub trait Model {
    /// Everything which is read from the input for one sample.
    type Sample;

    /// The number of values of the token whose beliefs are reported.
    fn num_values(&self) -> usize;

    /// Reads the input of the next sample.
    fn read_sample(&mut self) -> CpbpResult<Self::Sample>;

    /// Creates the variables and posts the constraints for `sample`, and returns the variable whose
    /// beliefs are reported.
    fn post(&self, solver: &mut Solver, sample: &Self::Sample) -> Result<DomainId, Inconsistency>;
}

/// The options which are shared by all models.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleOptions {
    /// The number of samples in the input.
    pub samples: usize,
    /// The position of the token which is generated next.
    pub index: usize,
    /// The weight of the oracle which injects the scores.
    pub oracle_weight: f64,
    /// The number of consecutive bars which are constrained together.
    pub group_size: usize,
    /// Whether an inconsistent sample ends the run instead of producing the fallback beliefs.
    pub abort_on_inconsistency: bool,
}

impl SampleOptions {
    pub(crate) fn validate(&self) -> CpbpResult<()> {
        if self.index >= NUM_TOKENS {
            return Err(CpbpError::invalid_argument(format!(
                "the index {} is not a position in a piece of {NUM_TOKENS} tokens",
                self.index
            )));
        }
        if self.group_size == 0 || self.group_size > NUM_BARS {
            return Err(CpbpError::invalid_argument(format!(
                "the group size has to be between 1 and {NUM_BARS}, got {}",
                self.group_size
            )));
        }
        if !self.oracle_weight.is_finite() || self.oracle_weight < 0.0 {
            return Err(CpbpError::invalid_argument(format!(
                "the oracle weight has to be a non-negative number, got {}",
                self.oracle_weight
            )));
        }
        Ok(())
    }
}

/// The outcome of [`run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// The number of samples which were processed.
    pub samples: usize,
    /// The number of samples for which the fallback beliefs were written.
    pub inconsistent_samples: usize,
}

cpbp_core::create_statistics_struct!(
    /// The statistics of a run over all of its samples.
    RunStatistics {
        num_samples: usize,
        num_inconsistent_samples: usize,
        num_converged_samples: usize,
        num_belief_propagation_iterations: usize,
    }
);

/// Solves every sample of `model` and writes one line of beliefs per sample to `output`.
///
/// A line contains the probability of every value of the reported token, separated by spaces. For
/// a sample whose model is inconsistent the line gives probability one to the value `0`, unless
/// [`SampleOptions::abort_on_inconsistency`] is set.
pub fn run<M: Model>(
    model: &mut M,
    solver_options: &SolverOptions,
    options: &SampleOptions,
    output: &mut impl Write,
) -> CpbpResult<RunSummary> {
    let mut statistics = RunStatistics::default();

    for sample_index in 0..options.samples {
        let sample = model.read_sample()?;
        let mut solver = Solver::with_options(solver_options.clone());

        match solve_sample(model, &mut solver, &sample) {
            Ok((beliefs, report)) => {
                debug!(
                    "sample {sample_index}: {} rounds of belief propagation",
                    report.iterations
                );
                statistics.num_belief_propagation_iterations += report.iterations;
                if report.converged {
                    statistics.num_converged_samples += 1;
                }
                write_beliefs(output, &beliefs)?;
            }
            Err(inconsistency) if options.abort_on_inconsistency => {
                return Err(CpbpError::InconsistentSample {
                    sample: sample_index,
                    source: inconsistency,
                });
            }
            Err(inconsistency) => {
                warn!("Sample {sample_index} is inconsistent ({inconsistency})");
                statistics.num_inconsistent_samples += 1;
                write_beliefs(output, &fallback_beliefs(model.num_values()))?;
            }
        }

        statistics.num_samples += 1;
    }

    output.flush()?;
    info!(
        "Processed {} samples, {} of them inconsistent",
        statistics.num_samples, statistics.num_inconsistent_samples
    );
    if should_log_statistics() {
        statistics.log(StatisticLogger::new("run"));
        log_statistic_postfix();
    }

    Ok(RunSummary {
        samples: statistics.num_samples,
        inconsistent_samples: statistics.num_inconsistent_samples,
    })
}

fn solve_sample<M: Model>(
    model: &M,
    solver: &mut Solver,
    sample: &M::Sample,
) -> Result<(Vec<f64>, BeliefPropagationReport), Inconsistency> {
    let target = model.post(solver, sample)?;
    solver.fixed_point()?;
    let report = solver.belief_propagation()?;
    Ok((beliefs(solver, &target, model.num_values()), report))
}

fn fallback_beliefs(num_values: usize) -> Vec<f64> {
    (0..num_values)
        .map(|value| if value == 0 { 1.0 } else { 0.0 })
        .collect()
}

fn write_beliefs(output: &mut impl Write, beliefs: &[f64]) -> std::io::Result<()> {
    let line = beliefs
        .iter()
        .map(|belief| belief.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(output, "{line}")
}
