use std::fs::File;
use std::fs::OpenOptions;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use cpbp_solver::belief::BeliefRepresentation;
use cpbp_solver::convert_case::Case;
use cpbp_solver::models;
use cpbp_solver::models::Model;
use cpbp_solver::models::PitchKeyModel;
use cpbp_solver::models::RhythmConstraint;
use cpbp_solver::models::RhythmModel;
use cpbp_solver::models::RunSummary;
use cpbp_solver::models::SampleOptions;
use cpbp_solver::models::TokenReader;
use cpbp_solver::rand::rngs::SmallRng;
use cpbp_solver::rand::SeedableRng;
use cpbp_solver::statistics::configure_statistic_logging;
use cpbp_solver::BeliefPropagationOptions;
use cpbp_solver::CpbpError;
use cpbp_solver::CpbpResult;
use cpbp_solver::SolverOptions;
use log::error;
use log::info;
use log::warn;
use log::LevelFilter;

#[derive(Debug, Parser)]
#[command(
    help_template = "\
{before-help}{name} {version}
About: {about}

{usage-heading}\n{tab}{usage}

{all-args}{after-help}
",
    version,
    about,
    arg_required_else_help = true
)]
struct Args {
    #[command(subcommand)]
    model: ModelCommand,

    /// How beliefs are stored during belief propagation.
    ///
    /// Both representations yield the same beliefs; the logarithmic one is less prone to
    /// underflow on long chains of small messages.
    #[arg(long, value_enum, default_value_t, global = true)]
    belief_representation: BeliefRepresentation,

    /// The maximum number of rounds of belief propagation per sample.
    ///
    /// Possible values: usize
    #[arg(long, default_value_t = 5, global = true)]
    max_iterations: usize,

    /// Stop belief propagation once no belief changes by more than this value during a round.
    ///
    /// Possible values: f64
    #[arg(long, global = true)]
    convergence_threshold: Option<f64>,

    /// The share of the previous message which is kept in every new message, in [0, 1).
    ///
    /// Possible values: f64
    #[arg(long, default_value_t = 0.0, global = true)]
    damping: f64,

    /// The seed of the random generator of the solver.
    ///
    /// Possible values: u64
    #[arg(long = "seed", default_value_t = 42, global = true)]
    random_seed: u64,

    /// Where the beliefs are written; defaults to `<data>_results.dat` next to the data file.
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// A file to which the number of inconsistent samples of the run is appended.
    #[arg(long, global = true)]
    inconsistency_log: Option<PathBuf>,

    /// What happens when the model of a sample is inconsistent.
    ///
    /// `rhythm-alldifferent-lastbar` writes fallback beliefs by default, the other models end the
    /// run with exit code 2.
    #[arg(long, value_enum, global = true)]
    on_inconsistency: Option<OnInconsistency>,

    /// Enables log message output from the solver.
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    /// Instructs the solver to log statistics to stdout at the end of the run.
    #[arg(short = 's', long = "log-statistics", global = true)]
    log_statistics: bool,
}

#[derive(Debug, Subcommand)]
enum ModelCommand {
    /// The onset count of the bars strictly increases within every group of bars.
    RhythmIncreasingReset(SampleArgs),
    /// The bars of a group have distinct onset counts, the last doubling the one before.
    RhythmAlldifferentLastbar(SampleArgs),
    /// The pitches of the first group of bars follow a key, given the rhythm of the piece.
    PitchKey(PitchKeyArgs),
}

impl ModelCommand {
    fn default_on_inconsistency(&self) -> OnInconsistency {
        match self {
            ModelCommand::RhythmAlldifferentLastbar(_) => OnInconsistency::Fallback,
            ModelCommand::RhythmIncreasingReset(_) | ModelCommand::PitchKey(_) => {
                OnInconsistency::Abort
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OnInconsistency {
    /// End the run with exit code 2.
    Abort,
    /// Write beliefs which put everything on the value `0` and continue with the next sample.
    Fallback,
}

#[derive(Debug, clap::Args)]
struct SampleArgs {
    /// The data file with, for every sample, the tokens generated so far and the scores of the
    /// next token.
    data: PathBuf,

    /// The number of samples in the data file.
    #[arg(long)]
    samples: usize,

    /// The position of the token which is generated next.
    #[arg(long)]
    index: usize,

    /// The weight of the scores of the generative model.
    #[arg(long, default_value_t = 1.0)]
    oracle_weight: f64,

    /// The number of consecutive bars which are constrained together.
    #[arg(long, default_value_t = 1)]
    group_size: usize,
}

#[derive(Debug, clap::Args)]
struct PitchKeyArgs {
    #[command(flatten)]
    sample: SampleArgs,

    /// The file with the rhythm tokens of every sample.
    #[arg(long)]
    rhythm_tokens: PathBuf,

    /// How often every pitch class of the key occurs at least in the first group of bars.
    #[arg(long, default_value_t = 1)]
    min_occurrences: i32,
}

fn configure_logging(verbose: bool, log_statistics: bool) {
    if log_statistics {
        configure_statistic_logging(
            "%%%cpbp-stat:",
            Some("%%%cpbp-stat-end"),
            Some(Case::Camel),
            None,
        );
    }
    let level_filter = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::new()
        .format(move |buf, record| writeln!(buf, "% {}", record.args()))
        .filter_level(level_filter)
        .target(env_logger::Target::Stderr)
        .init();
    info!("Logging successfully configured");
}

fn main() {
    match run() {
        Ok(()) => {}
        Err(e) => {
            error!("Execution failed, error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

fn run() -> CpbpResult<()> {
    let args = Args::parse();

    configure_logging(args.verbose, args.log_statistics);

    if cpbp_solver::asserts::CPBP_ASSERT_LEVEL_DEFINITION
        >= cpbp_solver::asserts::CPBP_ASSERT_MODERATE
    {
        warn!(
            "Potential performance degradation: the assert level is set to {}, meaning many debug asserts are active which may result in performance degradation.",
            cpbp_solver::asserts::CPBP_ASSERT_LEVEL_DEFINITION
        );
    }

    if !(0.0..1.0).contains(&args.damping) {
        return Err(CpbpError::InvalidArgument(format!(
            "the damping has to be in [0, 1), got {}",
            args.damping
        )));
    }

    let solver_options = SolverOptions {
        belief_representation: args.belief_representation,
        belief_propagation: BeliefPropagationOptions {
            max_iterations: args.max_iterations,
            convergence_threshold: args.convergence_threshold,
            damping: args.damping,
        },
        random_generator: SmallRng::seed_from_u64(args.random_seed),
    };

    let sample_args = match &args.model {
        ModelCommand::RhythmIncreasingReset(sample_args)
        | ModelCommand::RhythmAlldifferentLastbar(sample_args) => sample_args,
        ModelCommand::PitchKey(pitch_key_args) => &pitch_key_args.sample,
    };
    let sample_options = SampleOptions {
        samples: sample_args.samples,
        index: sample_args.index,
        oracle_weight: sample_args.oracle_weight,
        group_size: sample_args.group_size,
        abort_on_inconsistency: args
            .on_inconsistency
            .unwrap_or_else(|| args.model.default_on_inconsistency())
            == OnInconsistency::Abort,
    };

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| results_path(&sample_args.data));

    // Every input is opened before the results file is created.
    let input = TokenReader::from_path(&sample_args.data)?;
    let summary = match &args.model {
        ModelCommand::RhythmIncreasingReset(_) => {
            let mut model =
                RhythmModel::new(RhythmConstraint::IncreasingReset, input, &sample_options)?;
            run_model(&mut model, &solver_options, &sample_options, &output_path)?
        }
        ModelCommand::RhythmAlldifferentLastbar(_) => {
            let mut model =
                RhythmModel::new(RhythmConstraint::AllDifferentLastBar, input, &sample_options)?;
            run_model(&mut model, &solver_options, &sample_options, &output_path)?
        }
        ModelCommand::PitchKey(pitch_key_args) => {
            let rhythm = TokenReader::from_path(&pitch_key_args.rhythm_tokens)?;
            let mut model = PitchKeyModel::new(
                input,
                rhythm,
                &sample_options,
                pitch_key_args.min_occurrences,
            )?;
            run_model(&mut model, &solver_options, &sample_options, &output_path)?
        }
    };

    if let Some(path) = &args.inconsistency_log {
        append_inconsistency_count(path, summary)?;
    }

    Ok(())
}

fn run_model<M: Model>(
    model: &mut M,
    solver_options: &SolverOptions,
    sample_options: &SampleOptions,
    output_path: &Path,
) -> CpbpResult<RunSummary> {
    let mut output = BufWriter::new(File::create(output_path)?);
    info!("Writing the beliefs to {}", output_path.display());
    models::run(model, solver_options, sample_options, &mut output)
}

/// `<directory>/<stem>_results.dat` for a data file `<directory>/<stem>.<extension>`.
fn results_path(data: &Path) -> PathBuf {
    let stem = data
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    data.with_file_name(format!("{stem}_results.dat"))
}

fn append_inconsistency_count(path: &Path, summary: RunSummary) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", summary.inconsistent_samples)
}
