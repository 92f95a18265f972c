//! Command implementations and argument parsing for the protolearn CLI.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;
use tracing::warn;

use protolearn_core::error::ClassifierError;
use protolearn_core::io::{NormProtoClass, read_microfeat, read_param_descs, write_microfeat, write_normproto};
use protolearn_core::{ClassLibrary, ClusterBuilder, ClusterConfigBuilder, ProtoDistiller, ProtoMerger, ProtoStyle, Prototype};

const DEFAULT_MAX_NUM_PROTOS: usize = 128;
const DEFAULT_RETRY_SHRINK: f32 = 0.95;
const DEFAULT_MAX_RETRIES: u32 = 10;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "protolearn", about = "Distil and merge classifier prototypes for one training page.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the full distillation-and-merge pipeline for one training page.
    Train(TrainCommand),
}

/// The prototype style a caller may request on the command line. Mirrors
/// [`ProtoStyle`] but derives [`ValueEnum`] rather than living in the core
/// crate, so the core has no `clap` dependency.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProtoStyleArg {
    /// Fit a single scalar variance across all essential dimensions.
    Spherical,
    /// Fit an independent variance per essential dimension, all normal.
    Elliptical,
    /// Fit each essential dimension independently against normal, random,
    /// and uniform candidates.
    Mixed,
    /// Try spherical, then elliptical, then mixed.
    Automatic,
}

impl From<ProtoStyleArg> for ProtoStyle {
    fn from(value: ProtoStyleArg) -> Self {
        match value {
            ProtoStyleArg::Spherical => Self::Spherical,
            ProtoStyleArg::Elliptical => Self::Elliptical,
            ProtoStyleArg::Mixed => Self::Mixed,
            ProtoStyleArg::Automatic => Self::Automatic,
        }
    }
}

/// Options accepted by the `train` command.
#[derive(Debug, Args, Clone)]
pub struct TrainCommand {
    /// Path to the ParamDesc header file describing the feature space.
    pub param_desc: PathBuf,

    /// Path to a whitespace-delimited sample file: one `<char_id> <feature
    /// ...>` record per line, `char_id` a non-negative integer and the
    /// feature count matching the ParamDesc header.
    pub samples: PathBuf,

    /// Unichar label the distilled prototypes belong to.
    #[arg(long = "class")]
    pub class_label: String,

    /// Training-page font id recorded against the merged configuration.
    #[arg(long = "font-id", default_value_t = 0)]
    pub font_id: i32,

    /// Destination for the distilled normproto dump.
    #[arg(long = "normproto-out")]
    pub normproto_out: PathBuf,

    /// Optional destination for a merged Microfeat dump. When supplied,
    /// an existing dump at the same path is read back first so merging
    /// accumulates across pages, matching the teacher's read-then-write
    /// round trip for persistent state.
    #[arg(long = "microfeat-out")]
    pub microfeat_out: Option<PathBuf>,

    /// Upper bound on the number of prototypes a class library may hold.
    #[arg(long = "max-num-protos", default_value_t = DEFAULT_MAX_NUM_PROTOS)]
    pub max_num_protos: usize,

    /// Maximum pairwise distance `ClusterBuilder` will merge across; the
    /// historical clusterer has no such cap, so the default is unbounded.
    #[arg(long = "max-distance", default_value_t = f32::INFINITY)]
    pub max_distance: f32,

    /// Requested prototype style or fallthrough strategy.
    #[arg(long = "proto-style", value_enum, default_value_t = ProtoStyleArg::Elliptical)]
    pub proto_style: ProtoStyleArg,

    /// Fraction of total-character count required for significance.
    #[arg(long = "min-samples", default_value_t = 0.1)]
    pub min_samples: f32,

    /// Fraction threshold for the multi-character filter.
    #[arg(long = "max-illegal", default_value_t = 0.5)]
    pub max_illegal: f32,

    /// Correlation-coefficient ceiling for the independence gate.
    #[arg(long = "independence", default_value_t = 0.9)]
    pub independence: f32,

    /// Alpha for the chi-squared goodness-of-fit test.
    #[arg(long = "confidence", default_value_t = 0.01)]
    pub confidence: f64,

    /// Sample count that earns the Hotelling acceptance boost.
    #[arg(long = "magic-samples", default_value_t = 0)]
    pub magic_samples: u32,

    /// Factor `min_samples` is multiplied by on each driver retry.
    #[arg(long = "retry-shrink", default_value_t = DEFAULT_RETRY_SHRINK)]
    pub retry_shrink: f32,

    /// Maximum number of driver retries before giving up and emitting
    /// whatever the last attempt produced.
    #[arg(long = "max-retries", default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,
}

impl std::fmt::Display for ProtoStyleArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Spherical => "spherical",
            Self::Elliptical => "elliptical",
            Self::Mixed => "mixed",
            Self::Automatic => "automatic",
        };
        f.write_str(text)
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O failed while loading an input source or writing an output.
    #[error("failed to access `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// A sample record did not parse.
    #[error("malformed sample record on line {line}: {detail}")]
    MalformedSample {
        /// One-based line number within the sample file.
        line: usize,
        /// Human-readable detail.
        detail: String,
    },
    /// Core pipeline orchestration failed.
    #[error(transparent)]
    Core(#[from] ClassifierError),
}

/// Summarises the outcome of executing the `train` command.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Unichar label the run trained against.
    pub class_label: String,
    /// Number of driver retries consumed before a non-empty significant
    /// prototype set was produced (or `max_retries` was exhausted).
    pub attempts: u32,
    /// Total prototypes distilled on the final attempt.
    pub prototypes_emitted: usize,
    /// Of those, the number marked significant.
    pub significant_prototypes: usize,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when reading inputs, running the pipeline, or
/// writing outputs fails.
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Train(train) => run_train(&train),
    }
}

#[tracing::instrument(name = "protolearn_cli::train", skip(command), fields(class = %command.class_label))]
pub(super) fn run_train(command: &TrainCommand) -> Result<ExecutionSummary, CliError> {
    let params = read_param_descs(open_reader(&command.param_desc)?)
        .map_err(ClassifierError::from)?;
    let samples = read_samples(&command.samples, params.len())?;

    let mut min_samples = command.min_samples;
    let mut attempts = 0u32;
    let protos = loop {
        let config = ClusterConfigBuilder::new()
            .with_proto_style(command.proto_style.into())
            .with_min_samples(min_samples)
            .with_max_illegal(command.max_illegal)
            .with_independence(command.independence)
            .with_confidence(command.confidence)
            .with_magic_samples(command.magic_samples)
            .build()
            .map_err(ClassifierError::from)?;

        let forest = ClusterBuilder::new(params.clone(), command.max_distance).build(&samples);
        let protos = ProtoDistiller::new(params.clone(), config).distill(&forest, &samples);
        let significant = protos.iter().filter(|p| p.significant()).count();

        if significant > 0 || attempts >= command.max_retries {
            break protos;
        }

        attempts += 1;
        let shrunk = shrink_min_samples(min_samples, command.retry_shrink);
        warn!(
            attempt = attempts,
            previous_min_samples = min_samples,
            next_min_samples = shrunk,
            "no significant prototypes produced; retrying with shrunk min_samples"
        );
        min_samples = shrunk;
    };

    let prototypes_emitted = protos.len();
    let significant_prototypes = protos.iter().filter(|p| p.significant()).count();

    write_normproto_file(&command.normproto_out, &params, &command.class_label, protos.clone())?;

    if let Some(microfeat_path) = &command.microfeat_out {
        merge_into_microfeat(microfeat_path, &command.class_label, protos, command.font_id, command.max_num_protos)?;
    }

    Ok(ExecutionSummary {
        class_label: command.class_label.clone(),
        attempts,
        prototypes_emitted,
        significant_prototypes,
    })
}

#[expect(clippy::float_arithmetic, reason = "applies the driver's retry shrink factor to min_samples")]
pub(super) const fn shrink_min_samples(min_samples: f32, retry_shrink: f32) -> f32 {
    min_samples * retry_shrink
}

fn write_normproto_file(
    path: &Path,
    params: &[protolearn_core::ParamDesc],
    class_label: &str,
    protos: Vec<Prototype>,
) -> Result<(), CliError> {
    let classes = [NormProtoClass {
        label: class_label.to_owned(),
        protos,
    }];
    let mut file = create_file(path)?;
    write_normproto(&mut file, params, &classes).map_err(ClassifierError::from)?;
    Ok(())
}

fn merge_into_microfeat(
    path: &Path,
    class_label: &str,
    protos: Vec<Prototype>,
    font_id: i32,
    max_num_protos: usize,
) -> Result<(), CliError> {
    let mut classes = read_existing_microfeat(path, max_num_protos)?;
    let index = match classes.iter().position(|(label, _)| label == class_label) {
        Some(index) => index,
        None => {
            classes.push((class_label.to_owned(), ClassLibrary::new(max_num_protos)));
            classes.len().saturating_sub(1)
        }
    };
    let library = classes
        .get_mut(index)
        .map(|(_, library)| library)
        .ok_or_else(|| CliError::MalformedSample {
            line: 0,
            detail: "freshly pushed class library vanished".to_owned(),
        })?;

    ProtoMerger::new().merge_page(library, protos, font_id)?;

    let mut file = create_file(path)?;
    write_microfeat(&mut file, &classes).map_err(ClassifierError::from)?;
    Ok(())
}

fn read_existing_microfeat(path: &Path, max_num_protos: usize) -> Result<Vec<(String, ClassLibrary)>, CliError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = open_reader(path)?;
    let classes = read_microfeat(file, max_num_protos).map_err(ClassifierError::from)?;
    Ok(classes)
}

fn open_reader(path: &Path) -> Result<BufReader<File>, CliError> {
    let file = File::open(path).map_err(|source| CliError::Io { path: path.to_path_buf(), source })?;
    Ok(BufReader::new(file))
}

fn create_file(path: &Path) -> Result<File, CliError> {
    File::create(path).map_err(|source| CliError::Io { path: path.to_path_buf(), source })
}

/// Reads a labelled sample file: one `<char_id> <feature ...>` record per
/// non-blank line, `dims` features expected on each line.
pub(super) fn read_samples(path: &Path, dims: usize) -> Result<Vec<(Vec<f32>, i32)>, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CliError::Io { path: path.to_path_buf(), source })?;
    let mut samples = Vec::new();
    for (index, raw_line) in contents.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        let line_number = index + 1;
        let mut fields = line.split_whitespace();
        let char_id = fields
            .next()
            .ok_or_else(|| CliError::MalformedSample { line: line_number, detail: "missing char_id".to_owned() })?
            .parse::<i32>()
            .map_err(|source| CliError::MalformedSample { line: line_number, detail: source.to_string() })?;

        let mut key = Vec::with_capacity(dims);
        for field in fields {
            let value = field
                .parse::<f32>()
                .map_err(|source| CliError::MalformedSample { line: line_number, detail: source.to_string() })?;
            key.push(value);
        }

        if key.len() != dims {
            return Err(CliError::MalformedSample {
                line: line_number,
                detail: format!("expected {dims} features, found {}", key.len()),
            });
        }

        samples.push((key, char_id));
    }
    Ok(samples)
}

/// Renders `summary` to `writer` in a human-readable text format.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    writeln!(writer, "class: {}", summary.class_label)?;
    writeln!(writer, "driver retries: {}", summary.attempts)?;
    writeln!(writer, "prototypes: {}", summary.prototypes_emitted)?;
    writeln!(writer, "significant: {}", summary.significant_prototypes)?;
    Ok(())
}
