//! Command-line interface orchestration for the protolearn training driver.
//!
//! The CLI currently offers a single `train` subcommand that drives one
//! training page (a ParamDesc header plus a labelled sample file) through
//! the `KdIndex -> ClusterBuilder -> ProtoDistiller -> ProtoMerger`
//! pipeline and writes the resulting normproto and, optionally, Microfeat
//! dumps.

mod commands;

pub use commands::{
    Cli, CliError, Command, ExecutionSummary, ProtoStyleArg, TrainCommand, render_summary,
    run_cli,
};

#[cfg(test)]
mod tests;
