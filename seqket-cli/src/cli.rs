//! CLI argument parsing for seqket.
//!
//! Provides the `verify`, `record` and `list` subcommands of the `seqket`
//! binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use seqket_conformance::ConverterCommand;
use thiserror::Error;

/// Errors from CLI argument validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    #[error("--converter-arg requires --converter")]
    ConverterArgsWithoutProgram,

    #[error("--converter must not be empty")]
    EmptyConverter,

    #[error("--case must not be empty")]
    EmptyCaseName,
}

/// seqket - FASTA to KET golden-file regression runner.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "seqket")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Convert every case and compare against the reference documents.
    Verify(VerifyArgs),
    /// Convert every case and overwrite the reference documents.
    Record(RecordArgs),
    /// List the cases of a suite.
    List(ListArgs),
}

/// Options shared by `verify` and `record`.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct SuiteArgs {
    /// Suite manifest, or a directory containing suite.json.
    /// Defaults to the built-in fixtures suite.
    #[arg(short, long)]
    pub suite: Option<PathBuf>,

    /// Run only this case (repeatable). Declaration order is kept.
    #[arg(short = 'c', long = "case")]
    pub cases: Vec<String>,

    /// Converter program, overriding the manifest's converter.
    #[arg(long)]
    pub converter: Option<String>,

    /// Argument template for --converter (repeatable). Placeholders:
    /// {input}, {seq_type}, {pretty}, {ignore_stereo}.
    #[arg(long = "converter-arg", allow_hyphen_values = true)]
    pub converter_args: Vec<String>,

    /// Increase verbosity (-v for per-case progress, -vv for debug).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl SuiteArgs {
    /// Validate the arguments.
    pub fn validate(&self) -> Result<(), CliError> {
        if self.cases.iter().any(|c| c.trim().is_empty()) {
            return Err(CliError::EmptyCaseName);
        }
        match &self.converter {
            Some(program) if program.trim().is_empty() => Err(CliError::EmptyConverter),
            None if !self.converter_args.is_empty() => Err(CliError::ConverterArgsWithoutProgram),
            _ => Ok(()),
        }
    }

    /// Converter given on the command line, if any.
    pub fn converter_override(&self) -> Option<ConverterCommand> {
        self.converter.as_ref().map(|program| ConverterCommand {
            program: program.clone(),
            args: self.converter_args.clone(),
        })
    }
}

/// Arguments for the verify command.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub suite: SuiteArgs,

    /// Exit non-zero when any case fails to match its reference.
    #[arg(long)]
    pub strict: bool,
}

impl VerifyArgs {
    pub fn validate(&self) -> Result<(), CliError> {
        self.suite.validate()
    }
}

/// Arguments for the record command.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct RecordArgs {
    #[command(flatten)]
    pub suite: SuiteArgs,
}

impl RecordArgs {
    pub fn validate(&self) -> Result<(), CliError> {
        self.suite.validate()
    }
}

/// Arguments for the list command.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ListArgs {
    /// Suite manifest, or a directory containing suite.json.
    #[arg(short, long)]
    pub suite: Option<PathBuf>,
}

/// Parse CLI arguments from an iterator of strings.
/// Useful for testing.
pub fn parse_from<I, T>(iter: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(iter)
}
