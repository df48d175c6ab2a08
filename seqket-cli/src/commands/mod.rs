//! Command orchestration for CLI subcommands.
//!
//! Provides execute functions for:
//! - `verify` - Compare conversions against references
//! - `record` - Rewrite references from conversions
//! - `list` - Show the cases of a suite

pub mod list;
pub mod run;

pub use list::execute_list;
pub use run::{command_loader, execute_record, execute_verify, resolve_suite};

use seqket_conformance::{LoadError, RunError, UnknownCase};
use thiserror::Error;

use crate::cli::CliError;

/// Errors from command execution.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] CliError),

    #[error("suite error: {0}")]
    Suite(#[from] LoadError),

    #[error("{0}")]
    UnknownCase(#[from] UnknownCase),

    #[error("no converter configured for suite '{0}' (set \"converter\" in the manifest or pass --converter)")]
    NoConverter(String),

    #[error("{0}")]
    Run(#[from] RunError),

    #[error("{failed} of {total} case(s) did not match their reference")]
    Mismatch { failed: usize, total: usize },

    #[error("output error: {0}")]
    Output(#[from] std::io::Error),
}

/// Result of command execution.
pub type CommandResult<T> = Result<T, CommandError>;
