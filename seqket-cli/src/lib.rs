//! seqket CLI.
//!
//! Argument parsing, command orchestration and exit codes for the `seqket`
//! binary.

pub mod cli;
pub mod commands;
pub mod exit;

pub use cli::{parse_from, Cli, CliError, Command, ListArgs, RecordArgs, SuiteArgs, VerifyArgs};
pub use commands::{
    command_loader, execute_list, execute_record, execute_verify, resolve_suite, CommandError,
    CommandResult,
};
