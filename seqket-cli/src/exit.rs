//! Exit codes for the seqket CLI.
//!
//! Following Unix conventions for exit codes.

use seqket_conformance::RunError;

use crate::commands::CommandError;

/// Exit code constants.
pub mod codes {
    /// Successful execution, including verify runs with mismatches.
    pub const SUCCESS: i32 = 0;
    /// Invalid arguments, unknown case or missing converter.
    pub const INVALID_ARGS: i32 = 1;
    /// IO error (reference unreadable, record failed, stdout closed).
    pub const IO_ERROR: i32 = 2;
    /// Converter failed or rejected an input.
    pub const CONVERSION_ERROR: i32 = 3;
    /// At least one case mismatched under `--strict`.
    pub const MISMATCH: i32 = 4;
    /// Suite manifest missing or invalid.
    pub const SUITE_ERROR: i32 = 5;
}

/// Map a CommandError to an exit code.
pub fn exit_code(error: &CommandError) -> i32 {
    match error {
        CommandError::InvalidArgument(_) => codes::INVALID_ARGS,
        CommandError::UnknownCase(_) => codes::INVALID_ARGS,
        CommandError::NoConverter(_) => codes::INVALID_ARGS,
        CommandError::Suite(_) => codes::SUITE_ERROR,
        CommandError::Run(RunError::Conversion { .. }) => codes::CONVERSION_ERROR,
        CommandError::Run(_) => codes::IO_ERROR,
        CommandError::Mismatch { .. } => codes::MISMATCH,
        CommandError::Output(_) => codes::IO_ERROR,
    }
}
