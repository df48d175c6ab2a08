//! Verify and record command orchestration.

use std::io::Write;

use seqket_conformance::{
    default_suite_path, load_suite, run_suite, CommandLoader, Logger, RunMode, RunSummary,
    SequenceLoader, Suite,
};
use seqket_fs::Filesystem;

use crate::cli::{RecordArgs, SuiteArgs, VerifyArgs};

use super::{CommandError, CommandResult};

/// Load the suite named by the arguments and apply case selection and the
/// converter override.
pub fn resolve_suite(args: &SuiteArgs, logger: &dyn Logger) -> CommandResult<Suite> {
    let path = args.suite.clone().unwrap_or_else(default_suite_path);
    logger.debug(&format!("suite manifest: {}", path.display()));

    let mut suite = load_suite(&path)?.select(&args.cases)?;
    if let Some(converter) = args.converter_override() {
        suite = suite.with_converter(converter);
    }

    Ok(suite)
}

/// Build the external converter loader configured for the suite.
pub fn command_loader(suite: &Suite) -> CommandResult<CommandLoader> {
    suite
        .converter
        .clone()
        .map(CommandLoader::new)
        .ok_or_else(|| CommandError::NoConverter(suite.name.clone()))
}

/// Execute the verify command.
///
/// Mismatches only fail the command under `--strict`.
pub fn execute_verify<L, F, W>(
    args: &VerifyArgs,
    suite: &Suite,
    loader: &L,
    fs: &F,
    out: &mut W,
    logger: &dyn Logger,
) -> CommandResult<RunSummary>
where
    L: SequenceLoader + ?Sized,
    F: Filesystem + ?Sized,
    W: Write + ?Sized,
{
    args.validate()?;

    let summary = run_suite(suite, loader, fs, RunMode::Verify, out, logger)?;

    if args.strict && !summary.all_passed() {
        return Err(CommandError::Mismatch {
            failed: summary.failed_count(),
            total: summary.reports.len(),
        });
    }

    Ok(summary)
}

/// Execute the record command.
pub fn execute_record<L, F, W>(
    args: &RecordArgs,
    suite: &Suite,
    loader: &L,
    fs: &F,
    out: &mut W,
    logger: &dyn Logger,
) -> CommandResult<RunSummary>
where
    L: SequenceLoader + ?Sized,
    F: Filesystem + ?Sized,
    W: Write + ?Sized,
{
    args.validate()?;

    logger.info(&format!(
        "recording {} reference(s) into {}",
        suite.cases.len(),
        suite.ref_dir.display()
    ));

    Ok(run_suite(suite, loader, fs, RunMode::Record, out, logger)?)
}
