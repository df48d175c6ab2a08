//! seqket CLI binary.
//!
//! Entry point for the `seqket` command-line tool.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use seqket_cli::exit::{codes, exit_code};
use seqket_cli::{
    command_loader, execute_list, execute_record, execute_verify, resolve_suite, Cli, Command,
    CommandError, ListArgs, RecordArgs, VerifyArgs,
};
use seqket_conformance::{Logger, StderrLogger, Verbosity};
use seqket_fs::RealFilesystem;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let result = match cli.command {
        Command::Verify(args) => run_verify(args, &mut out),
        Command::Record(args) => run_record(args, &mut out),
        Command::List(args) => run_list(args, &mut out),
    };

    match result {
        Ok(()) => ExitCode::from(codes::SUCCESS as u8),
        Err(e) => {
            // Keep already printed reports ahead of the error
            let _ = out.flush();
            eprintln!("error: {}", e);
            ExitCode::from(exit_code(&e) as u8)
        }
    }
}

/// Run the verify command.
fn run_verify(args: VerifyArgs, out: &mut impl Write) -> Result<(), CommandError> {
    let logger = StderrLogger::new(Verbosity::from_count(args.suite.verbose));
    let suite = resolve_suite(&args.suite, &logger)?;
    let loader = command_loader(&suite)?;

    let summary = execute_verify(&args, &suite, &loader, &RealFilesystem, out, &logger)?;

    if !summary.all_passed() {
        logger.info(&format!(
            "{} of {} case(s) failed: {}",
            summary.failed_count(),
            summary.reports.len(),
            summary.failed_cases().join(", ")
        ));
    }

    Ok(())
}

/// Run the record command.
fn run_record(args: RecordArgs, out: &mut impl Write) -> Result<(), CommandError> {
    let logger = StderrLogger::new(Verbosity::from_count(args.suite.verbose));
    let suite = resolve_suite(&args.suite, &logger)?;
    let loader = command_loader(&suite)?;

    execute_record(&args, &suite, &loader, &RealFilesystem, out, &logger)?;

    Ok(())
}

/// Run the list command.
fn run_list(args: ListArgs, out: &mut impl Write) -> Result<(), CommandError> {
    execute_list(&args, out)?;
    out.flush()?;
    Ok(())
}
