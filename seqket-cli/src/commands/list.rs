//! List command: print the cases of a suite.

use std::io::Write;

use seqket_conformance::{default_suite_path, load_suite, Suite};

use crate::cli::ListArgs;

use super::CommandResult;

/// Execute the list command.
pub fn execute_list<W: Write + ?Sized>(args: &ListArgs, out: &mut W) -> CommandResult<Suite> {
    let path = args.suite.clone().unwrap_or_else(default_suite_path);
    let suite = load_suite(&path)?;
    write_listing(&suite, out)?;
    Ok(suite)
}

/// One line per case: `<file>\t<SEQ_TYPE>\t<input path>`.
fn write_listing<W: Write + ?Sized>(suite: &Suite, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "# {} ({} cases)", suite.name, suite.cases.len())?;
    for case in &suite.cases {
        writeln!(
            out,
            "{}\t{}\t{}",
            case.file,
            case.seq_type,
            case.input_path(&suite.molecules_dir).display()
        )?;
    }
    Ok(())
}
