//! Suite runner: convert each case and compare against its reference.

use std::io::Write;
use std::path::{Path, PathBuf};

use seqket_fs::{Filesystem, FsError};

use crate::converter::{convert_fasta_to_ket, ConversionError, SequenceLoader};
use crate::diff::unified_diff;
use crate::logger::Logger;
use crate::suite::Suite;
use crate::types::{CaseOutcome, CaseReport, RunMode, RunSummary, TestCase};

/// Errors that abort a run. Mismatches are not errors.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("conversion failed for {case}: {source}")]
    Conversion {
        case: String,
        #[source]
        source: ConversionError,
    },

    #[error("failed to read reference {path}: {source}")]
    Reference {
        path: String,
        #[source]
        source: FsError,
    },

    #[error("failed to record reference {path}: {source}")]
    Record {
        path: String,
        #[source]
        source: FsError,
    },

    #[error("failed to write report: {0}")]
    Output(#[from] std::io::Error),
}

/// Run every case of `suite` in declaration order.
///
/// Each case's report is written to `out` as soon as it completes, so a fatal
/// error leaves the reports of all earlier cases in place and nothing for the
/// failing case or later ones.
pub fn run_suite<L, F, W>(
    suite: &Suite,
    loader: &L,
    fs: &F,
    mode: RunMode,
    out: &mut W,
    logger: &dyn Logger,
) -> Result<RunSummary, RunError>
where
    L: SequenceLoader + ?Sized,
    F: Filesystem + ?Sized,
    W: Write + ?Sized,
{
    logger.verbose(&format!(
        "running {} case(s) of '{}' in {:?} mode",
        suite.cases.len(),
        suite.name,
        mode
    ));
    logger.debug(&format!(
        "molecules: {}, references: {}, options: {:?}",
        suite.molecules_dir.display(),
        suite.ref_dir.display(),
        suite.options
    ));

    writeln!(out, "*** {} ***", suite.name)?;

    let mut summary = RunSummary::default();
    for case in &suite.cases {
        let report = run_case(suite, case, loader, fs, mode, logger)?;
        write!(out, "{}", report)?;
        out.flush()?;
        summary.reports.push(report);
    }

    logger.verbose(&format!(
        "{} passed, {} failed",
        summary.passed_count(),
        summary.failed_count()
    ));

    Ok(summary)
}

/// Run a single case: convert, then verify or record.
pub fn run_case<L, F>(
    suite: &Suite,
    case: &TestCase,
    loader: &L,
    fs: &F,
    mode: RunMode,
    logger: &dyn Logger,
) -> Result<CaseReport, RunError>
where
    L: SequenceLoader + ?Sized,
    F: Filesystem + ?Sized,
{
    let input = case.input_path(&suite.molecules_dir);
    logger.verbose(&format!("case {} ({})", case.file, case.seq_type));
    logger.debug(&format!("loading {}", input.display()));

    let converted = convert_fasta_to_ket(loader, &input, case.seq_type, &suite.options)
        .map_err(|e| RunError::Conversion {
            case: case.file.clone(),
            source: e,
        })?;

    let reference_path = case.reference_path(&suite.ref_dir);

    match mode {
        RunMode::Verify => {
            logger.debug(&format!("comparing against {}", reference_path.display()));
            let reference = fs
                .read_file(&reference_path)
                .map_err(|e| RunError::Reference {
                    path: reference_path.display().to_string(),
                    source: e,
                })?;
            Ok(check_case(case, &reference, &converted, &reference_path))
        }
        RunMode::Record => {
            let path = record_reference(fs, &suite.ref_dir, case, &converted)?;
            logger.info(&format!("recorded {}", path.display()));
            Ok(CaseReport {
                case: case.clone(),
                outcome: CaseOutcome::Recorded(path),
            })
        }
    }
}

/// Compare a conversion result with its reference text.
pub fn check_case(
    case: &TestCase,
    reference: &str,
    converted: &str,
    reference_path: &Path,
) -> CaseReport {
    let diff = unified_diff(
        reference,
        converted,
        &reference_path.display().to_string(),
        &format!("{} (converted)", case.reference_name()),
    );

    let outcome = if diff.is_empty() {
        CaseOutcome::Succeeded
    } else {
        CaseOutcome::Failed(diff)
    };

    CaseReport {
        case: case.clone(),
        outcome,
    }
}

/// Overwrite the case's reference with `converted`.
fn record_reference<F: Filesystem + ?Sized>(
    fs: &F,
    ref_dir: &Path,
    case: &TestCase,
    converted: &str,
) -> Result<PathBuf, RunError> {
    let path = case.reference_path(ref_dir);
    let record_err = |source| RunError::Record {
        path: path.display().to_string(),
        source,
    };

    fs.create_dir_all(ref_dir).map_err(record_err)?;
    fs.write_atomic(&path, converted.as_bytes())
        .map_err(record_err)?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::{LoaderOptions, MockLoader};
    use crate::logger::{MockLogger, NullLogger, Verbosity};
    use crate::types::SequenceType;
    use seqket_fs::MockFilesystem;
    use std::io;

    const ROOT: &str = "/suite";

    fn ket_for(case: &TestCase) -> String {
        format!(
            "{{\n    \"root\": {{\n        \"nodes\": [\n            {{\n                \"$ref\": \"{}\"\n            }}\n        ]\n    }}\n}}\n",
            case.file
        )
    }

    /// Loader and filesystem where every case converts to its reference.
    fn setup(suite: &Suite) -> (MockLoader, MockFilesystem) {
        let loader = MockLoader::new();
        let fs = MockFilesystem::new();
        for case in &suite.cases {
            let ket = ket_for(case);
            loader.add_document(case.input_path(&suite.molecules_dir), &ket);
            fs.add_file(case.reference_path(&suite.ref_dir), ket);
        }
        (loader, fs)
    }

    fn run_to_string(
        suite: &Suite,
        loader: &MockLoader,
        fs: &MockFilesystem,
        mode: RunMode,
    ) -> (Result<RunSummary, RunError>, String) {
        let mut out = Vec::new();
        let result = run_suite(suite, loader, fs, mode, &mut out, &NullLogger);
        (result, String::from_utf8(out).unwrap())
    }

    // -------------------------------------------
    // Regression baseline
    // -------------------------------------------

    #[test]
    fn test_unmodified_references_all_succeed() {
        let suite = Suite::builtin(Path::new(ROOT));
        let (loader, fs) = setup(&suite);

        let (result, output) = run_to_string(&suite, &loader, &fs, RunMode::Verify);
        let summary = result.unwrap();

        assert!(summary.all_passed());
        assert_eq!(summary.reports.len(), 6);
        assert_eq!(
            output,
            "*** FASTA to KET ***\n\
             test_peptide.ket:SUCCEED\n\
             test_rna.ket:SUCCEED\n\
             test_dna.ket:SUCCEED\n\
             multiseq.ket:SUCCEED\n\
             break.ket:SUCCEED\n\
             comment.ket:SUCCEED\n"
        );
    }

    #[test]
    fn test_single_dna_case_prints_exactly_one_line() {
        let suite = Suite::builtin(Path::new(ROOT))
            .with_cases(vec![TestCase::new("test_dna", SequenceType::Dna)]);
        let (loader, fs) = setup(&suite);

        let (result, output) = run_to_string(&suite, &loader, &fs, RunMode::Verify);
        result.unwrap();

        let case_lines: Vec<_> = output.lines().skip(1).collect();
        assert_eq!(case_lines, vec!["test_dna.ket:SUCCEED"]);
    }

    #[test]
    fn test_reference_without_trailing_newline_still_matches() {
        let suite = Suite::builtin(Path::new(ROOT))
            .with_cases(vec![TestCase::new("comment", SequenceType::Peptide)]);
        let (loader, fs) = setup(&suite);
        let case = &suite.cases[0];
        fs.add_file(case.reference_path(&suite.ref_dir), ket_for(case).trim_end());

        let (result, _) = run_to_string(&suite, &loader, &fs, RunMode::Verify);
        assert!(result.unwrap().all_passed());
    }

    // -------------------------------------------
    // Mismatch isolation
    // -------------------------------------------

    #[test]
    fn test_altered_reference_fails_only_that_case() {
        let suite = Suite::builtin(Path::new(ROOT));
        let (loader, fs) = setup(&suite);

        let rna = suite.case("test_rna").unwrap();
        let altered = ket_for(rna).replace("test_rna", "test_rnA");
        fs.add_file(rna.reference_path(&suite.ref_dir), altered);

        let (result, output) = run_to_string(&suite, &loader, &fs, RunMode::Verify);
        let summary = result.unwrap();

        assert_eq!(summary.failed_cases(), vec!["test_rna"]);
        assert_eq!(summary.passed_count(), 5);

        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines[1], "test_peptide.ket:SUCCEED");
        assert_eq!(lines[2], "test_rna.ket:FAILED");
        assert_eq!(lines[3], "--- /suite/ref/test_rna.ket");
        assert_eq!(lines[4], "+++ test_rna.ket (converted)");
        assert!(output.contains("-                \"$ref\": \"test_rnA\"\n"));
        assert!(output.contains("+                \"$ref\": \"test_rna\"\n"));
        assert!(output.contains("test_dna.ket:SUCCEED\n"));
        assert!(output.ends_with("comment.ket:SUCCEED\n"));
    }

    #[test]
    fn test_check_case_pure_comparison() {
        let case = TestCase::new("break", SequenceType::Peptide);
        let path = Path::new("ref/break.ket");

        let same = check_case(&case, "a\nb\n", "a\nb\n", path);
        assert_eq!(same.outcome, CaseOutcome::Succeeded);

        let different = check_case(&case, "a\nb\n", "a\nc\n", path);
        match different.outcome {
            CaseOutcome::Failed(diff) => {
                assert_eq!(diff.lines()[0], "--- ref/break.ket");
                assert_eq!(diff.hunk_count(), 1);
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    // -------------------------------------------
    // Fatal errors
    // -------------------------------------------

    #[test]
    fn test_missing_input_halts_before_its_report_line() {
        let suite = Suite::builtin(Path::new(ROOT));
        let (_, fs) = setup(&suite);

        // Loader knows only the first two inputs
        let loader = MockLoader::new();
        for case in suite.cases.iter().take(2) {
            loader.add_document(case.input_path(&suite.molecules_dir), &ket_for(case));
        }

        let (result, output) = run_to_string(&suite, &loader, &fs, RunMode::Verify);

        match result {
            Err(RunError::Conversion { case, source }) => {
                assert_eq!(case, "test_dna");
                assert!(matches!(source, ConversionError::MissingInput(_)));
            }
            other => panic!("expected conversion error, got {:?}", other),
        }
        assert_eq!(
            output,
            "*** FASTA to KET ***\ntest_peptide.ket:SUCCEED\ntest_rna.ket:SUCCEED\n"
        );
        // No load attempted past the failing case
        assert_eq!(loader.calls().len(), 3);
    }

    #[test]
    fn test_loader_rejection_is_fatal() {
        let suite = Suite::builtin(Path::new(ROOT));
        let (loader, fs) = setup(&suite);
        loader.reject(suite.case("break").unwrap().input_path(&suite.molecules_dir));

        let (result, output) = run_to_string(&suite, &loader, &fs, RunMode::Verify);

        let err = result.unwrap_err();
        assert!(err.to_string().contains("conversion failed for break"));
        assert!(output.contains("multiseq.ket:SUCCEED"));
        assert!(!output.contains("break.ket"));
        assert!(!output.contains("comment.ket"));
    }

    #[test]
    fn test_missing_reference_is_fatal() {
        let suite = Suite::builtin(Path::new(ROOT));
        let (loader, fs) = setup(&suite);
        fs.remove_file(&suite.case("multiseq").unwrap().reference_path(&suite.ref_dir));

        let (result, output) = run_to_string(&suite, &loader, &fs, RunMode::Verify);

        match result {
            Err(RunError::Reference { path, source }) => {
                assert_eq!(path, "/suite/ref/multiseq.ket");
                assert!(source.is_not_found());
            }
            other => panic!("expected reference error, got {:?}", other),
        }
        assert!(output.ends_with("test_dna.ket:SUCCEED\n"));
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_output_failure_is_reported() {
        let suite = Suite::builtin(Path::new(ROOT));
        let (loader, fs) = setup(&suite);

        let result = run_suite(&suite, &loader, &fs, RunMode::Verify, &mut BrokenPipe, &NullLogger);
        assert!(matches!(result, Err(RunError::Output(_))));
        assert!(loader.calls().is_empty());
    }

    // -------------------------------------------
    // Loader options
    // -------------------------------------------

    #[test]
    fn test_options_reach_every_load_call() {
        let options = LoaderOptions::default().with_ignore_stereochemistry_errors(false);
        let suite = Suite::builtin(Path::new(ROOT)).with_options(options);
        let (loader, fs) = setup(&suite);

        run_to_string(&suite, &loader, &fs, RunMode::Verify).0.unwrap();

        let calls = loader.calls();
        assert_eq!(calls.len(), 6);
        assert!(calls.iter().all(|c| c.options == options));
        let types: Vec<_> = calls.iter().map(|c| c.seq_type).collect();
        assert_eq!(
            types,
            vec![
                SequenceType::Peptide,
                SequenceType::Rna,
                SequenceType::Dna,
                SequenceType::Dna,
                SequenceType::Peptide,
                SequenceType::Peptide,
            ]
        );
    }

    // -------------------------------------------
    // Record mode
    // -------------------------------------------

    #[test]
    fn test_verify_never_writes() {
        let suite = Suite::builtin(Path::new(ROOT));
        let (loader, fs) = setup(&suite);
        let before = fs.files();

        run_to_string(&suite, &loader, &fs, RunMode::Verify).0.unwrap();

        assert_eq!(fs.files(), before);
        assert!(!fs.has_dir(&suite.ref_dir));
    }

    #[test]
    fn test_record_writes_references_then_verify_passes() {
        let suite = Suite::builtin(Path::new(ROOT));
        let (loader, _) = setup(&suite);
        let fs = MockFilesystem::new();

        let (result, output) = run_to_string(&suite, &loader, &fs, RunMode::Record);
        let summary = result.unwrap();

        assert!(summary.all_passed());
        assert!(fs.has_dir(Path::new("/suite/ref")));
        assert!(output.contains("test_peptide.ket:RECORDED\n"));
        for case in &suite.cases {
            let path = case.reference_path(&suite.ref_dir);
            assert_eq!(fs.get_text(&path), Some(ket_for(case)));
        }

        let (verify, _) = run_to_string(&suite, &loader, &fs, RunMode::Verify);
        assert!(verify.unwrap().all_passed());
    }

    #[test]
    fn test_record_overwrites_stale_reference() {
        let suite = Suite::builtin(Path::new(ROOT))
            .with_cases(vec![TestCase::new("multiseq", SequenceType::Dna)]);
        let (loader, fs) = setup(&suite);
        let path = suite.cases[0].reference_path(&suite.ref_dir);
        fs.add_file(path.clone(), "stale");

        let report = run_case(&suite, &suite.cases[0], &loader, &fs, RunMode::Record, &NullLogger)
            .unwrap();

        assert_eq!(report.outcome, CaseOutcome::Recorded(path.clone()));
        assert_eq!(fs.get_text(&path), Some(ket_for(&suite.cases[0])));
    }

    // -------------------------------------------
    // Logging
    // -------------------------------------------

    #[test]
    fn test_progress_is_logged_not_printed() {
        let suite = Suite::builtin(Path::new(ROOT));
        let (loader, fs) = setup(&suite);
        let logger = MockLogger::new();
        let mut out = Vec::new();

        run_suite(&suite, &loader, &fs, RunMode::Verify, &mut out, &logger).unwrap();

        assert!(logger.contains("running 6 case(s) of 'FASTA to KET'"));
        assert!(logger.contains("loading /suite/molecules/test_peptide.fasta"));
        assert_eq!(
            logger.messages_at_level(Verbosity::Verbose).last().map(String::as_str),
            Some("6 passed, 0 failed")
        );
        let printed = String::from_utf8(out).unwrap();
        assert!(!printed.contains("loading"));
    }
}
