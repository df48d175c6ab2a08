//! seqket conformance harness
//!
//! Regression harness for a toolkit's FASTA loader: each case feeds a FASTA
//! file through the loader, serializes the result as KET and compares it
//! line by line against a golden reference document.
//!
//! # Overview
//!
//! 1. Load a suite (built-in case list or a `suite.json` manifest)
//! 2. Convert each `<molecules>/<case>.fasta` through a [`SequenceLoader`]
//! 3. Diff the KET text against `<ref>/<case>.ket`
//! 4. Print `<case>.ket:SUCCEED` or `<case>.ket:FAILED` plus the unified diff
//!
//! Conversion and IO failures abort the run; mismatches do not.
//!
//! # Fixtures
//!
//! The built-in suite lives in `fixtures/fasta_to_ket/` at the workspace root:
//!
//! - `suite.json` - Manifest (name, directories, loader options, converter, cases)
//! - `molecules/` - FASTA inputs (`*.fasta`)
//! - `ref/` - Reference KET documents (`*.ket`)

pub mod converter;
pub mod diff;
pub mod logger;
pub mod runner;
pub mod suite;
pub mod types;

pub use converter::{
    convert_fasta_to_ket, CommandLoader, ConversionError, ConverterCommand, ExternalMolecule,
    LoadCall, LoaderOptions, MockLoader, MockMolecule, MoleculeHandle, SequenceLoader,
};
pub use diff::{unified_diff, UnifiedDiff};
pub use logger::{LogEntry, Logger, MockLogger, NullLogger, StderrLogger, Verbosity};
pub use runner::{check_case, run_case, run_suite, RunError};
pub use suite::{
    default_suite_path, fixtures_dir, load_suite, parse_suite, LoadError, Suite, SuiteManifest,
    UnknownCase,
};
pub use types::{
    builtin_cases, CaseOutcome, CaseReport, RunMode, RunSummary, SequenceType, TestCase,
};
