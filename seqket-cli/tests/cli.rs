//! End-to-end tests for the seqket binary.
//!
//! `cat` stands in for the converter, so each reference must equal its
//! FASTA input byte for byte to pass.

#![cfg(unix)]

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const MANIFEST: &str = r#"{
    "name": "FASTA to KET",
    "converter": { "program": "cat", "args": ["{input}"] },
    "cases": [
        { "file": "test_dna", "seq_type": "DNA" },
        { "file": "break", "seq_type": "PEPTIDE" }
    ]
}"#;

const DNA: &str = ">seq1\nACGTACGT\n";
const PEPTIDE: &str = ">p1\nACDEFGHIK\n\n>p2\nLMNPQ\n";

/// Suite dir with inputs for both cases and matching references.
fn create_suite() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let molecules = dir.path().join("molecules");
    let refs = dir.path().join("ref");
    fs::create_dir_all(&molecules).unwrap();
    fs::create_dir_all(&refs).unwrap();

    fs::write(dir.path().join("suite.json"), MANIFEST).unwrap();
    fs::write(molecules.join("test_dna.fasta"), DNA).unwrap();
    fs::write(molecules.join("break.fasta"), PEPTIDE).unwrap();
    fs::write(refs.join("test_dna.ket"), DNA).unwrap();
    fs::write(refs.join("break.ket"), PEPTIDE).unwrap();

    dir
}

fn run_seqket(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_seqket"))
        .args(args)
        .output()
        .expect("Failed to run seqket")
}

fn suite_arg(dir: &Path) -> String {
    dir.display().to_string()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_verify_all_succeed() {
    let suite = create_suite();
    let output = run_seqket(&["verify", "--suite", &suite_arg(suite.path())]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "*** FASTA to KET ***\ntest_dna.ket:SUCCEED\nbreak.ket:SUCCEED\n"
    );
}

#[test]
fn test_verify_mismatch_prints_diff_and_exits_zero() {
    let suite = create_suite();
    fs::write(
        suite.path().join("ref/break.ket"),
        ">p1\nACDEFGHIK\n\n>p2\nLMNPX\n",
    )
    .unwrap();

    let output = run_seqket(&["verify", "--suite", &suite_arg(suite.path())]);

    assert_eq!(output.status.code(), Some(0));
    let out = stdout(&output);
    assert!(out.contains("test_dna.ket:SUCCEED\nbreak.ket:FAILED\n"));
    assert!(out.contains("+++ break.ket (converted)"));
    assert!(out.contains("\n-LMNPX\n+LMNPQ"));
}

#[test]
fn test_verify_strict_mismatch_exit_code() {
    let suite = create_suite();
    fs::write(suite.path().join("ref/test_dna.ket"), ">seq1\nTTTT\n").unwrap();

    let output = run_seqket(&["verify", "--strict", "--suite", &suite_arg(suite.path())]);

    assert_eq!(output.status.code(), Some(4));
    assert!(stdout(&output).contains("test_dna.ket:FAILED"));
    assert!(stdout(&output).contains("break.ket:SUCCEED"));
    assert!(stderr(&output).contains("1 of 2 case(s) did not match"));
}

#[test]
fn test_verify_missing_input_aborts() {
    let suite = create_suite();
    fs::remove_file(suite.path().join("molecules/break.fasta")).unwrap();

    let output = run_seqket(&["verify", "--suite", &suite_arg(suite.path())]);

    assert_eq!(output.status.code(), Some(3));
    // Earlier cases are reported; the failing case is not
    assert_eq!(
        stdout(&output),
        "*** FASTA to KET ***\ntest_dna.ket:SUCCEED\n"
    );
    assert!(stderr(&output).contains("break"));
}

#[test]
fn test_verify_missing_reference_is_io_error() {
    let suite = create_suite();
    fs::remove_file(suite.path().join("ref/test_dna.ket")).unwrap();

    let output = run_seqket(&["verify", "--suite", &suite_arg(suite.path())]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("test_dna.ket"));
}

#[test]
fn test_record_then_verify() {
    let suite = create_suite();
    fs::remove_dir_all(suite.path().join("ref")).unwrap();
    let dir = suite_arg(suite.path());

    let output = run_seqket(&["record", "--suite", &dir]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "*** FASTA to KET ***\ntest_dna.ket:RECORDED\nbreak.ket:RECORDED\n"
    );
    assert_eq!(
        fs::read_to_string(suite.path().join("ref/break.ket")).unwrap(),
        PEPTIDE
    );

    let output = run_seqket(&["verify", "--strict", "--suite", &dir]);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_case_selection() {
    let suite = create_suite();
    let output = run_seqket(&[
        "verify",
        "--suite",
        &suite_arg(suite.path()),
        "--case",
        "break",
    ]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "*** FASTA to KET ***\nbreak.ket:SUCCEED\n");
}

#[test]
fn test_unknown_case_exit_code() {
    let suite = create_suite();
    let output = run_seqket(&[
        "verify",
        "--suite",
        &suite_arg(suite.path()),
        "--case",
        "nope",
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("unknown case: nope"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_converter_arg_without_converter_rejected() {
    let suite = create_suite();
    let output = run_seqket(&[
        "verify",
        "--suite",
        &suite_arg(suite.path()),
        "--converter-arg",
        "{input}",
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("--converter-arg requires --converter"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_missing_suite_exit_code() {
    let dir = TempDir::new().unwrap();
    let output = run_seqket(&["list", "--suite", &suite_arg(&dir.path().join("absent.json"))]);

    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn test_list_cases() {
    let suite = create_suite();
    let output = run_seqket(&["list", "--suite", &suite_arg(suite.path())]);

    assert_eq!(output.status.code(), Some(0));
    let out = stdout(&output);
    assert!(out.starts_with("# FASTA to KET (2 cases)\n"));
    assert!(out.contains("test_dna\tDNA\t"));
    assert!(out.contains("break\tPEPTIDE\t"));
}
