//! Conformance types.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::diff::UnifiedDiff;

/// Extension of FASTA input files.
pub const INPUT_EXTENSION: &str = "fasta";

/// Extension of reference KET documents.
pub const REFERENCE_EXTENSION: &str = "ket";

/// Biological sequence classification handed to the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SequenceType {
    Peptide,
    Rna,
    Dna,
}

impl SequenceType {
    /// Upper-case name as understood by the toolkit.
    pub fn as_str(&self) -> &'static str {
        match self {
            SequenceType::Peptide => "PEPTIDE",
            SequenceType::Rna => "RNA",
            SequenceType::Dna => "DNA",
        }
    }
}

impl fmt::Display for SequenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One (input file, sequence type) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// File stem shared by the `.fasta` input and the `.ket` reference.
    pub file: String,
    pub seq_type: SequenceType,
}

impl TestCase {
    pub fn new(file: &str, seq_type: SequenceType) -> Self {
        Self {
            file: file.to_string(),
            seq_type,
        }
    }

    /// `<molecules_dir>/<file>.fasta`
    pub fn input_path(&self, molecules_dir: &Path) -> PathBuf {
        molecules_dir.join(format!("{}.{}", self.file, INPUT_EXTENSION))
    }

    /// `<ref_dir>/<file>.ket`
    pub fn reference_path(&self, ref_dir: &Path) -> PathBuf {
        ref_dir.join(self.reference_name())
    }

    /// Name used on report lines.
    pub fn reference_name(&self) -> String {
        format!("{}.{}", self.file, REFERENCE_EXTENSION)
    }
}

/// The six cases of the FASTA to KET suite, in declaration order.
pub fn builtin_cases() -> Vec<TestCase> {
    vec![
        TestCase::new("test_peptide", SequenceType::Peptide),
        TestCase::new("test_rna", SequenceType::Rna),
        TestCase::new("test_dna", SequenceType::Dna),
        TestCase::new("multiseq", SequenceType::Dna),
        TestCase::new("break", SequenceType::Peptide),
        TestCase::new("comment", SequenceType::Peptide),
    ]
}

/// Whether a run compares against references or rewrites them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Verify,
    Record,
}

/// Per-case outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseOutcome {
    Succeeded,
    Failed(UnifiedDiff),
    /// Reference rewritten at this path.
    Recorded(PathBuf),
}

/// Result of running one case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseReport {
    pub case: TestCase,
    pub outcome: CaseOutcome,
}

impl CaseReport {
    pub fn passed(&self) -> bool {
        !matches!(self.outcome, CaseOutcome::Failed(_))
    }

    /// Status line, e.g. `test_dna.ket:SUCCEED`.
    pub fn status_line(&self) -> String {
        let status = match self.outcome {
            CaseOutcome::Succeeded => "SUCCEED",
            CaseOutcome::Failed(_) => "FAILED",
            CaseOutcome::Recorded(_) => "RECORDED",
        };
        format!("{}:{}", self.case.reference_name(), status)
    }
}

impl fmt::Display for CaseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.status_line())?;
        if let CaseOutcome::Failed(diff) = &self.outcome {
            writeln!(f, "{}", diff)?;
        }
        Ok(())
    }
}

/// Reports of a run that went through every case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub reports: Vec<CaseReport>,
}

impl RunSummary {
    pub fn passed_count(&self) -> usize {
        self.reports.iter().filter(|r| r.passed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.reports.len() - self.passed_count()
    }

    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }

    /// Names of the failed cases in run order.
    pub fn failed_cases(&self) -> Vec<&str> {
        self.reports
            .iter()
            .filter(|r| !r.passed())
            .map(|r| r.case.file.as_str())
            .collect()
    }
}
