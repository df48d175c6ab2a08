//! Suite manifest loading.
//!
//! A suite is a directory holding `suite.json`, a `molecules/` directory of
//! FASTA inputs and a `ref/` directory of reference KET documents. The
//! manifest may override every part; omitted fields fall back to the
//! built-in FASTA to KET suite.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::converter::{ConverterCommand, LoaderOptions};
use crate::types::{builtin_cases, TestCase};

/// Name printed in the title line of the built-in suite.
pub const DEFAULT_SUITE_NAME: &str = "FASTA to KET";

/// Default directory of FASTA inputs, relative to the suite directory.
pub const DEFAULT_MOLECULES_DIR: &str = "molecules";

/// Default directory of reference documents, relative to the suite directory.
pub const DEFAULT_REF_DIR: &str = "ref";

/// Manifest file name inside a suite directory.
pub const SUITE_FILE: &str = "suite.json";

/// Directory of the built-in suite under `fixtures/`.
pub const BUILTIN_SUITE_DIR: &str = "fasta_to_ket";

/// Errors that can occur when loading a suite.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("suite manifest not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read file {path}: {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON in {path}: {source}")]
    JsonError {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("suite declares no cases: {0}")]
    NoCases(String),

    #[error("case with empty file name in {0}")]
    EmptyCaseName(String),

    #[error("duplicate case {case} in {path}")]
    DuplicateCase { case: String, path: String },
}

/// A case name that is not part of the suite.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown case: {0}")]
pub struct UnknownCase(pub String);

/// On-disk manifest layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuiteManifest {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_molecules_dir")]
    pub molecules_dir: PathBuf,
    #[serde(default = "default_ref_dir")]
    pub ref_dir: PathBuf,
    #[serde(default)]
    pub options: LoaderOptions,
    #[serde(default)]
    pub converter: Option<ConverterCommand>,
    #[serde(default = "builtin_cases")]
    pub cases: Vec<TestCase>,
}

fn default_name() -> String {
    DEFAULT_SUITE_NAME.to_string()
}

fn default_molecules_dir() -> PathBuf {
    PathBuf::from(DEFAULT_MOLECULES_DIR)
}

fn default_ref_dir() -> PathBuf {
    PathBuf::from(DEFAULT_REF_DIR)
}

/// A suite with directories resolved, ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suite {
    pub name: String,
    pub molecules_dir: PathBuf,
    pub ref_dir: PathBuf,
    pub options: LoaderOptions,
    pub converter: Option<ConverterCommand>,
    pub cases: Vec<TestCase>,
}

impl Suite {
    /// The built-in suite rooted at `root`.
    pub fn builtin(root: &Path) -> Self {
        Self {
            name: DEFAULT_SUITE_NAME.to_string(),
            molecules_dir: root.join(DEFAULT_MOLECULES_DIR),
            ref_dir: root.join(DEFAULT_REF_DIR),
            options: LoaderOptions::default(),
            converter: None,
            cases: builtin_cases(),
        }
    }

    /// Builder: set loader options.
    pub fn with_options(mut self, options: LoaderOptions) -> Self {
        self.options = options;
        self
    }

    /// Builder: set the converter command.
    pub fn with_converter(mut self, converter: ConverterCommand) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Builder: replace the case list.
    pub fn with_cases(mut self, cases: Vec<TestCase>) -> Self {
        self.cases = cases;
        self
    }

    pub fn case(&self, name: &str) -> Option<&TestCase> {
        self.cases.iter().find(|c| c.file == name)
    }

    /// Restrict to the named cases, keeping declaration order.
    /// An empty selection keeps every case.
    pub fn select(&self, names: &[String]) -> Result<Suite, UnknownCase> {
        if names.is_empty() {
            return Ok(self.clone());
        }

        if let Some(unknown) = names.iter().find(|n| self.case(n).is_none()) {
            return Err(UnknownCase(unknown.clone()));
        }

        let cases = self
            .cases
            .iter()
            .filter(|c| names.contains(&c.file))
            .cloned()
            .collect();

        Ok(self.clone().with_cases(cases))
    }
}

/// Get the fixtures directory path.
///
/// By default, looks for `fixtures/` relative to the workspace root.
pub fn fixtures_dir() -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let path = Path::new(&manifest_dir);

    // Crate directories sit directly under the workspace root
    if path.ends_with("seqket-conformance") || path.ends_with("seqket-cli") {
        path.parent().unwrap_or(path).join("fixtures")
    } else {
        path.join("fixtures")
    }
}

/// Path of the built-in suite manifest.
pub fn default_suite_path() -> PathBuf {
    fixtures_dir().join(BUILTIN_SUITE_DIR).join(SUITE_FILE)
}

/// Load a suite from a manifest file.
///
/// A directory path is treated as `<dir>/suite.json`.
pub fn load_suite(path: &Path) -> Result<Suite, LoadError> {
    let manifest_path = if path.is_dir() {
        path.join(SUITE_FILE)
    } else {
        path.to_path_buf()
    };

    if !manifest_path.exists() {
        return Err(LoadError::NotFound(manifest_path));
    }

    let content = std::fs::read_to_string(&manifest_path).map_err(|e| LoadError::ReadError {
        path: manifest_path.display().to_string(),
        source: e,
    })?;

    let base_dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    parse_suite(&content, base_dir, &manifest_path)
}

/// Parse manifest text, resolving relative directories against `base_dir`.
pub fn parse_suite(content: &str, base_dir: &Path, origin: &Path) -> Result<Suite, LoadError> {
    let origin_str = origin.display().to_string();

    let manifest: SuiteManifest =
        serde_json::from_str(content).map_err(|e| LoadError::JsonError {
            path: origin_str.clone(),
            source: e,
        })?;

    validate_cases(&manifest.cases, &origin_str)?;

    Ok(Suite {
        name: manifest.name,
        molecules_dir: base_dir.join(manifest.molecules_dir),
        ref_dir: base_dir.join(manifest.ref_dir),
        options: manifest.options,
        converter: manifest.converter,
        cases: manifest.cases,
    })
}

fn validate_cases(cases: &[TestCase], origin: &str) -> Result<(), LoadError> {
    if cases.is_empty() {
        return Err(LoadError::NoCases(origin.to_string()));
    }

    let mut seen = HashSet::new();
    for case in cases {
        if case.file.trim().is_empty() {
            return Err(LoadError::EmptyCaseName(origin.to_string()));
        }
        if !seen.insert(case.file.as_str()) {
            return Err(LoadError::DuplicateCase {
                case: case.file.clone(),
                path: origin.to_string(),
            });
        }
    }

    Ok(())
}
