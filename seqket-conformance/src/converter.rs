//! Boundary to the external FASTA loader.
//!
//! The harness never parses FASTA or KET itself. A [`SequenceLoader`] turns an
//! input file into an opaque [`MoleculeHandle`], which serializes to KET text.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::types::SequenceType;

/// Errors from the conversion capability.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    #[error("loader rejected {path}: {message}")]
    Rejected { path: PathBuf, message: String },

    #[error("failed to start converter {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("converter produced invalid output for {path}: {message}")]
    InvalidOutput { path: PathBuf, message: String },
}

/// Loader options passed explicitly into every load call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderOptions {
    pub ignore_stereochemistry_errors: bool,
    pub json_saving_pretty: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            ignore_stereochemistry_errors: true,
            json_saving_pretty: true,
        }
    }
}

impl LoaderOptions {
    /// Builder: set ignore_stereochemistry_errors.
    pub fn with_ignore_stereochemistry_errors(mut self, ignore: bool) -> Self {
        self.ignore_stereochemistry_errors = ignore;
        self
    }

    /// Builder: set json_saving_pretty.
    pub fn with_json_saving_pretty(mut self, pretty: bool) -> Self {
        self.json_saving_pretty = pretty;
        self
    }
}

/// A loaded molecule or sequence, opaque to the harness.
pub trait MoleculeHandle {
    /// Serialize to KET text. Deterministic for a given handle and flag.
    fn serialize_to_text(&self, pretty: bool) -> Result<String, ConversionError>;
}

/// Loads FASTA files into molecule handles.
pub trait SequenceLoader {
    type Molecule: MoleculeHandle;

    fn load_fasta_from_file(
        &self,
        path: &Path,
        seq_type: SequenceType,
        options: &LoaderOptions,
    ) -> Result<Self::Molecule, ConversionError>;
}

/// Load `path` and serialize it with the pretty flag from `options`.
pub fn convert_fasta_to_ket<L: SequenceLoader + ?Sized>(
    loader: &L,
    path: &Path,
    seq_type: SequenceType,
    options: &LoaderOptions,
) -> Result<String, ConversionError> {
    let molecule = loader.load_fasta_from_file(path, seq_type, options)?;
    molecule.serialize_to_text(options.json_saving_pretty)
}

// ===========================================
// External converter process
// ===========================================

/// External converter program and its argument templates.
///
/// Placeholders substituted in each argument: `{input}`, `{seq_type}`,
/// `{pretty}` and `{ignore_stereo}` (the last two as `true`/`false`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ConverterCommand {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
        }
    }

    /// Builder: append an argument template.
    pub fn with_arg(mut self, arg: &str) -> Self {
        self.args.push(arg.to_string());
        self
    }

    /// Arguments with placeholders filled in.
    pub fn render_args(
        &self,
        input: &Path,
        seq_type: SequenceType,
        pretty: bool,
        ignore_stereo: bool,
    ) -> Vec<String> {
        let input = input.display().to_string();
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{input}", &input)
                    .replace("{seq_type}", seq_type.as_str())
                    .replace("{pretty}", bool_str(pretty))
                    .replace("{ignore_stereo}", bool_str(ignore_stereo))
            })
            .collect()
    }
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Loader that shells out to an external converter; stdout is the KET text.
#[derive(Debug, Clone)]
pub struct CommandLoader {
    command: ConverterCommand,
}

impl CommandLoader {
    pub fn new(command: ConverterCommand) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &ConverterCommand {
        &self.command
    }

    fn invoke(
        &self,
        path: &Path,
        seq_type: SequenceType,
        pretty: bool,
        ignore_stereo: bool,
    ) -> Result<String, ConversionError> {
        let args = self.command.render_args(path, seq_type, pretty, ignore_stereo);
        let output = Command::new(&self.command.program)
            .args(&args)
            .output()
            .map_err(|e| ConversionError::Spawn {
                program: self.command.program.clone(),
                source: e,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("converter exited with {}", output.status)
            } else {
                stderr
            };
            return Err(ConversionError::Rejected {
                path: path.to_path_buf(),
                message,
            });
        }

        String::from_utf8(output.stdout).map_err(|e| ConversionError::InvalidOutput {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

impl SequenceLoader for CommandLoader {
    type Molecule = ExternalMolecule;

    fn load_fasta_from_file(
        &self,
        path: &Path,
        seq_type: SequenceType,
        options: &LoaderOptions,
    ) -> Result<ExternalMolecule, ConversionError> {
        if !path.is_file() {
            return Err(ConversionError::MissingInput(path.to_path_buf()));
        }

        // Loading runs the converter once so rejections surface here
        let text = self.invoke(
            path,
            seq_type,
            options.json_saving_pretty,
            options.ignore_stereochemistry_errors,
        )?;

        let molecule = ExternalMolecule {
            loader: self.clone(),
            path: path.to_path_buf(),
            seq_type,
            ignore_stereo: options.ignore_stereochemistry_errors,
            rendered: RefCell::new(HashMap::new()),
        };
        molecule
            .rendered
            .borrow_mut()
            .insert(options.json_saving_pretty, text);
        Ok(molecule)
    }
}

/// Handle to a document produced by the external converter.
///
/// Each serialization is cached per pretty flag; asking for a flag not yet
/// rendered runs the converter again.
#[derive(Debug)]
pub struct ExternalMolecule {
    loader: CommandLoader,
    path: PathBuf,
    seq_type: SequenceType,
    ignore_stereo: bool,
    rendered: RefCell<HashMap<bool, String>>,
}

impl MoleculeHandle for ExternalMolecule {
    fn serialize_to_text(&self, pretty: bool) -> Result<String, ConversionError> {
        if let Some(text) = self.rendered.borrow().get(&pretty) {
            return Ok(text.clone());
        }
        let text = self
            .loader
            .invoke(&self.path, self.seq_type, pretty, self.ignore_stereo)?;
        self.rendered.borrow_mut().insert(pretty, text.clone());
        Ok(text)
    }
}

// ===========================================
// In-memory loader for tests
// ===========================================

/// A captured load call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadCall {
    pub path: PathBuf,
    pub seq_type: SequenceType,
    pub options: LoaderOptions,
}

/// Mock loader serving canned KET documents by input path.
/// Cloning creates a new handle to the same underlying data.
#[derive(Debug, Clone, Default)]
pub struct MockLoader {
    documents: Arc<RwLock<HashMap<PathBuf, String>>>,
    rejected: Arc<RwLock<HashSet<PathBuf>>>,
    calls: Arc<RwLock<Vec<LoadCall>>>,
}

impl MockLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the KET text produced for an input path.
    pub fn add_document(&self, path: impl Into<PathBuf>, ket: &str) {
        self.documents
            .write()
            .unwrap()
            .insert(path.into(), ket.to_string());
    }

    /// Make the loader reject an input path as malformed.
    pub fn reject(&self, path: impl Into<PathBuf>) {
        self.rejected.write().unwrap().insert(path.into());
    }

    /// All load calls in order.
    pub fn calls(&self) -> Vec<LoadCall> {
        self.calls.read().unwrap().clone()
    }
}

/// Molecule served by [`MockLoader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockMolecule {
    pub ket: String,
}

impl MoleculeHandle for MockMolecule {
    fn serialize_to_text(&self, _pretty: bool) -> Result<String, ConversionError> {
        Ok(self.ket.clone())
    }
}

impl SequenceLoader for MockLoader {
    type Molecule = MockMolecule;

    fn load_fasta_from_file(
        &self,
        path: &Path,
        seq_type: SequenceType,
        options: &LoaderOptions,
    ) -> Result<MockMolecule, ConversionError> {
        self.calls.write().unwrap().push(LoadCall {
            path: path.to_path_buf(),
            seq_type,
            options: *options,
        });

        if self.rejected.read().unwrap().contains(path) {
            return Err(ConversionError::Rejected {
                path: path.to_path_buf(),
                message: format!("malformed {} sequence", seq_type),
            });
        }

        match self.documents.read().unwrap().get(path) {
            Some(ket) => Ok(MockMolecule { ket: ket.clone() }),
            None => Err(ConversionError::MissingInput(path.to_path_buf())),
        }
    }
}
