//! Filesystem abstraction for seqket.
//!
//! This crate provides:
//! - Filesystem trait for reading reference documents and atomic writes
//! - RealFilesystem backed by `std::fs`
//! - MockFilesystem for in-memory tests

pub mod filesystem;

pub use filesystem::{Filesystem, FsError, MockFilesystem, RealFilesystem};
