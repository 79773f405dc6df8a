//! Error types for the indexing and linking engine.

use crate::types::{CompositeSymbolId, FileId};
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the public engine API.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("no extractor registered for '{path}' (extension {extension:?})")]
    NoExtractor { path: PathBuf, extension: Option<String> },

    #[error("parser produced no tree for '{path}': {reason}")]
    ParseFailure { path: PathBuf, reason: String },

    #[error("symbol {id} not found")]
    SymbolNotFound { id: CompositeSymbolId },

    #[error("file {id} has no symbol table")]
    FileNotFound { id: FileId },

    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {reason}")]
    Config { reason: String },
}

pub type IndexResult<T> = Result<T, IndexError>;

/// A resolver-local error, attached to a [`crate::resolution::ModuleResolution`]
/// rather than aborting the caller — see §7 propagation policy.
#[derive(Error, Debug, Clone)]
pub enum ResolutionError {
    #[error("I/O error while resolving '{path}': {reason}")]
    Io { path: PathBuf, reason: String },

    #[error("invalid import request '{request}': {reason}")]
    InvalidRequest { request: String, reason: String },
}
