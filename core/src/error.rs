use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("external reference not found: {0}")]
    ReferenceNotFound(String),
}

impl ResolveError {
    /// The reference (or reference path) that could not be resolved.
    pub fn reference(&self) -> &str {
        match self {
            ResolveError::ReferenceNotFound(reference) => reference,
        }
    }
}

pub type ResolveResult<T> = Result<T, ResolveError>;

/// A file that could not be read as text.
///
/// Only ever logged: the resolver treats it as a file without lines.
#[derive(Debug, Error)]
pub enum UnreadableFile {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path} is not valid UTF-8 (first invalid byte at offset {offset})")]
    Decode { path: PathBuf, offset: usize },
}
