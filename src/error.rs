// src/error.rs

//! Crate-wide error type
//!
//! Only conditions that abort a parse are errors. Everything the list-file
//! interpreter can recover from is reported as a
//! [`Diagnostic`](crate::listfile::Diagnostic) instead.

use std::path::PathBuf;
use thiserror::Error;

/// Maximum number of list files open at once (primary file plus includes)
pub const MAX_INCLUDE_DEPTH: usize = 10;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unable to open list file \"{}\": {source}", .path.display())]
    ListFileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Include depth of {depth} exceeded while including \"{}\"", .path.display())]
    IncludeDepthExceeded { path: PathBuf, depth: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid distribution: {0}")]
    Validation(String),

    #[error("Product names can only contain letters and numbers: \"{0}\"")]
    InvalidProductName(String),

    #[error("Unknown package format \"{0}\"")]
    UnknownFormat(String),
}

pub type Result<T> = std::result::Result<T, Error>;
