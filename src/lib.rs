// src/lib.rs

//! Packlist
//!
//! Reads EPM-style list files into a normalized software distribution model
//! that package generators consume.
//!
//! # Architecture
//!
//! - [`listfile`]: the interpreter (conditionals, variables, includes, directives)
//! - [`dist`]: the distribution model and its canonical ordering
//! - [`version`]: version string to sortable number codec
//! - [`platform`]: target platform and package format descriptors

pub mod dist;
mod error;
pub mod listfile;
pub mod platform;
pub mod version;

pub use dist::{
    Command, CommandType, Dependency, DependencyType, Description, Distribution, File, FileKind,
    FileType,
};
pub use error::{Error, Result, MAX_INCLUDE_DEPTH};
pub use listfile::{parse, parse_str, parse_with_options, Diagnostic, Environment, ParseOptions, ParseOutput};
pub use platform::{PackageFormat, Platform};
pub use version::version_to_number;
