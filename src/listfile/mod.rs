// src/listfile/mod.rs

//! List-file interpreter
//!
//! A list file describes one software distribution: product metadata,
//! descriptions, lifecycle commands, dependencies and the files to ship.
//! Reading one is layered:
//!
//! - [`conditional`] turns raw lines into logical lines, evaluating
//!   `%system`, `%format`, `%arch` and `%if` blocks
//! - [`expand`] substitutes `$NAME` references from the effective environment
//! - [`parser`] dispatches directives and file entries, following `%include`
//!   chains and expanding wildcard sources
//!
//! Problems that do not prevent reading the file are reported as
//! [`Diagnostic`]s alongside the resulting [`Distribution`](crate::dist::Distribution).

pub mod conditional;
pub mod depend;
pub mod diag;
pub mod expand;
pub mod glob;
pub mod parser;

pub use conditional::{ConditionalReader, ConditionalState, LogicalLine, Target};
pub use depend::parse_dependency;
pub use diag::{Diagnostic, Diagnostics};
pub use expand::{parse_assignment, Environment};
pub use parser::{parse, parse_str, parse_with_options, ParseOptions, ParseOutput};
