// src/listfile/conditional.rs

//! Conditional line reader
//!
//! Reads physical lines from one list-file stream and hands back the
//! logical lines that survive conditional filtering. Comments and blank
//! lines are dropped. The filtering directives are consumed here and never
//! reach the dispatcher:
//!
//! - `%system`, `%format`, `%arch` select a target platform, package format
//!   or CPU architecture. They stay in effect until the next directive of
//!   the same kind.
//! - `%if`, `%ifdef`, `%elseif`, `%elseifdef`, `%else`, `%endif` test
//!   variables of the effective environment. Blocks do not nest.
//!
//! The skip state lives in a [`ConditionalState`] owned by the caller, so a
//! `%system` in an included file keeps applying after the include ends.

use super::diag::Diagnostics;
use super::expand::Environment;
use crate::platform::{normalize_machine, normalize_sysname, PackageFormat, Platform};
use bitflags::bitflags;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use tracing::debug;

bitflags! {
    /// Conditional skip state carried across lines and include streams
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ConditionalState: u8 {
        /// Current `%system` filter is false
        const SYSTEM = 0x01;
        /// Current `%format` filter is false
        const FORMAT = 0x02;
        /// Current `%arch` filter is false
        const ARCH = 0x04;
        /// Current `%if` branch is false
        const IF = 0x08;
        /// An `%if` block is open
        const IFACTIVE = 0x10;
        /// A branch of the open `%if` block already matched
        const IFSAT = 0x20;
    }
}

impl ConditionalState {
    /// Whether lines in the current region are dropped
    pub fn is_suppressed(&self) -> bool {
        self.intersects(Self::SYSTEM | Self::FORMAT | Self::ARCH | Self::IF)
    }

    /// Whether an `%if` block is still open
    pub fn in_if_block(&self) -> bool {
        self.contains(Self::IFACTIVE)
    }

    /// Enter a branch whose condition evaluated to `matched`
    fn take_branch(&mut self, matched: bool) {
        if matched {
            self.remove(Self::IF);
            self.insert(Self::IFSAT);
        } else {
            self.insert(Self::IF);
        }
    }
}

/// What conditional directives are evaluated against
#[derive(Debug, Clone, Copy)]
pub struct Target<'a> {
    pub platform: &'a Platform,
    pub format: PackageFormat,
    pub env: &'a Environment,
}

/// A line that passed conditional filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    pub text: String,
    /// 1-based physical line number
    pub line: usize,
}

/// Reads logical lines from one list-file stream
#[derive(Debug)]
pub struct ConditionalReader<R> {
    reader: R,
    path: PathBuf,
    line_no: usize,
    finished: bool,
}

impl<R: BufRead> ConditionalReader<R> {
    pub fn new(reader: R, path: impl Into<PathBuf>) -> Self {
        Self {
            reader,
            path: path.into(),
            line_no: 0,
            finished: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of the last physical line read
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    /// Read the next physical line without any filtering
    ///
    /// Used for inline `<<TERM` blocks. The line terminator is removed.
    pub fn read_raw_line(&mut self) -> io::Result<Option<String>> {
        if self.finished {
            return Ok(None);
        }

        let mut buf = String::new();
        if self.reader.read_line(&mut buf)? == 0 {
            self.finished = true;
            return Ok(None);
        }
        self.line_no += 1;

        if buf.ends_with('\n') {
            buf.pop();
            if buf.ends_with('\r') {
                buf.pop();
            }
        }
        Ok(Some(buf))
    }

    /// Read the next logical line, applying conditional directives
    ///
    /// Returns `None` at the end of the stream, or after an `%else`/`%endif`
    /// with no open block, which ends processing of this stream.
    pub fn next_line(
        &mut self,
        state: &mut ConditionalState,
        target: &Target<'_>,
        diags: &mut Diagnostics,
    ) -> io::Result<Option<LogicalLine>> {
        while let Some(raw) = self.read_raw_line()? {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with('%') && self.apply_directive(line, state, target, diags) {
                if self.finished {
                    return Ok(None);
                }
                continue;
            }

            if state.is_suppressed() {
                continue;
            }

            return Ok(Some(LogicalLine {
                text: line.to_string(),
                line: self.line_no,
            }));
        }

        Ok(None)
    }

    /// Handle a conditional directive; returns false for any other directive
    fn apply_directive(
        &mut self,
        line: &str,
        state: &mut ConditionalState,
        target: &Target<'_>,
        diags: &mut Diagnostics,
    ) -> bool {
        let (directive, spec) = match line.split_once(char::is_whitespace) {
            Some((d, rest)) => (d, rest.trim()),
            None => (line, ""),
        };

        match directive {
            "%system" | "%format" | "%arch" => {
                if spec.is_empty() {
                    self.warn(diags, format!("Missing value for {} ignored", directive));
                    return true;
                }

                let (flag, skip) = match directive {
                    "%system" => (
                        ConditionalState::SYSTEM,
                        filter_skips(spec, |v| system_matches(v, target.platform)),
                    ),
                    "%format" => (
                        ConditionalState::FORMAT,
                        filter_skips(spec, |v| PackageFormat::parse(v) == Some(target.format)),
                    ),
                    _ => (
                        ConditionalState::ARCH,
                        filter_skips(spec, |v| normalize_machine(v) == target.platform.machine),
                    ),
                };
                debug!("{} {} -> skip={}", directive, spec, skip);
                state.set(flag, skip);
                true
            }
            "%if" | "%ifdef" => {
                if state.in_if_block() {
                    self.warn(
                        diags,
                        format!("Nested {} is not supported, ignoring \"{}\"", directive, line),
                    );
                    return true;
                }
                if spec.is_empty() {
                    self.warn(diags, format!("Missing variable names for {}", directive));
                }

                state.insert(ConditionalState::IFACTIVE);
                state.remove(ConditionalState::IFSAT);
                state.take_branch(vars_match(spec, target.env, directive == "%ifdef"));
                true
            }
            "%elseif" | "%elseifdef" => {
                if !state.in_if_block() {
                    self.unmatched(diags, directive);
                    return true;
                }

                if state.contains(ConditionalState::IFSAT) {
                    state.insert(ConditionalState::IF);
                } else {
                    state.take_branch(vars_match(spec, target.env, directive == "%elseifdef"));
                }
                true
            }
            "%else" => {
                if !state.in_if_block() {
                    self.unmatched(diags, directive);
                    return true;
                }

                let satisfied = state.contains(ConditionalState::IFSAT);
                state.take_branch(!satisfied);
                true
            }
            "%endif" => {
                if !state.in_if_block() {
                    self.unmatched(diags, directive);
                    return true;
                }

                state.remove(ConditionalState::IF | ConditionalState::IFACTIVE | ConditionalState::IFSAT);
                true
            }
            _ => false,
        }
    }

    fn unmatched(&mut self, diags: &mut Diagnostics, directive: &str) {
        self.warn(diags, format!("{} without matching %if, skipping rest of file", directive));
        self.finished = true;
    }

    fn warn(&self, diags: &mut Diagnostics, message: String) {
        diags.warn(&self.path, self.line_no, message);
    }
}

/// Evaluate a `%system`/`%format`/`%arch` value list
///
/// Returns true when the following lines should be skipped. A list that
/// starts with a positive identifier skips unless one of them matches; any
/// matching `!identifier` skips.
pub fn filter_skips(spec: &str, matcher: impl Fn(&str) -> bool) -> bool {
    if spec.eq_ignore_ascii_case("all") {
        return false;
    }

    let mut skip = !spec.starts_with('!');
    for token in spec.split_whitespace() {
        match token.strip_prefix('!') {
            Some(value) => skip |= matcher(value),
            None => skip &= !matcher(token),
        }
    }
    skip
}

/// Match an `os[-release]` identifier against the target platform
///
/// The identifier, with its OS name alias-normalized, is a case-insensitive
/// prefix of the target's `os-release` string.
pub fn system_matches(value: &str, platform: &Platform) -> bool {
    let identifier = match value.split_once('-') {
        Some((os, release)) => format!("{}-{}", normalize_sysname(os), release.to_lowercase()),
        None => normalize_sysname(value),
    };
    platform
        .name_and_release()
        .to_lowercase()
        .starts_with(&identifier)
}

/// Evaluate the variable list of an `%if`/`%ifdef`
///
/// True if any name passes the test, where `!name` inverts the test.
fn vars_match(spec: &str, env: &Environment, defined_only: bool) -> bool {
    spec.split_whitespace().any(|token| {
        let (negate, name) = match token.strip_prefix('!') {
            Some(name) => (true, name),
            None => (false, token),
        };
        let present = if defined_only {
            env.is_defined(name)
        } else {
            env.is_set(name)
        };
        present != negate
    })
}
