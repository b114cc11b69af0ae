// src/listfile/expand.rs

//! Effective environment and `$NAME` expansion
//!
//! List files read variables with `$NAME`, `${NAME}` or `$(NAME)` and set
//! defaults with `$NAME=value` lines. Both go through an [`Environment`]
//! snapshot instead of the process environment, so a parse never changes
//! global state and values given on the command line always win.

use std::collections::BTreeMap;

/// Characters that end an unbracketed variable name
const NAME_TERMINATORS: &[char] = &['/', ' ', '\t', '-'];

/// Variables visible to a list file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// An environment with no variables
    pub fn empty() -> Self {
        Self::default()
    }

    /// Snapshot the process environment
    pub fn from_os() -> Self {
        Self {
            vars: std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Whether the variable exists at all (`%ifdef`)
    pub fn is_defined(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Whether the variable exists and is not empty (`%if`)
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.is_empty())
    }

    /// Set a variable unconditionally
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Set a variable only if it is not already defined
    ///
    /// Returns whether the value was stored.
    pub fn set_default(&mut self, name: &str, value: impl Into<String>) -> bool {
        if self.vars.contains_key(name) {
            return false;
        }
        self.vars.insert(name.to_string(), value.into());
        true
    }

    /// Apply a `NAME=value` assignment, as given on the command line
    pub fn apply_assignment(&mut self, assignment: &str) -> bool {
        match assignment.split_once('=') {
            Some((name, value)) if !name.is_empty() => {
                self.set(name, value);
                true
            }
            _ => false,
        }
    }

    /// Replace every variable reference in `input`
    ///
    /// `$$` produces a literal `$`. Unknown variables expand to nothing. The
    /// substituted values are not expanded again.
    pub fn expand(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        let mut rest = input;

        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];

            if let Some(tail) = after.strip_prefix('$') {
                out.push('$');
                rest = tail;
                continue;
            }

            let (name, tail) = split_reference(after);
            if let Some(value) = self.get(name) {
                out.push_str(value);
            }
            rest = tail;
        }

        out.push_str(rest);
        out
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Split the text after a `$` into the variable name and what follows it
pub(crate) fn split_reference(after: &str) -> (&str, &str) {
    let close = match after.chars().next() {
        Some('{') => Some('}'),
        Some('(') => Some(')'),
        _ => None,
    };

    match close {
        Some(close) => {
            let body = &after[1..];
            match body.find(close) {
                Some(end) => (&body[..end], &body[end + 1..]),
                None => (body, ""),
            }
        }
        None => {
            let end = after.find(NAME_TERMINATORS).unwrap_or(after.len());
            after.split_at(end)
        }
    }
}

/// Parse a `$NAME=value` style assignment line into name and raw value
pub fn parse_assignment(line: &str) -> Option<(&str, &str)> {
    let after = line.strip_prefix('$')?;
    let (name, value) = match after.chars().next() {
        Some('{') => {
            let (name, rest) = after[1..].split_once('}')?;
            (name, rest.strip_prefix('=')?)
        }
        Some('(') => {
            let (name, rest) = after[1..].split_once(')')?;
            (name, rest.strip_prefix('=')?)
        }
        _ => after.split_once('=')?,
    };

    if name.is_empty() || name.contains(char::is_whitespace) {
        return None;
    }
    Some((name, value))
}
