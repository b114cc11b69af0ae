// src/listfile/depend.rs

//! Dependency line parsing
//!
//! `%requires`, `%incompat`, `%replaces` and `%provides` take
//!
//! ```text
//! <product> [[op]<version> [<number>] [[op]<version> [<number>]]]
//! ```
//!
//! The first version is the lower bound and the second the upper bound. A
//! `<` in front of the first version makes it an upper bound instead, with
//! an implicit lower bound of `0.0`. A bare integer after a version is its
//! literal version number; otherwise the number is derived from the string.

use crate::dist::{Dependency, DependencyType};
use crate::version::{version_to_number, MAX_VERSION, MAX_VERSION_NUMBER, MIN_VERSION};

fn is_operator(c: char) -> bool {
    matches!(c, '<' | '>' | '=')
}

fn is_number(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// Parse the value of a dependency directive
///
/// Returns `None` when the line has no product name.
pub fn parse_dependency(dep_type: DependencyType, spec: &str) -> Option<Dependency> {
    let mut tokens = spec.split_whitespace().peekable();
    let product = tokens.next()?;

    let mut bounds: Vec<(String, i64)> = Vec::with_capacity(2);
    let mut upper_only = false;

    while bounds.len() < 2 {
        let Some(token) = tokens.next() else {
            break;
        };

        if bounds.is_empty() && token.starts_with('<') {
            upper_only = true;
        }

        let version = token.trim_start_matches(is_operator);
        if version.is_empty() {
            // operator written apart from its version, e.g. ">= 1.0"
            continue;
        }

        if upper_only && bounds.is_empty() {
            bounds.push((MIN_VERSION.to_string(), 0));
        }

        let number = match tokens.peek() {
            Some(next) if is_number(next) => {
                let literal = next.parse::<i64>().unwrap_or(MAX_VERSION_NUMBER);
                tokens.next();
                literal
            }
            _ => version_to_number(version),
        };

        bounds.push((version.to_string(), number));
    }

    let mut dep = Dependency::any_version(dep_type, product);
    let mut bounds = bounds.into_iter();
    if let Some((version, number)) = bounds.next() {
        dep.version[0] = version;
        dep.vernumber[0] = number;
    }
    if let Some((version, number)) = bounds.next() {
        dep.version[1] = version;
        dep.vernumber[1] = number;
    } else {
        dep.version[1] = MAX_VERSION.to_string();
        dep.vernumber[1] = MAX_VERSION_NUMBER;
    }

    Some(dep)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requires(spec: &str) -> Dependency {
        parse_dependency(DependencyType::Requires, spec).unwrap()
    }

    #[test]
    fn test_no_versions() {
        let dep = requires("foo");
        assert_eq!(dep.product, "foo");
        assert_eq!(dep.vernumber, [0, i64::MAX]);
        assert_eq!(dep.version, ["0.0".to_string(), "999.99.99p99".to_string()]);
    }

    #[test]
    fn test_lower_bound_only() {
        let dep = requires("foo 1.2");
        assert_eq!(dep.version[0], "1.2");
        assert_eq!(dep.vernumber[0], version_to_number("1.2"));
        assert_eq!(dep.version[1], "999.99.99p99");
        assert_eq!(dep.vernumber[1], i64::MAX);
    }

    #[test]
    fn test_full_range() {
        let dep = requires("libbar 1.0 2.0b1");
        assert_eq!(dep.version, ["1.0".to_string(), "2.0b1".to_string()]);
        assert_eq!(dep.vernumber, [version_to_number("1.0"), version_to_number("2.0b1")]);
        assert!(dep.accepts(version_to_number("1.5")));
        assert!(!dep.accepts(version_to_number("2.0")));
    }

    #[test]
    fn test_leading_less_than() {
        let dep = requires("foo <2.0");
        assert_eq!(dep.version, ["0.0".to_string(), "2.0".to_string()]);
        assert_eq!(dep.vernumber, [0, version_to_number("2.0")]);

        let dep = requires("foo < 2.0");
        assert_eq!(dep.version, ["0.0".to_string(), "2.0".to_string()]);
    }

    #[test]
    fn test_operators_are_stripped() {
        let dep = requires("foo >=1.0 <=3.0");
        assert_eq!(dep.version, ["1.0".to_string(), "3.0".to_string()]);

        let dep = requires("foo >= 1.0");
        assert_eq!(dep.version[0], "1.0");
        assert!(dep.is_open_ended());
    }

    #[test]
    fn test_literal_numbers() {
        let dep = requires("foo 1.0 100 2.0 200");
        assert_eq!(dep.vernumber, [100, 200]);
        assert_eq!(dep.version, ["1.0".to_string(), "2.0".to_string()]);
    }

    #[test]
    fn test_literal_number_on_lower_bound_only() {
        let dep = requires("foo 3.1 310");
        assert_eq!(dep.vernumber, [310, i64::MAX]);
    }

    #[test]
    fn test_missing_product() {
        assert!(parse_dependency(DependencyType::Provides, "   ").is_none());
    }

    #[test]
    fn test_dependency_type_kept() {
        let dep = parse_dependency(DependencyType::Replaces, "oldfoo").unwrap();
        assert_eq!(dep.dep_type, DependencyType::Replaces);
        assert!(dep.subpackage.is_none());
    }
}
