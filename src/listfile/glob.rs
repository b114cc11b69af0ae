// src/listfile/glob.rs

//! Wildcard matching for file-entry source names
//!
//! Supports:
//! - `*` - zero or more characters
//! - `?` - exactly one character
//! - `[set]` - one character from a set of members and `a-z` style ranges
//!
//! Matching is plain backtracking: a `*` tries every suffix of the remaining
//! candidate. An empty or unterminated bracket never matches.

/// Characters that make a source name a wildcard pattern
pub const GLOB_CHARS: &[char] = &['*', '?', '['];

/// Whether `s` contains any wildcard character
pub fn is_pattern(s: &str) -> bool {
    s.contains(GLOB_CHARS)
}

/// Match `candidate` against `pattern`
pub fn matches(candidate: &str, pattern: &str) -> bool {
    let candidate: Vec<char> = candidate.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    match_from(&candidate, &pattern)
}

fn match_from(s: &[char], p: &[char]) -> bool {
    match p.first() {
        None => s.is_empty(),
        Some('*') => (0..=s.len()).any(|i| match_from(&s[i..], &p[1..])),
        Some('?') => !s.is_empty() && match_from(&s[1..], &p[1..]),
        Some('[') => {
            let Some((&c, rest)) = s.split_first() else {
                return false;
            };
            match bracket(&p[1..], c) {
                Some((true, after)) => match_from(rest, after),
                _ => false,
            }
        }
        Some(&c) => s.first() == Some(&c) && match_from(&s[1..], &p[1..]),
    }
}

/// Test `c` against the set that starts at `p` (just past the `[`)
///
/// Returns whether `c` is a member and the pattern after the closing `]`,
/// or `None` when the set is empty or never closed.
fn bracket(p: &[char], c: char) -> Option<(bool, &[char])> {
    let close = p.iter().position(|&ch| ch == ']')?;
    if close == 0 {
        return None;
    }

    let set = &p[..close];
    let mut member = false;
    let mut i = 0;
    while i < set.len() {
        if i + 2 < set.len() && set[i + 1] == '-' {
            if set[i] <= c && c <= set[i + 2] {
                member = true;
            }
            i += 3;
        } else {
            if set[i] == c {
                member = true;
            }
            i += 1;
        }
    }

    Some((member, &p[close + 1..]))
}
