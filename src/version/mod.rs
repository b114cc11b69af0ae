// src/version/mod.rs

//! Version number encoding for dependency range checks
//!
//! List files carry free-form version strings (`1.2.3`, `2.0b4`, `1.0pre2`,
//! `3.1p1`). Dependency ranges are compared on a single integer derived from
//! the string, so the encoding has to be monotonic in the way packagers
//! expect:
//!
//! ```text
//! 1.0a < 1.0b < 1.0pre < 1.0 < 1.0p1
//! ```
//!
//! Up to four numeric fields (`major.minor.patch.build`) are packed base 100
//! and a suffix offset is added:
//!
//! | Suffix      | Offset |
//! |-------------|--------|
//! | `pre`       | -20    |
//! | `p`, `-`    | 0      |
//! | `b`         | -50    |
//! | other alpha | -100   |
//!
//! Any suffix jumps straight to the build field, so `1.0p1` encodes the `1`
//! as the build number.

/// Lower bound version string used when a dependency gives no lower bound
pub const MIN_VERSION: &str = "0.0";

/// Upper bound version string used when a dependency gives no upper bound
pub const MAX_VERSION: &str = "999.99.99p99";

/// Upper bound version number for open-ended dependency ranges
pub const MAX_VERSION_NUMBER: i64 = i64::MAX;

/// Number of packed numeric fields
const FIELDS: usize = 4;

/// Index of the build field that every suffix jumps to
const BUILD_FIELD: usize = FIELDS - 1;

const PRE_OFFSET: i64 = -20;
const BETA_OFFSET: i64 = -50;
const ALPHA_OFFSET: i64 = -100;

/// Convert a version string into a comparable integer
pub fn version_to_number(version: &str) -> i64 {
    let chars: Vec<char> = version.chars().collect();
    let mut fields = [0i64; FIELDS];
    let mut index = 0;
    let mut offset = 0;
    let mut pos = 0;

    while pos < chars.len() && index < FIELDS {
        let c = chars[pos];

        if let Some(digit) = c.to_digit(10) {
            fields[index] = fields[index]
                .saturating_mul(10)
                .saturating_add(i64::from(digit));
        } else if c == 'p' || c == '-' {
            if c == 'p' && chars.get(pos + 1) == Some(&'r') && chars.get(pos + 2) == Some(&'e') {
                offset = PRE_OFFSET;
                pos += 2;
            } else {
                offset = 0;
            }
            index = BUILD_FIELD;
        } else if c == 'b' {
            offset = BETA_OFFSET;
            index = BUILD_FIELD;
        } else if c.is_alphabetic() {
            offset = ALPHA_OFFSET;
            index = BUILD_FIELD;
        } else {
            // '.' and any other separator close the current field
            index += 1;
        }

        pos += 1;
    }

    let packed = fields
        .iter()
        .fold(0i64, |acc, field| acc.saturating_mul(100).saturating_add(*field));

    packed.saturating_add(offset)
}
