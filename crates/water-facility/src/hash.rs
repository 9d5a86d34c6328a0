//! Content hash suffix.
//!
//! The five identifying values are normalized, joined with `|` and digested
//! with SHA-256. The first three bytes of the digest, in uppercase hex, form
//! the suffix. That is 24 bits: enough to tell facilities in one
//! county/district/type bucket apart, small enough that collisions happen.

use sha2::{Digest, Sha256};
use std::fmt::Write;

/// Separator between normalized values in the hashed string.
pub const HASH_SEPARATOR: &str = "|";

/// Number of digest bytes kept in the suffix.
pub const SUFFIX_BYTES: usize = 3;

/// Lowercases, trims and collapses inner whitespace runs to one space.
///
/// Trimming drops every leading and trailing character up to and including
/// U+0020, control characters among them. Only ASCII whitespace (with vertical
/// tab) counts as a run separator, so a no-break space stays part of the name.
pub fn normalize(value: &str) -> String {
    let lowered = value.to_lowercase();
    let trimmed = lowered.trim_matches(|c: char| c <= ' ');

    let mut out = String::with_capacity(trimmed.len());
    let mut in_run = false;
    for c in trimmed.chars() {
        if is_run_space(c) {
            if !in_run {
                out.push(' ');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

fn is_run_space(c: char) -> bool {
    c.is_ascii_whitespace() || c == '\u{0B}'
}

/// The string that gets digested, in the order the values are given.
pub fn canonical_string(values: &[&str]) -> String {
    values
        .iter()
        .map(|v| normalize(v))
        .collect::<Vec<_>>()
        .join(HASH_SEPARATOR)
}

/// Six uppercase hex characters derived from `values`.
pub fn hash_suffix(values: &[&str]) -> String {
    let digest = Sha256::digest(canonical_string(values).as_bytes());
    let mut out = String::with_capacity(SUFFIX_BYTES * 2);
    for byte in &digest[..SUFFIX_BYTES] {
        let _ = write!(out, "{byte:02X}");
    }
    out
}
