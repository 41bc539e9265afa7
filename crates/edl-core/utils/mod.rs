//! Shared utilities for EDL processing
//!
//! Holds the crate-wide error type, the input-shape combinator used by the
//! public arithmetic functions and a few lenient text helpers that the
//! tokenizer and model builder share.

pub mod errors;
pub mod shape;

pub use errors::{CoreError, ErrorKind, Result};
pub use shape::{map_shape, FromLine, Shape, Shaped};

/// Parse the leading integer of `text`, ignoring anything after it
///
/// Leading whitespace and a single sign are accepted. Returns `None` when no
/// digit follows. Event numbers in the wild carry zero padding (`"003"`) and
/// occasionally trailing junk, both of which are tolerated here.
///
/// # Example
///
/// ```rust
/// use edl_core::utils::leading_integer;
///
/// assert_eq!(leading_integer("003"), Some(3));
/// assert_eq!(leading_integer(" -12abc"), Some(-12));
/// assert_eq!(leading_integer("M2"), None);
/// ```
#[must_use]
pub fn leading_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Parse a leading decimal number, ignoring anything after it
///
/// Used for motion speeds such as `-24`, `6.7` or `048.0`.
#[must_use]
pub fn leading_float(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;

    for (idx, ch) in trimmed.char_indices() {
        match ch {
            '+' | '-' if idx == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = idx + ch.len_utf8();
    }

    if !seen_digit {
        return None;
    }
    trimmed[..end].trim_end_matches('.').parse().ok()
}

/// Round to the nearest integer, halves toward positive infinity
///
/// Matches the rounding EDL tools apply to motion-effect frame math, where
/// `-2.5` rounds to `-2` rather than away from zero.
#[must_use]
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}
