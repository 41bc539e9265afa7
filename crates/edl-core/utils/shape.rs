//! Input-shape polymorphism for timecode and matchback functions
//!
//! Public arithmetic functions accept a value in one of several shapes: a
//! single scalar, a block of newline-separated text, or a nested ordered
//! sequence of either. [`map_shape`] applies one scalar operation across any
//! of these shapes and mirrors the input shape in its output.
//!
//! Failure handling depends on where the value sits:
//!
//! - a top-level scalar propagates its error to the caller
//! - every element of a sequence is mapped independently and a failure is
//!   stored in place as [`Shaped::Failed`]
//! - every line of a text block is mapped independently and a failure is
//!   written into that line as the error's display text
//!
//! # Example
//!
//! ```rust
//! use edl_core::utils::shape::{map_shape, Shape, Shaped};
//!
//! let input: Shape<String> = Shape::from("12\nfoo\n\n3");
//! let doubled = map_shape(&input, &|s: &String| {
//!     s.parse::<i64>()
//!         .map(|v| v * 2)
//!         .map_err(|_| edl_core::CoreError::integer_expected(s))
//! })?;
//! assert_eq!(
//!     doubled,
//!     Shaped::Lines("24\nInteger expected: 'foo' given\n\n6".to_string())
//! );
//! # Ok::<(), edl_core::CoreError>(())
//! ```

use core::fmt;

use super::errors::{CoreError, Result};
use crate::timecode::parse_integer;

/// Input value in one of the supported shapes
#[derive(Debug, Clone, PartialEq)]
pub enum Shape<T> {
    /// Empty cell, passed through untouched
    Empty,
    /// Single value
    Scalar(T),
    /// Newline-separated text, one value per line
    Lines(String),
    /// Ordered sequence of nested shapes
    Sequence(Vec<Shape<T>>),
}

/// Output of [`map_shape`], mirroring the input [`Shape`]
#[derive(Debug, Clone, PartialEq)]
pub enum Shaped<U> {
    /// Empty input cell
    Empty,
    /// Mapped scalar
    Scalar(U),
    /// Mapped text block, failures rendered in place
    Lines(String),
    /// Mapped sequence
    Sequence(Vec<Shaped<U>>),
    /// Contained failure of one sequence element
    Failed(CoreError),
}

/// Conversion of one text line into a scalar input value
pub trait FromLine: Sized {
    /// Parse a single, non-empty line
    ///
    /// # Errors
    ///
    /// Returns the same error the scalar operation would raise for
    /// malformed input.
    fn from_line(line: &str) -> Result<Self>;
}

impl FromLine for String {
    fn from_line(line: &str) -> Result<Self> {
        Ok(line.to_string())
    }
}

impl FromLine for i64 {
    fn from_line(line: &str) -> Result<Self> {
        parse_integer(line)
    }
}

impl FromLine for f64 {
    fn from_line(line: &str) -> Result<Self> {
        parse_integer(line).map(|value| value as Self)
    }
}

/// Apply `op` to every scalar of `input`, preserving its shape
///
/// # Errors
///
/// Only a top-level [`Shape::Scalar`] propagates the failure of `op`.
/// Sequence elements and text lines contain their failures in the output.
pub fn map_shape<T, U, F>(input: &Shape<T>, op: &F) -> Result<Shaped<U>>
where
    T: FromLine,
    U: fmt::Display,
    F: Fn(&T) -> Result<U>,
{
    match input {
        Shape::Empty => Ok(Shaped::Empty),
        Shape::Scalar(value) => op(value).map(Shaped::Scalar),
        Shape::Lines(text) => Ok(Shaped::Lines(map_lines(text, op))),
        Shape::Sequence(items) => Ok(Shaped::Sequence(
            items
                .iter()
                .map(|item| map_shape(item, op).unwrap_or_else(Shaped::Failed))
                .collect(),
        )),
    }
}

/// Map every line of `text`, keeping empty lines empty
fn map_lines<T, U, F>(text: &str, op: &F) -> String
where
    T: FromLine,
    U: fmt::Display,
    F: Fn(&T) -> Result<U>,
{
    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                return String::new();
            }
            match T::from_line(line).and_then(|value| op(&value)) {
                Ok(mapped) => mapped.to_string(),
                Err(err) => err.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl From<&str> for Shape<String> {
    fn from(text: &str) -> Self {
        if text.is_empty() {
            Self::Empty
        } else if text.contains('\n') {
            Self::Lines(text.to_string())
        } else {
            Self::Scalar(text.to_string())
        }
    }
}

impl From<f64> for Shape<f64> {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

impl From<i64> for Shape<f64> {
    fn from(value: i64) -> Self {
        Self::Scalar(value as f64)
    }
}

impl<T, S> From<Vec<S>> for Shape<T>
where
    S: Into<Self>,
{
    fn from(items: Vec<S>) -> Self {
        Self::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl<T> Shape<T> {
    /// Build a text-block input from newline-separated lines
    pub fn lines<S: Into<String>>(text: S) -> Self {
        Self::Lines(text.into())
    }
}

impl<U: fmt::Display> Shaped<U> {
    /// Scalar value, if this output is a successful scalar
    pub const fn as_scalar(&self) -> Option<&U> {
        match self {
            Self::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// Render as text: scalars and lines as-is, sequences one item per line
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Scalar(value) => value.to_string(),
            Self::Lines(text) => text.clone(),
            Self::Failed(err) => err.to_string(),
            Self::Sequence(items) => items
                .iter()
                .map(Self::render)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}
