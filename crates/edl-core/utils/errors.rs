//! Core error type for EDL operations
//!
//! Provides the closed `CoreError` enum shared by every module in the crate.
//! Each variant carries a human-readable message; the rendered `Display`
//! text is also what contained per-element failures turn into when a
//! sequence or multi-line input is mapped (see [`crate::utils::shape`]).
//!
//! # Examples
//!
//! ```rust
//! use edl_core::utils::errors::{CoreError, ErrorKind};
//!
//! let err = CoreError::invalid_timecode("Illegal \"25\" found in TC");
//! assert_eq!(err.kind(), ErrorKind::InvalidTimecode);
//! assert_eq!(err.to_string(), "Invalid timecode: Illegal \"25\" found in TC");
//! ```

use core::fmt;

use thiserror::Error;

/// Maximum rendered length of an offending input before it gets shortened
const SHORTEN_THRESHOLD: usize = 12;

/// Main error type for EDL core operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Frame rate is missing, non-positive or fractional
    InvalidFps(String),

    /// Timecode text does not follow the `HH:MM:SS:FF` grammar or bounds
    InvalidTimecode(String),

    /// EDL structure is malformed or fails validation
    InvalidEdl(String),

    /// A matchback query has no answer in the EDL
    NotFoundInEdl(String),

    /// A whole number was required
    IntegerExpected(String),

    /// Requested mode is not available
    NotImplemented(String),
}

/// Tag identifying a [`CoreError`] variant without its message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    /// See [`CoreError::InvalidFps`]
    InvalidFps,
    /// See [`CoreError::InvalidTimecode`]
    InvalidTimecode,
    /// See [`CoreError::InvalidEdl`]
    InvalidEdl,
    /// See [`CoreError::NotFoundInEdl`]
    NotFoundInEdl,
    /// See [`CoreError::IntegerExpected`]
    IntegerExpected,
    /// See [`CoreError::NotImplemented`]
    NotImplemented,
}

impl CoreError {
    /// Create frame rate error from message
    pub fn invalid_fps<T: fmt::Display>(message: T) -> Self {
        Self::InvalidFps(message.to_string())
    }

    /// Create timecode error from message
    pub fn invalid_timecode<T: fmt::Display>(message: T) -> Self {
        Self::InvalidTimecode(message.to_string())
    }

    /// Create EDL structure error from message
    pub fn invalid_edl<T: fmt::Display>(message: T) -> Self {
        Self::InvalidEdl(message.to_string())
    }

    /// Create matchback miss from message
    pub fn not_found<T: fmt::Display>(message: T) -> Self {
        Self::NotFoundInEdl(message.to_string())
    }

    /// Create integer error citing the offending input
    ///
    /// Long inputs are shortened so the message stays readable when it is
    /// written back into a spreadsheet-like cell.
    pub fn integer_expected(input: &str) -> Self {
        Self::IntegerExpected(format!("'{}' given", shorten(input)))
    }

    /// Create not-implemented error from message
    pub fn not_implemented<T: fmt::Display>(message: T) -> Self {
        Self::NotImplemented(message.to_string())
    }

    /// Variant tag of this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidFps(_) => ErrorKind::InvalidFps,
            Self::InvalidTimecode(_) => ErrorKind::InvalidTimecode,
            Self::InvalidEdl(_) => ErrorKind::InvalidEdl,
            Self::NotFoundInEdl(_) => ErrorKind::NotFoundInEdl,
            Self::IntegerExpected(_) => ErrorKind::IntegerExpected,
            Self::NotImplemented(_) => ErrorKind::NotImplemented,
        }
    }

    /// Message carried by the error, without the kind label
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidFps(msg)
            | Self::InvalidTimecode(msg)
            | Self::InvalidEdl(msg)
            | Self::NotFoundInEdl(msg)
            | Self::IntegerExpected(msg)
            | Self::NotImplemented(msg) => msg,
        }
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFps(msg) => write!(f, "Invalid fps: {msg}"),
            Self::InvalidTimecode(msg) => write!(f, "Invalid timecode: {msg}"),
            Self::InvalidEdl(msg) => write!(f, "Invalid EDL: {msg}"),
            Self::NotFoundInEdl(msg) => write!(f, "Not found in EDL: {msg}"),
            Self::IntegerExpected(msg) => write!(f, "Integer expected: {msg}"),
            Self::NotImplemented(msg) => write!(f, "Not implemented: {msg}"),
        }
    }
}

/// Shorten long offending input to `first5 [...] last5`
#[must_use]
pub fn shorten(input: &str) -> String {
    let count = input.chars().count();
    if count <= SHORTEN_THRESHOLD {
        return input.to_string();
    }

    let head: String = input.chars().take(5).collect();
    let tail: String = input.chars().skip(count - 5).collect();
    format!("{head} [...] {tail}")
}

/// Result type alias for convenience
pub type Result<T> = core::result::Result<T, CoreError>;
