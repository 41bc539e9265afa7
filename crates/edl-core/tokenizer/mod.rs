//! Line tokenizer for CMX3600-style EDL text
//!
//! Splits raw EDL text into tagged [`Row`]s. Each physical line is read as a
//! header (`TITLE: ...`), a comment (`* ...`) or a whitespace-separated data
//! row. Dissolve edits written as two cells (`D 024`) are merged back into a
//! single edit-type field so every data row fits the eight-column layout.
//!
//! # Example
//!
//! ```rust
//! use edl_core::tokenizer::{tokenize, Row, TokenizeOptions};
//!
//! let text = "TITLE: demo\nTIME_CODE_MODULUS: 24\n\
//!             001  AX  V  C  01:00:00:00 01:00:01:00 00:00:00:00 00:00:01:00\n";
//! let rows = tokenize(text, &TokenizeOptions::default())?;
//! assert_eq!(rows.len(), 3);
//! assert!(matches!(rows[2], Row::Event(_)));
//! # Ok::<(), edl_core::CoreError>(())
//! ```

pub mod markers;
pub mod row;

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

pub use markers::{parse_resolve_markers, Marker};
pub use row::{rows_from_table, source_tag, MarkerRow, RawEvent, Row, COLUMNS, MARKER_SOURCE};

use crate::timecode::Fps;
use crate::utils::errors::{CoreError, Result};

/// Header key carrying the frame rate
pub const TIME_CODE_MODULUS: &str = "TIME_CODE_MODULUS";

/// Tokenizer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenizeOptions {
    /// Frame rate the caller expects; checked against the header
    pub fps: Option<Fps>,
    /// Keep `*` comment rows instead of dropping them
    pub keep_comments: bool,
}

impl TokenizeOptions {
    /// Set the expected frame rate
    #[must_use]
    pub const fn with_fps(mut self, fps: Fps) -> Self {
        self.fps = Some(fps);
        self
    }

    /// Keep or drop comment rows
    #[must_use]
    pub const fn with_comments(mut self, keep: bool) -> Self {
        self.keep_comments = keep;
        self
    }
}

fn header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\w+):\s*(.*)$")
            .unwrap_or_else(|err| unreachable!("header pattern is valid: {err}"))
    })
}

fn labelled_comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\*\s*(.*:)\s+(.*)")
            .unwrap_or_else(|err| unreachable!("comment pattern is valid: {err}"))
    })
}

/// Split EDL text into rows
///
/// Blank lines are skipped and comment rows are dropped unless
/// `keep_comments` is set. When `fps` is given the first
/// `TIME_CODE_MODULUS:` header must agree with it; if the text has no such
/// header one is inserted as the second row.
///
/// # Errors
///
/// Returns [`CoreError::InvalidEdl`] for a row with more than eight columns
/// and [`CoreError::InvalidFps`] when the header disagrees with `fps`.
pub fn tokenize(text: &str, options: &TokenizeOptions) -> Result<Vec<Row>> {
    let mut rows = Vec::new();
    let mut modulus_found = false;

    for line in split_lines(text.trim()) {
        let tokens = split_line(line.trim());
        if tokens.iter().all(String::is_empty) {
            continue;
        }

        let row = Row::from_tokens(tokens)?;
        match &row {
            Row::Header { key, value } if key == TIME_CODE_MODULUS && !modulus_found => {
                modulus_found = true;
                if let Some(fps) = options.fps {
                    check_modulus(value, fps)?;
                }
            }
            Row::Comment { .. } if !options.keep_comments => continue,
            _ => {}
        }
        rows.push(row);
    }

    if let (false, Some(fps)) = (modulus_found, options.fps) {
        let header = Row::Header {
            key: TIME_CODE_MODULUS.to_string(),
            value: fps.to_string(),
        };
        rows.insert(rows.len().min(1), header);
    }

    debug!(rows = rows.len(), modulus_found, "tokenized EDL text");
    Ok(rows)
}

/// Split on any of the line separators found in the wild
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split("\r\n")
        .flat_map(|chunk| chunk.split("\n\r"))
        .flat_map(|chunk| chunk.split(['\n', '\r']))
}

/// Split one trimmed line into raw tokens
fn split_line(line: &str) -> Vec<String> {
    if let Some(caps) = header_regex().captures(line) {
        return vec![format!("{}:", &caps[1]), caps[2].to_string()];
    }

    if line.starts_with('*') {
        if let Some(caps) = labelled_comment_regex().captures(line) {
            return vec!["*".to_string(), caps[1].to_string(), caps[2].trim().to_string()];
        }
        let text = line.trim_start_matches('*').trim();
        return vec!["*".to_string(), text.to_string()];
    }

    let mut tokens: Vec<String> = line.split_whitespace().map(str::to_string).collect();
    if tokens.len() > 4 && tokens[3] == "D" {
        let duration = tokens.remove(4);
        tokens[3] = format!("D {duration}");
    }
    tokens
}

/// Compare a `TIME_CODE_MODULUS:` header value with the expected rate
///
/// # Errors
///
/// Returns [`CoreError::InvalidFps`] unless the header holds exactly `fps`.
pub fn check_modulus(value: &str, fps: Fps) -> Result<()> {
    match value.trim().parse::<f64>() {
        Ok(declared) if declared == f64::from(fps.get()) => Ok(()),
        _ => Err(CoreError::invalid_fps(format!(
            "given FPS ({fps}) is not equal to TIME_CODE_MODULUS header ({})",
            value.trim()
        ))),
    }
}
