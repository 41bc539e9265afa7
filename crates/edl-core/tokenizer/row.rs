//! Tagged EDL rows
//!
//! Every physical EDL line (or pre-tokenized table row) is resolved into one
//! [`Row`] variant as soon as it is read, so later stages never have to guess
//! what a column means from its position.

use std::sync::OnceLock;

use regex::Regex;

use crate::utils::errors::{CoreError, Result};
use crate::utils::{leading_float, leading_integer};

/// Number of columns in a standard EDL row
pub const COLUMNS: usize = 8;

/// Source given to marker rows that carry no `(s: NAME)` tag
pub const MARKER_SOURCE: &str = "MARK";

/// Column layout reported when a table row has the wrong width
const ROW_LAYOUT: &str =
    "[EventNumber, SourceName, Track, EventType, SourceIn, SourceOut, RecordIn, RecordOut]";

/// Event row before frame conversion
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawEvent {
    /// Event number as written, e.g. `"003"`
    pub number: String,
    /// Source reel or clip identifier
    pub source: String,
    /// Track designator, e.g. `"V"`
    pub track: String,
    /// Edit type: `"C"`, `"D 024"`, ...
    pub kind: String,
    /// Source in timecode
    pub source_in: String,
    /// Source out timecode
    pub source_out: String,
    /// Record in timecode
    pub record_in: String,
    /// Record out timecode
    pub record_out: String,
}

/// Three-column marker-style import row
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarkerRow {
    /// Position among the imported rows, used as the event number
    pub index: usize,
    /// Source in timecode, possibly tagged with `(s: NAME)`
    pub source_in: String,
    /// Source out timecode; one frame after `source_in` when absent
    pub source_out: Option<String>,
    /// Free comment emitted after the event
    pub comment: Option<String>,
}

impl MarkerRow {
    /// Source named by the in point's `(s: NAME)` tag, or [`MARKER_SOURCE`]
    #[must_use]
    pub fn source(&self) -> &str {
        source_tag(&self.source_in).unwrap_or(MARKER_SOURCE)
    }
}

fn source_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\(s: ([^)]+)\)")
            .unwrap_or_else(|err| unreachable!("source tag pattern is valid: {err}"))
    })
}

/// Extract `NAME` from a `(s: NAME)` tag, as appended by matchback queries
///
/// ```rust
/// use edl_core::tokenizer::row::source_tag;
///
/// assert_eq!(source_tag("02:03:30:02 (s: BOBINE_02) (e: 14)"), Some("BOBINE_02"));
/// assert_eq!(source_tag("02:03:30:02"), None);
/// ```
#[must_use]
pub fn source_tag(text: &str) -> Option<&str> {
    source_tag_regex()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// One resolved EDL row
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Row {
    /// `KEY: value` header such as `TITLE:` or `TIME_CODE_MODULUS:`
    Header {
        /// Header name without the trailing colon
        key: String,
        /// Header value
        value: String,
    },
    /// `*` comment, optionally `* LABEL: text`
    Comment {
        /// Label including its trailing colon, e.g. `FROM CLIP NAME:`
        label: Option<String>,
        /// Comment text
        text: String,
    },
    /// `>>> SOURCE <id> <name>` mapping
    SourceMap {
        /// Raw source identifier used by events
        id: String,
        /// Resolved source name
        name: String,
    },
    /// `M2 <reel> <speed> <reference>` motion effect
    Motion {
        /// Reel the effect applies to
        reel: String,
        /// Playback speed in frames per second; negative plays in reverse
        speed: f64,
        /// Source in timecode of the event the effect belongs to
        reference: String,
    },
    /// Standard edit event
    Event(RawEvent),
    /// Marker-style import row, expanded into an event by the model builder
    Marker(MarkerRow),
    /// Anything else; dropped by the model builder
    Other(Vec<String>),
}

impl Row {
    /// Classify eight columns into a row variant
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidEdl`] when an `M2` row carries no
    /// readable speed.
    pub fn from_columns(columns: [String; COLUMNS]) -> Result<Self> {
        let [c0, c1, c2, c3, c4, c5, c6, c7] = columns;

        if let Some(key) = header_key(&c0) {
            return Ok(Self::Header {
                key: key.to_string(),
                value: c1,
            });
        }

        if c0.starts_with('*') {
            return Ok(if c1.ends_with(':') {
                Self::Comment {
                    label: Some(c1),
                    text: c2,
                }
            } else {
                Self::Comment { label: None, text: c1 }
            });
        }

        if c0 == "M2" {
            let speed = leading_float(&c2).ok_or_else(|| {
                CoreError::invalid_edl(format!("invalid M2 speed ({c2}) for reference {c3}"))
            })?;
            return Ok(Self::Motion {
                reel: c1,
                speed,
                reference: c3,
            });
        }

        if c0 == ">>>" && c1 == "SOURCE" {
            return Ok(Self::SourceMap { id: c2, name: c3 });
        }

        if !c7.is_empty() && leading_integer(&c0).is_some() {
            return Ok(Self::Event(RawEvent {
                number: c0,
                source: c1,
                track: c2,
                kind: c3,
                source_in: c4,
                source_out: c5,
                record_in: c6,
                record_out: c7,
            }));
        }

        Ok(Self::Other(vec![c0, c1, c2, c3, c4, c5, c6, c7]))
    }

    /// Classify a variable-width list of tokens, padding it to eight columns
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidEdl`] for more than eight tokens.
    pub fn from_tokens(tokens: Vec<String>) -> Result<Self> {
        if tokens.len() > COLUMNS {
            return Err(CoreError::invalid_edl(format!(
                "more than 8 columns: ({})",
                tokens.join(",")
            )));
        }

        let mut columns: [String; COLUMNS] = Default::default();
        for (slot, token) in columns.iter_mut().zip(tokens) {
            *slot = token;
        }
        Self::from_columns(columns)
    }

    /// Record out field, for rows that have one
    #[must_use]
    pub fn record_out(&self) -> Option<&str> {
        match self {
            Self::Event(event) => Some(event.record_out.as_str()),
            Self::Other(columns) => columns.get(COLUMNS - 1).map(String::as_str),
            _ => None,
        }
        .filter(|value| !value.is_empty())
    }

    /// Render back to the column list this row was read from
    #[must_use]
    pub fn to_columns(&self) -> Vec<String> {
        match self {
            Self::Header { key, value } => vec![format!("{key}:"), value.clone()],
            Self::Comment { label, text } => {
                let mut columns = vec!["*".to_string()];
                columns.extend(label.iter().cloned());
                columns.push(text.clone());
                columns
            }
            Self::SourceMap { id, name } => vec![
                ">>>".to_string(),
                "SOURCE".to_string(),
                id.clone(),
                name.clone(),
            ],
            Self::Motion {
                reel,
                speed,
                reference,
            } => vec![
                "M2".to_string(),
                reel.clone(),
                speed.to_string(),
                reference.clone(),
            ],
            Self::Event(event) => vec![
                event.number.clone(),
                event.source.clone(),
                event.track.clone(),
                event.kind.clone(),
                event.source_in.clone(),
                event.source_out.clone(),
                event.record_in.clone(),
                event.record_out.clone(),
            ],
            Self::Marker(marker) => vec![
                marker.source_in.clone(),
                marker.source_out.clone().unwrap_or_default(),
                marker.comment.clone().unwrap_or_default(),
            ],
            Self::Other(columns) => columns.clone(),
        }
    }
}

/// Header name of a `KEY:` cell, if it is one
fn header_key(cell: &str) -> Option<&str> {
    let key = cell.strip_suffix(':')?;
    let is_word = !key.is_empty() && key.chars().all(|ch| ch.is_alphanumeric() || ch == '_');
    is_word.then_some(key)
}

/// Resolve a pre-tokenized table into rows
///
/// Rows of eight cells are classified like text rows. Rows of three cells are
/// marker-style imports numbered by their position among the kept rows.
/// Blank rows are skipped.
///
/// # Errors
///
/// Returns [`CoreError::InvalidEdl`] for an empty table or a row of any other
/// width.
pub fn rows_from_table<R, C>(table: &[R]) -> Result<Vec<Row>>
where
    R: AsRef<[C]>,
    C: AsRef<str>,
{
    if table.is_empty() {
        return Err(CoreError::invalid_edl("EDL is empty"));
    }

    let mut rows = Vec::with_capacity(table.len());
    for raw in table {
        let cells: Vec<String> = raw
            .as_ref()
            .iter()
            .map(|cell| cell.as_ref().trim().to_string())
            .collect();

        let blank = cells.iter().all(String::is_empty);
        match cells.len() {
            COLUMNS if blank => {}
            COLUMNS => {
                let columns: [String; COLUMNS] = cells
                    .try_into()
                    .map_err(|_| CoreError::invalid_edl("row width changed while reading"))?;
                rows.push(Row::from_columns(columns)?);
            }
            3 if cells[0].is_empty() => {}
            3 => {
                let mut cells = cells.into_iter();
                let source_in = cells.next().unwrap_or_default();
                let source_out = cells.next().filter(|cell| !cell.is_empty());
                let comment = cells.next().filter(|cell| !cell.is_empty());
                rows.push(Row::Marker(MarkerRow {
                    index: rows.len(),
                    source_in,
                    source_out,
                    comment,
                }));
            }
            width => {
                return Err(CoreError::invalid_edl(format!(
                    "each EDL row must be {ROW_LAYOUT}, num entries: {width}"
                )));
            }
        }
    }

    Ok(rows)
}
