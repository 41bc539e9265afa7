//! EDL text builder
//!
//! Turns marker-style rows (`[in, out?, comment?]`, e.g. timecodes returned
//! by matchback queries) or standard 8-column rows back into CMX3600-style
//! text with aligned columns. The generated text is parsed again and
//! summarized so callers learn immediately whether it would load.
//!
//! # Example
//!
//! ```rust
//! use edl_core::builder::{BuildOptions, EdlBuilder};
//! use edl_core::timecode::Fps;
//!
//! let built = EdlBuilder::new("title", Fps::new(24)?)
//!     .import_events(&[["00:00:00:00", "00:00:20:08", "a first comment"]])?
//!     .build(BuildOptions::default())?;
//!
//! assert_eq!(
//!     built.text,
//!     "TITLE:title\n\
//!      TIME_CODE_MODULUS:24\n\
//!      000  MARK  V  C        00:00:00:00 00:00:20:08 00:00:00:00 00:00:20:08\n\
//!      * a first comment"
//! );
//! assert!(built.warning.is_none());
//! # Ok::<(), edl_core::CoreError>(())
//! ```

use tracing::{debug, warn};

use crate::analysis::EdlSummary;
use crate::parser::EdlSequence;
use crate::timecode::{self, Fps};
use crate::tokenizer::{MarkerRow, COLUMNS, TIME_CODE_MODULUS};
use crate::utils::errors::{CoreError, Result};

/// Minimum width of each column of an event line
const MIN_WIDTHS: [usize; COLUMNS] = [3, 0, 0, 0, 11, 11, 11, 11];

/// Separator written before each column of an event line
const PREFIXES: [&str; COLUMNS] = ["", "  ", "  ", "  ", "        ", " ", " ", " "];

/// Settings for [`EdlBuilder::build`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuildOptions {
    /// Fail instead of warning when the generated text does not parse
    pub strict: bool,
}

impl BuildOptions {
    /// Fail or warn on invalid output
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Generated EDL with its validation outcome
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltEdl {
    /// EDL text
    pub text: String,
    /// Summary of the text once parsed back, when it parsed
    pub summary: Option<EdlSummary>,
    /// Why the text did not parse back
    pub warning: Option<String>,
}

/// Accumulates rows and renders them as EDL text
#[derive(Debug, Clone)]
pub struct EdlBuilder {
    title: String,
    fps: Fps,
    lines: Vec<Vec<String>>,
}

/// How a stored row is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Numbered,
    Comment,
    Motion,
    Other,
}

impl LineKind {
    fn of(first: &str) -> Self {
        if first.starts_with('*') {
            Self::Comment
        } else if first == "M2" {
            Self::Motion
        } else if is_numeric(first) {
            Self::Numbered
        } else {
            Self::Other
        }
    }
}

/// Whether a first cell reads as a number, blanks included
fn is_numeric(cell: &str) -> bool {
    let trimmed = cell.trim();
    trimmed.is_empty() || trimmed.parse::<f64>().is_ok_and(|value| !value.is_nan())
}

impl EdlBuilder {
    /// Start an empty EDL
    pub fn new(title: impl Into<String>, fps: Fps) -> Self {
        Self {
            title: title.into(),
            fps,
            lines: Vec::new(),
        }
    }

    /// Rows imported so far, comments included
    #[must_use]
    pub fn lines(&self) -> &[Vec<String>] {
        &self.lines
    }

    /// Import a table of marker-style or standard rows
    ///
    /// Rows with an empty first cell are skipped. Three-cell rows become a
    /// numbered event (numbered by position among the kept rows) followed by
    /// their comment, if any; eight-cell rows are kept as they are.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidEdl`] for a row of another width or when
    /// nothing was imported, and [`CoreError::InvalidTimecode`] for a marker
    /// timecode that does not parse.
    pub fn import_events<R, C>(mut self, table: &[R]) -> Result<Self>
    where
        R: AsRef<[C]>,
        C: AsRef<str>,
    {
        let kept = table
            .iter()
            .filter(|row| row.as_ref().first().is_some_and(|cell| !cell.as_ref().is_empty()));

        for (index, row) in kept.enumerate() {
            let cells: Vec<String> = row
                .as_ref()
                .iter()
                .map(|cell| cell.as_ref().trim().to_string())
                .collect();

            match cells.len() {
                3 => {
                    let mut cells = cells.into_iter();
                    let marker = MarkerRow {
                        index,
                        source_in: cells.next().unwrap_or_default(),
                        source_out: cells.next().filter(|cell| !cell.is_empty()),
                        comment: cells.next().filter(|cell| !cell.is_empty()),
                    };
                    self.push_marker(&marker)?;
                }
                COLUMNS => self.lines.push(cells),
                width => {
                    return Err(CoreError::invalid_edl(format!(
                        "Please provide either a 3 by Y arrays with <srcIn, [srcOut], [Comment]> \
                         (ie: an EDL to use as markers) or a standard EDL range (8 by Y) ; \
                         {width} columns array given on row {index}"
                    )));
                }
            }
        }

        if self.lines.is_empty() {
            return Err(CoreError::invalid_edl("No event found!?!"));
        }
        Ok(self)
    }

    fn push_marker(&mut self, marker: &MarkerRow) -> Result<()> {
        let source_in = timecode::clean(&marker.source_in)?.to_string();
        let source_out = match &marker.source_out {
            Some(out) => timecode::clean(out)?.to_string(),
            None => timecode::offset(&source_in, 1, self.fps)?,
        };

        self.lines.push(vec![
            marker.index.to_string(),
            marker.source().to_string(),
            "V".to_string(),
            "C".to_string(),
            source_in.clone(),
            source_out.clone(),
            source_in,
            source_out,
        ]);
        if let Some(comment) = &marker.comment {
            self.lines.push(vec!["*".to_string(), comment.clone()]);
        }
        Ok(())
    }

    /// Render the EDL text and check that it parses back
    ///
    /// `TITLE:` and `TIME_CODE_MODULUS:` headers are written unless the
    /// first imported row already is a `TITLE:` row.
    ///
    /// # Errors
    ///
    /// With [`BuildOptions::strict`], returns the error raised while parsing
    /// the generated text back. Otherwise the error is kept as
    /// [`BuiltEdl::warning`].
    pub fn build(&self, options: BuildOptions) -> Result<BuiltEdl> {
        let widths = self.column_widths();
        let body: Vec<String> = self
            .lines
            .iter()
            .map(|line| render_line(line, &widths))
            .collect();

        let starts_with_title = self
            .lines
            .first()
            .and_then(|line| line.first())
            .is_some_and(|cell| cell == "TITLE:");
        let mut text = if starts_with_title {
            String::new()
        } else {
            format!(
                "TITLE:{}\n{TIME_CODE_MODULUS}:{}\n",
                self.title,
                self.fps.get()
            )
        };
        text.push_str(&body.join("\n"));

        debug!(lines = body.len(), "built EDL text");

        match EdlSequence::parse(&text, Some(self.fps)) {
            Ok(sequence) => Ok(BuiltEdl {
                text,
                summary: Some(EdlSummary::compute(&sequence)),
                warning: None,
            }),
            Err(err) if options.strict => Err(err),
            Err(err) => {
                let warning = format!("Generated EDL does not seem valid: {err}");
                warn!("{warning}");
                Ok(BuiltEdl {
                    text,
                    summary: None,
                    warning: Some(warning),
                })
            }
        }
    }

    /// Widest cell of each column over numbered rows, at least the minimum
    fn column_widths(&self) -> [usize; COLUMNS] {
        let mut widths = MIN_WIDTHS;
        let numbered = self
            .lines
            .iter()
            .filter(|line| line.first().is_some_and(|cell| LineKind::of(cell) == LineKind::Numbered));
        for line in numbered {
            for (width, cell) in widths.iter_mut().zip(line) {
                *width = (*width).max(cell.chars().count());
            }
        }
        widths
    }
}

fn pad_right(text: &str, width: usize) -> String {
    format!("{text:<width$}")
}

fn pad_zeros(text: &str, width: usize) -> String {
    format!("{text:0>width$}")
}

/// Lay one row out; the result is trimmed
fn render_line(line: &[String], widths: &[usize; COLUMNS]) -> String {
    let Some(first) = line.first() else {
        return String::new();
    };
    let kind = LineKind::of(first);
    let mut out = String::new();

    for (idx, cell) in line.iter().enumerate() {
        match (kind, idx) {
            (LineKind::Numbered, 0) => out.push_str(&pad_zeros(cell, widths[0])),
            (LineKind::Numbered, _) if idx < COLUMNS => {
                out.push_str(PREFIXES[idx]);
                out.push_str(&pad_right(cell, widths[idx]));
            }
            (LineKind::Motion, 0) => {
                out.push_str(cell);
                out.push(' ');
            }
            (LineKind::Motion, 1) => {
                out.push_str(PREFIXES[1]);
                out.push_str(&pad_right(cell, widths[1]));
            }
            // M2 rows are stored without the gaps of a standard row:
            // speed lands in column 3 and the reference timecode in column 5
            (LineKind::Motion, 2 | 3) => {
                let target = if idx == 2 { 3 } else { 5 };
                out.push_str(PREFIXES[target - 1]);
                out.push_str(&pad_right("", widths[target - 1]));
                out.push_str(PREFIXES[target]);
                out.push_str(&pad_right(cell, widths[target]));
            }
            (LineKind::Motion, _) => {}
            (_, 0) => out.push_str(cell),
            _ => {
                out.push(' ');
                out.push_str(cell);
            }
        }
    }

    out.trim().to_string()
}
