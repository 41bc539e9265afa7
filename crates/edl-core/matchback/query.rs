//! Timecode-level matchback queries
//!
//! [`TcMatcher`] wraps the frame matchers with timecode parsing, the output
//! offset and result formatting. Results for one query are joined with
//! newlines. When the sequence has overlaps each result is tagged with
//! `(s: SOURCE) (e: EVENT)` so the caller can tell the candidates apart.

use super::{match_record_frame, match_source_frame};
use crate::parser::EdlSequence;
use crate::timecode;
use crate::utils::errors::{CoreError, Result};
use crate::utils::shape::{map_shape, Shape, Shaped};

/// Which way a query maps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Record timecode to source timecode
    #[default]
    Forward,
    /// Source timecode to record timecode
    Reverse,
}

/// Per-query settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchOptions {
    /// Frames added to every returned position
    pub offset: i64,
    /// Skip black/filler events
    pub ignore_filler: bool,
    /// Report the containing shot instead of the exact frame (reverse only)
    pub shots: bool,
}

impl MatchOptions {
    /// Set the output offset
    #[must_use]
    pub const fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    /// Skip or keep filler events
    #[must_use]
    pub const fn with_ignore_filler(mut self, ignore: bool) -> Self {
        self.ignore_filler = ignore;
        self
    }

    /// Report shots instead of frames
    #[must_use]
    pub const fn with_shots(mut self, shots: bool) -> Self {
        self.shots = shots;
        self
    }
}

/// Timecode matcher bound to one sequence
///
/// # Example
///
/// ```rust
/// use edl_core::matchback::{Direction, MatchOptions, TcMatcher};
/// use edl_core::parser::EdlSequence;
/// use edl_core::timecode::Fps;
///
/// let text = "001  AX  V  C  01:00:00:00 01:00:10:00 10:00:00:00 10:00:10:00\n";
/// let sequence = EdlSequence::parse(text, Some(Fps::new(25)?))?;
/// let matcher = TcMatcher::new(&sequence, Direction::Forward, MatchOptions::default())?;
///
/// assert_eq!(matcher.query("10:00:02:05")?, "01:00:02:05");
/// # Ok::<(), edl_core::CoreError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TcMatcher<'a> {
    sequence: &'a EdlSequence,
    direction: Direction,
    options: MatchOptions,
}

impl<'a> TcMatcher<'a> {
    /// Create a matcher
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotImplemented`] for shots on forward queries.
    pub fn new(sequence: &'a EdlSequence, direction: Direction, options: MatchOptions) -> Result<Self> {
        if options.shots && direction == Direction::Forward {
            return Err(CoreError::not_implemented(
                "shots mode is not implemented for forward matchback",
            ));
        }
        Ok(Self {
            sequence,
            direction,
            options,
        })
    }

    /// Sequence queried
    #[must_use]
    pub const fn sequence(&self) -> &'a EdlSequence {
        self.sequence
    }

    /// Answer one timecode query
    ///
    /// Text after the timecode, such as a `(s: ..)` tag from an earlier
    /// query, is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTimecode`] for malformed input,
    /// [`CoreError::NotFoundInEdl`] when nothing matches and
    /// [`CoreError::InvalidEdl`] when the offset overflows a frame count.
    pub fn query(&self, tc: &str) -> Result<String> {
        let frame = timecode::parse(tc, self.sequence.fps())?;
        let tagged = self.sequence.has_overlaps();
        let tag = |tc: String, source: &str, label: &str| {
            if tagged {
                format!("{tc} (s: {source}) (e: {label})")
            } else {
                tc
            }
        };

        let lines = match self.direction {
            Direction::Forward => match_record_frame(self.sequence, frame, self.options.ignore_filler)?
                .into_iter()
                .map(|found| Ok(tag(self.shifted(found.frame)?, &found.source, &found.label)))
                .collect::<Result<Vec<_>>>()?,
            Direction::Reverse => match_source_frame(self.sequence, frame, self.options.ignore_filler)?
                .into_iter()
                .map(|found| {
                    if self.options.shots {
                        Ok(format!(
                            "{} (s: {}) (e: {}) (f#: {})",
                            self.shifted(found.shot_start)?,
                            found.source,
                            found.label,
                            found.shot_duration
                        ))
                    } else {
                        Ok(tag(self.shifted(found.frame)?, &found.source, &found.label))
                    }
                })
                .collect::<Result<Vec<_>>>()?,
        };

        Ok(lines.join("\n"))
    }

    /// Format `frame` plus the output offset
    fn shifted(&self, frame: i64) -> Result<String> {
        let offset = self.options.offset;
        frame
            .checked_add(offset)
            .map(|shifted| timecode::format(shifted, self.sequence.fps()))
            .ok_or_else(|| CoreError::invalid_edl(format!("offset {offset} out of range")))
    }

    /// Answer a scalar, multi-line or nested query
    ///
    /// Failures inside sequences and multi-line text are contained in place.
    ///
    /// # Errors
    ///
    /// Fails only when the input is a single scalar timecode whose query
    /// fails.
    pub fn query_shape(&self, input: &Shape<String>) -> Result<Shaped<String>> {
        map_shape(input, &|tc: &String| self.query(tc))
    }
}
