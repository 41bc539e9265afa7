//! EDL model builder
//!
//! Turns tokenized rows into a validated [`EdlSequence`]: events with frame
//! counts, sorted by record in point, with dissolves merged and motion
//! effects attached. A build either fully succeeds or fails with the first
//! fatal condition met; overlaps are only counted.
//!
//! # Example
//!
//! ```rust
//! use edl_core::parser::EdlSequence;
//! use edl_core::timecode::Fps;
//!
//! let text = "TITLE: demo\n\
//!             001  AX  V  C  01:00:00:00 01:00:01:00 00:00:00:00 00:00:01:00\n\
//!             002  BL  V  C  00:00:00:00 00:00:00:12 00:00:01:00 00:00:01:12\n";
//!
//! let sequence = EdlSequence::parse(text, Some(Fps::new(24)?))?;
//! assert_eq!(sequence.events().len(), 2);
//! assert_eq!(sequence.events()[1].rec_in, 24);
//! # Ok::<(), edl_core::CoreError>(())
//! ```

pub mod event;
mod reconcile;

use std::collections::HashMap;

use tracing::debug;

pub use event::{Event, FILLER_SOURCE};

use crate::timecode::{self, Fps};
use crate::tokenizer::{self, MarkerRow, RawEvent, Row, TokenizeOptions, TIME_CODE_MODULUS};
use crate::utils::errors::{CoreError, ErrorKind, Result};
use crate::utils::leading_integer;

/// Comment labels that rename the preceding event's source
const CLIP_NAME_LABELS: [&str; 2] = ["FROM CLIP NAME:", "SOURCE FILE:"];

/// Statistics gathered while building a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdlStats {
    /// Events starting inside the previous event's source range
    pub source_overlap_count: usize,
    /// Non-dissolve events starting before the previous record out
    pub record_overlap_count: usize,
    /// Dissolves merged into their outgoing event
    pub dissolve_count: usize,
    /// Total frames spent in dissolves
    pub dissolve_length: i64,
    /// Whether any `M2` row was seen
    pub has_m2: bool,
}

/// Validated, record-ordered event list
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdlSequence {
    events: Vec<Event>,
    fps: Fps,
    stats: EdlStats,
    source_depth: usize,
}

impl EdlSequence {
    /// Build a sequence from EDL text
    ///
    /// Without `fps` the rate comes from the `TIME_CODE_MODULUS:` header.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidFps`] when no rate is known or the header
    /// disagrees with `fps`, and [`CoreError::InvalidEdl`] for any structural
    /// problem.
    pub fn parse(text: &str, fps: Option<Fps>) -> Result<Self> {
        let options = TokenizeOptions {
            fps,
            keep_comments: true,
        };
        let rows = tokenizer::tokenize(text, &options)?;
        Self::from_rows(&rows, fps)
    }

    /// Build a sequence from a pre-tokenized table
    ///
    /// A `TIME_CODE_MODULUS:` row is only read when `fps` is not given.
    ///
    /// # Errors
    ///
    /// Same as [`EdlSequence::parse`], plus table width errors.
    pub fn from_table<R, C>(table: &[R], fps: Option<Fps>) -> Result<Self>
    where
        R: AsRef<[C]>,
        C: AsRef<str>,
    {
        let rows = tokenizer::rows_from_table(table)?;
        Self::from_rows(&rows, fps)
    }

    /// Build a sequence from tagged rows
    ///
    /// # Errors
    ///
    /// Same as [`EdlSequence::parse`].
    pub fn from_rows(rows: &[Row], fps: Option<Fps>) -> Result<Self> {
        let mut builder = SequenceBuilder::new(fps);
        for row in rows {
            builder.push(row)?;
        }
        builder.finish()
    }

    /// Events sorted by record in point
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Frame rate of every frame count in the sequence
    #[must_use]
    pub const fn fps(&self) -> Fps {
        self.fps
    }

    /// Build statistics
    #[must_use]
    pub const fn stats(&self) -> &EdlStats {
        &self.stats
    }

    /// Whether any source or record overlap was counted
    #[must_use]
    pub const fn has_overlaps(&self) -> bool {
        self.stats.source_overlap_count > 0 || self.stats.record_overlap_count > 0
    }

    /// Most events sharing any single source frame
    pub(crate) const fn source_depth(&self) -> usize {
        self.source_depth
    }

    /// Record frames from the first event's in to the last event's out
    #[must_use]
    pub fn edit_length(&self) -> i64 {
        match (self.events.first(), self.events.last()) {
            (Some(first), Some(last)) => last.rec_out - first.rec_in,
            _ => 0,
        }
    }
}

/// Event row waiting for frame conversion
#[derive(Debug)]
struct PendingEvent {
    label: String,
    source: String,
    track: String,
    kind: String,
    timecodes: [String; 4],
    speed: Option<f64>,
}

impl PendingEvent {
    fn from_raw(raw: &RawEvent) -> Self {
        Self {
            label: raw.number.clone(),
            source: raw.source.clone(),
            track: raw.track.clone(),
            kind: raw.kind.clone(),
            timecodes: [
                raw.source_in.clone(),
                raw.source_out.clone(),
                raw.record_in.clone(),
                raw.record_out.clone(),
            ],
            speed: None,
        }
    }

    /// Expand a marker row into a one-shot event with identical source and
    /// record ranges
    fn from_marker(marker: &MarkerRow, fps: Fps) -> Result<Self> {
        let label = marker.index.to_string();
        let source_in = timecode::clean(&marker.source_in)
            .map_err(|err| tag_event(&label, err))?
            .to_string();
        let source_out = match &marker.source_out {
            Some(out) => timecode::clean(out)
                .map_err(|err| tag_event(&label, err))?
                .to_string(),
            None => timecode::offset(&source_in, 1, fps).map_err(|err| tag_event(&label, err))?,
        };

        Ok(Self {
            source: marker.source().to_string(),
            track: "V".to_string(),
            kind: "C".to_string(),
            timecodes: [
                source_in.clone(),
                source_out.clone(),
                source_in,
                source_out,
            ],
            speed: None,
            label,
        })
    }

    fn resolve(self, mapping: &HashMap<String, String>, fps: Fps) -> Result<Event> {
        let mut frames = [0_i64; 4];
        for (slot, text) in frames.iter_mut().zip(&self.timecodes) {
            *slot = timecode::parse(text, fps).map_err(|err| tag_event(&self.label, err))?;
        }
        let [src_in, src_out, rec_in, rec_out] = frames;

        let source = mapping.get(&self.source).cloned().unwrap_or(self.source);
        Ok(Event {
            number: leading_integer(&self.label).unwrap_or_default(),
            label: self.label,
            source,
            track: self.track,
            kind: self.kind,
            src_in,
            src_out,
            rec_in,
            rec_out,
            speed: self.speed,
        })
    }
}

/// Re-raise timecode failures as EDL errors naming the event
fn tag_event(label: &str, err: CoreError) -> CoreError {
    if err.kind() == ErrorKind::InvalidTimecode {
        CoreError::invalid_edl(format!("event # {label}: {err}"))
    } else {
        err
    }
}

/// Row-by-row state of one build
#[derive(Debug)]
struct SequenceBuilder {
    fps: Option<Fps>,
    pending: Vec<PendingEvent>,
    mapping: HashMap<String, String>,
    using_clip_names: bool,
    has_m2: bool,
}

impl SequenceBuilder {
    fn new(fps: Option<Fps>) -> Self {
        Self {
            fps,
            pending: Vec::new(),
            mapping: HashMap::new(),
            using_clip_names: false,
            has_m2: false,
        }
    }

    fn push(&mut self, row: &Row) -> Result<()> {
        self.resolve_fps(row)?;

        match row {
            Row::SourceMap { id, name } if !self.using_clip_names => {
                self.mapping.insert(id.clone(), name.clone());
            }
            Row::Comment {
                label: Some(label),
                text,
            } if CLIP_NAME_LABELS.contains(&label.as_str()) => {
                self.using_clip_names = true;
                if let Some(last) = self.pending.last_mut() {
                    last.source.clone_from(text);
                }
            }
            Row::Event(raw) => self.pending.push(PendingEvent::from_raw(raw)),
            Row::Marker(marker) => {
                let fps = self.require_fps()?;
                self.pending.push(PendingEvent::from_marker(marker, fps)?);
            }
            Row::Motion {
                speed, reference, ..
            } => {
                self.has_m2 = true;
                let target = self
                    .pending
                    .iter_mut()
                    .rev()
                    .find(|event| event.timecodes[0] == *reference)
                    .ok_or_else(|| {
                        CoreError::invalid_edl(format!("M2 reference ({reference}) not found."))
                    })?;
                target.speed = Some(*speed);
            }
            _ => {}
        }
        Ok(())
    }

    /// Pick the rate up from the header, or fail on the first row that
    /// needs one
    fn resolve_fps(&mut self, row: &Row) -> Result<()> {
        if self.fps.is_some() {
            return Ok(());
        }

        if let Row::Header { key, value } = row {
            if key == TIME_CODE_MODULUS {
                let declared = leading_integer(value).unwrap_or_default();
                self.fps = Some(Fps::try_from_f64(declared as f64)?);
                return Ok(());
            }
        }

        if row.record_out().is_some() || matches!(row, Row::Marker(_)) {
            return Err(missing_fps());
        }
        Ok(())
    }

    fn require_fps(&self) -> Result<Fps> {
        self.fps.ok_or_else(missing_fps)
    }

    fn finish(self) -> Result<EdlSequence> {
        if self.pending.is_empty() {
            return Err(CoreError::invalid_edl("No event found!?!"));
        }
        let fps = self.require_fps()?;

        let mut events = self
            .pending
            .into_iter()
            .map(|pending| pending.resolve(&self.mapping, fps))
            .collect::<Result<Vec<_>>>()?;
        events.sort_by_key(|event| event.rec_in);

        let totals = reconcile::reconcile(&mut events, fps)?;
        let stats = EdlStats {
            source_overlap_count: reconcile::count_source_overlaps(&events),
            record_overlap_count: totals.record_overlaps,
            dissolve_count: totals.dissolve_count,
            dissolve_length: totals.dissolve_length,
            has_m2: self.has_m2,
        };

        debug!(
            events = events.len(),
            fps = fps.get(),
            source_overlaps = stats.source_overlap_count,
            record_overlaps = stats.record_overlap_count,
            dissolves = stats.dissolve_count,
            has_m2 = stats.has_m2,
            "built EDL sequence"
        );

        let source_depth = reconcile::max_source_depth(&events);
        Ok(EdlSequence {
            events,
            fps,
            stats,
            source_depth,
        })
    }
}

fn missing_fps() -> CoreError {
    CoreError::invalid_fps("no fps given and no TIME_CODE_MODULUS header found.")
}

#[cfg(test)]
mod tests;
