//! Matchback between record and source time
//!
//! Forward matchback answers "which source frame was edited at this record
//! frame"; reverse matchback answers "where in the program does this source
//! frame appear". Both work on a built [`EdlSequence`] and take the filler
//! filter as a per-call flag, so one sequence can serve concurrent queries.
//!
//! Motion (`M2`) events scale the offset into the event by the speed ratio.
//! Reverse-motion events count from the source out point backwards.
//!
//! # Example
//!
//! ```rust
//! use edl_core::matchback::{match_record_frame, match_source_frame};
//! use edl_core::parser::EdlSequence;
//! use edl_core::timecode::Fps;
//!
//! let text = "001  AX  V  C  01:00:00:00 01:00:10:00 00:00:00:00 00:00:10:00\n";
//! let sequence = EdlSequence::parse(text, Some(Fps::new(24)?))?;
//!
//! let forward = match_record_frame(&sequence, 48, false)?;
//! assert_eq!(forward[0].frame, 86400 + 48);
//!
//! let reverse = match_source_frame(&sequence, 86400 + 48, false)?;
//! assert_eq!(reverse[0].frame, 48);
//! # Ok::<(), edl_core::CoreError>(())
//! ```

pub mod query;

use tracing::trace;

pub use query::{Direction, MatchOptions, TcMatcher};

use crate::parser::{EdlSequence, Event};
use crate::timecode;
use crate::utils::errors::{CoreError, Result};
use crate::utils::round_half_up;

/// Suffix appended to labels of motion-effect matches
const MOTION_LABEL: &str = " - M2";

/// Source position edited at a record frame
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceMatch {
    /// Source frame
    pub frame: i64,
    /// Source name of the matching event
    pub source: String,
    /// Event label, with `" - M2"` for motion effects
    pub label: String,
}

/// Record position showing a source frame
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecordMatch {
    /// Record frame
    pub frame: i64,
    /// Source name of the matching event
    pub source: String,
    /// Event label, with `" - M2"` for motion effects
    pub label: String,
    /// Record in point of the matching event
    pub shot_start: i64,
    /// Record length of the matching event
    pub shot_duration: i64,
}

fn label_for(event: &Event) -> String {
    if event.is_motion() {
        format!("{}{MOTION_LABEL}", event.label)
    } else {
        event.label.clone()
    }
}

/// Find the source frames edited at `frame` on the record timeline
///
/// Several matches only happen where record ranges overlap.
///
/// # Errors
///
/// Returns [`CoreError::NotFoundInEdl`] when `frame` is before the first
/// event, at or after the last event's record out, or in a gap.
pub fn match_record_frame(
    sequence: &EdlSequence,
    frame: i64,
    ignore_filler: bool,
) -> Result<Vec<SourceMatch>> {
    let fps = sequence.fps();
    let events = sequence.events();
    let tc = || timecode::format(frame, fps);

    match (events.first(), events.last()) {
        (Some(first), _) if frame < first.rec_in => {
            return Err(CoreError::not_found(format!(
                "record TC is located before EDL's first event, TC: {}",
                tc()
            )));
        }
        (_, Some(last)) if frame >= last.rec_out => {
            return Err(CoreError::not_found(format!(
                "record TC out-ran EDL record length, TC: {}",
                tc()
            )));
        }
        _ => {}
    }

    let mut matches = Vec::new();
    for event in events {
        if frame < event.rec_in {
            break;
        }
        if !event.covers_record(frame) || (ignore_filler && event.is_filler()) {
            continue;
        }

        let source_frame = source_frame_at(event, frame, fps.frames());
        trace!(event = %event.label, frame, source_frame, "record match");
        matches.push(SourceMatch {
            frame: source_frame,
            source: event.source.clone(),
            label: label_for(event),
        });
    }

    if matches.is_empty() {
        return Err(CoreError::not_found(format!(
            "record TC not found in EDL (gap ?), TC: {}",
            tc()
        )));
    }
    Ok(matches)
}

fn source_frame_at(event: &Event, frame: i64, fps: i64) -> i64 {
    let offset = frame - event.rec_in;
    let Some(speed) = event.speed else {
        return event.src_in + offset;
    };

    let scaled = offset as f64 * (speed / fps as f64);
    let matched = if speed >= 0.0 {
        event.src_in + scaled.trunc() as i64
    } else {
        ((event.src_out - 1) as f64 + scaled).floor() as i64
    };
    matched.clamp(event.src_in, (event.src_out - 1).max(event.src_in))
}

/// Find the record frames showing `frame` of source material
///
/// Every event is considered; the scan stops once as many matches were
/// found as the most events stacked on any one source frame.
///
/// # Errors
///
/// Returns [`CoreError::NotFoundInEdl`] when no event uses `frame`.
pub fn match_source_frame(
    sequence: &EdlSequence,
    frame: i64,
    ignore_filler: bool,
) -> Result<Vec<RecordMatch>> {
    let fps = sequence.fps();
    let limit = sequence.source_depth();
    let mut matches = Vec::new();

    for event in sequence.events() {
        if !event.covers_source(frame) || (ignore_filler && event.is_filler()) {
            continue;
        }

        let record_frame = record_frame_at(event, frame, fps.frames());
        trace!(event = %event.label, frame, record_frame, "source match");
        matches.push(RecordMatch {
            frame: record_frame,
            source: event.source.clone(),
            label: label_for(event),
            shot_start: event.rec_in,
            shot_duration: event.rec_len(),
        });

        if matches.len() >= limit {
            break;
        }
    }

    if matches.is_empty() {
        return Err(CoreError::not_found(format!(
            "source TC not found in EDL (not edited?), TC: {}",
            timecode::format(frame, fps)
        )));
    }
    Ok(matches)
}

fn record_frame_at(event: &Event, frame: i64, fps: i64) -> i64 {
    let offset = frame - event.src_in;
    let Some(speed) = event.speed else {
        return event.rec_in + offset;
    };

    let fps = fps as f64;
    let matched = if speed > 0.0 {
        event.rec_in + round_half_up(offset as f64 * (fps / speed))
    } else if speed == 0.0 {
        event.rec_in
    } else {
        event.rec_out - 1 - round_half_up(offset as f64 * -1.0 * (fps / speed) + 0.5)
    };
    matched.clamp(event.rec_in, (event.rec_out - 1).max(event.rec_in))
}
