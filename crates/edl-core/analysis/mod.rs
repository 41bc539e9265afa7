//! Aggregate analysis of a built EDL sequence
//!
//! Computes per-source edited lengths and finds events that reuse the same
//! stretch of source material. [`summary::EdlSummary`] assembles these into
//! the tabular report.
//!
//! # Example
//!
//! ```rust
//! use edl_core::analysis::{find_duplicates, source_lengths};
//! use edl_core::parser::EdlSequence;
//! use edl_core::timecode::Fps;
//!
//! let text = "001  AX  V  C  01:00:00:00 01:00:02:00 00:00:00:00 00:00:02:00\n\
//!             002  AX  V  C  01:00:01:00 01:00:03:00 00:00:02:00 00:00:04:00\n";
//! let sequence = EdlSequence::parse(text, Some(Fps::new(24)?))?;
//!
//! assert_eq!(source_lengths(&sequence)[0].frames, 96);
//! assert_eq!(find_duplicates(&sequence).frames, 24);
//! # Ok::<(), edl_core::CoreError>(())
//! ```

pub mod summary;

pub use summary::EdlSummary;

use crate::parser::{EdlSequence, Event};

/// Source frames edited from one source
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceLength {
    /// Source name
    pub name: String,
    /// Sum of the source spans of every event using it
    pub frames: i64,
}

/// Event side of a duplicate pair
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DuplicateUse {
    /// Event label
    pub label: String,
    /// Source name
    pub source: String,
    /// First source frame
    pub src_in: i64,
    /// Source frame after the last one used
    pub src_out: i64,
    /// First record frame
    pub rec_in: i64,
}

impl From<&Event> for DuplicateUse {
    fn from(event: &Event) -> Self {
        Self {
            label: event.label.clone(),
            source: event.source.clone(),
            src_in: event.src_in,
            src_out: event.src_out,
            rec_in: event.rec_in,
        }
    }
}

/// Events using overlapping ranges of the same source
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Duplicates {
    /// Earlier and later event of each overlapping pair, in source order
    pub pairs: Vec<(DuplicateUse, DuplicateUse)>,
    /// Source frames used more than once
    pub frames: i64,
}

impl Duplicates {
    /// Whether any pair was found
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Edited length per source, in order of first appearance on the record
/// timeline
#[must_use]
pub fn source_lengths(sequence: &EdlSequence) -> Vec<SourceLength> {
    let mut lengths: Vec<SourceLength> = Vec::new();
    for event in sequence.events() {
        match lengths.iter_mut().find(|entry| entry.name == event.source) {
            Some(entry) => entry.frames += event.src_len(),
            None => lengths.push(SourceLength {
                name: event.source.clone(),
                frames: event.src_len(),
            }),
        }
    }
    lengths
}

/// Source frames edited from anything but filler
#[must_use]
pub fn edited_source_length(sequence: &EdlSequence) -> i64 {
    sequence
        .events()
        .iter()
        .filter(|event| !event.is_filler())
        .map(Event::src_len)
        .sum()
}

/// Find events that reuse source frames of the same source
///
/// Events are walked in (source, source in) order; each non-null event
/// starting before its neighbour's source out forms a pair with it. Filler
/// never counts.
#[must_use]
pub fn find_duplicates(sequence: &EdlSequence) -> Duplicates {
    let mut by_source: Vec<&Event> = sequence.events().iter().collect();
    by_source.sort_by(|a, b| a.source.cmp(&b.source).then(a.src_in.cmp(&b.src_in)));

    let mut duplicates = Duplicates::default();
    for pair in by_source.windows(2) {
        let (previous, current) = (pair[0], pair[1]);
        if current.is_null() {
            continue;
        }
        if current.source == previous.source
            && !current.is_filler()
            && !previous.is_filler()
            && current.src_in < previous.src_out
        {
            duplicates.frames += previous.src_out - current.src_in;
            duplicates.pairs.push((previous.into(), current.into()));
        }
    }
    duplicates
}
