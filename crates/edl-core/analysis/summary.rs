//! Tabular EDL summary report
//!
//! [`EdlSummary`] gathers the counts and lengths of a sequence once;
//! [`EdlSummary::to_rows`] lays them out as rows of text cells, ready for a
//! spreadsheet or a tab-separated dump.

use core::fmt;

use super::{edited_source_length, find_duplicates, source_lengths, Duplicates, SourceLength};
use crate::parser::EdlSequence;
use crate::timecode::{self, Fps};
use crate::VERSION;

/// Aggregated report over one sequence
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdlSummary {
    /// Frame rate of the sequence
    pub fps: Fps,
    /// Highest event number found
    pub max_event_number: i64,
    /// Events once dissolves are merged
    pub event_count: usize,
    /// Dissolves merged into their outgoing event
    pub dissolve_count: usize,
    /// Frames spent in dissolves
    pub dissolve_length: i64,
    /// Source frames edited, filler excluded
    pub source_length: i64,
    /// Record frames from the first in to the last out
    pub edit_length: i64,
    /// Edited length per source
    pub sources: Vec<SourceLength>,
    /// Source overlaps counted while building
    pub source_overlap_count: usize,
    /// Record overlaps counted while building
    pub record_overlap_count: usize,
    /// Whether motion effects are present
    pub has_m2: bool,
    /// Reused source ranges
    pub duplicates: Duplicates,
}

impl EdlSummary {
    /// Summarize a built sequence
    ///
    /// # Example
    ///
    /// ```rust
    /// use edl_core::analysis::EdlSummary;
    /// use edl_core::parser::EdlSequence;
    /// use edl_core::timecode::Fps;
    ///
    /// let text = "001  AX  V  C  01:00:00:00 01:00:02:00 00:00:00:00 00:00:02:00\n";
    /// let sequence = EdlSequence::parse(text, Some(Fps::new(24)?))?;
    /// let summary = EdlSummary::compute(&sequence);
    ///
    /// assert_eq!(summary.event_count, 1);
    /// assert_eq!(summary.edit_length, 48);
    /// # Ok::<(), edl_core::CoreError>(())
    /// ```
    #[must_use]
    pub fn compute(sequence: &EdlSequence) -> Self {
        let stats = sequence.stats();
        Self {
            fps: sequence.fps(),
            max_event_number: sequence
                .events()
                .iter()
                .map(|event| event.number)
                .max()
                .unwrap_or_default(),
            event_count: sequence.events().len() - stats.dissolve_count,
            dissolve_count: stats.dissolve_count,
            dissolve_length: stats.dissolve_length,
            source_length: edited_source_length(sequence),
            edit_length: sequence.edit_length(),
            sources: source_lengths(sequence),
            source_overlap_count: stats.source_overlap_count,
            record_overlap_count: stats.record_overlap_count,
            has_m2: stats.has_m2,
            duplicates: find_duplicates(sequence),
        }
    }

    /// Lay the report out as rows of cells
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        let tc = |frames: i64| timecode::format(frames, self.fps);
        let dissolves = self.dissolve_count > 0;

        let events = if usize::try_from(self.max_event_number).ok() == Some(self.event_count) {
            self.max_event_number.to_string()
        } else {
            format!("{}(*)", self.event_count)
        };
        let duration = timecode::to_duration(self.edit_length, f64::from(self.fps.get()))
            .unwrap_or_else(|err| err.to_string());
        let uniqueness = if self.source_overlap_count > 0 {
            format!(
                "(source timecodes are NOT unique: {} overlaps detected)",
                self.source_overlap_count
            )
        } else {
            "(source timecodes are unique)".to_string()
        };

        let mut per_source = "---- Edited length per source ----".to_string();
        if self.has_m2 {
            per_source.push_str(
                " Warning: M2 detected - MATCHBACK() functions may not be frame accurate on these events!",
            );
        }

        let mut rows = vec![
            vec![format!("=== EDL Summary (v{VERSION}) ===")],
            cells([
                "Events:".to_string(),
                events,
                if dissolves {
                    format!("of which {} dissolves, frames in dissolves:", self.dissolve_count)
                } else {
                    String::new()
                },
                if dissolves {
                    self.dissolve_length.to_string()
                } else {
                    String::new()
                },
            ]),
            cells([
                "Edited source length:".to_string(),
                self.source_length.to_string(),
                tc(self.source_length),
            ]),
            cells([
                "Edit length:".to_string(),
                self.edit_length.to_string(),
                tc(self.edit_length),
                if self.edit_length == self.source_length {
                    String::new()
                } else {
                    "Warning: source length != edit length".to_string()
                },
            ]),
            cells(["Edit real duration:".to_string(), duration]),
            cells([
                "Number of sources:".to_string(),
                self.sources.len().to_string(),
                uniqueness,
            ]),
            vec![per_source],
            cells([
                "Source name".to_string(),
                "Frame #".to_string(),
                "Duration".to_string(),
                if self.record_overlap_count > 0 {
                    "WARNING: record TC overlap (on purpose?)".to_string()
                } else {
                    String::new()
                },
            ]),
        ];

        rows.extend(
            self.sources
                .iter()
                .map(|source| cells([source.name.clone(), source.frames.to_string(), tc(source.frames)])),
        );

        if !self.duplicates.is_empty() {
            rows.push(cells([
                "--- Duplicates:".to_string(),
                format!("{} events", self.duplicates.pairs.len()),
                format!("{} affected frames", self.duplicates.frames),
            ]));
            rows.push(cells(
                ["Event #", "Source name", "[Src in", "Src out[", "[Rec in"].map(String::from),
            ));
            for (previous, current) in &self.duplicates.pairs {
                for side in [previous, current] {
                    rows.push(cells([
                        side.label.clone(),
                        side.source.clone(),
                        tc(side.src_in),
                        tc(side.src_out),
                        tc(side.rec_in),
                    ]));
                }
            }
        }

        rows.push(cells(["=== End of summary ===", "", ""].map(String::from)));
        rows
    }
}

fn cells<const N: usize>(row: [String; N]) -> Vec<String> {
    row.into()
}

impl fmt::Display for EdlSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.to_rows() {
            writeln!(f, "{}", row.join("\t"))?;
        }
        Ok(())
    }
}
