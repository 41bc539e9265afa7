//! Resolve marker EDL reader
//!
//! DaVinci Resolve exports timeline markers as an EDL where every marker is
//! a one-frame event row followed by a line such as
//! `note |C:ResolveColorBlue |M:Marker 1 |D:1`. This module turns that text
//! into [`Marker`] entries. It is independent from the event model builder.
//!
//! Some Resolve versions write the marker end position (as a frame count)
//! where the duration belongs. Durations of 20000 frames or more are read
//! that way.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::timecode::{self, Fps};
use crate::utils::errors::{CoreError, Result};

/// Durations at or above this value are absolute end frames
pub const ABSOLUTE_END_THRESHOLD: i64 = 20_000;

/// One Resolve timeline marker
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Marker {
    /// Start timecode
    pub start: String,
    /// End timecode, absent for single-frame markers
    pub end: Option<String>,
    /// Marker name (`|M:`)
    pub name: String,
    /// Free note preceding the tags
    pub note: String,
    /// Resolve color name (`|C:`)
    pub color: String,
    /// Length in frames
    pub duration: i64,
}

fn entry_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"(\d+\s+?\d+\s+?V\s+?C\s+?",
            r"\d\d:\d\d:\d\d:\d\d \d\d:\d\d:\d\d:\d\d \d\d:\d\d:\d\d:\d\d \d\d:\d\d:\d\d:\d\d\s+?)",
            r"([\s\S]+?\|C:\S+? \|M:.*? \|D:\d+?\s+?)"
        ))
        .unwrap_or_else(|err| unreachable!("marker entry pattern is valid: {err}"))
    })
}

fn tags_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([\s\S]*?)\|C:(\S+?) \|M:(.*?) \|D:(\d+)")
            .unwrap_or_else(|err| unreachable!("marker tags pattern is valid: {err}"))
    })
}

fn title_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\w+:)\s*(.*)$")
            .unwrap_or_else(|err| unreachable!("title pattern is valid: {err}"))
    })
}

/// A piece of marker text after splitting on entries
#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    /// `TITLE:` style header
    Title,
    /// Eight-column event row; only the start timecode matters
    Event { start: String },
    /// `note |C: |M: |D:` tags
    Tags {
        note: String,
        color: String,
        name: String,
        duration: String,
    },
}

impl Piece {
    const fn width(&self) -> usize {
        match self {
            Self::Title => 1,
            Self::Event { .. } => 8,
            Self::Tags { .. } => 4,
        }
    }
}

/// Parse Resolve marker EDL text
///
/// # Errors
///
/// Returns [`CoreError::InvalidEdl`] when an event row has different source
/// and record timecodes, when rows come in an unexpected order, or when no
/// marker is found at all.
pub fn parse_resolve_markers(text: &str, fps: Fps) -> Result<Vec<Marker>> {
    let mut pieces = Vec::new();
    let mut found_tags = false;

    for raw in split_entries(text) {
        if let Some(piece) = classify(raw.trim())? {
            found_tags |= matches!(piece, Piece::Tags { .. });
            pieces.push(piece);
        }
    }

    if !found_tags {
        return Err(CoreError::invalid_edl("No Resolve marker could be found"));
    }

    let mut markers: Vec<Marker> = Vec::new();
    for (idx, piece) in pieces.iter().enumerate() {
        let previous = idx.checked_sub(1).map(|prev| pieces[prev].width());

        match piece {
            Piece::Title if idx == 0 => {}
            Piece::Event { start } if markers.is_empty() || previous == Some(4) => {
                markers.push(Marker {
                    start: start.clone(),
                    end: None,
                    name: String::new(),
                    note: String::new(),
                    color: String::new(),
                    duration: 1,
                });
            }
            Piece::Tags {
                note,
                color,
                name,
                duration,
            } if previous == Some(8) => {
                let Some(marker) = markers.last_mut() else {
                    return Err(unexpected(piece));
                };
                apply_duration(marker, duration, fps)?;
                marker.name = name.trim().to_string();
                marker.note = note.trim().to_string();
                marker.color = color.trim().to_string();
            }
            _ => return Err(unexpected(piece)),
        }
    }

    debug!(markers = markers.len(), "parsed Resolve markers");
    Ok(markers)
}

/// Split text around marker entries, keeping the two captured parts of each
fn split_entries(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut last = 0;

    for caps in entry_regex().captures_iter(text) {
        let (Some(whole), Some(event), Some(tags)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        parts.push(&text[last..whole.start()]);
        parts.push(event.as_str());
        parts.push(tags.as_str());
        last = whole.end();
    }
    parts.push(&text[last..]);
    parts
}

fn classify(piece: &str) -> Result<Option<Piece>> {
    if let Some(caps) = tags_regex().captures(piece) {
        return Ok(Some(Piece::Tags {
            note: caps[1].to_string(),
            color: caps[2].to_string(),
            name: caps[3].to_string(),
            duration: caps[4].to_string(),
        }));
    }

    if title_regex().is_match(piece) {
        return Ok(Some(Piece::Title));
    }

    let columns: Vec<&str> = piece.split_whitespace().collect();
    if columns.get(4) != columns.get(6) || columns.get(5) != columns.get(7) {
        return Err(CoreError::invalid_edl(format!(
            "Unexpected mismatch between source and record: {}",
            columns.join(",")
        )));
    }

    match columns.len() {
        0 => Ok(None),
        8 => Ok(Some(Piece::Event {
            start: columns[4].to_string(),
        })),
        width if width > 8 => Err(CoreError::invalid_edl(format!(
            "more than 8 columns: ({})",
            columns.join(",")
        ))),
        width => Err(CoreError::invalid_edl(format!(
            "Unexpected entry length ({width}) in marker edl: '{}'",
            columns.join(",")
        ))),
    }
}

fn apply_duration(marker: &mut Marker, duration: &str, fps: Fps) -> Result<()> {
    let duration: i64 = duration
        .parse()
        .map_err(|_| CoreError::invalid_edl(format!("invalid marker duration ({duration})")))?;
    if duration <= 1 {
        return Ok(());
    }

    let start = timecode::parse(&marker.start, fps)?;
    if duration < ABSOLUTE_END_THRESHOLD {
        marker.end = Some(timecode::format(start + duration, fps));
        marker.duration = duration;
    } else {
        marker.end = Some(timecode::format(duration, fps));
        marker.duration = duration - start;
    }
    Ok(())
}

fn unexpected(piece: &Piece) -> CoreError {
    let rendered = match piece {
        Piece::Title => "TITLE".to_string(),
        Piece::Event { start } => start.clone(),
        Piece::Tags {
            note,
            color,
            name,
            duration,
        } => format!("{},{},{},{}", note.trim(), color, name, duration),
    };
    CoreError::invalid_edl(format!(
        "Unexpected entry length ({}) in marker edl: '{rendered}'",
        piece.width()
    ))
}
