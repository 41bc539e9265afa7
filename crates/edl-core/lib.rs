//! # EDL Core
//!
//! Parser, validator and matchback engine for CMX3600-style Edit Decision
//! Lists. EDL text or pre-tokenized tables are turned into a validated,
//! record-ordered [`EdlSequence`] of frame-counted events, which then answers
//! matchback queries (record time to source time and back) and feeds the
//! summary report.
//!
//! ## Features
//!
//! - **Timecode codec**: `HH:MM:SS:FF` parsing, formatting, offsets and rate
//!   conversion at integer frame rates, with 24-hour wraparound
//! - **Tolerant tokenizer**: headers, comments, source mappings, `M2` motion
//!   rows and DaVinci Resolve marker exports
//! - **Model builder**: dissolve merging, motion-effect association, overlap
//!   statistics
//! - **Matchback**: forward and reverse, through motion effects, with optional
//!   filler skipping per call
//! - **Reporting**: tabular summary with duplicate source usage, and an EDL
//!   text builder
//!
//! ## Quick Start
//!
//! ```rust
//! use edl_core::{Direction, EdlSequence, Fps, MatchOptions, TcMatcher};
//!
//! let text = "TITLE: reel one\n\
//!             TIME_CODE_MODULUS: 24\n\
//!             001  AX  V  C  01:00:00:00 01:00:10:00 10:00:00:00 10:00:10:00\n";
//!
//! let sequence = EdlSequence::parse(text, None)?;
//! let matcher = TcMatcher::new(&sequence, Direction::Forward, MatchOptions::default())?;
//! assert_eq!(matcher.query("10:00:01:00")?, "01:00:01:00");
//!
//! let fps = Fps::new(24)?;
//! assert_eq!(sequence.fps(), fps);
//! # Ok::<(), edl_core::CoreError>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(clippy::all)]
#![deny(unsafe_code)]

pub mod analysis;
pub mod builder;
pub mod matchback;
pub mod parser;
pub mod timecode;
pub mod tokenizer;
pub mod utils;

pub use analysis::EdlSummary;
pub use builder::{BuildOptions, BuiltEdl, EdlBuilder};
pub use matchback::{Direction, MatchOptions, TcMatcher};
pub use parser::{EdlSequence, EdlStats, Event};
pub use timecode::Fps;
pub use tokenizer::{parse_resolve_markers, tokenize, Marker, Row, TokenizeOptions};
pub use utils::{CoreError, ErrorKind, Result, Shape, Shaped};

/// Crate version, reported in summary titles
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn text_flows_through_every_stage() {
        let text = "TITLE: demo\n\
                    001  AX  V  C  01:00:00:00 01:00:02:00 00:00:00:00 00:00:02:00\n\
                    002  BL  V  C  00:00:00:00 00:00:01:00 00:00:02:00 00:00:03:00\n";
        let sequence = EdlSequence::parse(text, Some(Fps::new(25).unwrap())).unwrap();

        let reverse = TcMatcher::new(&sequence, Direction::Reverse, MatchOptions::default()).unwrap();
        assert_eq!(reverse.query("01:00:01:00").unwrap(), "00:00:01:00");

        let summary = EdlSummary::compute(&sequence);
        assert_eq!(summary.source_length, 50);
        assert_eq!(summary.edit_length, 75);
        assert!(summary.to_string().contains("Warning: source length != edit length"));
    }

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
