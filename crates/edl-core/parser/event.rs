//! Frame-resolved EDL events

/// Source token used for black and filler edits
pub const FILLER_SOURCE: &str = "BL";

/// One edit event with its timecodes resolved to frame counts
///
/// Ranges are half-open: an event covers source frames `[src_in, src_out)`
/// and record frames `[rec_in, rec_out)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    /// Event number as written in the EDL, e.g. `"003"`
    pub label: String,
    /// Numeric value of the event number
    pub number: i64,
    /// Resolved source name
    pub source: String,
    /// Track designator
    pub track: String,
    /// Edit type: `"C"`, `"D 024"`, ...
    pub kind: String,
    /// First source frame
    pub src_in: i64,
    /// Source frame after the last one used
    pub src_out: i64,
    /// First record frame
    pub rec_in: i64,
    /// Record frame after the last one used
    pub rec_out: i64,
    /// `M2` motion speed in frames per second, if any
    pub speed: Option<f64>,
}

impl Event {
    /// Source span in frames
    #[must_use]
    pub const fn src_len(&self) -> i64 {
        self.src_out - self.src_in
    }

    /// Record span in frames
    #[must_use]
    pub const fn rec_len(&self) -> i64 {
        self.rec_out - self.rec_in
    }

    /// Whether the source is black/filler
    #[must_use]
    pub fn is_filler(&self) -> bool {
        self.source == FILLER_SOURCE
    }

    /// Whether the edit type is a dissolve
    #[must_use]
    pub fn is_dissolve(&self) -> bool {
        self.kind.starts_with('D')
    }

    /// Whether the event covers no record time
    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.rec_in == self.rec_out
    }

    /// Whether the event carries a motion effect
    #[must_use]
    pub const fn is_motion(&self) -> bool {
        self.speed.is_some()
    }

    /// Whether `frame` lies in `[rec_in, rec_out)`
    #[must_use]
    pub const fn covers_record(&self, frame: i64) -> bool {
        frame >= self.rec_in && frame < self.rec_out
    }

    /// Whether `frame` lies in `[src_in, src_out)`
    #[must_use]
    pub const fn covers_source(&self, frame: i64) -> bool {
        frame >= self.src_in && frame < self.src_out
    }
}
