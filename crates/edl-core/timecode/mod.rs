//! Timecode codec for integer frame rates
//!
//! Converts between colon-separated `HH:MM:SS:FF` timecodes and absolute
//! frame counts. Shorter forms are right-aligned, so `"1:00"` is one second
//! and `"12"` is twelve frames. Formatting wraps at 24 hours, which makes
//! negative frame counts land on the previous day.
//!
//! Drop-frame timecode is not supported; every rate is a whole number of
//! frames per second.
//!
//! # Example
//!
//! ```rust
//! use edl_core::timecode::{self, Fps};
//!
//! let fps = Fps::new(24)?;
//! assert_eq!(timecode::parse("01:00:00:00", fps)?, 86400);
//! assert_eq!(timecode::format(-1, fps), "23:59:59:23");
//! assert_eq!(timecode::convert("01:00:00:00", fps, Fps::new(25)?)?, "00:57:36:00");
//! # Ok::<(), edl_core::CoreError>(())
//! ```

pub mod shaped;

use core::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::utils::errors::{CoreError, Result};

/// Seconds in a day, the wraparound period of displayed timecodes
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Bounds of the frames/seconds/minutes/hours components, right to left
const UPPER_BOUNDS: [i64; 3] = [59, 59, 23];

/// Largest integer an `f64` represents exactly
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_991.0;

/// Positive integer frame rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fps(u32);

impl Fps {
    /// Create a frame rate, rejecting zero
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidFps`] when `fps` is zero.
    pub fn new(fps: u32) -> Result<Self> {
        if fps == 0 {
            return Err(CoreError::invalid_fps(format!("fps must be > 0 ({fps}) given")));
        }
        Ok(Self(fps))
    }

    /// Create a frame rate from a loosely typed number
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidFps`] for non-positive or fractional rates.
    pub fn try_from_f64(fps: f64) -> Result<Self> {
        let checked = check_fps(fps, false)?;
        if checked > f64::from(u32::MAX) {
            return Err(CoreError::invalid_fps(format!("fps out of range ({fps}) given")));
        }
        Self::new(checked as u32)
    }

    /// Frames per second
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Frames per second as a signed frame count
    #[must_use]
    pub const fn frames(self) -> i64 {
        self.0 as i64
    }

    /// Frames in 24 hours, the display wraparound modulus
    #[must_use]
    pub const fn frames_per_day(self) -> i64 {
        SECONDS_PER_DAY * self.0 as i64
    }
}

impl fmt::Display for Fps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<f64> for Fps {
    type Error = CoreError;

    fn try_from(fps: f64) -> Result<Self> {
        Self::try_from_f64(fps)
    }
}

/// Validate a frame rate
///
/// Fractional rates are only accepted when `allow_fractional` is set, which
/// is reserved for duration rendering.
///
/// # Errors
///
/// Returns [`CoreError::InvalidFps`] when `fps` is not a finite number > 0,
/// or when it is fractional and fractions are not allowed.
pub fn check_fps(fps: f64, allow_fractional: bool) -> Result<f64> {
    if !fps.is_finite() || fps <= 0.0 {
        return Err(CoreError::invalid_fps(format!("fps must be > 0 ({fps}) given")));
    }
    if !allow_fractional && fps.fract() != 0.0 {
        return Err(CoreError::invalid_fps(format!(
            "fractional fps are not supported yet! ({fps}) given"
        )));
    }
    Ok(fps)
}

/// Validate that a number is whole
///
/// # Errors
///
/// Returns [`CoreError::IntegerExpected`] for fractional, infinite or NaN
/// values and for values beyond the exactly representable range.
pub fn check_integer(value: f64) -> Result<i64> {
    if !value.is_finite() || value.fract() != 0.0 || value.abs() > MAX_EXACT_FLOAT {
        return Err(CoreError::integer_expected(&value.to_string()));
    }
    Ok(value as i64)
}

/// Parse text holding exactly one integer, with nothing around it
///
/// # Errors
///
/// Returns [`CoreError::IntegerExpected`] for `"86400 garbage"`, `"+1"`,
/// `"007"` and anything else that does not print back identically.
pub fn parse_integer(text: &str) -> Result<i64> {
    match text.parse::<i64>() {
        Ok(value) if value.to_string() == text => Ok(value),
        _ => Err(CoreError::integer_expected(text)),
    }
}

/// Timecode grammar: up to four 1-2 digit groups, then optional free text
///
/// The timecode must start the text. Free text may span several lines, but
/// a timecode that only appears on a later line is not searched for.
fn timecode_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^((?:[0-9]{1,2}:){0,3}[0-9]{1,2})(?:\s.*)?$")
            .unwrap_or_else(|err| unreachable!("timecode pattern is valid: {err}"))
    })
}

/// Extract the timecode part of `text`, dropping trailing free text
///
/// # Errors
///
/// Returns [`CoreError::InvalidTimecode`] if `text` does not start with a
/// timecode followed by either nothing or whitespace.
pub fn clean(text: &str) -> Result<&str> {
    timecode_regex()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| {
            CoreError::invalid_timecode(format!("\"{text}\" does not seem to be a valid TC."))
        })
}

/// Convert a timecode to an absolute frame count
///
/// Components are validated right to left: frames must be below `fps`,
/// seconds and minutes at most 59, hours at most 23.
///
/// # Errors
///
/// Returns [`CoreError::InvalidTimecode`] for malformed text or a component
/// out of range.
pub fn parse(text: &str, fps: Fps) -> Result<i64> {
    let timecode = clean(text)?;
    let mut total = 0_i64;
    let mut unit = 1_i64;

    for (idx, component) in timecode.rsplit(':').enumerate() {
        let value: i64 = component.parse().map_err(|_| illegal(component))?;
        let bound = if idx == 0 {
            fps.frames() - 1
        } else {
            UPPER_BOUNDS[idx - 1]
        };
        if value > bound {
            return Err(illegal(component));
        }

        total += value * unit;
        unit *= if idx == 0 { fps.frames() } else { 60 };
    }

    Ok(total)
}

fn illegal(component: &str) -> CoreError {
    CoreError::invalid_timecode(format!("Illegal \"{component}\" found in TC"))
}

/// Format a frame count as `HH:MM:SS:FF`, wrapping at 24 hours
#[must_use]
pub fn format(frames: i64, fps: Fps) -> String {
    let wrapped = frames.rem_euclid(fps.frames_per_day());
    let parts = split_frames(wrapped, fps);
    format!(
        "{:02}:{:02}:{:02}:{:02}",
        parts.hours, parts.minutes, parts.seconds, parts.frames
    )
}

/// Re-render a timecode in canonical zero-padded form
///
/// # Errors
///
/// Returns [`CoreError::InvalidTimecode`] when `text` does not parse.
pub fn normalize(text: &str, fps: Fps) -> Result<String> {
    parse(text, fps).map(|frames| format(frames, fps))
}

/// Shift a timecode by a signed number of frames
///
/// # Errors
///
/// Returns [`CoreError::InvalidTimecode`] when `text` does not parse.
pub fn offset(text: &str, frames: i64, fps: Fps) -> Result<String> {
    parse(text, fps).map(|base| format(base + frames, fps))
}

/// Re-express a timecode at another frame rate, keeping its frame count
///
/// # Errors
///
/// Returns [`CoreError::InvalidTimecode`] when `text` does not parse at
/// `from`.
pub fn convert(text: &str, from: Fps, to: Fps) -> Result<String> {
    parse(text, from).map(|frames| format(frames, to))
}

/// Render a frame count as a free-form duration such as `01h 00m 0.04s`
///
/// Hours do not wrap. Seconds carry their fraction rounded half-up to two
/// decimals with a 1e-6 nudge against float error.
///
/// Negative frame counts give negative components that keep their sign in
/// front, so one hour back renders as `-1h 00m 0s`.
///
/// # Errors
///
/// Returns [`CoreError::InvalidFps`] when `fps` is not > 0. Fractional
/// rates are accepted here.
pub fn to_duration(frames: i64, fps: f64) -> Result<String> {
    let fps = check_fps(fps, true)?;
    let exact = frames as f64 / fps;
    let whole = exact.trunc() as i64;
    let fraction = exact - whole as f64;

    let seconds = whole % 60;
    let minutes = (whole % 3600) / 60;
    let hours = whole / 3600;

    let mut rounded = (((seconds as f64 + fraction + 1e-6) * 100.0) + 0.5).floor() / 100.0;
    if rounded == 0.0 {
        rounded = 0.0;
    }

    Ok(format!("{hours:02}h {minutes:02}m {rounded}s"))
}

/// Components of a frame count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameComponents {
    /// Whole hours, unbounded
    pub hours: i64,
    /// Minutes within the hour
    pub minutes: i64,
    /// Minutes since zero, not reduced modulo 60
    pub total_minutes: i64,
    /// Seconds within the minute
    pub seconds: i64,
    /// Frames within the second
    pub frames: i64,
}

/// Split a frame count into its components without wrapping
///
/// Remainders keep the sign of `frames`, so a negative count yields
/// non-positive components.
#[must_use]
pub const fn split_frames(frames: i64, fps: Fps) -> FrameComponents {
    let rate = fps.frames();
    let frame = frames % rate;
    let whole_seconds = (frames - frame) / rate;
    let seconds = whole_seconds % 60;
    let total_minutes = (whole_seconds - seconds) / 60;
    let minutes = total_minutes % 60;
    let hours = (total_minutes - minutes) / 60;

    FrameComponents {
        hours,
        minutes,
        total_minutes,
        seconds,
        frames: frame,
    }
}

#[cfg(test)]
mod tests;
