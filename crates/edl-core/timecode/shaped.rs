//! Shape-polymorphic timecode functions
//!
//! Spreadsheet-style entry points over the scalar codec. Each one validates
//! its rate and offset arguments up front, then maps the scalar operation
//! over the input [`Shape`] with [`map_shape`]. Frame inputs are taken as
//! `f64` so a fractional value is reported as `IntegerExpected` at its own
//! position rather than being rejected by the type system.

use super::{check_fps, check_integer, convert, format, offset, parse, split_frames, to_duration, Fps};
use crate::utils::errors::Result;
use crate::utils::shape::{map_shape, Shape, Shaped};

/// Component selector for [`frame_component`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    /// Frames within the second
    Frames,
    /// Seconds within the minute
    Seconds,
    /// Minutes within the hour
    Minutes,
    /// Minutes since zero
    TotalMinutes,
    /// Whole hours
    Hours,
}

/// Timecode text to frame count
///
/// # Errors
///
/// Fails on an invalid or fractional `fps`, or on a malformed top-level
/// scalar timecode.
pub fn tc_to_frame(input: &Shape<String>, fps: f64) -> Result<Shaped<i64>> {
    let fps = Fps::try_from_f64(fps)?;
    map_shape(input, &|tc: &String| parse(tc, fps))
}

/// Frame count to wrapped timecode text
///
/// # Errors
///
/// Fails on an invalid `fps` or a fractional top-level scalar.
pub fn frame_to_tc(input: &Shape<f64>, fps: f64) -> Result<Shaped<String>> {
    let fps = Fps::try_from_f64(fps)?;
    map_shape(input, &|frames: &f64| check_integer(*frames).map(|f| format(f, fps)))
}

/// Frame count to free-form duration text
///
/// Fractional rates are accepted here.
///
/// # Errors
///
/// Fails on a non-positive `fps` or a fractional top-level scalar.
pub fn frame_to_duration(input: &Shape<f64>, fps: f64) -> Result<Shaped<String>> {
    let fps = check_fps(fps, true)?;
    map_shape(input, &|frames: &f64| to_duration(check_integer(*frames)?, fps))
}

/// Shift timecodes by a whole number of frames
///
/// # Errors
///
/// Fails on an invalid `fps`, a fractional `frames` offset, or a malformed
/// top-level scalar timecode.
pub fn tc_offset(input: &Shape<String>, frames: f64, fps: f64) -> Result<Shaped<String>> {
    let fps = Fps::try_from_f64(fps)?;
    let frames = check_integer(frames)?;
    map_shape(input, &|tc: &String| offset(tc, frames, fps))
}

/// Re-express timecodes at another frame rate
///
/// # Errors
///
/// Fails on an invalid rate on either side, or a malformed top-level scalar
/// timecode.
pub fn tc_conv(input: &Shape<String>, from: f64, to: f64) -> Result<Shaped<String>> {
    let from = Fps::try_from_f64(from)?;
    let to = Fps::try_from_f64(to)?;
    map_shape(input, &|tc: &String| convert(tc, from, to))
}

/// Extract one component of frame counts
///
/// # Errors
///
/// Fails on an invalid `fps` or a fractional top-level scalar.
pub fn frame_component(input: &Shape<f64>, component: Component, fps: f64) -> Result<Shaped<i64>> {
    let fps = Fps::try_from_f64(fps)?;
    map_shape(input, &|frames: &f64| {
        let parts = split_frames(check_integer(*frames)?, fps);
        Ok(match component {
            Component::Frames => parts.frames,
            Component::Seconds => parts.seconds,
            Component::Minutes => parts.minutes,
            Component::TotalMinutes => parts.total_minutes,
            Component::Hours => parts.hours,
        })
    })
}
