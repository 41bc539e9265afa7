//! Dissolve and motion reconciliation over the record-sorted event list
//!
//! A dissolve is written as a zero-length "from" event followed by the
//! incoming `D nnn` event. The transition frames are folded back into the
//! event that precedes the zero-length one, and reverse-motion events get
//! their source in point re-derived from their source out point.

use tracing::trace;

use super::event::Event;
use crate::timecode::Fps;
use crate::utils::errors::{CoreError, Result};
use crate::utils::{leading_integer, round_half_up};

/// Counters gathered while reconciling
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Reconciled {
    pub record_overlaps: usize,
    pub dissolve_count: usize,
    pub dissolve_length: i64,
}

/// Walk the sorted events once, merging dissolves and fixing reverse motion
///
/// # Errors
///
/// Returns [`CoreError::InvalidEdl`] on a length mismatch outside motion
/// effects, on a zero or negative length that is not the first half of a
/// dissolve, or on an unreadable dissolve duration.
pub(crate) fn reconcile(events: &mut [Event], fps: Fps) -> Result<Reconciled> {
    let mut totals = Reconciled::default();

    for idx in 0..events.len() {
        if idx > 0 && events[idx].rec_in < events[idx - 1].rec_out && !events[idx].is_dissolve() {
            totals.record_overlaps += 1;
        }

        let current = &events[idx];
        if !current.is_motion() && current.src_len() != current.rec_len() {
            return Err(CoreError::invalid_edl(format!(
                "source length ({}) does not match record length ({}) on event # {} - check frame rate",
                current.src_len(),
                current.rec_len(),
                current.label
            )));
        }

        if current.src_len() < 1 {
            let duration = dissolve_duration(events, idx)?;
            extend_previous(events, idx, duration, fps)?;
            totals.dissolve_count += 1;
            totals.dissolve_length += duration;
            trace!(event = %events[idx].label, duration, "merged dissolve");
        }

        fix_reverse_in_point(&mut events[idx], fps);
    }

    Ok(totals)
}

fn dissolve_duration(events: &[Event], idx: usize) -> Result<i64> {
    let current = &events[idx];
    let next = events
        .get(idx + 1)
        .filter(|next| next.is_dissolve() && idx > 0 && current.src_len() >= 0);

    let Some(next) = next else {
        return Err(CoreError::invalid_edl(format!(
            "invalid length detected on event # {}",
            current.label
        )));
    };

    next.kind.get(2..).and_then(leading_integer).ok_or_else(|| {
        CoreError::invalid_edl(format!(
            "invalid dissolve duration (no integer:{}) on event {}",
            next.kind, current.label
        ))
    })
}

/// Add the dissolve frames to the event before `idx`
fn extend_previous(events: &mut [Event], idx: usize, duration: i64, fps: Fps) -> Result<()> {
    let current_speed = events[idx].speed;
    let current_out = events[idx].src_out;
    let previous = &mut events[idx - 1];

    previous.rec_out += duration;
    match previous.speed {
        None => previous.src_out += duration,
        Some(speed) if speed > 0.0 => {
            let ratio = current_speed.unwrap_or(speed) / f64::from(fps.get());
            let scaled = (previous.src_in + 1) as f64 + previous.rec_len() as f64 * ratio;
            previous.src_out = scaled.trunc() as i64;
            if previous.src_out < current_out {
                return Err(CoreError::invalid_edl(
                    "Dissolve on M2 adjustment sanity check failure",
                ));
            }
        }
        Some(_) => fix_reverse_in_point(previous, fps),
    }
    Ok(())
}

/// Re-derive the source in point of a reverse-motion event
pub(crate) fn fix_reverse_in_point(event: &mut Event, fps: Fps) {
    let Some(speed) = event.speed.filter(|speed| *speed < 0.0) else {
        return;
    };
    if event.src_len() > 0 {
        let span = event.rec_len() as f64 * -speed / f64::from(fps.get());
        event.src_in = event.src_out - round_half_up(span);
    }
}

/// Count events whose source range starts inside the previous one in
/// source order, ignoring null events and filler
pub(crate) fn count_source_overlaps(events: &[Event]) -> usize {
    let mut by_source: Vec<&Event> = events.iter().collect();
    by_source.sort_by_key(|event| event.src_in);

    by_source
        .windows(2)
        .filter(|pair| {
            let (previous, current) = (pair[0], pair[1]);
            !current.is_null()
                && current.src_in < previous.src_out
                && !current.is_filler()
                && !previous.is_filler()
        })
        .count()
}

/// Most events covering any one source frame, names and filler included
pub(crate) fn max_source_depth(events: &[Event]) -> usize {
    let mut edges: Vec<(i64, isize)> = events
        .iter()
        .filter(|event| event.src_len() > 0)
        .flat_map(|event| [(event.src_in, 1), (event.src_out, -1)])
        .collect();
    // an out point sorts before an in point on the same frame
    edges.sort_unstable();

    let mut depth: isize = 0;
    let mut deepest: isize = 0;
    for (_, step) in edges {
        depth += step;
        deepest = deepest.max(depth);
    }
    deepest.unsigned_abs()
}
