//! Projection of job intervals onto a view window.
//!
//! Converts absolute job intervals into percentage geometry relative to the
//! window width.
//!
//! # Algorithm
//!
//! With `wm` the window length and offsets in whole minutes from the window
//! start:
//!
//! 1. Job starts before the window: one segment from 0%, clipped to the
//!    window.
//! 2. Job runs past the window end: two segments. The first runs from the
//!    job start to 100%; the second wraps to 0% and carries the overflow
//!    (capped at 100%).
//! 3. Otherwise: one segment at the job's offset.
//!
//! Minute differences truncate toward zero, so sub-minute parts of the job
//! start are ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{end_of, TimeWindow};

/// A horizontal bar segment, in percent of the window width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Offset from the window start (%).
    pub left_percent: f64,
    /// Width (%), never negative.
    pub width_percent: f64,
}

impl Segment {
    /// Right edge (%).
    #[inline]
    pub fn right_percent(&self) -> f64 {
        self.left_percent + self.width_percent
    }
}

/// Result of projecting a job onto a window.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Projection {
    /// One segment, or two when the job wraps past the window end.
    pub segments: Vec<Segment>,
    /// Whether the job continues past the window end.
    pub is_wrapped: bool,
}

impl Projection {
    /// The segment anchored at the job start.
    pub fn primary(&self) -> Option<&Segment> {
        self.segments.first()
    }

    /// Sum of segment widths (%).
    pub fn total_width(&self) -> f64 {
        self.segments.iter().map(|s| s.width_percent).sum()
    }

    /// Whether nothing of the job is visible.
    pub fn is_empty(&self) -> bool {
        self.total_width() <= 0.0
    }
}

/// Projects `[job_start, job_start + duration_hours)` onto the window.
///
/// A degenerate window (zero or negative length) yields no segments.
/// Negative or non-finite durations are treated as zero.
///
/// ```
/// use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
/// use stand_schedule::models::{TimeWindow, ViewMode};
/// use stand_schedule::placement::project;
///
/// let w = TimeWindow::compute(
///     NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
///     ViewMode::Shift,
///     FixedOffset::east_opt(0).unwrap(),
/// );
/// // 05:30 next morning, one hour: wraps
/// let start = Utc.with_ymd_and_hms(2024, 1, 11, 5, 30, 0).unwrap();
/// let p = project(start, 1.0, &w);
/// assert!(p.is_wrapped);
/// assert_eq!(p.segments.len(), 2);
/// ```
pub fn project(job_start: DateTime<Utc>, duration_hours: f64, window: &TimeWindow) -> Projection {
    let window_minutes = window.duration_minutes() as f64;
    if window_minutes <= 0.0 {
        return Projection::default();
    }

    let duration_minutes = if duration_hours.is_finite() {
        (duration_hours * 60.0).max(0.0)
    } else {
        0.0
    };
    let start_offset = (job_start - window.start).num_minutes() as f64;
    let end_offset = start_offset + duration_minutes;
    let pct = |minutes: f64| minutes / window_minutes * 100.0;

    if start_offset < 0.0 {
        let visible = end_offset.min(window_minutes).max(0.0);
        return Projection {
            segments: vec![Segment {
                left_percent: 0.0,
                width_percent: pct(visible),
            }],
            is_wrapped: false,
        };
    }

    if end_offset > window_minutes {
        let first = Segment {
            left_percent: pct(start_offset),
            width_percent: pct(window_minutes - start_offset).max(0.0),
        };
        let second = Segment {
            left_percent: 0.0,
            width_percent: pct(end_offset - window_minutes).min(100.0),
        };
        return Projection {
            segments: vec![first, second],
            is_wrapped: true,
        };
    }

    Projection {
        segments: vec![Segment {
            left_percent: pct(start_offset),
            width_percent: pct(duration_minutes),
        }],
        is_wrapped: false,
    }
}

/// Instant at a horizontal position (%) of the window.
///
/// Positions outside 0..=100 extrapolate linearly.
pub fn time_from_position(percent: f64, window: &TimeWindow) -> DateTime<Utc> {
    let window_minutes = window.duration_minutes() as f64;
    let minutes = percent / 100.0 * window_minutes;
    end_of(window.start, minutes / 60.0)
}

/// Position (%) of `now` within the window, for the "now" marker.
///
/// The offset is truncated to whole minutes before the range check, so
/// `now` up to 59 seconds before `start` maps to `Some(0.0)` and up to 59
/// seconds past `end` maps to `Some(100.0)`. Anything further out is `None`.
pub fn current_time_position(now: DateTime<Utc>, window: &TimeWindow) -> Option<f64> {
    let window_minutes = window.duration_minutes();
    if window_minutes <= 0 {
        return None;
    }
    let current = (now - window.start).num_minutes();
    if current < 0 || current > window_minutes {
        return None;
    }
    Some(current as f64 / window_minutes as f64 * 100.0)
}
