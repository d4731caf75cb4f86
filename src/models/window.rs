//! View windows.
//!
//! A window is the 24-hour span the board shows for one day. Two views
//! exist: the operational shift (06:00 to 06:00 next day) and the plain
//! calendar day (00:00 to 00:00).
//!
//! # Time Model
//! Window bounds are absolute instants (`DateTime<Utc>`). The local calendar
//! day is resolved through a fixed UTC offset, so every window is exactly
//! 1440 minutes long; daylight-saving shifts are not modeled.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::Job;

/// Local hour a shift window starts at.
pub const SHIFT_START_HOUR: u32 = 6;

/// Length of every window (minutes).
pub const WINDOW_MINUTES: i64 = 24 * 60;

/// How the day is cut into a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Operational shift day, starting at the shift hour.
    #[default]
    Shift,
    /// Midnight to midnight.
    Calendar,
}

/// A 24-hour view window `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Window start (inclusive).
    pub start: DateTime<Utc>,
    /// Window end (exclusive).
    pub end: DateTime<Utc>,
    /// View the window was computed for.
    pub mode: ViewMode,
    /// Local hour at `start` (first entry of the hour sequence).
    pub start_hour: u32,
}

impl TimeWindow {
    /// Computes the window for a local calendar date.
    ///
    /// Shift windows start at 06:00 local on `date` regardless of the time
    /// of day the caller has in mind; calendar windows start at midnight.
    ///
    /// ```
    /// use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
    /// use stand_schedule::models::{TimeWindow, ViewMode};
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
    /// let utc = FixedOffset::east_opt(0).unwrap();
    /// let w = TimeWindow::compute(date, ViewMode::Shift, utc);
    /// assert_eq!(w.start, Utc.with_ymd_and_hms(2024, 1, 10, 6, 0, 0).unwrap());
    /// assert_eq!(w.end, Utc.with_ymd_and_hms(2024, 1, 11, 6, 0, 0).unwrap());
    /// ```
    pub fn compute(date: NaiveDate, mode: ViewMode, offset: FixedOffset) -> Self {
        Self::compute_with_shift_start(date, mode, offset, SHIFT_START_HOUR)
    }

    /// Computes the window with a custom shift start hour.
    ///
    /// `shift_start_hour` is taken modulo 24 and ignored in calendar mode.
    pub fn compute_with_shift_start(
        date: NaiveDate,
        mode: ViewMode,
        offset: FixedOffset,
        shift_start_hour: u32,
    ) -> Self {
        let start_hour = match mode {
            ViewMode::Shift => shift_start_hour % 24,
            ViewMode::Calendar => 0,
        };

        let local_midnight = date.and_time(NaiveTime::default());
        let local_start = local_midnight
            .checked_add_signed(TimeDelta::hours(i64::from(start_hour)))
            .unwrap_or(local_midnight);
        let start = local_to_utc(local_start, offset);
        let end = start
            .checked_add_signed(TimeDelta::minutes(WINDOW_MINUTES))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            start,
            end,
            mode,
            start_hour,
        }
    }

    /// Computes the window for the local day containing `anchor`.
    ///
    /// Seconds and sub-seconds of the anchor never matter: only its local
    /// date is used.
    pub fn containing(anchor: DateTime<Utc>, mode: ViewMode, offset: FixedOffset) -> Self {
        Self::compute(local_date(anchor, offset), mode, offset)
    }

    /// Window length in whole minutes.
    #[inline]
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Whether an instant falls within `[start, end)`.
    #[inline]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }

    /// Whether `[start, end)` intersects the window.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end && end > self.start
    }

    /// Displayed hour sequence (24 entries, starting at `start_hour`).
    pub fn hours(&self) -> Vec<u32> {
        rotated_hours(self.start_hour)
    }

    /// The window of the following day.
    pub fn next(&self) -> Self {
        self.shifted(TimeDelta::minutes(WINDOW_MINUTES))
    }

    /// The window of the preceding day.
    pub fn previous(&self) -> Self {
        self.shifted(TimeDelta::minutes(-WINDOW_MINUTES))
    }

    fn shifted(&self, delta: TimeDelta) -> Self {
        match (
            self.start.checked_add_signed(delta),
            self.end.checked_add_signed(delta),
        ) {
            (Some(start), Some(end)) => Self {
                start,
                end,
                ..self.clone()
            },
            _ => self.clone(),
        }
    }
}

/// Displayed hour sequence for a view.
///
/// Shift with the default start hour: `[6, 7, ..., 23, 0, ..., 5]`.
/// Calendar: `[0, 1, ..., 23]`, whatever `shift_start_hour` is.
pub fn hour_sequence(mode: ViewMode, shift_start_hour: u32) -> Vec<u32> {
    match mode {
        ViewMode::Shift => rotated_hours(shift_start_hour % 24),
        ViewMode::Calendar => rotated_hours(0),
    }
}

fn rotated_hours(first: u32) -> Vec<u32> {
    (0..24).map(|i| (first + i) % 24).collect()
}

/// 12-hour header label for a clock hour (`12AM`, `6AM`, `12PM`, `5PM`).
pub fn hour_label(hour: u32) -> String {
    let hour = hour % 24;
    let suffix = if hour >= 12 { "PM" } else { "AM" };
    let display = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{display}{suffix}")
}

/// Local calendar date of an instant under a fixed offset.
pub fn local_date(instant: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    instant.with_timezone(&offset).date_naive()
}

fn local_to_utc(local: NaiveDateTime, offset: FixedOffset) -> DateTime<Utc> {
    let utc = local
        .checked_sub_signed(TimeDelta::seconds(i64::from(offset.local_minus_utc())))
        .unwrap_or(local);
    DateTime::from_naive_utc_and_offset(utc, Utc)
}

/// Jobs whose interval intersects the window, ordered by start.
///
/// Status is not filtered: finished and cancelled jobs are still drawn.
pub fn jobs_in_window<'a>(jobs: &'a [Job], window: &TimeWindow) -> Vec<&'a Job> {
    let mut visible: Vec<&Job> = jobs
        .iter()
        .filter(|j| window.overlaps(j.start_datetime, j.end_datetime()))
        .collect();
    visible.sort_by(|a, b| a.start_datetime.cmp(&b.start_datetime));
    visible
}

/// Jobs of one machine lane, keeping the input order.
pub fn lane_jobs<'a>(jobs: &[&'a Job], machine_id: &str, lane_index: u8) -> Vec<&'a Job> {
    jobs.iter()
        .copied()
        .filter(|j| j.machine_id == machine_id && j.lane_index == lane_index)
        .collect()
}
