//! Job model.
//!
//! A job is one test run of a workpiece on a machine lane. It occupies the
//! half-open interval `[start, start + duration)`.
//!
//! # Status Lifecycle
//!
//! ```text
//! scheduled ──▶ running ──▶ completed
//!     │            │
//!     └────────────┴──────▶ cancelled
//! ```
//!
//! `completed` and `cancelled` are terminal. Terminal jobs are inert: they
//! never block a placement.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Largest duration representable as a job interval (100 years, ms).
const MAX_DELTA_MS: f64 = 100.0 * 365.0 * 24.0 * 3_600_000.0;

/// A scheduled test run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Unique job identifier.
    pub id: String,
    /// Workpiece identifier (shop order / serial number).
    pub serial_number: String,
    /// Test type being run.
    pub test_type_id: String,
    /// Machine the job runs on.
    pub machine_id: String,
    /// Lane on the machine (always 0 on single-lane machines).
    pub lane_index: u8,
    /// Absolute start instant.
    pub start_datetime: DateTime<Utc>,
    /// Run length (hours).
    pub duration_hours: f64,
    /// Lifecycle state.
    pub status: JobStatus,
    /// Operator notes.
    pub notes: Option<String>,
    /// Opaque identifier of the creator, for audit.
    pub created_by: Option<String>,
}

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Planned, not started.
    #[default]
    Scheduled,
    /// Currently on the stand.
    Running,
    /// Finished (terminal).
    Completed,
    /// Withdrawn (terminal).
    Cancelled,
}

impl JobStatus {
    /// Whether jobs in this state hold their slot.
    #[inline]
    pub fn is_active(self) -> bool {
        matches!(self, JobStatus::Scheduled | JobStatus::Running)
    }

    /// Whether no further transition is allowed.
    #[inline]
    pub fn is_terminal(self) -> bool {
        !self.is_active()
    }

    /// Whether moving from `self` to `next` follows the lifecycle.
    ///
    /// Staying in the same state is allowed.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        use JobStatus::{Cancelled, Completed, Running, Scheduled};

        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (Scheduled, Running)
                | (Running, Completed)
                | (Scheduled, Cancelled)
                | (Running, Cancelled)
        )
    }

    /// Lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Scheduled => "scheduled",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Job {
    /// Creates a scheduled job on lane 0.
    pub fn new(
        id: impl Into<String>,
        serial_number: impl Into<String>,
        machine_id: impl Into<String>,
        start_datetime: DateTime<Utc>,
        duration_hours: f64,
    ) -> Self {
        Self {
            id: id.into(),
            serial_number: serial_number.into(),
            test_type_id: String::new(),
            machine_id: machine_id.into(),
            lane_index: 0,
            start_datetime,
            duration_hours,
            status: JobStatus::Scheduled,
            notes: None,
            created_by: None,
        }
    }

    /// Sets the test type.
    pub fn with_test_type(mut self, test_type_id: impl Into<String>) -> Self {
        self.test_type_id = test_type_id.into();
        self
    }

    /// Sets the lane.
    pub fn with_lane(mut self, lane_index: u8) -> Self {
        self.lane_index = lane_index;
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Sets the audit creator.
    pub fn with_creator(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = Some(created_by.into());
        self
    }

    /// Derived end instant: `start + duration`.
    pub fn end_datetime(&self) -> DateTime<Utc> {
        end_of(self.start_datetime, self.duration_hours)
    }

    /// The occupied interval `[start, end)`.
    pub fn interval(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.start_datetime, self.end_datetime())
    }

    /// Whether this job's interval intersects `[start, end)`.
    ///
    /// Abutting intervals do not overlap.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_datetime < end && self.end_datetime() > start
    }

    /// Whether this job holds its slot (scheduled or running).
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// Converts fractional hours to a time delta at millisecond resolution.
///
/// Non-finite input maps to zero; magnitudes are capped at 100 years.
pub fn hours_to_delta(hours: f64) -> TimeDelta {
    if !hours.is_finite() {
        return TimeDelta::zero();
    }
    let ms = (hours * 3_600_000.0).round().clamp(-MAX_DELTA_MS, MAX_DELTA_MS);
    TimeDelta::milliseconds(ms as i64)
}

/// End of an interval starting at `start` and lasting `hours`.
///
/// Saturates at the representable bounds instead of overflowing.
pub fn end_of(start: DateTime<Utc>, hours: f64) -> DateTime<Utc> {
    let delta = hours_to_delta(hours);
    start.checked_add_signed(delta).unwrap_or(if delta < TimeDelta::zero() {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}
