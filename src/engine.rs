//! Scheduling facade.
//!
//! [`PlacementEngine`] bundles the window calculator, projector, conflict
//! resolver and lane allocator behind one configured entry point. It holds
//! only immutable configuration, so a single instance can be shared across
//! threads without locking.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

use crate::config::SchedulerConfig;
use crate::error::Result;
use crate::models::{default_duration, local_date, Job, TimeWindow, ViewMode};
use crate::placement::{self, PlacementCandidate, Projection, Verdict};
use crate::snapshot::{Mutation, Snapshot, SnapshotVersion};
use crate::validation::{self, ValidationResult};

/// Configured entry point to the placement engines.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use stand_schedule::engine::PlacementEngine;
/// use stand_schedule::models::{Job, Machine, TestType};
/// use stand_schedule::placement::PlacementCandidate;
/// use stand_schedule::snapshot::Snapshot;
///
/// let engine = PlacementEngine::default();
/// let eight = Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap();
/// let snapshot = Snapshot::new(
///     vec![Machine::dual("ETT2")],
///     vec![TestType::new("burn-in", 4.0)],
///     vec![Job::new("j0", "SN-0", "ETT2", eight, 4.0).with_test_type("burn-in")],
/// );
///
/// let lane = engine.allocate_lane("ETT2", eight, 4.0, &snapshot, None);
/// assert_eq!(lane, Some(1));
///
/// let candidate = PlacementCandidate::new("ETT2", eight, 4.0).on_lane(1);
/// assert!(engine.validate_placement(&candidate, &snapshot).is_accepted());
/// ```
#[derive(Debug, Clone)]
pub struct PlacementEngine {
    config: SchedulerConfig,
    offset: FixedOffset,
}

impl PlacementEngine {
    /// Creates an engine from a checked configuration.
    ///
    /// # Errors
    /// [`crate::SchedulingError::InvalidConfig`] if the configuration is out of range.
    pub fn new(config: SchedulerConfig) -> Result<Self> {
        config.validate()?;
        let offset = config.offset()?;
        Ok(Self { config, offset })
    }

    /// The active configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Window for a local date and view.
    pub fn compute_window(&self, date: NaiveDate, mode: ViewMode) -> TimeWindow {
        TimeWindow::compute_with_shift_start(date, mode, self.offset, self.config.shift_start_hour)
    }

    /// Window for the local day containing `anchor`.
    pub fn window_containing(&self, anchor: DateTime<Utc>, mode: ViewMode) -> TimeWindow {
        self.compute_window(local_date(anchor, self.offset), mode)
    }

    /// Window for the local day containing `anchor`, in the default view.
    pub fn default_window(&self, anchor: DateTime<Utc>) -> TimeWindow {
        self.window_containing(anchor, self.config.default_view_mode)
    }

    /// Projects a job onto a window.
    pub fn project_job(&self, job: &Job, window: &TimeWindow) -> Projection {
        placement::project(job.start_datetime, job.duration_hours, window)
    }

    /// Position of the "now" marker, if `now` is inside the window.
    pub fn now_marker(&self, now: DateTime<Utc>, window: &TimeWindow) -> Option<f64> {
        placement::current_time_position(now, window)
    }

    /// Instant under a horizontal position (%) of the window.
    pub fn time_at(&self, percent: f64, window: &TimeWindow) -> DateTime<Utc> {
        placement::time_from_position(percent, window)
    }

    /// Validates a placement against the snapshot's jobs.
    pub fn validate_placement(&self, candidate: &PlacementCandidate, snapshot: &Snapshot) -> Verdict {
        placement::validate(candidate, &snapshot.jobs, &snapshot.machines)
    }

    /// First free lane of a machine for the interval.
    pub fn allocate_lane(
        &self,
        machine_id: &str,
        start: DateTime<Utc>,
        duration_hours: f64,
        snapshot: &Snapshot,
        exclude_job_id: Option<&str>,
    ) -> Option<u8> {
        placement::allocate_lane(
            machine_id,
            start,
            duration_hours,
            &snapshot.jobs,
            &snapshot.machines,
            exclude_job_id,
        )
    }

    /// Duration to pre-fill for a test type on a machine.
    ///
    /// Returns `None` when either id is unknown or the test type requires a
    /// manually entered duration.
    pub fn suggested_duration(
        &self,
        test_type_id: &str,
        machine_id: &str,
        snapshot: &Snapshot,
    ) -> Option<f64> {
        let test_type = snapshot.test_type(test_type_id)?;
        let machine = snapshot.machine(machine_id)?;
        if test_type.requires_manual_duration {
            return None;
        }
        Some(default_duration(test_type, machine.is_dual()))
    }

    /// Field validation of a job under the configured limits.
    pub fn validate_job(&self, job: &Job, snapshot: &Snapshot) -> ValidationResult {
        validation::validate_job(job, &snapshot.machines, &snapshot.test_types, &self.config.limits)
    }

    /// Re-validates and applies a mutation; see [`Snapshot::commit`].
    ///
    /// # Errors
    /// Propagates [`Snapshot::commit`] errors.
    pub fn commit(
        &self,
        snapshot: &Snapshot,
        expected: SnapshotVersion,
        mutation: Mutation,
    ) -> Result<Snapshot> {
        snapshot.commit(expected, mutation, &self.config.limits)
    }
}

impl Default for PlacementEngine {
    fn default() -> Self {
        Self {
            config: SchedulerConfig::default(),
            offset: Utc.fix(),
        }
    }
}
