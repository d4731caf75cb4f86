//! Placement conflict detection.
//!
//! Decides whether a job may occupy a machine lane during an interval,
//! given every other job on record.
//!
//! # Policy
//!
//! Only active jobs (scheduled, running) on the candidate's machine count;
//! the job being edited is excluded. Intervals are half-open, so a job
//! ending at 10:00 does not block one starting at 10:00.
//!
//! - Single-lane machine: any overlap rejects.
//! - Dual-lane machine: an overlap in the same lane rejects. Independently,
//!   two or more overlapping jobs anywhere on the machine reject, which holds
//!   the two-job limit even if lane bookkeeping is wrong.
//!
//! Checks never look at a view window: jobs conflict whether or not they
//! are visible.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{end_of, find_machine, Capacity, Job, Machine};

/// A proposed placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementCandidate {
    /// Target machine.
    pub machine_id: String,
    /// Target lane.
    pub lane_index: u8,
    /// Proposed start.
    pub start: DateTime<Utc>,
    /// Proposed run length (hours).
    pub duration_hours: f64,
    /// Job to ignore, i.e. the job being moved or resized.
    pub exclude_job_id: Option<String>,
}

impl PlacementCandidate {
    /// Creates a candidate on lane 0.
    pub fn new(machine_id: impl Into<String>, start: DateTime<Utc>, duration_hours: f64) -> Self {
        Self {
            machine_id: machine_id.into(),
            lane_index: 0,
            start,
            duration_hours,
            exclude_job_id: None,
        }
    }

    /// Candidate for re-validating an existing job in place.
    pub fn for_job(job: &Job) -> Self {
        Self {
            machine_id: job.machine_id.clone(),
            lane_index: job.lane_index,
            start: job.start_datetime,
            duration_hours: job.duration_hours,
            exclude_job_id: Some(job.id.clone()),
        }
    }

    /// Sets the lane.
    pub fn on_lane(mut self, lane_index: u8) -> Self {
        self.lane_index = lane_index;
        self
    }

    /// Excludes a job (self when editing).
    pub fn excluding(mut self, job_id: impl Into<String>) -> Self {
        self.exclude_job_id = Some(job_id.into());
        self
    }

    /// Candidate end: `start + duration`.
    pub fn end(&self) -> DateTime<Utc> {
        end_of(self.start, self.duration_hours)
    }
}

/// Why a placement was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    /// The target machine is not in the machine table.
    MachineNotFound,
    /// A single-lane machine is already busy.
    SingleCapacityOverlap,
    /// The target lane of a dual-lane machine is already busy.
    LaneOverlap,
    /// A dual-lane machine already runs two jobs in the interval.
    MachineSaturated,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RejectionReason::MachineNotFound => "machine not found",
            RejectionReason::SingleCapacityOverlap => "single-capacity overlap",
            RejectionReason::LaneOverlap => "lane overlap",
            RejectionReason::MachineSaturated => "machine saturated",
        };
        f.write_str(s)
    }
}

/// A rejected placement and the jobs in the way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    /// Rejection category.
    pub reason: RejectionReason,
    /// Jobs that block the candidate (empty for `MachineNotFound`).
    pub blocking_jobs: Vec<Job>,
    /// Operator-facing description naming the blocking jobs.
    pub message: String,
}

impl Rejection {
    /// Ids of the blocking jobs.
    pub fn blocking_ids(&self) -> Vec<&str> {
        self.blocking_jobs.iter().map(|j| j.id.as_str()).collect()
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Outcome of validating a placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Verdict {
    /// The placement is legal.
    Accepted,
    /// The placement conflicts.
    Rejected(Rejection),
}

impl Verdict {
    /// Whether the placement is legal.
    #[inline]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }

    /// The rejection, if any.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Verdict::Accepted => None,
            Verdict::Rejected(r) => Some(r),
        }
    }

    /// The rejection reason, if any.
    pub fn reason(&self) -> Option<RejectionReason> {
        self.rejection().map(|r| r.reason)
    }

    /// Converts into a `Result` for `?`-style callers.
    pub fn into_result(self) -> Result<(), Rejection> {
        match self {
            Verdict::Accepted => Ok(()),
            Verdict::Rejected(r) => Err(r),
        }
    }
}

/// Validates a candidate placement against the job set.
///
/// `jobs` may include terminal jobs and jobs on other machines; both are
/// ignored.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use stand_schedule::models::{Job, Machine};
/// use stand_schedule::placement::{validate, PlacementCandidate, RejectionReason};
///
/// let machines = vec![Machine::single("M").with_name("FCT1")];
/// let at = |h| Utc.with_ymd_and_hms(2024, 1, 10, h, 0, 0).unwrap();
/// let jobs = vec![Job::new("j1", "SN-1", "M", at(8), 2.0)];
///
/// let v = validate(&PlacementCandidate::new("M", at(9), 2.0), &jobs, &machines);
/// assert_eq!(v.reason(), Some(RejectionReason::SingleCapacityOverlap));
///
/// let v = validate(&PlacementCandidate::new("M", at(10), 1.0), &jobs, &machines);
/// assert!(v.is_accepted());
/// ```
pub fn validate(candidate: &PlacementCandidate, jobs: &[Job], machines: &[Machine]) -> Verdict {
    let Some(machine) = find_machine(machines, &candidate.machine_id) else {
        tracing::debug!(
            machine_id = %candidate.machine_id,
            reason = %RejectionReason::MachineNotFound,
            "placement rejected"
        );
        return Verdict::Rejected(Rejection {
            reason: RejectionReason::MachineNotFound,
            blocking_jobs: Vec::new(),
            message: format!("Machine not found: {}", candidate.machine_id),
        });
    };

    let start = candidate.start;
    let end = candidate.end();

    // Active jobs on this machine overlapping the candidate, self excluded
    let overlapping: Vec<&Job> = jobs
        .iter()
        .filter(|j| j.machine_id == candidate.machine_id)
        .filter(|j| candidate.exclude_job_id.as_deref() != Some(j.id.as_str()))
        .filter(|j| j.is_active())
        .filter(|j| j.overlaps(start, end))
        .collect();

    let rejection = match machine.capacity {
        Capacity::Single => (!overlapping.is_empty()).then(|| Rejection {
            reason: RejectionReason::SingleCapacityOverlap,
            message: format!(
                "{} can only run one job at a time. Conflicts with: {}",
                machine.label(),
                serials(&overlapping)
            ),
            blocking_jobs: owned(&overlapping),
        }),
        Capacity::Dual => {
            let same_lane: Vec<&Job> = overlapping
                .iter()
                .copied()
                .filter(|j| j.lane_index == candidate.lane_index)
                .collect();

            if !same_lane.is_empty() {
                Some(Rejection {
                    reason: RejectionReason::LaneOverlap,
                    message: format!(
                        "Lane {} already has a job during this time. Conflicts with: {}",
                        u32::from(candidate.lane_index) + 1,
                        serials(&same_lane)
                    ),
                    blocking_jobs: owned(&same_lane),
                })
            } else if overlapping.len() >= usize::from(Capacity::Dual.lanes()) {
                Some(Rejection {
                    reason: RejectionReason::MachineSaturated,
                    message: format!(
                        "{} can only run 2 jobs concurrently. Both lanes are occupied.",
                        machine.label()
                    ),
                    blocking_jobs: owned(&overlapping),
                })
            } else {
                None
            }
        }
    };

    match rejection {
        Some(r) => {
            tracing::debug!(
                machine_id = %candidate.machine_id,
                lane_index = candidate.lane_index,
                reason = %r.reason,
                blocking = r.blocking_jobs.len(),
                "placement rejected"
            );
            Verdict::Rejected(r)
        }
        None => {
            tracing::trace!(
                machine_id = %candidate.machine_id,
                lane_index = candidate.lane_index,
                "placement accepted"
            );
            Verdict::Accepted
        }
    }
}

fn serials(jobs: &[&Job]) -> String {
    jobs.iter()
        .map(|j| j.serial_number.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn owned(jobs: &[&Job]) -> Vec<Job> {
    jobs.iter().map(|j| (*j).clone()).collect()
}
