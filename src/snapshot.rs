//! Versioned data snapshots and commit discipline.
//!
//! The engine never assumes its data is fresh. Callers hold a [`Snapshot`]
//! tagged with a [`SnapshotVersion`]; every successful write produces a new
//! snapshot with the next version. Committing against an older version
//! fails with [`SchedulingError::StaleWriteConflict`], which tells the
//! caller to refresh and re-prompt.
//!
//! # Commit Sequence
//!
//! 1. Version check (stale → error, never retried here)
//! 2. Field validation of the job
//! 3. Conflict re-validation against the snapshot's jobs (active jobs only)
//! 4. New snapshot, version + 1
//!
//! The storage layer behind the caller must still enforce the same
//! invariant atomically; a commit here is a pure function of the snapshot.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::JobLimits;
use crate::error::{Result, SchedulingError};
use crate::models::{find_machine, Job, Machine, TestType};
use crate::placement::{validate, PlacementCandidate, Verdict};
use crate::validation::{validate_job, ValidationError, ValidationErrorKind};

/// Monotonic snapshot version (invalidation token).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SnapshotVersion(pub u64);

impl SnapshotVersion {
    /// The version after this one.
    #[inline]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for SnapshotVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A change to the job set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Mutation {
    /// Add a new job.
    Insert(Job),
    /// Replace the job with the same id (move, resize, status change).
    Update(Job),
    /// Hard-delete a job by id.
    Remove(String),
}

/// An immutable view of machines, test types and jobs at one version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Version of this data.
    pub version: SnapshotVersion,
    /// Machine table.
    pub machines: Vec<Machine>,
    /// Test type table.
    pub test_types: Vec<TestType>,
    /// All known jobs, terminal ones included.
    pub jobs: Vec<Job>,
}

impl Snapshot {
    /// Creates a snapshot at version 0.
    pub fn new(machines: Vec<Machine>, test_types: Vec<TestType>, jobs: Vec<Job>) -> Self {
        Self {
            version: SnapshotVersion::default(),
            machines,
            test_types,
            jobs,
        }
    }

    /// Sets the version (e.g., as reported by storage).
    pub fn with_version(mut self, version: SnapshotVersion) -> Self {
        self.version = version;
        self
    }

    /// Jobs that hold their slot (scheduled, running).
    pub fn active_jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter().filter(|j| j.is_active())
    }

    /// Finds a job by id.
    pub fn job(&self, job_id: &str) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == job_id)
    }

    /// Finds a machine by id.
    pub fn machine(&self, machine_id: &str) -> Option<&Machine> {
        find_machine(&self.machines, machine_id)
    }

    /// Finds a test type by id.
    pub fn test_type(&self, test_type_id: &str) -> Option<&TestType> {
        self.test_types.iter().find(|t| t.id == test_type_id)
    }

    /// Machines in presentation order.
    pub fn machines_in_order(&self) -> Vec<&Machine> {
        let mut ordered: Vec<&Machine> = self.machines.iter().collect();
        ordered.sort_by_key(|m| m.display_order);
        ordered
    }

    /// Applies a mutation after re-validating it against this snapshot.
    ///
    /// `self` is left untouched; the result is the next snapshot.
    ///
    /// # Errors
    /// - [`SchedulingError::StaleWriteConflict`] if `expected` is not this version
    /// - [`SchedulingError::InvalidJob`] if the job fails field validation
    ///   or an insert reuses an existing id
    /// - [`SchedulingError::Rejected`] if an active job conflicts
    /// - [`SchedulingError::JobNotFound`] if an update/remove names an unknown job
    pub fn commit(
        &self,
        expected: SnapshotVersion,
        mutation: Mutation,
        limits: &JobLimits,
    ) -> Result<Snapshot> {
        if expected != self.version {
            tracing::warn!(
                expected = %expected,
                current = %self.version,
                "stale write rejected"
            );
            return Err(SchedulingError::StaleWriteConflict {
                expected,
                current: self.version,
            });
        }

        let mut jobs = self.jobs.clone();
        let job_id = match mutation {
            Mutation::Insert(job) => {
                if self.job(&job.id).is_some() {
                    return Err(SchedulingError::InvalidJob(vec![ValidationError {
                        kind: ValidationErrorKind::DuplicateId,
                        message: format!("Duplicate job ID: {}", job.id),
                    }]));
                }
                self.check(&job, limits)?;
                let id = job.id.clone();
                jobs.push(job);
                id
            }
            Mutation::Update(job) => {
                let idx = self.index_of(&job.id)?;
                self.check(&job, limits)?;
                let id = job.id.clone();
                jobs[idx] = job;
                id
            }
            Mutation::Remove(job_id) => {
                let idx = self.index_of(&job_id)?;
                jobs.remove(idx);
                job_id
            }
        };

        let version = self.version.next();
        tracing::debug!(version = %version, job_id = %job_id, "snapshot committed");

        Ok(Snapshot {
            version,
            machines: self.machines.clone(),
            test_types: self.test_types.clone(),
            jobs,
        })
    }

    fn index_of(&self, job_id: &str) -> Result<usize> {
        self.jobs
            .iter()
            .position(|j| j.id == job_id)
            .ok_or_else(|| SchedulingError::JobNotFound(job_id.to_string()))
    }

    fn check(&self, job: &Job, limits: &JobLimits) -> Result<()> {
        validate_job(job, &self.machines, &self.test_types, limits)
            .map_err(SchedulingError::InvalidJob)?;

        // Terminal jobs never occupy a slot
        if !job.is_active() {
            return Ok(());
        }
        match validate(&PlacementCandidate::for_job(job), &self.jobs, &self.machines) {
            Verdict::Accepted => Ok(()),
            Verdict::Rejected(r) => Err(SchedulingError::Rejected(r)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobStatus;
    use crate::placement::RejectionReason;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, h, 0, 0).unwrap()
    }

    fn job(id: &str, machine: &str, h: u32, hours: f64) -> Job {
        Job::new(id, format!("SN-{id}"), machine, at(h), hours).with_test_type("T")
    }

    fn base() -> Snapshot {
        Snapshot::new(
            vec![
                Machine::single("M").with_display_order(2),
                Machine::dual("D").with_display_order(1),
            ],
            vec![TestType::new("T", 2.0)],
            vec![job("j1", "M", 8, 2.0)],
        )
    }

    #[test]
    fn test_insert_bumps_version() {
        let s0 = base();
        let s1 = s0
            .commit(s0.version, Mutation::Insert(job("j2", "M", 10, 1.0)), &JobLimits::default())
            .unwrap();
        assert_eq!(s1.version, SnapshotVersion(1));
        assert_eq!(s1.jobs.len(), 2);
        // Receiver untouched
        assert_eq!(s0.jobs.len(), 1);
        assert_eq!(s0.version, SnapshotVersion(0));
    }

    #[test]
    fn test_stale_write() {
        let s0 = base();
        let limits = JobLimits::default();
        let s1 = s0
            .commit(s0.version, Mutation::Insert(job("j2", "M", 10, 1.0)), &limits)
            .unwrap();

        // A second operator still holding v0
        let err = s1
            .commit(SnapshotVersion(0), Mutation::Insert(job("j3", "M", 12, 1.0)), &limits)
            .unwrap_err();
        assert!(err.requires_refresh());
        match err {
            SchedulingError::StaleWriteConflict { expected, current } => {
                assert_eq!(expected, SnapshotVersion(0));
                assert_eq!(current, SnapshotVersion(1));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_conflicting_insert_rejected() {
        let s0 = base();
        let err = s0
            .commit(s0.version, Mutation::Insert(job("j2", "M", 9, 1.0)), &JobLimits::default())
            .unwrap_err();
        match err {
            SchedulingError::Rejected(r) => {
                assert_eq!(r.reason, RejectionReason::SingleCapacityOverlap);
                assert_eq!(r.blocking_ids(), vec!["j1"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!SchedulingError::JobNotFound("x".into()).requires_refresh());
    }

    #[test]
    fn test_duplicate_insert() {
        let s0 = base();
        let err = s0
            .commit(s0.version, Mutation::Insert(job("j1", "M", 20, 1.0)), &JobLimits::default())
            .unwrap_err();
        assert!(matches!(err, SchedulingError::InvalidJob(ref e) if e[0].kind == ValidationErrorKind::DuplicateId));
    }

    #[test]
    fn test_invalid_job() {
        let s0 = base();
        let mut bad = job("j2", "M", 20, 1.0);
        bad.serial_number = String::new();
        let err = s0
            .commit(s0.version, Mutation::Insert(bad), &JobLimits::default())
            .unwrap_err();
        assert!(matches!(err, SchedulingError::InvalidJob(_)));
        assert!(err.to_string().contains("blank serial"));
    }

    #[test]
    fn test_update_moves_job_without_self_conflict() {
        let s0 = base();
        // Extend j1 by an hour: overlaps only its old self
        let moved = job("j1", "M", 8, 3.0);
        let s1 = s0
            .commit(s0.version, Mutation::Update(moved), &JobLimits::default())
            .unwrap();
        assert!((s1.job("j1").unwrap().duration_hours - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_cancelled_update_skips_conflict_check() {
        let limits = JobLimits::default();
        let s0 = base();
        let s1 = s0
            .commit(s0.version, Mutation::Insert(job("j2", "M", 10, 1.0)), &limits)
            .unwrap();
        // Moving j2 onto j1 while cancelling it is fine
        let cancelled = job("j2", "M", 8, 1.0).with_status(JobStatus::Cancelled);
        let s2 = s1.commit(s1.version, Mutation::Update(cancelled), &limits).unwrap();
        assert_eq!(s2.active_jobs().count(), 1);
    }

    #[test]
    fn test_update_unknown_job() {
        let s0 = base();
        let err = s0
            .commit(s0.version, Mutation::Update(job("nope", "M", 8, 1.0)), &JobLimits::default())
            .unwrap_err();
        assert!(matches!(err, SchedulingError::JobNotFound(id) if id == "nope"));
    }

    #[test]
    fn test_remove() {
        let s0 = base();
        let s1 = s0
            .commit(s0.version, Mutation::Remove("j1".into()), &JobLimits::default())
            .unwrap();
        assert!(s1.jobs.is_empty());
        assert!(s1.job("j1").is_none());

        let err = s1
            .commit(s1.version, Mutation::Remove("j1".into()), &JobLimits::default())
            .unwrap_err();
        assert!(matches!(err, SchedulingError::JobNotFound(_)));
    }

    #[test]
    fn test_lookups() {
        let s = base();
        assert!(s.machine("D").is_some());
        assert!(s.test_type("T").is_some());
        assert!(s.test_type("X").is_none());
        let order: Vec<&str> = s.machines_in_order().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(order, vec!["D", "M"]);
    }

    #[test]
    fn test_version_wire_format() {
        assert_eq!(serde_json::to_string(&SnapshotVersion(7)).unwrap(), "7");
        assert_eq!(SnapshotVersion(7).to_string(), "v7");
    }
}
