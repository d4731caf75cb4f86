//! Lane allocation.
//!
//! Finds the first lane of a machine that accepts a new interval. Lanes are
//! tried in index order, so identical inputs always yield the same lane.

use chrono::{DateTime, Utc};

use crate::models::{find_machine, Job, Machine};

use super::conflict::{validate, PlacementCandidate};

/// First lane of `machine_id` free for `[start, start + duration_hours)`.
///
/// Returns `None` when the machine is unknown or every lane conflicts.
/// `exclude_job_id` skips the job being moved.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use stand_schedule::models::{Job, Machine};
/// use stand_schedule::placement::allocate_lane;
///
/// let machines = vec![Machine::dual("D")];
/// let eight = Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap();
/// let jobs = vec![Job::new("j0", "SN-0", "D", eight, 4.0)];
///
/// assert_eq!(allocate_lane("D", eight, 4.0, &jobs, &machines, None), Some(1));
/// ```
pub fn allocate_lane(
    machine_id: &str,
    start: DateTime<Utc>,
    duration_hours: f64,
    jobs: &[Job],
    machines: &[Machine],
    exclude_job_id: Option<&str>,
) -> Option<u8> {
    let machine = find_machine(machines, machine_id)?;

    let mut base = PlacementCandidate::new(machine_id, start, duration_hours);
    base.exclude_job_id = exclude_job_id.map(str::to_owned);

    let lane = (0..machine.capacity.lanes()).find(|&lane| {
        let candidate = base.clone().on_lane(lane);
        validate(&candidate, jobs, machines).is_accepted()
    });

    tracing::trace!(machine_id, lane = ?lane, "lane allocation");
    lane
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobStatus;
    use chrono::TimeZone;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, h, 0, 0).unwrap()
    }

    fn machines() -> Vec<Machine> {
        vec![Machine::single("M"), Machine::dual("D")]
    }

    #[test]
    fn test_single_lane_free() {
        assert_eq!(allocate_lane("M", at(8), 2.0, &[], &machines(), None), Some(0));
    }

    #[test]
    fn test_single_lane_busy() {
        let jobs = vec![Job::new("j1", "SN-1", "M", at(8), 2.0)];
        assert_eq!(allocate_lane("M", at(9), 2.0, &jobs, &machines(), None), None);
    }

    #[test]
    fn test_unknown_machine() {
        assert_eq!(allocate_lane("X", at(8), 1.0, &[], &machines(), None), None);
    }

    #[test]
    fn test_dual_prefers_lane_zero() {
        assert_eq!(allocate_lane("D", at(8), 4.0, &[], &machines(), None), Some(0));
    }

    #[test]
    fn test_dual_falls_back_to_lane_one() {
        let jobs = vec![Job::new("j0", "SN-0", "D", at(8), 4.0)];
        assert_eq!(allocate_lane("D", at(8), 4.0, &jobs, &machines(), None), Some(1));
    }

    #[test]
    fn test_dual_lane_zero_reused_when_lane_one_busy() {
        let jobs = vec![Job::new("j1", "SN-1", "D", at(8), 4.0).with_lane(1)];
        assert_eq!(allocate_lane("D", at(9), 1.0, &jobs, &machines(), None), Some(0));
    }

    #[test]
    fn test_dual_full() {
        let jobs = vec![
            Job::new("j0", "SN-0", "D", at(8), 4.0),
            Job::new("j1", "SN-1", "D", at(8), 4.0).with_lane(1),
        ];
        assert_eq!(allocate_lane("D", at(10), 1.0, &jobs, &machines(), None), None);
    }

    #[test]
    fn test_exclude_self_when_moving() {
        let jobs = vec![Job::new("j0", "SN-0", "D", at(8), 4.0)];
        assert_eq!(allocate_lane("D", at(9), 4.0, &jobs, &machines(), Some("j0")), Some(0));
    }

    #[test]
    fn test_cancelled_jobs_free_lanes() {
        let jobs = vec![Job::new("j0", "SN-0", "D", at(8), 4.0).with_status(JobStatus::Cancelled)];
        assert_eq!(allocate_lane("D", at(8), 4.0, &jobs, &machines(), None), Some(0));
    }

    #[test]
    fn test_allocation_is_deterministic() {
        let jobs = vec![Job::new("j0", "SN-0", "D", at(8), 4.0)];
        let first = allocate_lane("D", at(8), 2.0, &jobs, &machines(), None);
        for _ in 0..10 {
            assert_eq!(allocate_lane("D", at(8), 2.0, &jobs, &machines(), None), first);
        }
    }
}
