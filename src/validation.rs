//! Input validation for the scheduling data set.
//!
//! Checks field-level integrity of machines, test types and jobs before
//! they reach the conflict resolver. Detects:
//! - Duplicate IDs
//! - Missing machine / test type references
//! - Lanes the machine does not have
//! - Out-of-range durations
//! - Blank or oversized serial numbers and notes
//!
//! All problems are collected; validation does not stop at the first one.
//! Conflicts between jobs are not checked here (see [`crate::placement`]).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::JobLimits;
use crate::models::{find_machine, Job, Machine, TestType};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A job references a machine that doesn't exist.
    InvalidMachineReference,
    /// A job references a test type that doesn't exist.
    InvalidTestTypeReference,
    /// The lane index is not a lane of the machine.
    InvalidLane,
    /// A duration is non-positive, non-finite or above the limit.
    InvalidDuration,
    /// The serial number is blank or too long.
    InvalidSerialNumber,
    /// The notes exceed the length limit.
    NotesTooLong,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates a single job against the reference tables.
///
/// Checks:
/// 1. Serial number is non-blank and within `limits.max_serial_len` (trimmed)
/// 2. Notes are within `limits.max_notes_len` (trimmed)
/// 3. Duration is finite, positive and at most `limits.max_duration_hours`
/// 4. The machine exists and has the job's lane
/// 5. The test type exists
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_job(
    job: &Job,
    machines: &[Machine],
    test_types: &[TestType],
    limits: &JobLimits,
) -> ValidationResult {
    let mut errors = Vec::new();
    check_job(job, machines, test_types, limits, &mut errors);
    finish(errors)
}

/// Validates a whole data set.
///
/// Checks:
/// 1. No duplicate machine, test type or job IDs
/// 2. Every test type has positive durations
/// 3. Every job passes [`validate_job`]
pub fn validate_dataset(
    machines: &[Machine],
    test_types: &[TestType],
    jobs: &[Job],
    limits: &JobLimits,
) -> ValidationResult {
    let mut errors = Vec::new();

    check_unique("machine", machines.iter().map(|m| m.id.as_str()), &mut errors);
    check_unique("test type", test_types.iter().map(|t| t.id.as_str()), &mut errors);
    check_unique("job", jobs.iter().map(|j| j.id.as_str()), &mut errors);

    for t in test_types {
        if !is_positive(t.default_duration_hours) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidDuration,
                format!(
                    "Test type '{}' has non-positive default duration {}",
                    t.id, t.default_duration_hours
                ),
            ));
        }
        if let Some(hours) = t.concurrent_duration_hours {
            if !is_positive(hours) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidDuration,
                    format!("Test type '{}' has non-positive concurrent duration {hours}", t.id),
                ));
            }
        }
    }

    for job in jobs {
        check_job(job, machines, test_types, limits, &mut errors);
    }

    finish(errors)
}

fn check_job(
    job: &Job,
    machines: &[Machine],
    test_types: &[TestType],
    limits: &JobLimits,
    errors: &mut Vec<ValidationError>,
) {
    let serial = job.serial_number.trim();
    if serial.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidSerialNumber,
            format!("Job '{}' has a blank serial number", job.id),
        ));
    } else if serial.chars().count() > limits.max_serial_len {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidSerialNumber,
            format!(
                "Job '{}' serial number exceeds {} characters",
                job.id, limits.max_serial_len
            ),
        ));
    }

    if let Some(notes) = &job.notes {
        if notes.trim().chars().count() > limits.max_notes_len {
            errors.push(ValidationError::new(
                ValidationErrorKind::NotesTooLong,
                format!("Job '{}' notes exceed {} characters", job.id, limits.max_notes_len),
            ));
        }
    }

    if !is_positive(job.duration_hours) || job.duration_hours > limits.max_duration_hours {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidDuration,
            format!(
                "Job '{}' duration {} is outside (0, {}] hours",
                job.id, job.duration_hours, limits.max_duration_hours
            ),
        ));
    }

    match find_machine(machines, &job.machine_id) {
        None => errors.push(ValidationError::new(
            ValidationErrorKind::InvalidMachineReference,
            format!(
                "Job '{}' references unknown machine '{}'",
                job.id, job.machine_id
            ),
        )),
        Some(machine) if !machine.capacity.has_lane(job.lane_index) => {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidLane,
                format!(
                    "Job '{}' uses lane {} but machine '{}' has {} lane(s)",
                    job.id,
                    job.lane_index,
                    machine.id,
                    machine.capacity.lanes()
                ),
            ))
        }
        Some(_) => {}
    }

    if !test_types.iter().any(|t| t.id == job.test_type_id) {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidTestTypeReference,
            format!(
                "Job '{}' references unknown test type '{}'",
                job.id, job.test_type_id
            ),
        ));
    }
}

fn check_unique<'a>(
    entity: &str,
    ids: impl Iterator<Item = &'a str>,
    errors: &mut Vec<ValidationError>,
) {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate {entity} ID: {id}"),
            ));
        }
    }
}

#[inline]
fn is_positive(hours: f64) -> bool {
    hours.is_finite() && hours > 0.0
}

fn finish(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
