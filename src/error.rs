//! Boundary errors.
//!
//! Placement conflicts are ordinary results ([`crate::placement::Verdict`]).
//! The errors here belong to committing a change or loading configuration.

use thiserror::Error;

use crate::placement::Rejection;
use crate::snapshot::SnapshotVersion;
use crate::validation::ValidationError;

/// Errors raised at the commit boundary.
#[derive(Debug, Error)]
pub enum SchedulingError {
    /// The snapshot changed between validation and commit. Refresh and
    /// re-prompt the operator; do not retry against the stale data.
    #[error("stale write: expected snapshot version {expected}, current is {current}")]
    StaleWriteConflict {
        expected: SnapshotVersion,
        current: SnapshotVersion,
    },

    /// Re-validation at commit found a placement conflict.
    #[error("placement rejected: {0}")]
    Rejected(Rejection),

    /// The job failed field validation.
    #[error("invalid job: {}", join_messages(.0))]
    InvalidJob(Vec<ValidationError>),

    /// The referenced job is not in the snapshot.
    #[error("job not found: {0}")]
    JobNotFound(String),

    /// A configuration value is out of range.
    #[error("invalid config: {message}")]
    InvalidConfig { message: String },
}

impl SchedulingError {
    /// Whether the caller must refresh its snapshot before retrying.
    pub fn requires_refresh(&self) -> bool {
        matches!(self, SchedulingError::StaleWriteConflict { .. })
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Crate result alias.
pub type Result<T> = std::result::Result<T, SchedulingError>;
