//! Placement engine for test-stand scheduling.
//!
//! Schedules test jobs onto physical test stands, some of which expose two
//! independent lanes, over a day viewed either as an operational shift
//! (06:00 to 06:00) or a calendar day. The crate is pure: it reads a
//! machine / test type / job data set and a proposed placement, and returns
//! window geometry or an accept/reject verdict. Storage, transport and
//! rendering belong to the caller.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Machine`, `Capacity`, `TestType`, `Job`,
//!   `JobStatus`, `TimeWindow`, `ViewMode`
//! - **`placement`**: Projection onto windows, conflict resolution, lane allocation
//! - **`validation`**: Field checks (duplicate IDs, references, lanes, limits)
//! - **`snapshot`**: Versioned data sets and validate-then-commit discipline
//! - **`engine`**: `PlacementEngine` facade over all of the above
//! - **`config`**: `SchedulerConfig` (view, shift hour, offset, limits)
//!
//! # Concurrency
//!
//! Every operation is a deterministic function of its inputs. Callers that
//! share a job set across operators re-validate against the latest
//! [`snapshot::Snapshot`] right before committing; a version mismatch
//! surfaces as [`SchedulingError::StaleWriteConflict`].
//!
//! # Logging
//!
//! Rejections and commits emit `tracing` events. The crate never installs a
//! subscriber.

pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod placement;
pub mod snapshot;
pub mod validation;

pub use config::{JobLimits, SchedulerConfig};
pub use engine::PlacementEngine;
pub use error::{Result, SchedulingError};
