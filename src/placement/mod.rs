//! Placement engines.
//!
//! Pure functions that turn a job data set and a proposed placement into
//! window geometry or an accept/reject verdict.
//!
//! # Components
//!
//! - **Projector**: job interval → one or two bar segments on a window,
//!   splitting jobs that run past the window end.
//! - **Conflict resolver**: candidate placement → [`Verdict`], honoring
//!   single-lane exclusivity, per-lane exclusivity and the two-job limit of
//!   dual-lane machines.
//! - **Lane allocator**: first lane accepting an interval.
//!
//! None of these hold state or perform I/O; they are safe to call from any
//! number of threads.

mod conflict;
mod lane;
mod projector;

pub use conflict::{validate, PlacementCandidate, Rejection, RejectionReason, Verdict};
pub use lane::allocate_lane;
pub use projector::{current_time_position, project, time_from_position, Projection, Segment};
