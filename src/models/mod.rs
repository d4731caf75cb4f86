//! Test-stand scheduling domain models.
//!
//! Provides the data types the placement engine reads: machines and their
//! lanes, test types, jobs, and the 24-hour view window.
//!
//! # Domain Mappings
//!
//! | stand-schedule | Shop floor | Generic scheduling |
//! |----------------|-----------|--------------------|
//! | Machine | Test stand | Resource |
//! | Lane | Fixture slot | Capacity unit |
//! | TestType | Test recipe | Activity type |
//! | Job | Test run of a serial number | Assignment |
//! | TimeWindow | Shift / calendar day | Horizon |

mod job;
mod machine;
mod test_type;
mod window;

pub use job::{end_of, hours_to_delta, Job, JobStatus};
pub use machine::{find_machine, Capacity, Machine};
pub use test_type::{default_duration, TestType};
pub use window::{
    hour_label, hour_sequence, jobs_in_window, lane_jobs, local_date, TimeWindow, ViewMode,
    SHIFT_START_HOUR, WINDOW_MINUTES,
};
