//! Engine configuration.
//!
//! All fields have defaults, so a partial document (or none at all) yields
//! a working configuration. The caller picks the format; any serde format
//! works.
//!
//! | Field | Default |
//! |-------|---------|
//! | `default_view_mode` | `shift` |
//! | `shift_start_hour` | 6 |
//! | `utc_offset_minutes` | 0 |
//! | `limits.max_serial_len` | 100 |
//! | `limits.max_notes_len` | 1000 |
//! | `limits.max_duration_hours` | 720 |

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulingError};
use crate::models::{ViewMode, SHIFT_START_HOUR};

/// Largest supported UTC offset magnitude (minutes).
const MAX_OFFSET_MINUTES: u32 = 18 * 60;

/// Placement engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// View used when the caller does not pick one.
    pub default_view_mode: ViewMode,
    /// Local hour shift windows start at (0-23).
    pub shift_start_hour: u32,
    /// Fixed UTC offset of the site, in minutes east of UTC.
    pub utc_offset_minutes: i32,
    /// Field limits for jobs.
    pub limits: JobLimits,
}

/// Field limits applied by job validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobLimits {
    /// Maximum serial number length (characters, trimmed).
    pub max_serial_len: usize,
    /// Maximum notes length (characters, trimmed).
    pub max_notes_len: usize,
    /// Maximum job duration (hours).
    pub max_duration_hours: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            default_view_mode: ViewMode::Shift,
            shift_start_hour: SHIFT_START_HOUR,
            utc_offset_minutes: 0,
            limits: JobLimits::default(),
        }
    }
}

impl Default for JobLimits {
    fn default() -> Self {
        Self {
            max_serial_len: 100,
            max_notes_len: 1000,
            max_duration_hours: 720.0,
        }
    }
}

impl SchedulerConfig {
    /// Sets the default view.
    pub fn with_view_mode(mut self, mode: ViewMode) -> Self {
        self.default_view_mode = mode;
        self
    }

    /// Sets the shift start hour.
    pub fn with_shift_start_hour(mut self, hour: u32) -> Self {
        self.shift_start_hour = hour;
        self
    }

    /// Sets the site UTC offset (minutes east of UTC).
    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    /// Sets the job limits.
    pub fn with_limits(mut self, limits: JobLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Checks ranges.
    ///
    /// # Errors
    /// [`SchedulingError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.shift_start_hour > 23 {
            return Err(invalid(format!(
                "shift_start_hour must be 0-23, got {}",
                self.shift_start_hour
            )));
        }
        if self.utc_offset_minutes.unsigned_abs() > MAX_OFFSET_MINUTES {
            return Err(invalid(format!(
                "utc_offset_minutes must be within ±{MAX_OFFSET_MINUTES}, got {}",
                self.utc_offset_minutes
            )));
        }
        if self.limits.max_serial_len == 0 {
            return Err(invalid("limits.max_serial_len must be positive"));
        }
        if self.limits.max_notes_len == 0 {
            return Err(invalid("limits.max_notes_len must be positive"));
        }
        if !(self.limits.max_duration_hours.is_finite() && self.limits.max_duration_hours > 0.0) {
            return Err(invalid(format!(
                "limits.max_duration_hours must be positive, got {}",
                self.limits.max_duration_hours
            )));
        }
        Ok(())
    }

    /// The site offset as a chrono offset.
    ///
    /// # Errors
    /// [`SchedulingError::InvalidConfig`] when the offset is beyond ±18 h.
    pub fn offset(&self) -> Result<FixedOffset> {
        let out_of_range = || {
            invalid(format!(
                "utc_offset_minutes out of range: {}",
                self.utc_offset_minutes
            ))
        };
        if self.utc_offset_minutes.unsigned_abs() > MAX_OFFSET_MINUTES {
            return Err(out_of_range());
        }
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(out_of_range)
    }
}

fn invalid(message: impl Into<String>) -> SchedulingError {
    SchedulingError::InvalidConfig {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PlacementEngine;

    #[test]
    fn test_defaults() {
        let c = SchedulerConfig::default();
        assert_eq!(c.default_view_mode, ViewMode::Shift);
        assert_eq!(c.shift_start_hour, 6);
        assert_eq!(c.utc_offset_minutes, 0);
        assert_eq!(c.limits.max_serial_len, 100);
        assert_eq!(c.limits.max_notes_len, 1000);
        assert!((c.limits.max_duration_hours - 720.0).abs() < 1e-10);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let c: SchedulerConfig = serde_json::from_str(
            r#"{"default_view_mode": "calendar", "limits": {"max_notes_len": 500}}"#,
        )
        .unwrap();
        assert_eq!(c.default_view_mode, ViewMode::Calendar);
        assert_eq!(c.shift_start_hour, 6);
        assert_eq!(c.limits.max_notes_len, 500);
        assert_eq!(c.limits.max_serial_len, 100);
    }

    #[test]
    fn test_empty_document() {
        let c: SchedulerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(c, SchedulerConfig::default());
    }

    #[test]
    fn test_invalid_shift_hour() {
        let c = SchedulerConfig::default().with_shift_start_hour(24);
        assert!(matches!(c.validate(), Err(SchedulingError::InvalidConfig { .. })));
    }

    #[test]
    fn test_invalid_offset() {
        let c = SchedulerConfig::default().with_utc_offset_minutes(19 * 60);
        assert!(c.validate().is_err());
        assert!(c.offset().is_err());
    }

    #[test]
    fn test_offset_limit_is_inclusive() {
        let c = SchedulerConfig::default().with_utc_offset_minutes(-18 * 60);
        assert!(c.validate().is_ok());
        assert_eq!(c.offset().unwrap().local_minus_utc(), -18 * 3600);
    }

    #[test]
    fn test_extreme_offsets_are_errors() {
        let c: SchedulerConfig =
            serde_json::from_str(r#"{"utc_offset_minutes": -2147483648}"#).unwrap();
        assert!(matches!(c.validate(), Err(SchedulingError::InvalidConfig { .. })));
        assert!(c.offset().is_err());

        let c = SchedulerConfig::default().with_utc_offset_minutes(40_000_000);
        assert!(c.validate().is_err());
        assert!(matches!(c.offset(), Err(SchedulingError::InvalidConfig { .. })));
        assert!(PlacementEngine::new(c).is_err());
    }

    #[test]
    fn test_offset() {
        let c = SchedulerConfig::default().with_utc_offset_minutes(-300);
        assert_eq!(c.offset().unwrap().local_minus_utc(), -300 * 60);
    }

    #[test]
    fn test_invalid_limits() {
        let c = SchedulerConfig::default().with_limits(JobLimits {
            max_duration_hours: 0.0,
            ..JobLimits::default()
        });
        assert!(c.validate().is_err());

        let c = SchedulerConfig::default().with_limits(JobLimits {
            max_serial_len: 0,
            ..JobLimits::default()
        });
        assert!(c.validate().is_err());
    }
}
