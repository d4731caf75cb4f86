//! Test type model.
//!
//! A test type names the kind of test a job runs and carries the durations
//! used to pre-fill new jobs.

use serde::{Deserialize, Serialize};

/// A kind of test that can be scheduled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestType {
    /// Unique test type identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// URL-safe short name.
    pub slug: String,
    /// Color/category tag for presentation.
    pub color: String,
    /// Duration of a single run (hours, > 0).
    pub default_duration_hours: f64,
    /// Duration when run on a dual-lane machine (hours).
    pub concurrent_duration_hours: Option<f64>,
    /// Callers should not pre-fill a duration for this type.
    pub requires_manual_duration: bool,
}

impl TestType {
    /// Creates a test type with the given default duration.
    pub fn new(id: impl Into<String>, default_duration_hours: f64) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            slug: String::new(),
            color: String::new(),
            default_duration_hours,
            concurrent_duration_hours: None,
            requires_manual_duration: false,
        }
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the slug.
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }

    /// Sets the color tag.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Sets the dual-lane duration.
    pub fn with_concurrent_duration(mut self, hours: f64) -> Self {
        self.concurrent_duration_hours = Some(hours);
        self
    }

    /// Requires the operator to enter a duration.
    pub fn manual_duration(mut self) -> Self {
        self.requires_manual_duration = true;
        self
    }
}

/// Duration to pre-fill for a job of this type.
///
/// Uses the concurrent duration on dual-lane machines when one is set,
/// otherwise the default duration.
///
/// ```
/// use stand_schedule::models::{default_duration, TestType};
///
/// let burn_in = TestType::new("burn-in", 8.0).with_concurrent_duration(6.0);
/// assert_eq!(default_duration(&burn_in, true), 6.0);
/// assert_eq!(default_duration(&burn_in, false), 8.0);
/// ```
pub fn default_duration(test_type: &TestType, is_dual_capacity: bool) -> f64 {
    match test_type.concurrent_duration_hours {
        Some(hours) if is_dual_capacity => hours,
        _ => test_type.default_duration_hours,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_test_type_builder() {
        let t = TestType::new("t1", 4.0)
            .with_name("Functional")
            .with_slug("fct")
            .with_color("#22c55e")
            .manual_duration();

        assert_eq!(t.name, "Functional");
        assert_eq!(t.slug, "fct");
        assert_eq!(t.color, "#22c55e");
        assert!(t.requires_manual_duration);
        assert!(t.concurrent_duration_hours.is_none());
    }

    #[test]
    fn test_default_duration_without_concurrent() {
        let t = TestType::new("t1", 4.0);
        assert!((default_duration(&t, true) - 4.0).abs() < 1e-10);
        assert!((default_duration(&t, false) - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_default_duration_concurrent_only_on_dual() {
        let t = TestType::new("t1", 10.0).with_concurrent_duration(7.5);
        assert!((default_duration(&t, true) - 7.5).abs() < 1e-10);
        assert!((default_duration(&t, false) - 10.0).abs() < 1e-10);
    }
}
