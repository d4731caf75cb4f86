//! Machine (test stand) model.
//!
//! Machines are the physical stands jobs run on. A stand exposes either one
//! execution lane or two independent lanes; the lane count is its capacity.
//! The engine reads machines, it never edits them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A physical test stand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    /// Unique machine identifier.
    pub id: String,
    /// Human-readable name (e.g., "ETT2").
    pub name: String,
    /// Logical group used for presentation (e.g., "FCT", "ETT").
    pub group: String,
    /// Number of independent execution lanes.
    pub capacity: Capacity,
    /// Stable presentation order.
    pub display_order: i32,
    /// Whether the stand is currently out of service.
    pub is_down: bool,
    /// Free-text reason for the outage.
    pub down_note: Option<String>,
    /// Expected return to service.
    pub down_eta: Option<DateTime<Utc>>,
}

/// Lane count of a machine.
///
/// Serialized as the integer `1` or `2`; any other integer is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Capacity {
    /// One job at a time.
    Single,
    /// Two concurrent jobs, one per lane.
    Dual,
}

impl Capacity {
    /// Number of lanes.
    #[inline]
    pub fn lanes(self) -> u8 {
        match self {
            Capacity::Single => 1,
            Capacity::Dual => 2,
        }
    }

    /// Whether `lane_index` addresses an existing lane.
    #[inline]
    pub fn has_lane(self, lane_index: u8) -> bool {
        lane_index < self.lanes()
    }
}

impl TryFrom<u8> for Capacity {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Capacity::Single),
            2 => Ok(Capacity::Dual),
            other => Err(format!("machine capacity must be 1 or 2, got {other}")),
        }
    }
}

impl From<Capacity> for u8 {
    fn from(capacity: Capacity) -> Self {
        capacity.lanes()
    }
}

impl Machine {
    /// Creates an operational machine.
    pub fn new(id: impl Into<String>, capacity: Capacity) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            group: String::new(),
            capacity,
            display_order: 0,
            is_down: false,
            down_note: None,
            down_eta: None,
        }
    }

    /// Creates a single-lane machine.
    pub fn single(id: impl Into<String>) -> Self {
        Self::new(id, Capacity::Single)
    }

    /// Creates a dual-lane machine.
    pub fn dual(id: impl Into<String>) -> Self {
        Self::new(id, Capacity::Dual)
    }

    /// Sets the machine name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the logical group.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Sets the display order.
    pub fn with_display_order(mut self, order: i32) -> Self {
        self.display_order = order;
        self
    }

    /// Marks the machine as down with an optional note.
    pub fn with_outage(mut self, note: Option<String>, eta: Option<DateTime<Utc>>) -> Self {
        self.is_down = true;
        self.down_note = note;
        self.down_eta = eta;
        self
    }

    /// Whether the machine has two lanes.
    #[inline]
    pub fn is_dual(&self) -> bool {
        self.capacity == Capacity::Dual
    }

    /// Name for messages, falling back to the id when unnamed.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// Finds a machine by id.
pub fn find_machine<'a>(machines: &'a [Machine], machine_id: &str) -> Option<&'a Machine> {
    machines.iter().find(|m| m.id == machine_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_machine_builder() {
        let m = Machine::dual("m-ett2")
            .with_name("ETT2")
            .with_group("ETT")
            .with_display_order(3);

        assert_eq!(m.id, "m-ett2");
        assert_eq!(m.label(), "ETT2");
        assert_eq!(m.group, "ETT");
        assert_eq!(m.display_order, 3);
        assert!(m.is_dual());
        assert!(!m.is_down);
    }

    #[test]
    fn test_label_falls_back_to_id() {
        let m = Machine::single("m1");
        assert_eq!(m.label(), "m1");
    }

    #[test]
    fn test_capacity_lanes() {
        assert_eq!(Capacity::Single.lanes(), 1);
        assert_eq!(Capacity::Dual.lanes(), 2);
        assert!(Capacity::Single.has_lane(0));
        assert!(!Capacity::Single.has_lane(1));
        assert!(Capacity::Dual.has_lane(1));
        assert!(!Capacity::Dual.has_lane(2));
    }

    #[test]
    fn test_capacity_wire_format() {
        let json = serde_json::to_string(&Capacity::Dual).unwrap();
        assert_eq!(json, "2");

        let parsed: Capacity = serde_json::from_str("1").unwrap();
        assert_eq!(parsed, Capacity::Single);

        assert!(serde_json::from_str::<Capacity>("3").is_err());
        assert!(serde_json::from_str::<Capacity>("0").is_err());
    }

    #[test]
    fn test_outage() {
        let m = Machine::single("m1").with_outage(Some("fixture cracked".into()), None);
        assert!(m.is_down);
        assert_eq!(m.down_note.as_deref(), Some("fixture cracked"));
    }

    #[test]
    fn test_find_machine() {
        let machines = vec![Machine::single("a"), Machine::dual("b")];
        assert_eq!(find_machine(&machines, "b").map(|m| m.capacity), Some(Capacity::Dual));
        assert!(find_machine(&machines, "zzz").is_none());
    }
}
