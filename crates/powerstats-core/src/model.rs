//! Power stats data model.
//!
//! Entity and state identifiers are assigned by the [`Registry`](crate::registry::Registry);
//! rail indices are supplied wholesale by the rail energy provider. The two id
//! spaces are disjoint.

use serde::{Deserialize, Serialize};

/// A low-power state advertised by a power entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateInfo {
    /// Unique within the owning entity.
    pub state_id: i32,
    pub state_name: String,
}

impl StateInfo {
    pub fn new(state_id: i32, state_name: impl Into<String>) -> Self {
        Self {
            state_id,
            state_name: state_name.into(),
        }
    }
}

/// A registered power entity (CPU cluster, subsystem, ...).
///
/// Created once at provider registration time and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerEntityInfo {
    /// Dense, assigned sequentially from 0.
    pub entity_id: i32,
    pub entity_name: String,
    pub states: Vec<StateInfo>,
}

/// Static metadata for one measured power rail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RailInfo {
    pub rail_index: i32,
    pub subsys_name: String,
    pub rail_name: String,
}

/// Cumulative energy delivered through a rail, in micro-watt-seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyData {
    pub rail_index: i32,
    pub energy_uws: i64,
}

/// Residency counters for one state of one entity.
///
/// All counters are expected to be non-decreasing over a provider's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateResidency {
    pub state_id: i32,
    pub total_time_in_state_ms: u64,
    pub total_state_entry_count: u64,
    pub last_entry_timestamp_ms: u64,
}

/// Residency data for every state of one entity, in provider order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityResidencyResult {
    pub entity_id: i32,
    pub state_residency_data: Vec<StateResidency>,
}
