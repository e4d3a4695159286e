//! Delta tracking between successive report snapshots.
//!
//! Each report kind keeps exactly one retained snapshot. Computing a delta
//! matches the current readings against it by identity, then replaces it.
//! Deltas are plain signed differences: a counter that went backwards (reset,
//! reboot of the backing hardware) shows up as a negative delta and is not
//! clamped.

use std::collections::HashMap;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::clock;
use crate::model::{EnergyData, EntityResidencyResult, StateResidency};

/// A snapshot element that can be diffed against its previous reading.
pub trait Tracked: Clone {
    /// Identity used to match current and previous readings.
    type Key: Eq + Hash;
    /// Per-field differences.
    type Delta: Clone + std::fmt::Debug + PartialEq;

    fn key(&self) -> Self::Key;

    /// Differences against `previous`; all zero when there is no match.
    fn delta_from(&self, previous: Option<&Self>) -> Self::Delta;
}

/// Signed difference of two unsigned counters.
fn signed_diff(current: u64, previous: u64) -> i64 {
    current.wrapping_sub(previous) as i64
}

impl Tracked for EnergyData {
    type Key = i32;
    type Delta = i64;

    fn key(&self) -> i32 {
        self.rail_index
    }

    fn delta_from(&self, previous: Option<&Self>) -> i64 {
        previous.map_or(0, |p| self.energy_uws.wrapping_sub(p.energy_uws))
    }
}

/// Per-field deltas for one state of one entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateResidencyDelta {
    pub state_id: i32,
    pub total_time_in_state_ms: i64,
    pub total_state_entry_count: i64,
    pub last_entry_timestamp_ms: i64,
}

impl StateResidencyDelta {
    fn between(current: &StateResidency, previous: Option<&StateResidency>) -> Self {
        match previous {
            Some(p) => Self {
                state_id: current.state_id,
                total_time_in_state_ms: signed_diff(
                    current.total_time_in_state_ms,
                    p.total_time_in_state_ms,
                ),
                total_state_entry_count: signed_diff(
                    current.total_state_entry_count,
                    p.total_state_entry_count,
                ),
                last_entry_timestamp_ms: signed_diff(
                    current.last_entry_timestamp_ms,
                    p.last_entry_timestamp_ms,
                ),
            },
            None => Self {
                state_id: current.state_id,
                ..Self::default()
            },
        }
    }
}

impl Tracked for EntityResidencyResult {
    type Key = i32;
    type Delta = Vec<StateResidencyDelta>;

    fn key(&self) -> i32 {
        self.entity_id
    }

    // Second level of the (entity, state) lookup: the entity was matched by
    // `key`, states are matched by id here.
    fn delta_from(&self, previous: Option<&Self>) -> Vec<StateResidencyDelta> {
        let prev_states: HashMap<i32, &StateResidency> = previous
            .map(|p| {
                p.state_residency_data
                    .iter()
                    .map(|s| (s.state_id, s))
                    .collect()
            })
            .unwrap_or_default();

        self.state_residency_data
            .iter()
            .map(|s| StateResidencyDelta::between(s, prev_states.get(&s.state_id).copied()))
            .collect()
    }
}

/// Captured readings plus their capture time on the boot clock.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    pub items: Vec<T>,
    pub captured_ms: u64,
}

/// A current reading paired with its deltas.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaRow<T: Tracked> {
    pub current: T,
    pub delta: T::Delta,
}

/// Result of diffing a snapshot against the retained one.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaReport<T: Tracked> {
    pub rows: Vec<DeltaRow<T>>,
    /// Time since the previous capture; 0 on the first report.
    pub elapsed_ms: u64,
}

/// Retains the previous snapshot of one report kind.
#[derive(Debug, Clone)]
pub struct DeltaTracker<T> {
    previous: Option<Snapshot<T>>,
}

impl<T> Default for DeltaTracker<T> {
    fn default() -> Self {
        Self { previous: None }
    }
}

impl<T: Tracked> DeltaTracker<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff `current` against the retained snapshot, captured now.
    pub fn compute(&mut self, current: Vec<T>) -> DeltaReport<T> {
        self.compute_at(current, clock::boot_time_ms())
    }

    /// Diff `current` against the retained snapshot, captured at `now_ms`,
    /// then retain `current` as the new baseline.
    pub fn compute_at(&mut self, current: Vec<T>, now_ms: u64) -> DeltaReport<T> {
        let (rows, elapsed_ms) = match &self.previous {
            Some(prev) => {
                let by_key: HashMap<T::Key, &T> =
                    prev.items.iter().map(|item| (item.key(), item)).collect();
                let rows = current
                    .iter()
                    .map(|item| DeltaRow {
                        current: item.clone(),
                        delta: item.delta_from(by_key.get(&item.key()).copied()),
                    })
                    .collect();
                (rows, now_ms.saturating_sub(prev.captured_ms))
            }
            None => {
                let rows = current
                    .iter()
                    .map(|item| DeltaRow {
                        current: item.clone(),
                        delta: item.delta_from(None),
                    })
                    .collect();
                (rows, 0)
            }
        };

        self.previous = Some(Snapshot {
            items: current,
            captured_ms: now_ms,
        });
        DeltaReport { rows, elapsed_ms }
    }

    pub fn previous(&self) -> Option<&Snapshot<T>> {
        self.previous.as_ref()
    }
}

/// Delta baselines for both report kinds.
#[derive(Debug, Clone, Default)]
pub struct ReportBaseline {
    pub rail_energy: DeltaTracker<EnergyData>,
    pub state_residency: DeltaTracker<EntityResidencyResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn residency(entity_id: i32, states: &[(i32, u64, u64, u64)]) -> EntityResidencyResult {
        EntityResidencyResult {
            entity_id,
            state_residency_data: states
                .iter()
                .map(|&(state_id, t, c, ts)| StateResidency {
                    state_id,
                    total_time_in_state_ms: t,
                    total_state_entry_count: c,
                    last_entry_timestamp_ms: ts,
                })
                .collect(),
        }
    }

    #[test]
    fn first_report_is_all_zero() {
        let mut t = DeltaTracker::new();
        let r = t.compute_at(vec![residency(0, &[(1, 100, 2, 50)])], 5_000);
        assert_eq!(r.elapsed_ms, 0);
        assert_eq!(
            r.rows[0].delta,
            vec![StateResidencyDelta {
                state_id: 1,
                ..Default::default()
            }]
        );
        assert_eq!(t.previous().unwrap().captured_ms, 5_000);
    }

    #[test]
    fn residency_deltas_per_field() {
        let mut t = DeltaTracker::new();
        t.compute_at(vec![residency(0, &[(1, 100, 2, 50)])], 1_000);
        let r = t.compute_at(vec![residency(0, &[(1, 150, 3, 80)])], 1_750);
        assert_eq!(r.elapsed_ms, 750);
        let d = r.rows[0].delta[0];
        assert_eq!(d.total_time_in_state_ms, 50);
        assert_eq!(d.total_state_entry_count, 1);
        assert_eq!(d.last_entry_timestamp_ms, 30);
    }

    #[test]
    fn residency_matches_by_entity_then_state() {
        let mut t = DeltaTracker::new();
        t.compute_at(
            vec![
                residency(0, &[(0, 10, 1, 1), (1, 20, 1, 2)]),
                residency(1, &[(0, 1000, 9, 9)]),
            ],
            0,
        );
        // Reordered entities and states, plus a new state and a new entity.
        let r = t.compute_at(
            vec![
                residency(1, &[(0, 1010, 10, 12)]),
                residency(0, &[(1, 25, 2, 4), (0, 10, 1, 1), (2, 7, 7, 7)]),
                residency(2, &[(0, 5, 5, 5)]),
            ],
            10,
        );
        assert_eq!(r.rows[0].delta[0].total_time_in_state_ms, 10);
        assert_eq!(r.rows[1].delta[0].state_id, 1);
        assert_eq!(r.rows[1].delta[0].total_time_in_state_ms, 5);
        assert_eq!(r.rows[1].delta[1].total_time_in_state_ms, 0);
        assert_eq!(r.rows[1].delta[2], StateResidencyDelta {
            state_id: 2,
            ..Default::default()
        });
        assert_eq!(r.rows[2].delta[0].total_state_entry_count, 0);
    }

    #[test]
    fn counter_reset_yields_negative_delta() {
        let mut t = DeltaTracker::new();
        t.compute_at(vec![residency(0, &[(0, 500, 5, 400)])], 0);
        let r = t.compute_at(vec![residency(0, &[(0, 20, 1, 10)])], 1);
        let d = r.rows[0].delta[0];
        assert_eq!(d.total_time_in_state_ms, -480);
        assert_eq!(d.total_state_entry_count, -4);
        assert_eq!(d.last_entry_timestamp_ms, -390);
    }

    #[test]
    fn energy_matched_by_rail_index() {
        let mut t = DeltaTracker::new();
        t.compute_at(
            vec![
                EnergyData {
                    rail_index: 0,
                    energy_uws: 1_000,
                },
                EnergyData {
                    rail_index: 1,
                    energy_uws: 5_000,
                },
            ],
            100,
        );
        let r = t.compute_at(
            vec![
                EnergyData {
                    rail_index: 1,
                    energy_uws: 7_500,
                },
                EnergyData {
                    rail_index: 2,
                    energy_uws: 10,
                },
            ],
            350,
        );
        assert_eq!(r.elapsed_ms, 250);
        assert_eq!(r.rows[0].delta, 2_500);
        assert_eq!(r.rows[1].delta, 0);
    }

    #[test]
    fn clock_going_backwards_saturates_elapsed() {
        let mut t: DeltaTracker<EnergyData> = DeltaTracker::new();
        t.compute_at(Vec::new(), 1_000);
        let r = t.compute_at(Vec::new(), 500);
        assert_eq!(r.elapsed_ms, 0);
    }
}
