//! Deterministic providers for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::ProviderError;
use crate::model::{EnergyData, RailInfo, StateInfo, StateResidency};
use crate::provider::{
    EntityDescriptor, RailEnergyProvider, ResidencyMap, StateResidencyProvider, select_rails,
};

/// State residency provider with scripted records and a call counter.
///
/// States are named `S0`, `S1`, ... with ids matching their position.
pub struct MockProvider {
    name: String,
    entities: Vec<EntityDescriptor>,
    missing: Vec<String>,
    records: Mutex<HashMap<(String, i32), StateResidency>>,
    calls: AtomicUsize,
}

impl MockProvider {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entities: Vec::new(),
            missing: Vec::new(),
            records: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn entity(mut self, name: &str, n_states: i32) -> Self {
        let states = (0..n_states)
            .map(|i| StateInfo::new(i, format!("S{i}")))
            .collect();
        self.entities.push(EntityDescriptor::new(name, states));
        self
    }

    /// Advertise `name` but never return data for it.
    pub fn missing(mut self, name: &str) -> Self {
        self.missing.push(name.to_string());
        self
    }

    pub fn set(&self, entity: &str, state_id: i32, time_ms: u64, count: u64, ts_ms: u64) {
        self.records.lock().unwrap().insert(
            (entity.to_string(), state_id),
            StateResidency {
                state_id,
                total_time_in_state_ms: time_ms,
                total_state_entry_count: count,
                last_entry_timestamp_ms: ts_ms,
            },
        );
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl StateResidencyProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn info(&self) -> Vec<EntityDescriptor> {
        self.entities.clone()
    }

    fn results(&self) -> ResidencyMap {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let records = self.records.lock().unwrap();
        self.entities
            .iter()
            .filter(|e| !self.missing.contains(&e.entity_name))
            .map(|e| {
                let data = e
                    .states
                    .iter()
                    .map(|s| {
                        records
                            .get(&(e.entity_name.clone(), s.state_id))
                            .copied()
                            .unwrap_or(StateResidency {
                                state_id: s.state_id,
                                total_time_in_state_ms: 0,
                                total_state_entry_count: 0,
                                last_entry_timestamp_ms: 0,
                            })
                    })
                    .collect();
                (e.entity_name.clone(), data)
            })
            .collect()
    }
}

/// Rail provider with settable readings.
pub struct MockRails {
    rails: Vec<RailInfo>,
    energy: Mutex<Vec<EnergyData>>,
}

impl MockRails {
    pub fn new(rails: &[(i32, &str, &str, i64)]) -> Self {
        Self {
            rails: rails
                .iter()
                .map(|&(rail_index, subsys, rail, _)| RailInfo {
                    rail_index,
                    subsys_name: subsys.to_string(),
                    rail_name: rail.to_string(),
                })
                .collect(),
            energy: Mutex::new(
                rails
                    .iter()
                    .map(|&(rail_index, _, _, energy_uws)| EnergyData {
                        rail_index,
                        energy_uws,
                    })
                    .collect(),
            ),
        }
    }

    pub fn set(&self, rail_index: i32, energy_uws: i64) {
        let mut energy = self.energy.lock().unwrap();
        if let Some(e) = energy.iter_mut().find(|e| e.rail_index == rail_index) {
            e.energy_uws = energy_uws;
        }
    }
}

impl RailEnergyProvider for MockRails {
    fn rail_info(&self) -> Result<Vec<RailInfo>, ProviderError> {
        Ok(self.rails.clone())
    }

    fn energy(&self, rail_indices: &[i32]) -> Result<Vec<EnergyData>, ProviderError> {
        Ok(select_rails(
            self.energy.lock().unwrap().clone(),
            rail_indices,
        ))
    }
}
