//! Providers backed by a static JSON fixture.
//!
//! Fixtures describe simulated hardware for development and tests: any number
//! of state residency providers plus an optional set of rails. An entity listed
//! under `missing` is advertised at registration but never answered for, which
//! simulates a provider failing to read it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ProviderError};
use crate::model::{EnergyData, RailInfo, StateInfo, StateResidency};
use crate::provider::{
    EntityDescriptor, RailEnergyProvider, ResidencyMap, StateResidencyProvider, select_rails,
};

/// Top-level fixture document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fixture {
    #[serde(default)]
    pub residency_providers: Vec<FixtureProviderSpec>,
    #[serde(default)]
    pub rails: Vec<FixtureRailSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureProviderSpec {
    pub name: String,
    pub entities: Vec<FixtureEntitySpec>,
    #[serde(default)]
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureEntitySpec {
    pub name: String,
    pub states: Vec<FixtureStateSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureStateSpec {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub total_time_in_state_ms: u64,
    #[serde(default)]
    pub total_state_entry_count: u64,
    #[serde(default)]
    pub last_entry_timestamp_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureRailSpec {
    pub index: i32,
    pub subsys_name: String,
    pub rail_name: String,
    #[serde(default)]
    pub energy_uws: i64,
}

impl Fixture {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// State residency provider replaying one fixture provider block.
pub struct FixtureResidencyProvider {
    spec: FixtureProviderSpec,
}

impl FixtureResidencyProvider {
    pub fn new(spec: FixtureProviderSpec) -> Self {
        Self { spec }
    }
}

impl StateResidencyProvider for FixtureResidencyProvider {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn info(&self) -> Vec<EntityDescriptor> {
        self.spec
            .entities
            .iter()
            .map(|e| {
                EntityDescriptor::new(
                    e.name.clone(),
                    e.states
                        .iter()
                        .map(|s| StateInfo::new(s.id, s.name.clone()))
                        .collect(),
                )
            })
            .collect()
    }

    fn results(&self) -> ResidencyMap {
        self.spec
            .entities
            .iter()
            .filter(|e| !self.spec.missing.contains(&e.name))
            .map(|e| {
                let data = e
                    .states
                    .iter()
                    .map(|s| StateResidency {
                        state_id: s.id,
                        total_time_in_state_ms: s.total_time_in_state_ms,
                        total_state_entry_count: s.total_state_entry_count,
                        last_entry_timestamp_ms: s.last_entry_timestamp_ms,
                    })
                    .collect();
                (e.name.clone(), data)
            })
            .collect()
    }
}

/// Rail provider replaying the fixture's rail list.
pub struct FixtureRailProvider {
    rails: Vec<FixtureRailSpec>,
}

impl FixtureRailProvider {
    pub fn new(rails: Vec<FixtureRailSpec>) -> Self {
        Self { rails }
    }
}

impl RailEnergyProvider for FixtureRailProvider {
    fn rail_info(&self) -> Result<Vec<RailInfo>, ProviderError> {
        Ok(self
            .rails
            .iter()
            .map(|r| RailInfo {
                rail_index: r.index,
                subsys_name: r.subsys_name.clone(),
                rail_name: r.rail_name.clone(),
            })
            .collect())
    }

    fn energy(&self, rail_indices: &[i32]) -> Result<Vec<EnergyData>, ProviderError> {
        let readings = self
            .rails
            .iter()
            .map(|r| EnergyData {
                rail_index: r.index,
                energy_uws: r.energy_uws,
            })
            .collect();
        Ok(select_rails(readings, rail_indices))
    }
}
