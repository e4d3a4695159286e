//! Data provider capabilities.
//!
//! State residency data comes from any number of [`StateResidencyProvider`]s.
//! A single provider may back several sibling entities and answers for all of
//! them in one [`results`](StateResidencyProvider::results) call. Rail energy
//! comes from at most one [`RailEnergyProvider`].

use std::collections::HashMap;

use crate::error::ProviderError;
use crate::model::{EnergyData, RailInfo, StateInfo, StateResidency};

/// Entity advertised by a provider at registration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescriptor {
    pub entity_name: String,
    pub states: Vec<StateInfo>,
}

impl EntityDescriptor {
    pub fn new(entity_name: impl Into<String>, states: Vec<StateInfo>) -> Self {
        Self {
            entity_name: entity_name.into(),
            states,
        }
    }
}

/// Residency records keyed by entity name.
pub type ResidencyMap = HashMap<String, Vec<StateResidency>>;

/// Trait that every state residency provider must implement.
pub trait StateResidencyProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Entities this provider backs, with their states. Called once, at registration.
    fn info(&self) -> Vec<EntityDescriptor>;

    /// Current residency records for every entity the provider can answer for.
    ///
    /// Entities the provider failed to read are simply absent from the map.
    fn results(&self) -> ResidencyMap;
}

/// Trait for the (single, optional) rail energy provider.
pub trait RailEnergyProvider: Send + Sync {
    /// Static metadata for every rail.
    fn rail_info(&self) -> Result<Vec<RailInfo>, ProviderError>;

    /// Current readings for the given rails; an empty slice means all rails.
    fn energy(&self, rail_indices: &[i32]) -> Result<Vec<EnergyData>, ProviderError>;
}

impl<T: RailEnergyProvider + ?Sized> RailEnergyProvider for std::sync::Arc<T> {
    fn rail_info(&self) -> Result<Vec<RailInfo>, ProviderError> {
        (**self).rail_info()
    }

    fn energy(&self, rail_indices: &[i32]) -> Result<Vec<EnergyData>, ProviderError> {
        (**self).energy(rail_indices)
    }
}

/// Keep readings whose index was requested; an empty request keeps everything.
pub fn select_rails(readings: Vec<EnergyData>, rail_indices: &[i32]) -> Vec<EnergyData> {
    if rail_indices.is_empty() {
        return readings;
    }
    readings
        .into_iter()
        .filter(|r| rail_indices.contains(&r.rail_index))
        .collect()
}
