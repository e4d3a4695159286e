//! Optional rail energy capability.
//!
//! Platforms without rail telemetry simply have no provider; every query then
//! succeeds with an empty result, which keeps "nothing to measure" distinct
//! from a provider failure.

use std::collections::HashMap;

use crate::error::ProviderError;
use crate::model::{EnergyData, RailInfo};
use crate::provider::RailEnergyProvider;

/// Rail index to `(subsystem, rail)` names.
pub type RailNames = HashMap<i32, (String, String)>;

/// Wrapper around the zero-or-one rail energy provider.
#[derive(Default)]
pub struct RailAdapter {
    provider: Option<Box<dyn RailEnergyProvider>>,
}

impl RailAdapter {
    pub fn new(provider: Option<Box<dyn RailEnergyProvider>>) -> Self {
        Self { provider }
    }

    /// Install (or replace) the rail provider.
    pub fn set_provider(&mut self, provider: Box<dyn RailEnergyProvider>) {
        self.provider = Some(provider);
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    pub fn rail_info(&self) -> Result<Vec<RailInfo>, ProviderError> {
        match &self.provider {
            Some(p) => p.rail_info(),
            None => {
                log::debug!("no rail energy provider configured");
                Ok(Vec::new())
            }
        }
    }

    /// Readings for `rail_indices`; an empty slice means all rails.
    pub fn energy(&self, rail_indices: &[i32]) -> Result<Vec<EnergyData>, ProviderError> {
        match &self.provider {
            Some(p) => p.energy(rail_indices),
            None => Ok(Vec::new()),
        }
    }

    pub fn rail_names(&self) -> Result<RailNames, ProviderError> {
        Ok(self
            .rail_info()?
            .into_iter()
            .map(|r| (r.rail_index, (r.subsys_name, r.rail_name)))
            .collect())
    }
}
