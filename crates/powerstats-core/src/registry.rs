//! Power entity identity registry.
//!
//! Entity ids are dense, start at 0 and are handed out in registration order.
//! Nothing is ever unregistered, so an id stays valid for the lifetime of the
//! registry. Each id keeps a shared handle to the provider that backs it; one
//! provider usually backs several entities.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::RegistryError;
use crate::model::{PowerEntityInfo, StateInfo};
use crate::provider::StateResidencyProvider;

/// Registry of power entities and their owning providers.
#[derive(Default)]
pub struct Registry {
    entities: Vec<PowerEntityInfo>,
    providers: Vec<Arc<dyn StateResidencyProvider>>,
}

/// Id-to-name lookup tables used when rendering reports.
#[derive(Debug, Clone, Default)]
pub struct EntityNames {
    pub entities: HashMap<i32, String>,
    pub states: HashMap<i32, HashMap<i32, String>>,
}

impl EntityNames {
    pub fn entity(&self, entity_id: i32) -> Option<&str> {
        self.entities.get(&entity_id).map(String::as_str)
    }

    pub fn state(&self, entity_id: i32, state_id: i32) -> Option<&str> {
        self.states
            .get(&entity_id)
            .and_then(|states| states.get(&state_id))
            .map(String::as_str)
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one entity backed by `provider` and return its id.
    fn register(
        &mut self,
        entity_name: impl Into<String>,
        states: Vec<StateInfo>,
        provider: Arc<dyn StateResidencyProvider>,
    ) -> Result<i32, RegistryError> {
        let entity_name = entity_name.into();
        if self.id_of(&entity_name).is_some() {
            return Err(RegistryError::DuplicateEntity(entity_name));
        }

        let entity_id = self.entities.len() as i32;
        log::debug!(
            "registered power entity {entity_id} '{entity_name}' ({} states, provider '{}')",
            states.len(),
            provider.name()
        );
        self.entities.push(PowerEntityInfo {
            entity_id,
            entity_name,
            states,
        });
        self.providers.push(provider);
        Ok(entity_id)
    }

    /// Register every entity `provider` advertises. Ids are consecutive.
    ///
    /// Either all advertised entities are registered or none are.
    pub fn add_provider(
        &mut self,
        provider: Arc<dyn StateResidencyProvider>,
    ) -> Result<Vec<i32>, RegistryError> {
        let descriptors = provider.info();

        let mut seen: Vec<&str> = Vec::with_capacity(descriptors.len());
        for d in &descriptors {
            if self.id_of(&d.entity_name).is_some() || seen.contains(&d.entity_name.as_str()) {
                return Err(RegistryError::DuplicateEntity(d.entity_name.clone()));
            }
            seen.push(&d.entity_name);
        }

        let mut ids = Vec::with_capacity(descriptors.len());
        for d in descriptors {
            ids.push(self.register(d.entity_name, d.states, Arc::clone(&provider))?);
        }
        log::info!(
            "state residency provider '{}' backs {} entities",
            provider.name(),
            ids.len()
        );
        Ok(ids)
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Full registry dump, in id order.
    pub fn entities(&self) -> &[PowerEntityInfo] {
        &self.entities
    }

    pub fn entity(&self, entity_id: i32) -> Option<&PowerEntityInfo> {
        usize::try_from(entity_id)
            .ok()
            .and_then(|i| self.entities.get(i))
    }

    /// Provider backing `entity_id`.
    pub fn provider(&self, entity_id: i32) -> Option<&Arc<dyn StateResidencyProvider>> {
        usize::try_from(entity_id)
            .ok()
            .and_then(|i| self.providers.get(i))
    }

    /// An empty request means every registered entity, in ascending id order.
    /// Anything else is passed through untouched; validation happens downstream.
    pub fn resolve_entity_ids(&self, requested: &[i32]) -> Vec<i32> {
        if requested.is_empty() && !self.entities.is_empty() {
            (0..self.entities.len() as i32).collect()
        } else {
            requested.to_vec()
        }
    }

    pub fn entity_name(&self, entity_id: i32) -> Option<&str> {
        self.entity(entity_id).map(|e| e.entity_name.as_str())
    }

    pub fn state_name(&self, entity_id: i32, state_id: i32) -> Option<&str> {
        self.entity(entity_id)?
            .states
            .iter()
            .find(|s| s.state_id == state_id)
            .map(|s| s.state_name.as_str())
    }

    /// Build lookup tables for report rendering.
    pub fn names(&self) -> EntityNames {
        let mut names = EntityNames::default();
        for info in &self.entities {
            names
                .entities
                .insert(info.entity_id, info.entity_name.clone());
            names.states.insert(
                info.entity_id,
                info.states
                    .iter()
                    .map(|s| (s.state_id, s.state_name.clone()))
                    .collect(),
            );
        }
        names
    }

    fn id_of(&self, entity_name: &str) -> Option<i32> {
        self.entities
            .iter()
            .find(|e| e.entity_name == entity_name)
            .map(|e| e.entity_id)
    }
}
