//! State residency aggregation.
//!
//! A query fans out to the providers owning the requested entities. Results
//! are cached by entity name for the duration of one query, so a provider that
//! backs several requested entities is called once per pass.

use serde::{Deserialize, Serialize};

use crate::error::Status;
use crate::model::EntityResidencyResult;
use crate::provider::ResidencyMap;
use crate::registry::Registry;

/// Results of one residency query plus its overall status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidencyQuery {
    pub results: Vec<EntityResidencyResult>,
    pub status: Status,
}

/// Query state residency for `entity_ids` (empty = all registered entities).
///
/// Processing never stops at the first problem: out-of-range ids record
/// [`Status::BadValue`], entities their provider did not answer for record
/// [`Status::FailedTransaction`], and every other id is still served in
/// request order.
pub fn query(registry: &Registry, entity_ids: &[i32]) -> ResidencyQuery {
    let ids = registry.resolve_entity_ids(entity_ids);
    let mut out = ResidencyQuery::default();
    let mut cache = ResidencyMap::new();

    for id in ids {
        let (Some(info), Some(provider)) = (registry.entity(id), registry.provider(id)) else {
            log::warn!(
                "power entity id {id} out of range (0..{})",
                registry.len()
            );
            out.status.escalate(Status::BadValue);
            continue;
        };

        if !cache.contains_key(&info.entity_name) {
            log::debug!(
                "fetching residency from provider '{}' for '{}'",
                provider.name(),
                info.entity_name
            );
            for (name, records) in provider.results() {
                cache.entry(name).or_insert(records);
            }
        }

        match cache.get(&info.entity_name) {
            Some(records) => out.results.push(EntityResidencyResult {
                entity_id: id,
                state_residency_data: records.clone(),
            }),
            None => {
                log::warn!(
                    "provider '{}' returned no residency for '{}'",
                    provider.name(),
                    info.entity_name
                );
                out.status.escalate(Status::FailedTransaction);
            }
        }
    }

    out
}
