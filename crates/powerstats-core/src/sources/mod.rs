//! Concrete data providers.
//!
//! - [`cpuidle`]: per-CPU idle state residency (Linux sysfs)
//! - [`powercap`]: cumulative rail energy from powercap zones (Linux sysfs)
//! - [`fixture`]: static providers described by a JSON fixture

pub mod cpuidle;
pub mod fixture;
pub mod powercap;

use std::path::Path;
use std::sync::Arc;

use crate::error::{ConfigError, RegistryError};
use crate::provider::{RailEnergyProvider, StateResidencyProvider};
use crate::stats::PowerStats;

pub use cpuidle::CpuIdleProvider;
pub use fixture::{Fixture, FixtureRailProvider, FixtureResidencyProvider};
pub use powercap::PowercapRailProvider;

/// Read a small sysfs-style file, trimmed. `None` if missing or empty.
pub(crate) fn read_trimmed(path: &Path) -> Option<String> {
    let raw = std::fs::read_to_string(path).ok()?;
    let v = raw.trim();
    if v.is_empty() {
        None
    } else {
        Some(v.to_string())
    }
}

/// Providers to register with a [`PowerStats`] service.
#[derive(Default)]
pub struct ProviderSet {
    pub residency: Vec<Arc<dyn StateResidencyProvider>>,
    pub rail: Option<Box<dyn RailEnergyProvider>>,
}

impl ProviderSet {
    /// Build providers from a JSON fixture file.
    pub fn from_fixture(path: &Path) -> Result<Self, ConfigError> {
        let fixture = Fixture::load(path)?;
        log::info!(
            "fixture {}: {} residency providers, {} rails",
            path.display(),
            fixture.residency_providers.len(),
            fixture.rails.len()
        );
        Ok(Self::from(fixture))
    }

    /// Register everything into a fresh service, in order.
    pub fn into_power_stats(self) -> Result<PowerStats, RegistryError> {
        let mut stats = PowerStats::new();
        for provider in self.residency {
            stats.add_state_residency_provider(provider)?;
        }
        if let Some(rail) = self.rail {
            stats.set_rail_provider(rail);
        }
        Ok(stats)
    }
}

impl From<Fixture> for ProviderSet {
    fn from(fixture: Fixture) -> Self {
        let residency = fixture
            .residency_providers
            .into_iter()
            .map(|spec| Arc::new(FixtureResidencyProvider::new(spec)) as Arc<dyn StateResidencyProvider>)
            .collect();
        let rail = (!fixture.rails.is_empty())
            .then(|| Box::new(FixtureRailProvider::new(fixture.rails)) as Box<dyn RailEnergyProvider>);
        Self { residency, rail }
    }
}

/// Discover the providers available on this machine under `sysfs_root`
/// (normally `/`). Missing facilities are skipped, not errors.
pub fn detect_providers(sysfs_root: &Path, include_rails: bool) -> ProviderSet {
    let mut set = ProviderSet::default();

    match CpuIdleProvider::discover(sysfs_root) {
        Some(p) => set.residency.push(Arc::new(p)),
        None => log::info!("no cpuidle state residency under {}", sysfs_root.display()),
    }

    if include_rails {
        match PowercapRailProvider::discover(sysfs_root) {
            Some(p) => set.rail = Some(Box::new(p)),
            None => log::info!("no powercap rail energy under {}", sysfs_root.display()),
        }
    }

    set
}
