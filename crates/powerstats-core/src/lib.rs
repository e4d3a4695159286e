//! # powerstats-core
//!
//! Aggregates hardware power-state telemetry: per-entity low-power state
//! residency and per-rail cumulative energy, collected from pluggable
//! providers and exposed as queryable snapshots plus a differential text report.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use powerstats_core::{DumpMode, detect_providers};
//!
//! let stats = detect_providers(Path::new("/"), true)
//!     .into_power_stats()
//!     .expect("provider entity names are unique");
//!
//! let residency = stats.state_residency(&[]);
//! println!("{} entities, status {}", residency.results.len(), residency.status);
//!
//! print!("{}", stats.dump(DumpMode::Delta));
//! ```
//!
//! ## Architecture
//!
//! Providers → Registry (ids) → Aggregator (per-query cache) → Delta tracker → Report
//!
//! Every state residency source implements [`StateResidencyProvider`] and may
//! answer for several entities at once; the [`Registry`] hands out dense entity
//! ids at registration. A residency query calls each owning provider at most
//! once per pass. Rail energy comes from at most one [`RailEnergyProvider`].
//! [`PowerStats`] ties it together and owns the delta baseline used by
//! [`DumpMode::Delta`] reports.

pub mod clock;
pub mod delta;
pub mod error;
pub mod model;
pub mod provider;
pub mod rail;
pub mod registry;
pub mod report;
pub mod residency;
pub mod sources;
pub mod stats;

#[cfg(test)]
mod testing;

pub use delta::{
    DeltaReport, DeltaRow, DeltaTracker, ReportBaseline, Snapshot, StateResidencyDelta, Tracked,
};
pub use error::{ConfigError, ProviderError, RegistryError, Status};
pub use model::{
    EnergyData, EntityResidencyResult, PowerEntityInfo, RailInfo, StateInfo, StateResidency,
};
pub use provider::{
    EntityDescriptor, RailEnergyProvider, ResidencyMap, StateResidencyProvider, select_rails,
};
pub use rail::{RailAdapter, RailNames};
pub use registry::{EntityNames, Registry};
pub use residency::ResidencyQuery;
pub use sources::{ProviderSet, detect_providers};
pub use stats::{DumpMode, PowerStats};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
