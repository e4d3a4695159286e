//! The power stats service: every operation a host exposes to its callers.
//!
//! Provider registration happens up front through `&mut self`; afterwards the
//! service is shared immutably. Queries run lock-free on the caller's thread.
//! Report generation mutates the delta baseline and is serialized by a single
//! lock held for the whole fetch-diff-replace sequence.

use std::io::Write;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use crate::delta::ReportBaseline;
use crate::error::{ProviderError, RegistryError};
use crate::model::{EnergyData, PowerEntityInfo, RailInfo};
use crate::provider::{RailEnergyProvider, StateResidencyProvider};
use crate::rail::{RailAdapter, RailNames};
use crate::registry::Registry;
use crate::report;
use crate::residency::{self, ResidencyQuery};

/// Report rendering mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DumpMode {
    #[default]
    Plain,
    /// Annotate every counter with its change since the previous delta report.
    Delta,
}

impl DumpMode {
    /// Delta mode iff the only argument is `delta`.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Self {
        match args {
            [only] if only.as_ref() == "delta" => Self::Delta,
            _ => Self::Plain,
        }
    }
}

impl FromStr for DumpMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plain" => Ok(Self::Plain),
            "delta" => Ok(Self::Delta),
            other => Err(format!("unknown dump mode '{other}' (expected plain|delta)")),
        }
    }
}

impl std::fmt::Display for DumpMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Delta => write!(f, "delta"),
        }
    }
}

/// Aggregates state residency and rail energy from registered providers.
#[derive(Default)]
pub struct PowerStats {
    registry: Registry,
    rails: RailAdapter,
    baseline: Mutex<ReportBaseline>,
}

impl PowerStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every entity `provider` backs. Returns the assigned ids.
    pub fn add_state_residency_provider(
        &mut self,
        provider: Arc<dyn StateResidencyProvider>,
    ) -> Result<Vec<i32>, RegistryError> {
        self.registry.add_provider(provider)
    }

    /// Install the rail energy provider, replacing any previous one.
    pub fn set_rail_provider(&mut self, provider: Box<dyn RailEnergyProvider>) {
        self.rails.set_provider(provider);
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Full registry dump.
    pub fn list_entities(&self) -> Vec<PowerEntityInfo> {
        self.registry.entities().to_vec()
    }

    /// Rail metadata; empty when no rail provider is configured.
    pub fn list_rails(&self) -> Result<Vec<RailInfo>, ProviderError> {
        self.rails.rail_info()
    }

    /// Energy readings for `rail_indices`; empty means all rails.
    pub fn energy(&self, rail_indices: &[i32]) -> Result<Vec<EnergyData>, ProviderError> {
        self.rails.energy(rail_indices)
    }

    /// State residency for `entity_ids`; empty means all entities.
    pub fn state_residency(&self, entity_ids: &[i32]) -> ResidencyQuery {
        residency::query(&self.registry, entity_ids)
    }

    /// Combined report: state residency section, then rail energy section.
    pub fn dump(&self, mode: DumpMode) -> String {
        let mut baseline = self
            .baseline
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut out = String::new();
        self.dump_state_residency(&mut out, mode, &mut baseline);
        self.dump_rail_energy(&mut out, mode, &mut baseline);
        out
    }

    /// Write the combined report to `w` and flush it.
    pub fn dump_to<W: Write>(&self, w: &mut W, mode: DumpMode) -> std::io::Result<()> {
        w.write_all(self.dump(mode).as_bytes())?;
        w.flush()
    }

    fn dump_state_residency(&self, out: &mut String, mode: DumpMode, baseline: &mut ReportBaseline) {
        let names = self.registry.names();
        report::begin_section(out, report::STATE_RESIDENCY_TITLE);

        let query = self.state_residency(&[]);
        if !query.status.is_ok() {
            log::warn!("state residency report is partial: {}", query.status);
        }

        match mode {
            DumpMode::Plain => report::render_state_residency(out, &query.results, &names),
            DumpMode::Delta => {
                let delta = baseline.state_residency.compute(query.results);
                report::render_state_residency_delta(out, &delta, &names);
            }
        }

        report::end_section(out, report::STATE_RESIDENCY_TITLE);
    }

    fn dump_rail_energy(&self, out: &mut String, mode: DumpMode, baseline: &mut ReportBaseline) {
        report::begin_section(out, report::RAIL_ENERGY_TITLE);

        match self.rails.rail_names().and_then(|names| Ok((names, self.energy(&[])?))) {
            Ok((names, readings)) => self.render_rails(out, mode, baseline, &names, readings),
            Err(e) => {
                log::warn!("rail energy unavailable: {e}");
                out.push_str(&format!("  rail energy unavailable: {e}\n"));
            }
        }

        report::end_section(out, report::RAIL_ENERGY_TITLE);
    }

    fn render_rails(
        &self,
        out: &mut String,
        mode: DumpMode,
        baseline: &mut ReportBaseline,
        names: &RailNames,
        readings: Vec<EnergyData>,
    ) {
        match mode {
            DumpMode::Plain => report::render_rail_energy(out, &readings, names),
            DumpMode::Delta => {
                let delta = baseline.rail_energy.compute(readings);
                report::render_rail_energy_delta(out, &delta, names);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Status;
    use crate::testing::{MockProvider, MockRails};

    fn service() -> (PowerStats, Arc<MockProvider>, Arc<MockRails>) {
        let provider = Arc::new(MockProvider::new("soc").entity("CPU", 2).entity("GPU", 1));
        let rails = Arc::new(MockRails::new(&[(0, "SoC", "VDD_CPU", 1_500_000)]));
        let mut stats = PowerStats::new();
        stats.add_state_residency_provider(provider.clone()).unwrap();
        stats.set_rail_provider(Box::new(rails.clone()));
        (stats, provider, rails)
    }

    #[test]
    fn dump_mode_from_args() {
        assert_eq!(DumpMode::from_args(&["delta"]), DumpMode::Delta);
        assert_eq!(DumpMode::from_args::<&str>(&[]), DumpMode::Plain);
        assert_eq!(DumpMode::from_args(&["delta", "x"]), DumpMode::Plain);
        assert_eq!(DumpMode::from_args(&["Delta"]), DumpMode::Plain);
        assert_eq!("delta".parse::<DumpMode>(), Ok(DumpMode::Delta));
        assert!("bogus".parse::<DumpMode>().is_err());
    }

    #[test]
    fn boundary_operations() {
        let (stats, _, _) = service();
        let entities = stats.list_entities();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[1].entity_name, "GPU");
        assert_eq!(stats.list_rails().unwrap().len(), 1);
        assert_eq!(stats.energy(&[]).unwrap()[0].energy_uws, 1_500_000);

        let q = stats.state_residency(&[1, 2]);
        assert_eq!(q.status, Status::BadValue);
        assert_eq!(q.results.len(), 1);
    }

    #[test]
    fn dump_orders_sections() {
        let (stats, _, _) = service();
        let text = stats.dump(DumpMode::Plain);
        let residency = text.find("==== Power stats state residencies ====").unwrap();
        let rails = text.find("==== Power stats rail energy ====").unwrap();
        assert!(residency < rails);
        assert!(text.contains("1500.00 mWs"));
        assert!(!text.contains("Elapsed time"));
    }

    #[test]
    fn delta_dump_tracks_changes() {
        let (stats, provider, rails) = service();
        provider.set("CPU", 1, 100, 2, 50);
        let first = stats.dump(DumpMode::Delta);
        assert!(first.contains("Elapsed time: 0 ms"));

        provider.set("CPU", 1, 150, 3, 80);
        rails.set(0, 2_000_000);
        let second = stats.dump(DumpMode::Delta);
        let row = second
            .lines()
            .find(|l| l.contains("CPU") && l.contains("S1"))
            .unwrap();
        assert!(row.contains("+50)"), "{row}");
        assert!(row.contains("+1)"), "{row}");
        assert!(row.contains("+30)"), "{row}");
        assert!(second.contains("+500.00)"), "{second}");
    }

    #[test]
    fn plain_dump_leaves_baseline_alone() {
        let (stats, provider, _) = service();
        provider.set("CPU", 0, 10, 1, 1);
        stats.dump(DumpMode::Delta);
        provider.set("CPU", 0, 30, 2, 5);
        stats.dump(DumpMode::Plain);
        let text = stats.dump(DumpMode::Delta);
        assert!(text.contains("+20)"), "{text}");
    }

    #[test]
    fn no_rail_provider_renders_empty_section() {
        let mut stats = PowerStats::new();
        stats
            .add_state_residency_provider(Arc::new(MockProvider::new("p").entity("A", 1)))
            .unwrap();
        assert!(stats.list_rails().unwrap().is_empty());
        let text = stats.dump(DumpMode::Delta);
        assert!(text.contains("==== End of Power stats rail energy ===="));
        assert!(!text.contains("unavailable"));
    }

    #[test]
    fn dump_to_writes_report() {
        let (stats, _, _) = service();
        let mut buf = Vec::new();
        stats.dump_to(&mut buf, DumpMode::Plain).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("VDD_CPU"));
    }

    #[test]
    fn concurrent_delta_dumps_are_serialized() {
        let (stats, _, _) = service();
        let stats = Arc::new(stats);
        std::thread::scope(|s| {
            for _ in 0..8 {
                let stats = Arc::clone(&stats);
                s.spawn(move || {
                    for _ in 0..10 {
                        let text = stats.dump(DumpMode::Delta);
                        assert!(text.contains("(            +0)"), "{text}");
                    }
                });
            }
        });
    }
}
