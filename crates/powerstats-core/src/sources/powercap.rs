//! PowercapRailProvider: cumulative rail energy from Linux powercap sysfs.
//!
//! Each zone under `<root>/sys/class/powercap` that exposes a readable
//! `energy_uj` counter becomes one rail. Micro-joules are micro-watt-seconds,
//! so counters are reported unscaled. Rail indices follow sorted zone order.

use std::path::{Path, PathBuf};

use crate::error::ProviderError;
use crate::model::{EnergyData, RailInfo};
use crate::provider::RailEnergyProvider;

use super::read_trimmed;

const POWERCAP_DIR: &str = "sys/class/powercap";

struct Zone {
    info: RailInfo,
    energy_path: PathBuf,
}

/// Rail energy provider backed by powercap zones (RAPL and friends).
pub struct PowercapRailProvider {
    zones: Vec<Zone>,
}

impl PowercapRailProvider {
    /// Scan `root` for powercap zones with readable energy counters.
    pub fn discover(root: &Path) -> Option<Self> {
        let base = root.join(POWERCAP_DIR);
        let mut dirs: Vec<(String, PathBuf)> = std::fs::read_dir(&base)
            .ok()?
            .flatten()
            .filter_map(|e| Some((e.file_name().to_str()?.to_string(), e.path())))
            .filter(|(_, path)| path.join("energy_uj").is_file())
            .collect();
        dirs.sort();

        let mut zones = Vec::new();
        for (zone_name, dir) in dirs {
            let energy_path = dir.join("energy_uj");
            if read_energy(&energy_path).is_err() {
                log::debug!("powercap: {} not readable, skipping", energy_path.display());
                continue;
            }
            let subsys_name = zone_name
                .split(':')
                .next()
                .unwrap_or(zone_name.as_str())
                .to_string();
            let rail_name = read_trimmed(&dir.join("name")).unwrap_or_else(|| zone_name.clone());
            let rail_index = zones.len() as i32;
            zones.push(Zone {
                info: RailInfo {
                    rail_index,
                    subsys_name,
                    rail_name,
                },
                energy_path,
            });
        }

        if zones.is_empty() {
            return None;
        }
        log::debug!("powercap: found {} rails under {}", zones.len(), base.display());
        Some(Self { zones })
    }
}

fn read_energy(path: &Path) -> Result<i64, ProviderError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ProviderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ProviderError::Malformed {
            path: path.to_path_buf(),
            value: raw.trim().to_string(),
        })
}

impl RailEnergyProvider for PowercapRailProvider {
    fn rail_info(&self) -> Result<Vec<RailInfo>, ProviderError> {
        Ok(self.zones.iter().map(|z| z.info.clone()).collect())
    }

    fn energy(&self, rail_indices: &[i32]) -> Result<Vec<EnergyData>, ProviderError> {
        let wanted: Vec<&Zone> = self
            .zones
            .iter()
            .filter(|z| rail_indices.is_empty() || rail_indices.contains(&z.info.rail_index))
            .collect();
        let mut readings = Vec::with_capacity(wanted.len());
        for zone in wanted {
            readings.push(EnergyData {
                rail_index: zone.info.rail_index,
                energy_uws: read_energy(&zone.energy_path)?,
            });
        }
        Ok(readings)
    }
}
