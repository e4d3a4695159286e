//! CpuIdleProvider: per-CPU idle state residency from Linux cpuidle sysfs.
//!
//! Layout under `<root>/sys/devices/system/cpu`:
//! ```text
//! cpu0/cpuidle/state0/name    "WFI"
//! cpu0/cpuidle/state0/time    total residency, microseconds
//! cpu0/cpuidle/state0/usage   entry count
//! ```
//! Every CPU becomes one entity (`cpu0`, `cpu1`, ...). One provider answers
//! for all CPUs in a single pass.

use std::path::{Path, PathBuf};

use crate::model::{StateInfo, StateResidency};
use crate::provider::{EntityDescriptor, ResidencyMap, StateResidencyProvider};

use super::read_trimmed;

const CPU_DIR: &str = "sys/devices/system/cpu";

struct CpuEntry {
    name: String,
    states: Vec<(i32, PathBuf)>,
    descriptor: EntityDescriptor,
}

/// State residency provider backed by cpuidle counters.
pub struct CpuIdleProvider {
    cpus: Vec<CpuEntry>,
}

impl CpuIdleProvider {
    /// Scan `root` for CPUs with cpuidle states. `None` if there are none.
    pub fn discover(root: &Path) -> Option<Self> {
        let cpu_root = root.join(CPU_DIR);
        let entries = std::fs::read_dir(&cpu_root).ok()?;

        let mut cpus: Vec<(u32, CpuEntry)> = entries
            .flatten()
            .filter_map(|entry| {
                let fname = entry.file_name();
                let num = fname.to_str()?.strip_prefix("cpu")?.parse::<u32>().ok()?;
                let entry = scan_cpu(&entry.path().join("cpuidle"), num)?;
                Some((num, entry))
            })
            .collect();

        if cpus.is_empty() {
            return None;
        }
        cpus.sort_by_key(|(num, _)| *num);
        log::debug!("cpuidle: found {} cpus under {}", cpus.len(), cpu_root.display());
        Some(Self {
            cpus: cpus.into_iter().map(|(_, e)| e).collect(),
        })
    }
}

fn scan_cpu(idle_dir: &Path, num: u32) -> Option<CpuEntry> {
    let mut states: Vec<(i32, PathBuf, String)> = std::fs::read_dir(idle_dir)
        .ok()?
        .flatten()
        .filter_map(|entry| {
            let fname = entry.file_name();
            let id = fname.to_str()?.strip_prefix("state")?.parse::<i32>().ok()?;
            let dir = entry.path();
            let name = read_trimmed(&dir.join("name")).unwrap_or_else(|| format!("state{id}"));
            Some((id, dir, name))
        })
        .collect();

    if states.is_empty() {
        return None;
    }
    states.sort_by_key(|(id, _, _)| *id);

    let name = format!("cpu{num}");
    let descriptor = EntityDescriptor::new(
        name.clone(),
        states
            .iter()
            .map(|(id, _, state_name)| StateInfo::new(*id, state_name.clone()))
            .collect(),
    );
    Some(CpuEntry {
        name,
        states: states.into_iter().map(|(id, dir, _)| (id, dir)).collect(),
        descriptor,
    })
}

fn read_counter(path: &Path) -> Option<u64> {
    read_trimmed(path)?.parse::<u64>().ok()
}

impl StateResidencyProvider for CpuIdleProvider {
    fn name(&self) -> &str {
        "cpuidle"
    }

    fn info(&self) -> Vec<EntityDescriptor> {
        self.cpus.iter().map(|c| c.descriptor.clone()).collect()
    }

    fn results(&self) -> ResidencyMap {
        let mut out = ResidencyMap::new();
        'cpus: for cpu in &self.cpus {
            let mut data = Vec::with_capacity(cpu.states.len());
            for (state_id, dir) in &cpu.states {
                let (Some(time_us), Some(usage)) =
                    (read_counter(&dir.join("time")), read_counter(&dir.join("usage")))
                else {
                    // A CPU that went offline loses its cpuidle directory.
                    log::debug!("cpuidle: {} unreadable, skipping", cpu.name);
                    continue 'cpus;
                };
                data.push(StateResidency {
                    state_id: *state_id,
                    total_time_in_state_ms: time_us / 1000,
                    total_state_entry_count: usage,
                    last_entry_timestamp_ms: 0,
                });
            }
            out.insert(cpu.name.clone(), data);
        }
        out
    }
}
