//! Fixed-column text reports for state residency and rail energy.
//!
//! Ids passed in here have already been validated by the registry and the rail
//! provider; a name that cannot be resolved is rendered as `<unknown>`.

use crate::delta::DeltaReport;
use crate::model::{EnergyData, EntityResidencyResult};
use crate::rail::RailNames;
use crate::registry::EntityNames;

pub const STATE_RESIDENCY_TITLE: &str = "Power stats state residencies";
pub const RAIL_ENERGY_TITLE: &str = "Power stats rail energy";

pub const UNKNOWN: &str = "<unknown>";

/// Micro-watt-seconds to milli-watt-seconds.
pub fn to_mws(energy_uws: i64) -> f64 {
    energy_uws as f64 / 1000.0
}

pub fn begin_section(out: &mut String, title: &str) {
    out.push_str(&format!("\n==== {title} ====\n"));
}

pub fn end_section(out: &mut String, title: &str) {
    out.push_str(&format!("==== End of {title} ====\n"));
}

fn elapsed_line(out: &mut String, elapsed_ms: u64) {
    out.push_str(&format!("Elapsed time: {elapsed_ms} ms\n"));
}

fn entity_name(names: &EntityNames, entity_id: i32) -> &str {
    names.entity(entity_id).unwrap_or_else(|| {
        log::warn!("no name for power entity {entity_id}");
        UNKNOWN
    })
}

fn state_name(names: &EntityNames, entity_id: i32, state_id: i32) -> &str {
    names.state(entity_id, state_id).unwrap_or_else(|| {
        log::warn!("no name for state {state_id} of power entity {entity_id}");
        UNKNOWN
    })
}

fn rail_names(names: &RailNames, rail_index: i32) -> (&str, &str) {
    match names.get(&rail_index) {
        Some((subsys, rail)) => (subsys.as_str(), rail.as_str()),
        None => {
            log::warn!("no metadata for rail {rail_index}");
            (UNKNOWN, UNKNOWN)
        }
    }
}

// ---------------------------------------------------------------------------
// State residency
// ---------------------------------------------------------------------------

pub fn render_state_residency(
    out: &mut String,
    results: &[EntityResidencyResult],
    names: &EntityNames,
) {
    out.push_str(&format!(
        "  {:>14}   {:>14}   {:>16}   {:>15}   {:>17}\n",
        "Entity", "State", "Total time", "Total entries", "Last entry tstamp"
    ));
    for result in results {
        let entity = entity_name(names, result.entity_id);
        for s in &result.state_residency_data {
            out.push_str(&format!(
                "  {:>14}   {:>14}   {:>13} ms   {:>15}   {:>14} ms\n",
                entity,
                state_name(names, result.entity_id, s.state_id),
                s.total_time_in_state_ms,
                s.total_state_entry_count,
                s.last_entry_timestamp_ms,
            ));
        }
    }
}

pub fn render_state_residency_delta(
    out: &mut String,
    report: &DeltaReport<EntityResidencyResult>,
    names: &EntityNames,
) {
    elapsed_line(out, report.elapsed_ms);
    out.push_str(&format!(
        "  {:>14}   {:>14}   {:>16} ({:>14})   {:>15} ({:>16})   {:>17} ({:>14})\n",
        "Entity",
        "State",
        "Total time",
        "Delta   ",
        "Total entries",
        "Delta   ",
        "Last entry tstamp",
        "Delta "
    ));
    for row in &report.rows {
        let entity_id = row.current.entity_id;
        let entity = entity_name(names, entity_id);
        for (s, d) in row.current.state_residency_data.iter().zip(&row.delta) {
            out.push_str(&format!(
                "  {:>14}   {:>14}   {:>13} ms ({:>+14})   {:>15} ({:>+16})   {:>14} ms ({:>+14})\n",
                entity,
                state_name(names, entity_id, s.state_id),
                s.total_time_in_state_ms,
                d.total_time_in_state_ms,
                s.total_state_entry_count,
                d.total_state_entry_count,
                s.last_entry_timestamp_ms,
                d.last_entry_timestamp_ms,
            ));
        }
    }
}

// ---------------------------------------------------------------------------
// Rail energy
// ---------------------------------------------------------------------------

pub fn render_rail_energy(out: &mut String, readings: &[EnergyData], names: &RailNames) {
    out.push_str(&format!(
        "  {:>14}   {:>18}   {:>18}\n",
        "Subsys", "Rail", "Cumulative Energy"
    ));
    for r in readings {
        let (subsys, rail) = rail_names(names, r.rail_index);
        out.push_str(&format!(
            "  {:>14}   {:>18}   {:>14.2} mWs\n",
            subsys,
            rail,
            to_mws(r.energy_uws)
        ));
    }
}

pub fn render_rail_energy_delta(
    out: &mut String,
    report: &DeltaReport<EnergyData>,
    names: &RailNames,
) {
    elapsed_line(out, report.elapsed_ms);
    out.push_str(&format!(
        "  {:>14}   {:>18}   {:>18} ({:>14})\n",
        "Subsys", "Rail", "Cumulative Energy", "Delta   "
    ));
    for row in &report.rows {
        let (subsys, rail) = rail_names(names, row.current.rail_index);
        out.push_str(&format!(
            "  {:>14}   {:>18}   {:>14.2} mWs ({:>+14.2})\n",
            subsys,
            rail,
            to_mws(row.current.energy_uws),
            to_mws(row.delta)
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta::DeltaTracker;
    use crate::model::StateResidency;

    fn names() -> EntityNames {
        let mut n = EntityNames::default();
        n.entities.insert(0, "CPU".to_string());
        n.states
            .insert(0, [(1, "SLEEP".to_string())].into_iter().collect());
        n
    }

    fn rails() -> RailNames {
        [(3, ("SoC".to_string(), "VDD_CPU".to_string()))]
            .into_iter()
            .collect()
    }

    fn residency(t: u64, c: u64, ts: u64) -> EntityResidencyResult {
        EntityResidencyResult {
            entity_id: 0,
            state_residency_data: vec![StateResidency {
                state_id: 1,
                total_time_in_state_ms: t,
                total_state_entry_count: c,
                last_entry_timestamp_ms: ts,
            }],
        }
    }

    #[test]
    fn energy_rendered_in_mws() {
        let mut out = String::new();
        render_rail_energy(
            &mut out,
            &[EnergyData {
                rail_index: 3,
                energy_uws: 1_500_000,
            }],
            &rails(),
        );
        assert!(out.contains("1500.00 mWs"), "{out}");
        assert!(out.contains("VDD_CPU"));
        assert!(out.lines().next().unwrap().contains("Cumulative Energy"));
    }

    #[test]
    fn energy_delta_rendered_with_sign() {
        let mut t = DeltaTracker::new();
        t.compute_at(
            vec![EnergyData {
                rail_index: 3,
                energy_uws: 1_000_000,
            }],
            0,
        );
        let report = t.compute_at(
            vec![EnergyData {
                rail_index: 3,
                energy_uws: 1_500_000,
            }],
            2_000,
        );
        let mut out = String::new();
        render_rail_energy_delta(&mut out, &report, &rails());
        assert!(out.starts_with("Elapsed time: 2000 ms\n"));
        assert!(out.contains("1500.00 mWs"));
        assert!(out.contains("+500.00)"), "{out}");
    }

    #[test]
    fn residency_plain_row() {
        let mut out = String::new();
        render_state_residency(&mut out, &[residency(100, 2, 50)], &names());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Last entry tstamp"));
        assert!(lines[1].contains("CPU"));
        assert!(lines[1].contains("SLEEP"));
        assert!(lines[1].contains("100 ms"));
    }

    #[test]
    fn residency_delta_row() {
        let mut t = DeltaTracker::new();
        t.compute_at(vec![residency(100, 2, 50)], 0);
        let report = t.compute_at(vec![residency(150, 3, 80)], 10);
        let mut out = String::new();
        render_state_residency_delta(&mut out, &report, &names());
        let row = out.lines().last().unwrap();
        assert!(row.contains("+50)"), "{row}");
        assert!(row.contains("+1)"), "{row}");
        assert!(row.contains("+30)"), "{row}");
    }

    #[test]
    fn unknown_names_do_not_panic() {
        let mut out = String::new();
        let mut r = residency(1, 1, 1);
        r.entity_id = 9;
        render_state_residency(&mut out, &[r], &names());
        render_rail_energy(
            &mut out,
            &[EnergyData {
                rail_index: 42,
                energy_uws: 0,
            }],
            &rails(),
        );
        assert!(out.contains(UNKNOWN));
    }

    #[test]
    fn section_banners() {
        let mut out = String::new();
        begin_section(&mut out, RAIL_ENERGY_TITLE);
        end_section(&mut out, RAIL_ENERGY_TITLE);
        assert!(out.contains("==== Power stats rail energy ====\n"));
        assert!(out.contains("==== End of Power stats rail energy ====\n"));
    }
}
