use powerstats_core::report::UNKNOWN;
use powerstats_core::{EntityNames, ResidencyQuery};

use super::{ProviderOptions, make_stats, parse_ids_or_exit, print_json};

pub fn run(opts: &ProviderOptions<'_>, entities: Option<&str>, json: bool) {
    let ids = parse_ids_or_exit("entities", entities);
    let stats = make_stats(opts);
    let query = stats.state_residency(&ids);

    if json {
        print_json(&query);
    } else {
        print_table(&query, &stats.registry().names());
    }

    if !query.status.is_ok() {
        eprintln!("Error: residency query finished with status {}", query.status);
        std::process::exit(1);
    }
}

fn print_table(query: &ResidencyQuery, names: &EntityNames) {
    println!(
        "{:<20} {:<18} {:>14} {:>12} {:>16}",
        "Entity", "State", "Time (ms)", "Entries", "Last entry (ms)"
    );
    println!("{}", "-".repeat(84));
    for result in &query.results {
        let entity = names.entity(result.entity_id).unwrap_or(UNKNOWN);
        for state in &result.state_residency_data {
            let state_name = names
                .state(result.entity_id, state.state_id)
                .unwrap_or(UNKNOWN);
            println!(
                "{:<20} {:<18} {:>14} {:>12} {:>16}",
                entity,
                state_name,
                state.total_time_in_state_ms,
                state.total_state_entry_count,
                state.last_entry_timestamp_ms
            );
        }
    }
    println!();
    println!(
        "{} entities, status {}",
        query.results.len(),
        query.status
    );
}
