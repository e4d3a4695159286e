use powerstats_core::report::to_mws;

use super::{ProviderOptions, make_stats, parse_ids_or_exit, print_json};

pub fn run_rails(opts: &ProviderOptions<'_>, json: bool) {
    let stats = make_stats(opts);
    let rails = match stats.list_rails() {
        Ok(rails) => rails,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if json {
        print_json(&rails);
        return;
    }

    if rails.is_empty() {
        println!("No rails available.");
        return;
    }

    println!("{:>5}  {:<18} Rail", "Index", "Subsystem");
    println!("{}", "-".repeat(48));
    for rail in &rails {
        println!(
            "{:>5}  {:<18} {}",
            rail.rail_index, rail.subsys_name, rail.rail_name
        );
    }
}

pub fn run_energy(opts: &ProviderOptions<'_>, rails: Option<&str>, json: bool) {
    let indices = parse_ids_or_exit("rails", rails);
    let stats = make_stats(opts);

    let readings = match stats.energy(&indices) {
        Ok(readings) => readings,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if json {
        print_json(&readings);
        return;
    }

    if readings.is_empty() {
        println!("No energy readings.");
        return;
    }

    println!("{:>5}  {:>16}  {:>16}", "Index", "Energy (uWs)", "Energy (mWs)");
    println!("{}", "-".repeat(42));
    for r in &readings {
        println!(
            "{:>5}  {:>16}  {:>16.2}",
            r.rail_index,
            r.energy_uws,
            to_mws(r.energy_uws)
        );
    }
}
