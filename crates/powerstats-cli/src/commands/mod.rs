pub mod dump;
pub mod entities;
pub mod rails;
pub mod residency;
pub mod server;

use std::path::Path;

use powerstats_core::{PowerStats, ProviderSet, detect_providers};
use serde::Serialize;

/// Where providers come from.
pub struct ProviderOptions<'a> {
    pub fixture: Option<&'a Path>,
    pub sysfs_root: &'a Path,
    pub include_rails: bool,
}

/// Build a PowerStats service from a fixture or from the sysfs providers
/// found on this machine. Exits the process on configuration errors.
pub fn make_stats(opts: &ProviderOptions<'_>) -> PowerStats {
    let set = match opts.fixture {
        Some(path) => match ProviderSet::from_fixture(path) {
            Ok(mut set) => {
                if !opts.include_rails {
                    set.rail = None;
                }
                set
            }
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
        None => detect_providers(opts.sysfs_root, opts.include_rails),
    };

    match set.into_power_stats() {
        Ok(stats) => {
            if stats.registry().is_empty() {
                log::warn!("no state residency providers found");
            }
            stats
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Parse a `--rails`/`--entities` list. Exits with status 2 on bad input.
pub fn parse_ids_or_exit(flag: &str, raw: Option<&str>) -> Vec<i32> {
    match powerstats_server::parse_id_list(raw) {
        Ok(ids) => ids,
        Err(msg) => {
            eprintln!("Error: --{flag}: {msg}");
            std::process::exit(2);
        }
    }
}

/// Pretty-print a value as JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => {
            eprintln!("Error: failed to encode JSON: {e}");
            std::process::exit(1);
        }
    }
}
