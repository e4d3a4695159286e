use super::{ProviderOptions, make_stats};

pub fn run(opts: &ProviderOptions<'_>, host: &str, port: u16) {
    let stats = make_stats(opts);

    let base = format!("http://{host}:{port}");
    let n_entities = stats.registry().len();
    let rails = stats.list_rails().map(|r| r.len()).unwrap_or(0);

    println!("powerstats server v{}", powerstats_core::VERSION);
    println!("   {base}");
    println!("   {n_entities} power entities, {rails} rails");
    println!();
    println!("   Endpoints:");
    println!("     GET /                 API index (try: curl {base})");
    println!("     GET /entities         Registered entities and states");
    println!("     GET /rails            Rail metadata");
    println!("     GET /energy           Rail energy (rails=0,1)");
    println!("     GET /residency        State residency (entities=0,1)");
    println!("     GET /dump             Text report (mode=plain|delta)");
    println!();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = rt.block_on(powerstats_server::run_server(stats, host, port)) {
        eprintln!("Error: server failed on {host}:{port}: {e}");
        std::process::exit(1);
    }
}
