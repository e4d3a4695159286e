//! CLI for powerstats: power entity state residency and rail energy.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "powerstats")]
#[command(about = "powerstats: state residency and rail energy with differential reports")]
#[command(version = powerstats_core::VERSION)]
struct Cli {
    /// Load providers from a JSON fixture instead of probing sysfs
    #[arg(long, global = true)]
    fixture: Option<PathBuf>,

    /// Root under which sysfs is probed
    #[arg(long, global = true, default_value = "/")]
    sysfs_root: PathBuf,

    /// Do not configure a rail energy provider
    #[arg(long, global = true)]
    no_rails: bool,

    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered power entities and their states
    Entities {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List rails exposed by the rail energy provider
    Rails {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Read cumulative rail energy
    Energy {
        /// Comma-separated rail indices (default: all)
        #[arg(long)]
        rails: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Query state residency. Exits 1 when the query status is not ok.
    Residency {
        /// Comma-separated entity ids (default: all)
        #[arg(long)]
        entities: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print the state residency and rail energy report.
    /// `dump delta` samples twice, `--interval` apart, and prints the deltas.
    Dump {
        /// Dump arguments; exactly `delta` selects the delta report
        args: Vec<String>,

        /// Seconds between the baseline sample and the delta report
        #[arg(long, default_value = "1.0")]
        interval: f64,
    },

    /// Print a delta report every interval until Ctrl+C
    Watch {
        /// Seconds between reports
        #[arg(long, default_value = "5.0")]
        interval: f64,

        /// Stop after this many reports
        #[arg(long)]
        count: Option<usize>,
    },

    /// Serve the power stats operations over HTTP
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(long, default_value = "8043")]
        port: u16,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let providers = commands::ProviderOptions {
        fixture: cli.fixture.as_deref(),
        sysfs_root: &cli.sysfs_root,
        include_rails: !cli.no_rails,
    };

    match cli.command {
        Commands::Entities { json } => commands::entities::run(&providers, json),
        Commands::Rails { json } => commands::rails::run_rails(&providers, json),
        Commands::Energy { rails, json } => {
            commands::rails::run_energy(&providers, rails.as_deref(), json)
        }
        Commands::Residency { entities, json } => {
            commands::residency::run(&providers, entities.as_deref(), json)
        }
        Commands::Dump { args, interval } => commands::dump::run(&providers, &args, interval),
        Commands::Watch { interval, count } => commands::dump::watch(&providers, interval, count),
        Commands::Serve { host, port } => commands::server::run(&providers, &host, port),
    }
}
