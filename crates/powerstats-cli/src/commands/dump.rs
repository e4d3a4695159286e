use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use powerstats_core::{DumpMode, PowerStats};

use super::{ProviderOptions, make_stats};

fn interval_or_exit(secs: f64) -> Duration {
    if !secs.is_finite() || secs <= 0.0 {
        eprintln!("Error: --interval must be a positive number of seconds");
        std::process::exit(2);
    }
    Duration::from_secs_f64(secs)
}

pub fn run(opts: &ProviderOptions<'_>, args: &[String], interval: f64) {
    let mode = DumpMode::from_args(args);
    let interval = interval_or_exit(interval);
    let stats = make_stats(opts);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = write_dump(&stats, mode, interval, &mut out) {
        eprintln!("Error: failed to write report: {e}");
        std::process::exit(1);
    }
}

/// Write one report. Delta mode first records a baseline and waits
/// `interval`, so the report covers that window.
fn write_dump<W: Write>(
    stats: &PowerStats,
    mode: DumpMode,
    interval: Duration,
    out: &mut W,
) -> std::io::Result<()> {
    if mode == DumpMode::Delta {
        stats.dump(DumpMode::Delta);
        std::thread::sleep(interval);
    }
    stats.dump_to(out, mode)
}

pub fn watch(opts: &ProviderOptions<'_>, interval: f64, count: Option<usize>) {
    let interval = interval_or_exit(interval);
    let stats = make_stats(opts);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    }) {
        log::warn!("failed to install Ctrl+C handler: {e}");
    }

    // Prime the baseline so the first printed report covers one interval.
    stats.dump(DumpMode::Delta);

    let mut printed = 0usize;
    while running.load(Ordering::SeqCst) && count.is_none_or(|n| printed < n) {
        let deadline = Instant::now() + interval;
        while Instant::now() < deadline && running.load(Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(50).min(interval));
        }
        if !running.load(Ordering::SeqCst) {
            break;
        }

        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        if let Err(e) = stats.dump_to(&mut out, DumpMode::Delta) {
            eprintln!("Error: failed to write report: {e}");
            std::process::exit(1);
        }
        printed += 1;
    }
}
