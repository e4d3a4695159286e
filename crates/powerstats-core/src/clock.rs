//! Monotonic boot clock used to time delta reports.

/// Milliseconds since boot, including time spent suspended.
#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn boot_time_ms() -> u64 {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: `ts` is a valid, writable timespec and CLOCK_BOOTTIME is
    // supported on every Linux kernel we target.
    let rc = unsafe { libc::clock_gettime(libc::CLOCK_BOOTTIME, &mut ts) };
    if rc != 0 {
        return fallback_ms();
    }
    (ts.tv_sec as u64) * 1000 + (ts.tv_nsec as u64) / 1_000_000
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub fn boot_time_ms() -> u64 {
    fallback_ms()
}

/// Process-local monotonic clock, for platforms without a boot clock.
fn fallback_ms() -> u64 {
    use std::sync::OnceLock;
    use std::time::Instant;
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    let epoch = EPOCH.get_or_init(Instant::now);
    epoch.elapsed().as_millis() as u64
}
