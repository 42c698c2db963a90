//! Aggregate network throughput from interface byte counters.

use crate::error::{Result, SystemError};
use std::time::Duration;
use sysinfo::Networks;

pub(crate) const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

/// Whether an interface is loopback and should not count as traffic.
pub fn is_loopback(interface: &str) -> bool {
    interface == "lo" || interface.starts_with("lo0") || interface.starts_with("Loopback")
}

/// Bytes received plus transmitted since the previous refresh, summed over
/// every non-loopback interface. `None` when no such interface exists.
pub fn bytes_since_refresh(networks: &Networks) -> Option<u64> {
    let mut seen = false;
    let total: u64 = networks
        .iter()
        .filter(|(name, _)| !is_loopback(name))
        .inspect(|_| seen = true)
        .map(|(_, data)| data.received() + data.transmitted())
        .sum();
    seen.then_some(total)
}

/// Convert a byte count over `elapsed` to MiB/s.
pub fn throughput_mb_per_sec(bytes: u64, elapsed: Duration) -> Result<f64> {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return Err(SystemError::system_error("network window elapsed no time"));
    }
    Ok(bytes as f64 / BYTES_PER_MEGABYTE / secs)
}

/// Fail with `Unsupported` when the host has no countable interface.
pub fn require_interfaces(bytes: Option<u64>) -> Result<u64> {
    bytes.ok_or_else(|| SystemError::unsupported("no non-loopback network interfaces"))
}
