//! Disk busy time from `/proc/diskstats`.

use crate::error::{Result, SystemError};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Milliseconds each physical disk has spent doing I/O, keyed by device name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiskTicks(HashMap<String, u64>);

impl DiskTicks {
    /// Parse `/proc/diskstats`, keeping whole physical devices only.
    pub fn parse(content: &str) -> Result<Self> {
        let mut ticks = HashMap::new();

        for line in content.lines() {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 14 {
                continue;
            }

            let device_name = parts[2];
            if !is_physical_device(device_name) {
                continue;
            }

            // io_ticks: 10th stat field after major, minor and name
            let io_ticks = parts[12].parse::<u64>().map_err(|e| {
                SystemError::parse_error(format!("io_ticks for {}: {}", device_name, e))
            })?;
            ticks.insert(device_name.to_string(), io_ticks);
        }

        Ok(Self(ticks))
    }

    /// Read `<proc_root>/diskstats`.
    pub fn read(proc_root: &Path) -> Result<Self> {
        let content = fs::read_to_string(proc_root.join("diskstats"))?;
        Self::parse(&content)
    }

    /// Whether no physical disk was found.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of physical disks tracked.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// io_ticks for `device`, if it is a tracked physical disk.
    pub fn get(&self, device: &str) -> Option<u64> {
        self.0.get(device).copied()
    }
}

/// Average busy percentage of the disks present in both readings.
///
/// Each disk contributes `Δio_ticks / elapsed`, clamped to 100 since the
/// kernel may account slightly more than wall time to a saturated queue.
pub fn busy_percent(before: &DiskTicks, after: &DiskTicks, elapsed: Duration) -> Result<f64> {
    let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
    if elapsed_ms <= 0.0 {
        return Err(SystemError::system_error("disk window elapsed no time"));
    }

    let per_disk: Vec<f64> = after
        .0
        .iter()
        .filter_map(|(name, &end)| {
            let start = before.get(name)?;
            let delta = end.saturating_sub(start) as f64;
            Some((delta / elapsed_ms * 100.0).clamp(0.0, 100.0))
        })
        .collect();

    if per_disk.is_empty() {
        return Err(SystemError::unsupported("no physical disks in /proc/diskstats"));
    }

    Ok(per_disk.iter().sum::<f64>() / per_disk.len() as f64)
}

/// Check whether a device name is a whole physical device rather than a
/// partition or a virtual block device.
pub fn is_physical_device(device_name: &str) -> bool {
    if device_name.starts_with("loop")
        || device_name.starts_with("ram")
        || device_name.starts_with("dm-")
        || device_name.starts_with("zram")
        || device_name.starts_with("md")
        || device_name.starts_with("sr")
    {
        return false;
    }

    // nvme0n1 is a disk, nvme0n1p1 a partition
    if let Some(rest) = device_name.strip_prefix("nvme") {
        return match rest.find('n') {
            Some(n_pos) => {
                let after_namespace = rest[n_pos + 1..].trim_start_matches(|c: char| c.is_ascii_digit());
                !after_namespace.starts_with('p')
            }
            None => false,
        };
    }

    // mmcblk0 is a disk, mmcblk0p1 a partition
    if let Some(rest) = device_name.strip_prefix("mmcblk") {
        let after_device_num = rest.trim_start_matches(|c: char| c.is_ascii_digit());
        return after_device_num.is_empty();
    }

    // sd*, hd*, vd*, xvd*: disks end with a letter, partitions with a digit
    device_name
        .chars()
        .last()
        .map(|c| c.is_ascii_alphabetic())
        .unwrap_or(false)
}
