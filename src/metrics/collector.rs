//! Host metrics collection using sysinfo and direct /proc access.

use crate::config::MonitorConfig;
use crate::error::{Result, SystemError};
use crate::metrics::{
    cpu::{CpuLoadMeter, CpuTimes},
    disk::{self, DiskTicks},
    network::{self, BYTES_PER_MEGABYTE},
    temperature::ThermalProbe,
    traits::MetricsProvider,
};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use sysinfo::{Networks, System};
use tokio::time;

/// Production metrics provider for the local host.
pub struct HostCollector {
    system: System,
    networks: Networks,
    thermal: ThermalProbe,
    cpu_meter: CpuLoadMeter,
    proc_root: PathBuf,
    counter_window: Duration,
}

impl HostCollector {
    /// Create a collector honouring the paths and counter window in `config`.
    pub fn new(config: &MonitorConfig) -> Result<Self> {
        config.validate()?;

        let mut system = System::new();
        system.refresh_memory();
        let networks = Networks::new_with_refreshed_list();

        Ok(Self {
            system,
            networks,
            thermal: ThermalProbe::new(&config.thermal_root),
            cpu_meter: CpuLoadMeter::new(),
            proc_root: config.proc_root.clone(),
            counter_window: config.counter_window,
        })
    }

    /// Replace the thermal probe, e.g. to disable the component fallback.
    pub fn with_thermal_probe(mut self, thermal: ThermalProbe) -> Self {
        self.thermal = thermal;
        self
    }

    /// Whether the CPU meter has a baseline yet.
    pub fn cpu_primed(&self) -> bool {
        self.cpu_meter.is_primed()
    }

    /// Take the CPU baseline without reporting a value.
    pub fn prime_cpu(&mut self) -> Result<()> {
        let times = CpuTimes::read(&self.proc_root)?;
        self.cpu_meter.observe(times);
        Ok(())
    }

    /// Total and available physical memory in bytes.
    pub fn memory_bytes(&mut self) -> (u64, u64) {
        self.system.refresh_memory();
        (self.system.total_memory(), self.system.available_memory())
    }
}

/// Megabytes in use given total and available bytes.
pub fn used_megabytes(total_bytes: u64, available_bytes: u64) -> f64 {
    total_bytes.saturating_sub(available_bytes) as f64 / BYTES_PER_MEGABYTE
}

impl MetricsProvider for HostCollector {
    fn cpu_load(&mut self) -> Result<f64> {
        let times = CpuTimes::read(&self.proc_root)?;
        Ok(self.cpu_meter.observe(times))
    }

    fn cpu_temperature(&mut self) -> Result<f64> {
        self.thermal.read_celsius()
    }

    fn ram_used(&mut self) -> Result<f64> {
        let (total, available) = self.memory_bytes();
        if total == 0 {
            return Err(SystemError::system_error("total physical memory reported as zero"));
        }
        Ok(used_megabytes(total, available))
    }

    async fn disk_busy(&mut self) -> Result<f64> {
        let before = DiskTicks::read(&self.proc_root)?;
        if before.is_empty() {
            return Err(SystemError::unsupported("no physical disks in /proc/diskstats"));
        }

        let started = Instant::now();
        time::sleep(self.counter_window).await;
        let after = DiskTicks::read(&self.proc_root)?;

        disk::busy_percent(&before, &after, started.elapsed())
    }

    async fn network_throughput(&mut self) -> Result<f64> {
        self.networks.refresh();
        let started = Instant::now();
        time::sleep(self.counter_window).await;
        self.networks.refresh();

        let bytes = network::require_interfaces(network::bytes_since_refresh(&self.networks))?;
        network::throughput_mb_per_sec(bytes, started.elapsed())
    }
}
