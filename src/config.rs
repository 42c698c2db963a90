//! Sampler configuration.

use crate::error::{Result, SystemError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Upper bound on rendered decimal places.
const MAX_PRECISION: usize = 9;

/// Configuration for the sampling loop and its outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Append-only log file
    pub log_path: PathBuf,
    /// Delay between the end of one sample and the start of the next
    pub interval: Duration,
    /// Warm-up window for the rate-based disk and network counters
    pub counter_window: Duration,
    /// Decimal places for every rendered reading
    pub precision: usize,
    /// Clear the terminal before each redraw
    pub clear_screen: bool,
    /// Stop after this many samples (runs until shutdown when `None`)
    pub max_iterations: Option<u64>,
    /// Root of the proc filesystem
    pub proc_root: PathBuf,
    /// Root of the sysfs thermal class
    pub thermal_root: PathBuf,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from(crate::DEFAULT_LOG_PATH),
            interval: Duration::from_millis(crate::DEFAULT_INTERVAL_MS),
            counter_window: Duration::from_millis(crate::DEFAULT_WINDOW_MS),
            precision: crate::DEFAULT_PRECISION,
            clear_screen: true,
            max_iterations: None,
            proc_root: PathBuf::from("/proc"),
            thermal_root: PathBuf::from("/sys/class/thermal"),
        }
    }
}

impl MonitorConfig {
    /// Create a configuration logging to `log_path` with default timings.
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
            ..Default::default()
        }
    }

    /// Set the log file path.
    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = path.into();
        self
    }

    /// Set the loop interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the counter warm-up window.
    pub fn with_counter_window(mut self, window: Duration) -> Self {
        self.counter_window = window;
        self
    }

    /// Set the rendered precision.
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Enable or disable clearing the terminal between redraws.
    pub fn with_clear_screen(mut self, clear: bool) -> Self {
        self.clear_screen = clear;
        self
    }

    /// Cap the number of samples taken.
    pub fn with_max_iterations(mut self, max: Option<u64>) -> Self {
        self.max_iterations = max;
        self
    }

    /// Point the proc-based adapters at another root.
    pub fn with_proc_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.proc_root = root.into();
        self
    }

    /// Point the thermal adapter at another sysfs thermal root.
    pub fn with_thermal_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.thermal_root = root.into();
        self
    }

    /// Reject settings the sampler cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.counter_window.is_zero() {
            return Err(SystemError::config_error(
                "counter window must be longer than zero",
            ));
        }
        if self.precision > MAX_PRECISION {
            return Err(SystemError::config_error(format!(
                "precision {} exceeds the maximum of {}",
                self.precision, MAX_PRECISION
            )));
        }
        if self.log_path.as_os_str().is_empty() {
            return Err(SystemError::config_error("log path is empty"));
        }
        Ok(())
    }
}
