//! Data structures for sampled metrics.

use crate::error::SystemError;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp layout shared by the console and the log.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Marker rendered for a reading whose query failed this tick.
pub const FAILED_MARKER: &str = "ERR";

/// Outcome of one metric query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Reading {
    /// A measured value
    Value(f64),
    /// The host exposes no source for this metric
    Unsupported,
    /// The query failed this tick
    Failed(String),
}

impl Reading {
    /// Map an adapter result to a reading.
    pub fn from_result(result: crate::Result<f64>) -> Self {
        match result {
            Ok(value) => Self::Value(value),
            Err(SystemError::Unsupported(_)) => Self::Unsupported,
            Err(err) => Self::Failed(err.to_string()),
        }
    }

    /// The measured value, if any.
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            _ => None,
        }
    }

    /// Whether the query behind this reading failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Render with a fixed number of decimals.
    ///
    /// Unsupported metrics render as the sentinel, failures as [`FAILED_MARKER`].
    pub fn render(&self, precision: usize) -> String {
        match self {
            Self::Value(v) => format!("{:.*}", precision, v),
            Self::Unsupported => format!("{:.*}", precision, crate::UNAVAILABLE_SENTINEL),
            Self::Failed(_) => FAILED_MARKER.to_string(),
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(crate::DEFAULT_PRECISION);
        f.write_str(&self.render(precision))
    }
}

/// One complete set of readings taken in a single loop iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Wall-clock time at sample start
    pub timestamp: DateTime<Local>,
    /// CPU busy share in percent
    pub cpu_load_percent: Reading,
    /// CPU temperature in degrees Celsius
    pub cpu_temperature_celsius: Reading,
    /// Physical memory in use, in MiB
    pub ram_used_megabytes: Reading,
    /// Disk busy time in percent over the counter window
    pub disk_busy_percent: Reading,
    /// Aggregate interface throughput in MiB/s over the counter window
    pub network_throughput_mb_per_sec: Reading,
}

impl Sample {
    /// Timestamp rendered with second precision in local time.
    pub fn timestamp_string(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Readings in log order, paired with their labels.
    pub fn readings(&self) -> [(&'static str, &Reading); 5] {
        [
            ("cpu_load", &self.cpu_load_percent),
            ("cpu_temperature", &self.cpu_temperature_celsius),
            ("ram_used", &self.ram_used_megabytes),
            ("disk_busy", &self.disk_busy_percent),
            ("network_throughput", &self.network_throughput_mb_per_sec),
        ]
    }

    /// Number of readings whose query failed.
    pub fn failure_count(&self) -> usize {
        self.readings().iter().filter(|(_, r)| r.is_failed()).count()
    }
}
