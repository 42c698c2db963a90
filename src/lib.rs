//! # hwlog - Hardware Telemetry Logger
//!
//! Samples local hardware telemetry once per interval, redraws a console
//! snapshot and appends one timestamped line per sample to a flat log file.
//!
//! ## Metrics
//!
//! - **CPU load**: busy share of all logical processors since the previous tick
//! - **CPU temperature**: first thermal zone, in Celsius
//! - **RAM**: megabytes in use (total minus available)
//! - **Disk**: busy-time percentage over a one-second counter window
//! - **Network**: aggregate throughput in MB/s over a one-second counter window
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hwlog::{HostCollector, Monitor, MonitorConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MonitorConfig::default().with_max_iterations(Some(5));
//!     let collector = HostCollector::new(&config)?;
//!     let monitor = Monitor::new(config, collector, std::io::stdout())?;
//!     let summary = monitor.run(std::future::pending::<()>()).await?;
//!     println!("logged {} samples", summary.iterations);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod metrics;
pub mod monitor;
pub mod output;

// Re-export public API
pub use config::MonitorConfig;
pub use error::{Result, SystemError};
pub use metrics::{
    collector::HostCollector,
    data::{Reading, Sample},
    traits::MetricsProvider,
};
pub use monitor::{collect_sample, Monitor, RunSummary};
pub use output::{console::ConsoleDisplay, logfile::SampleLog};

/// The default sampling interval in milliseconds
pub const DEFAULT_INTERVAL_MS: u64 = 1000;

/// The default counter warm-up window in milliseconds
pub const DEFAULT_WINDOW_MS: u64 = 1000;

/// The default log file, relative to the working directory
pub const DEFAULT_LOG_PATH: &str = "hardware_log.txt";

/// Decimal places used when rendering readings
pub const DEFAULT_PRECISION: usize = 2;

/// Value rendered in place of a metric the host does not expose
pub const UNAVAILABLE_SENTINEL: f64 = -1.0;
