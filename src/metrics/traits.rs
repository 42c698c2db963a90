//! Traits for metric acquisition.

use crate::error::Result;

/// Source of the five hardware metrics.
///
/// Each method is one independent query. Implementations report a metric the
/// host does not expose with [`SystemError::Unsupported`](crate::SystemError)
/// and any other failure with the matching error; the loop driver turns both
/// into readings and carries on.
pub trait MetricsProvider {
    /// CPU busy share across all logical processors, in percent.
    ///
    /// The first call establishes the baseline and returns exactly `0.0`.
    fn cpu_load(&mut self) -> Result<f64>;

    /// CPU temperature in degrees Celsius.
    fn cpu_temperature(&mut self) -> Result<f64>;

    /// Physical memory in use, in MiB.
    fn ram_used(&mut self) -> Result<f64>;

    /// Disk busy percentage measured over the counter window.
    fn disk_busy(&mut self) -> impl std::future::Future<Output = Result<f64>> + Send;

    /// Network throughput in MiB/s measured over the counter window.
    fn network_throughput(&mut self) -> impl std::future::Future<Output = Result<f64>> + Send;
}
