//! Hardware metric acquisition and data structures.
//!
//! This module provides one adapter per metric (CPU load, CPU temperature,
//! RAM, disk busy time, network throughput), the [`MetricsProvider`] seam the
//! loop driver samples through, and the [`Sample`] each tick produces.

pub mod collector;
pub mod cpu;
pub mod data;
pub mod disk;
pub mod network;
pub mod temperature;
pub mod traits;

// Re-export commonly used items
pub use collector::HostCollector;
pub use data::{Reading, Sample};
pub use traits::MetricsProvider;
