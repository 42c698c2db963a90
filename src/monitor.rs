//! The sampling loop: acquire, render, append, sleep.

use crate::config::MonitorConfig;
use crate::error::Result;
use crate::metrics::{
    data::{Reading, Sample},
    traits::MetricsProvider,
};
use crate::output::{
    console::{ConsoleDisplay, STOP_HINT},
    logfile::SampleLog,
};
use chrono::Local;
use std::future::Future;
use std::io::Write;
use tokio::time;
use tracing::{debug, info, warn};

/// Query every adapter in order and assemble one sample.
///
/// Failed queries become [`Reading::Failed`] and are reported; they never
/// abort the sample.
pub async fn collect_sample<P: MetricsProvider>(provider: &mut P) -> Sample {
    let timestamp = Local::now();

    let cpu_load_percent = Reading::from_result(provider.cpu_load());
    let cpu_temperature_celsius = Reading::from_result(provider.cpu_temperature());
    let ram_used_megabytes = Reading::from_result(provider.ram_used());
    let disk_busy_percent = Reading::from_result(provider.disk_busy().await);
    let network_throughput_mb_per_sec = Reading::from_result(provider.network_throughput().await);

    let sample = Sample {
        timestamp,
        cpu_load_percent,
        cpu_temperature_celsius,
        ram_used_megabytes,
        disk_busy_percent,
        network_throughput_mb_per_sec,
    };

    for (metric, reading) in sample.readings() {
        if let Reading::Failed(reason) = reading {
            warn!(metric, "Metric query failed: {}", reason);
        }
    }

    sample
}

/// Outcome of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Samples rendered and logged
    pub iterations: u64,
    /// Readings that failed across all samples
    pub failed_readings: u64,
    /// Whether the shutdown signal ended the run
    pub interrupted: bool,
}

/// Loop driver owning the provider and both sinks.
pub struct Monitor<P, W: Write> {
    config: MonitorConfig,
    provider: P,
    log: SampleLog,
    console: ConsoleDisplay<W>,
}

impl<P: MetricsProvider, W: Write> Monitor<P, W> {
    /// Validate `config`, open the log and prepare the console view on `out`.
    pub fn new(config: MonitorConfig, provider: P, out: W) -> Result<Self> {
        config.validate()?;
        let log = SampleLog::open(&config.log_path, config.precision)?;
        let console = ConsoleDisplay::new(out, config.clear_screen, config.precision);

        Ok(Self {
            config,
            provider,
            log,
            console,
        })
    }

    /// Settings this monitor was built with.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Render and append one finished sample.
    ///
    /// A console failure is only reported; a log failure ends the run.
    fn record(&mut self, sample: &Sample) -> Result<()> {
        if let Err(err) = self.console.render(sample) {
            warn!("Console redraw failed: {}", err);
        }
        self.log.append(sample)
    }

    /// Take, render and log a single sample.
    pub async fn tick(&mut self) -> Result<Sample> {
        let sample = collect_sample(&mut self.provider).await;
        self.record(&sample)?;
        Ok(sample)
    }

    /// Sample until `shutdown` resolves or the iteration cap is reached.
    ///
    /// Every wait races the shutdown future. A sample still being collected
    /// when shutdown arrives is dropped rather than logged. The log is synced
    /// and closed on every exit path.
    pub async fn run<F>(mut self, shutdown: F) -> Result<RunSummary>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut summary = RunSummary::default();

        // A cleared screen would erase the notice; render repeats it instead.
        if !self.config.clear_screen {
            if let Err(err) = self.console.announce(STOP_HINT) {
                warn!("Console write failed: {}", err);
            }
        }
        info!(
            "Sampling every {:?} with a {:?} counter window",
            self.config.interval, self.config.counter_window
        );

        loop {
            if let Some(max) = self.config.max_iterations {
                if summary.iterations >= max {
                    break;
                }
            }

            if summary.iterations > 0 {
                tokio::select! {
                    biased;
                    _ = &mut shutdown => {
                        summary.interrupted = true;
                        break;
                    }
                    _ = time::sleep(self.config.interval) => {}
                }
            }

            let sample = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    summary.interrupted = true;
                    break;
                }
                sample = collect_sample(&mut self.provider) => sample,
            };

            self.record(&sample)?;
            summary.iterations += 1;
            summary.failed_readings += sample.failure_count() as u64;
            debug!("Sample {} recorded", summary.iterations);
        }

        if summary.interrupted {
            info!("Shutdown requested, stopping after {} samples", summary.iterations);
        }

        let Monitor { log, .. } = self;
        log.close()?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SystemError;
    use std::time::Duration;

    struct FlakyProvider {
        calls: u32,
    }

    impl MetricsProvider for FlakyProvider {
        fn cpu_load(&mut self) -> Result<f64> {
            self.calls += 1;
            if self.calls % 2 == 0 {
                Err(SystemError::system_error("counter query failed"))
            } else {
                Ok(12.0)
            }
        }

        fn cpu_temperature(&mut self) -> Result<f64> {
            Err(SystemError::unsupported("no sensor"))
        }

        fn ram_used(&mut self) -> Result<f64> {
            Ok(2048.0)
        }

        async fn disk_busy(&mut self) -> Result<f64> {
            Ok(5.0)
        }

        async fn network_throughput(&mut self) -> Result<f64> {
            Ok(0.25)
        }
    }

    #[tokio::test]
    async fn test_collect_sample_maps_outcomes() {
        let mut provider = FlakyProvider { calls: 0 };
        let first = collect_sample(&mut provider).await;
        assert_eq!(first.cpu_load_percent, Reading::Value(12.0));
        assert_eq!(first.cpu_temperature_celsius, Reading::Unsupported);
        assert_eq!(first.failure_count(), 0);

        let second = collect_sample(&mut provider).await;
        assert!(second.cpu_load_percent.is_failed());
        assert_eq!(second.ram_used_megabytes, Reading::Value(2048.0));
        assert_eq!(second.failure_count(), 1);
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_loop() {
        let dir = tempfile::tempdir().unwrap();
        let config = MonitorConfig::new(dir.path().join("hw.log"))
            .with_interval(Duration::from_millis(1))
            .with_clear_screen(false)
            .with_max_iterations(Some(4));

        let monitor = Monitor::new(config, FlakyProvider { calls: 0 }, Vec::new()).unwrap();
        assert_eq!(monitor.config().max_iterations, Some(4));
        let summary = monitor.run(std::future::pending::<()>()).await.unwrap();

        assert_eq!(summary.iterations, 4);
        assert_eq!(summary.failed_readings, 2);
        assert!(!summary.interrupted);

        let content = std::fs::read_to_string(dir.path().join("hw.log")).unwrap();
        assert_eq!(content.lines().count(), 4);
        assert_eq!(content.matches("CPU: ERR%").count(), 2);
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_wait() {
        let dir = tempfile::tempdir().unwrap();
        let config = MonitorConfig::new(dir.path().join("hw.log"))
            .with_interval(Duration::from_secs(3600))
            .with_clear_screen(false);

        let monitor = Monitor::new(config, FlakyProvider { calls: 0 }, Vec::new()).unwrap();
        let shutdown = time::sleep(Duration::from_millis(50));
        let summary = time::timeout(Duration::from_secs(5), monitor.run(shutdown))
            .await
            .expect("shutdown should end the run")
            .unwrap();

        assert!(summary.interrupted);
        assert_eq!(summary.iterations, 1);
        let content = std::fs::read_to_string(dir.path().join("hw.log")).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[tokio::test]
    async fn test_tick_logs_one_line() {
        let dir = tempfile::tempdir().unwrap();
        let config = MonitorConfig::new(dir.path().join("hw.log")).with_clear_screen(false);
        let mut monitor = Monitor::new(config, FlakyProvider { calls: 0 }, Vec::new()).unwrap();

        let sample = monitor.tick().await.unwrap();
        assert_eq!(sample.network_throughput_mb_per_sec, Reading::Value(0.25));
        drop(monitor);

        let content = std::fs::read_to_string(dir.path().join("hw.log")).unwrap();
        assert!(content.ends_with("| Network: 0.25 MB/s\n"));
    }
}
