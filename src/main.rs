//! hwlog - Hardware Telemetry Logger Binary
//!
//! Samples CPU load, CPU temperature, RAM, disk and network activity, redraws
//! a console snapshot and appends one line per sample to a log file.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use hwlog::{
    collect_sample, HostCollector, Monitor, MonitorConfig, Sample, DEFAULT_INTERVAL_MS,
    DEFAULT_LOG_PATH, DEFAULT_PRECISION, DEFAULT_WINDOW_MS,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::{filter::LevelFilter, EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "hwlog")]
#[command(about = "Hardware telemetry sampler and logger")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    long_about = "Polls CPU load, CPU temperature, RAM, disk and network activity, shows the latest \
                  sample on the console and appends it to a log file"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log file samples are appended to
    #[arg(long, default_value = DEFAULT_LOG_PATH, global = true)]
    log_file: PathBuf,

    /// Delay between samples in milliseconds
    #[arg(short, long, default_value_t = DEFAULT_INTERVAL_MS, global = true)]
    interval: u64,

    /// Disk and network counter window in milliseconds
    #[arg(short, long, default_value_t = DEFAULT_WINDOW_MS, global = true)]
    window: u64,

    /// Decimal places for rendered readings
    #[arg(long, default_value_t = DEFAULT_PRECISION, global = true)]
    precision: usize,

    /// Do not clear the terminal between samples
    #[arg(long, global = true)]
    no_clear: bool,

    /// Stop after this many samples
    #[arg(short = 'n', long, global = true)]
    count: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample and log until interrupted (default)
    Run,

    /// Take a single sample, print it and exit without logging
    Snapshot(SnapshotArgs),

    /// Show host information
    Info,
}

#[derive(Args)]
struct SnapshotArgs {
    /// Output format: json or pretty
    #[arg(short, long, default_value = "pretty")]
    format: String,
}

impl Cli {
    fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig::new(&self.log_file)
            .with_interval(Duration::from_millis(self.interval))
            .with_counter_window(Duration::from_millis(self.window))
            .with_precision(self.precision)
            .with_clear_screen(!self.no_clear)
            .with_max_iterations(self.count)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&cli)?;

    match &cli.command {
        Some(Commands::Run) | None => run_command(&cli).await,
        Some(Commands::Snapshot(args)) => snapshot_command(&cli, args).await,
        Some(Commands::Info) => info_command(&cli),
    }
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    // RUST_LOG wins over the command-line level when set.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(LevelFilter::from_level(level).into()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM where the platform has it.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!("Ctrl+C handler unavailable: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!("SIGTERM handler unavailable: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

async fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let config = cli.monitor_config();
    info!("Starting hardware logger...");

    let collector = HostCollector::new(&config).context("invalid sampler configuration")?;
    let monitor = Monitor::new(config, collector, std::io::stdout())
        .with_context(|| format!("cannot open log file {}", cli.log_file.display()))?;

    let summary = monitor.run(shutdown_signal()).await?;
    info!(
        "Stopped after {} samples ({} failed readings)",
        summary.iterations, summary.failed_readings
    );

    Ok(())
}

async fn snapshot_command(cli: &Cli, args: &SnapshotArgs) -> anyhow::Result<()> {
    let config = cli.monitor_config();
    let mut collector = HostCollector::new(&config)?;

    // A first CPU reading is always zero; take the baseline a window earlier.
    if let Err(err) = collector.prime_cpu() {
        tracing::warn!("Could not prime CPU counters: {}", err);
    }
    tokio::time::sleep(config.counter_window).await;

    let sample = collect_sample(&mut collector).await;

    match args.format.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&sample)?;
            println!("{}", json);
        }
        "pretty" => {
            print_pretty_sample(&sample, config.precision);
        }
        other => {
            anyhow::bail!("Unsupported format: {}. Use 'json' or 'pretty'", other);
        }
    }

    Ok(())
}

fn info_command(cli: &Cli) -> anyhow::Result<()> {
    let config = cli.monitor_config();
    let mut collector = HostCollector::new(&config)?;
    let (total, available) = collector.memory_bytes();
    let temperature = hwlog::MetricsProvider::cpu_temperature(&mut collector);

    println!("Host Information");
    println!("================");
    println!(
        "  Hostname: {}",
        sysinfo::System::host_name().unwrap_or_else(|| "unknown".to_string())
    );
    println!(
        "  OS: {} {}",
        sysinfo::System::name().unwrap_or_else(|| "unknown".to_string()),
        sysinfo::System::os_version().unwrap_or_default()
    );
    println!(
        "  Kernel: {}",
        sysinfo::System::kernel_version().unwrap_or_else(|| "unknown".to_string())
    );
    println!(
        "  Logical CPUs: {}",
        std::thread::available_parallelism().map_or(0, |n| n.get())
    );
    println!(
        "  Memory: {:.1} GB total, {:.1} GB available",
        total as f64 / 1024.0 / 1024.0 / 1024.0,
        available as f64 / 1024.0 / 1024.0 / 1024.0
    );
    match temperature {
        Ok(celsius) => println!("  Thermal sensor: yes ({:.1}°C)", celsius),
        Err(err) if err.is_unsupported() => println!("  Thermal sensor: none"),
        Err(err) => println!("  Thermal sensor: error ({})", err),
    }
    println!("  Log file: {}", config.log_path.display());

    Ok(())
}

fn print_pretty_sample(sample: &Sample, precision: usize) {
    println!("Sample ({})", sample.timestamp_string());
    println!("==========================");
    println!("  CPU Load:        {}%", sample.cpu_load_percent.render(precision));
    println!(
        "  CPU Temperature: {}°C",
        sample.cpu_temperature_celsius.render(precision)
    );
    println!("  RAM Usage:       {} MB", sample.ram_used_megabytes.render(precision));
    println!("  Disk Usage:      {}%", sample.disk_busy_percent.render(precision));
    println!(
        "  Network Speed:   {} MB/s",
        sample.network_throughput_mb_per_sec.render(precision)
    );
}
