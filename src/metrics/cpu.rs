//! CPU load from cumulative `/proc/stat` counters.

use crate::error::{Result, SystemError};
use std::fs;
use std::path::Path;

/// Cumulative CPU time counters, in clock ticks, summed over all logical processors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuTimes {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl CpuTimes {
    /// Parse the aggregate `cpu` line of `/proc/stat`.
    pub fn parse(stat: &str) -> Result<Self> {
        let line = stat
            .lines()
            .find(|line| line.split_whitespace().next() == Some("cpu"))
            .ok_or_else(|| SystemError::parse_error("no aggregate cpu line in /proc/stat"))?;

        let fields: Vec<u64> = line
            .split_whitespace()
            .skip(1)
            .map(|field| {
                field
                    .parse::<u64>()
                    .map_err(|e| SystemError::parse_error(format!("cpu field {:?}: {}", field, e)))
            })
            .collect::<Result<_>>()?;

        // Kernels before 2.6.11 stop at irq/softirq; steal is optional.
        if fields.len() < 4 {
            return Err(SystemError::parse_error(format!(
                "aggregate cpu line has {} fields, expected at least 4",
                fields.len()
            )));
        }
        let field = |i: usize| fields.get(i).copied().unwrap_or(0);

        Ok(Self {
            user: field(0),
            nice: field(1),
            system: field(2),
            idle: field(3),
            iowait: field(4),
            irq: field(5),
            softirq: field(6),
            steal: field(7),
        })
    }

    /// Read the counters from `<proc_root>/stat`.
    pub fn read(proc_root: &Path) -> Result<Self> {
        let stat = fs::read_to_string(proc_root.join("stat"))?;
        Self::parse(&stat)
    }

    /// Ticks spent doing work.
    pub fn busy(&self) -> u64 {
        self.user + self.nice + self.system + self.irq + self.softirq + self.steal
    }

    /// All ticks elapsed across every processor.
    pub fn total(&self) -> u64 {
        self.busy() + self.idle + self.iowait
    }
}

/// Turns successive counter readings into a load percentage.
///
/// Holds the previous tick's counters. The first observation only sets the
/// baseline and reports `0.0`.
#[derive(Debug, Default)]
pub struct CpuLoadMeter {
    previous: Option<CpuTimes>,
}

impl CpuLoadMeter {
    /// A meter with no baseline yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a baseline has been recorded.
    pub fn is_primed(&self) -> bool {
        self.previous.is_some()
    }

    /// Record `now` and return the busy share since the previous observation.
    ///
    /// The aggregate counters already sum every logical processor, so the
    /// total delta equals wall time multiplied by the processor count.
    pub fn observe(&mut self, now: CpuTimes) -> f64 {
        let Some(previous) = self.previous else {
            self.previous = Some(now);
            return 0.0;
        };

        let busy = now.busy().saturating_sub(previous.busy());
        let total = now.total().saturating_sub(previous.total());
        if total == 0 {
            // Less than one tick elapsed; keep the older baseline.
            return 0.0;
        }

        self.previous = Some(now);
        (100.0 * busy as f64 / total as f64).clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAT: &str = "cpu  4705 356 584 3699 23 0 14 0 0 0\n\
                        cpu0 1393 280 290 1870 7 0 9 0 0 0\n\
                        intr 1462898\n";

    fn times(busy: u64, idle: u64) -> CpuTimes {
        CpuTimes {
            user: busy,
            idle,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_aggregate_line() {
        let t = CpuTimes::parse(STAT).unwrap();
        assert_eq!(t.user, 4705);
        assert_eq!(t.nice, 356);
        assert_eq!(t.system, 584);
        assert_eq!(t.idle, 3699);
        assert_eq!(t.iowait, 23);
        assert_eq!(t.softirq, 14);
        assert_eq!(t.busy(), 4705 + 356 + 584 + 14);
        assert_eq!(t.total(), t.busy() + 3699 + 23);
    }

    #[test]
    fn test_parse_short_line() {
        let t = CpuTimes::parse("cpu 10 0 5 100\n").unwrap();
        assert_eq!(t.busy(), 15);
        assert_eq!(t.steal, 0);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            CpuTimes::parse("intr 5\n"),
            Err(SystemError::ParseError(_))
        ));
        assert!(CpuTimes::parse("cpu 1 two 3 4\n").is_err());
        assert!(CpuTimes::parse("cpu 1 2\n").is_err());
    }

    #[test]
    fn test_first_observation_is_zero() {
        let mut meter = CpuLoadMeter::new();
        assert!(!meter.is_primed());
        assert_eq!(meter.observe(times(900, 100)), 0.0);
        assert!(meter.is_primed());
    }

    #[test]
    fn test_load_from_deltas() {
        let mut meter = CpuLoadMeter::new();
        meter.observe(times(100, 100));
        // 50 busy of 200 elapsed ticks
        let load = meter.observe(times(150, 250));
        assert!((load - 25.0).abs() < 1e-9);
        // fully busy interval
        let load = meter.observe(times(250, 250));
        assert!((load - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_elapsed_ticks_keeps_baseline() {
        let mut meter = CpuLoadMeter::new();
        meter.observe(times(100, 100));
        assert_eq!(meter.observe(times(100, 100)), 0.0);
        let load = meter.observe(times(110, 190));
        assert!((load - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_counter_reset_stays_in_range() {
        let mut meter = CpuLoadMeter::new();
        meter.observe(times(1000, 1000));
        let load = meter.observe(times(10, 3000));
        assert!((0.0..=100.0).contains(&load));
    }
}
