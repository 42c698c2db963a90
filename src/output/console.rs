//! Console snapshot redrawn each tick.

use crate::error::Result;
use crate::metrics::data::Sample;
use crossterm::{
    cursor::MoveTo,
    queue,
    terminal::{Clear, ClearType},
};
use std::io::Write;

/// Heading printed above every redraw.
pub const HEADER: &str = "=== Hardware Resource Monitor ===";

/// Startup notice; repeated under each redraw when the screen is cleared.
pub const STOP_HINT: &str = "Logging system started. Press Ctrl+C to stop.";

/// Human-readable view of the latest sample.
pub struct ConsoleDisplay<W: Write> {
    out: W,
    clear: bool,
    precision: usize,
    redraws: u64,
}

impl<W: Write> ConsoleDisplay<W> {
    pub fn new(out: W, clear: bool, precision: usize) -> Self {
        Self {
            out,
            clear,
            precision,
            redraws: 0,
        }
    }

    /// Completed redraws.
    pub fn redraws(&self) -> u64 {
        self.redraws
    }

    /// Print a one-off notice outside the redrawn block.
    pub fn announce(&mut self, message: &str) -> Result<()> {
        writeln!(self.out, "{}", message)?;
        self.out.flush()?;
        Ok(())
    }

    /// Clear the terminal (if enabled) and draw `sample`.
    pub fn render(&mut self, sample: &Sample) -> Result<()> {
        if self.clear {
            queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        }

        let p = self.precision;
        writeln!(self.out, "{}", HEADER)?;
        writeln!(self.out, "Time: {}", sample.timestamp_string())?;
        writeln!(self.out, "CPU Load: {}%", sample.cpu_load_percent.render(p))?;
        writeln!(
            self.out,
            "CPU Temperature: {}°C",
            sample.cpu_temperature_celsius.render(p)
        )?;
        writeln!(self.out, "RAM Usage: {} MB", sample.ram_used_megabytes.render(p))?;
        writeln!(self.out, "Disk Usage: {}%", sample.disk_busy_percent.render(p))?;
        writeln!(
            self.out,
            "Network Speed: {} MB/s",
            sample.network_throughput_mb_per_sec.render(p)
        )?;
        if self.clear {
            writeln!(self.out, "{}", STOP_HINT)?;
        }
        self.out.flush()?;

        self.redraws += 1;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::data::Reading;
    use chrono::Local;

    fn sample() -> Sample {
        Sample {
            timestamp: Local::now(),
            cpu_load_percent: Reading::Value(12.346),
            cpu_temperature_celsius: Reading::Unsupported,
            ram_used_megabytes: Reading::Value(1024.0),
            disk_busy_percent: Reading::Value(0.0),
            network_throughput_mb_per_sec: Reading::Failed("gone".into()),
        }
    }

    #[test]
    fn test_render_without_clear() {
        let mut display = ConsoleDisplay::new(Vec::new(), false, 2);
        display.render(&sample()).unwrap();
        assert_eq!(display.redraws(), 1);

        let text = String::from_utf8(display.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], HEADER);
        assert!(lines[1].starts_with("Time: "));
        assert_eq!(lines[2], "CPU Load: 12.35%");
        assert_eq!(lines[3], "CPU Temperature: -1.00°C");
        assert_eq!(lines[4], "RAM Usage: 1024.00 MB");
        assert_eq!(lines[5], "Disk Usage: 0.00%");
        assert_eq!(lines[6], "Network Speed: ERR MB/s");
        assert_eq!(lines.len(), 7);
    }

    #[test]
    fn test_render_with_clear_emits_escape() {
        let mut display = ConsoleDisplay::new(Vec::new(), true, 2);
        display.render(&sample()).unwrap();
        display.render(&sample()).unwrap();
        assert_eq!(display.redraws(), 2);

        let text = String::from_utf8(display.into_inner()).unwrap();
        assert!(text.starts_with('\u{1b}'));
        assert_eq!(text.matches(HEADER).count(), 2);
        // the hint follows the last clear, so it stays visible
        let last_clear = text.rfind('\u{1b}').unwrap();
        assert!(text[last_clear..].contains(STOP_HINT));
    }
}
