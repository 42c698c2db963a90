//! Append-only sample log.

use crate::error::Result;
use crate::metrics::data::Sample;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Render one log line, without the trailing newline.
///
/// `<timestamp> | CPU: <v>% | Temp: <v>°C | RAM: <v> MB | Disk: <v>% | Network: <v> MB/s`
pub fn format_log_line(sample: &Sample, precision: usize) -> String {
    format!(
        "{} | CPU: {}% | Temp: {}°C | RAM: {} MB | Disk: {}% | Network: {} MB/s",
        sample.timestamp_string(),
        sample.cpu_load_percent.render(precision),
        sample.cpu_temperature_celsius.render(precision),
        sample.ram_used_megabytes.render(precision),
        sample.disk_busy_percent.render(precision),
        sample.network_throughput_mb_per_sec.render(precision),
    )
}

/// Durable line-per-sample log.
///
/// Opened in append mode so restarts never truncate earlier entries. Every
/// line is flushed and synced before `append` returns.
pub struct SampleLog {
    file: Option<File>,
    path: PathBuf,
    precision: usize,
    lines_written: u64,
}

impl SampleLog {
    /// Open (creating if absent) the log at `path`.
    pub fn open(path: impl AsRef<Path>, precision: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        tracing::info!("Appending samples to {}", path.display());

        Ok(Self {
            file: Some(file),
            path,
            precision,
            lines_written: 0,
        })
    }

    /// Where samples are appended.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lines appended through this handle.
    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    /// Append one sample and sync it to disk.
    pub fn append(&mut self, sample: &Sample) -> Result<()> {
        let line = format_log_line(sample, self.precision);
        let Some(file) = self.file.as_mut() else {
            return Err(crate::SystemError::system_error("sample log already closed"));
        };

        writeln!(file, "{}", line)?;
        file.flush()?;
        file.sync_data()?;
        self.lines_written += 1;
        tracing::debug!("Logged: {}", line);
        Ok(())
    }

    /// Flush, sync and close the file.
    pub fn close(mut self) -> Result<()> {
        self.finish()
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
            file.sync_all()?;
            tracing::info!(
                "Closed {} after {} new lines",
                self.path.display(),
                self.lines_written
            );
        }
        Ok(())
    }
}

impl Drop for SampleLog {
    fn drop(&mut self) {
        if let Err(err) = self.finish() {
            tracing::warn!("Failed to close {}: {}", self.path.display(), err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::data::Reading;
    use chrono::{Local, TimeZone};

    fn sample(second: u32) -> Sample {
        Sample {
            timestamp: Local.with_ymd_and_hms(2024, 6, 15, 9, 30, second).unwrap(),
            cpu_load_percent: Reading::Value(42.5),
            cpu_temperature_celsius: Reading::Value(55.0),
            ram_used_megabytes: Reading::Value(8192.0),
            disk_busy_percent: Reading::Value(10.0),
            network_throughput_mb_per_sec: Reading::Value(1.5),
        }
    }

    #[test]
    fn test_line_format() {
        assert_eq!(
            format_log_line(&sample(1), 2),
            "2024-06-15 09:30:01 | CPU: 42.50% | Temp: 55.00°C | RAM: 8192.00 MB | Disk: 10.00% | Network: 1.50 MB/s"
        );
    }

    #[test]
    fn test_line_markers() {
        let mut sample = sample(1);
        sample.cpu_temperature_celsius = Reading::Unsupported;
        sample.disk_busy_percent = Reading::Failed("counter gone".into());
        let line = format_log_line(&sample, 1);
        assert!(line.contains("| Temp: -1.0°C |"));
        assert!(line.contains("| Disk: ERR% |"));
        assert!(line.contains("| CPU: 42.5% |"));
    }

    #[test]
    fn test_append_and_close() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hw.log");

        let mut log = SampleLog::open(&path, 2).unwrap();
        assert_eq!(log.path(), path.as_path());
        log.append(&sample(1)).unwrap();
        log.append(&sample(2)).unwrap();
        assert_eq!(log.lines_written(), 2);
        log.close().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("2024-06-15 09:30:01 | "));
        assert!(lines[1].starts_with("2024-06-15 09:30:02 | "));
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn test_reopen_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hw.log");

        {
            let mut log = SampleLog::open(&path, 2).unwrap();
            log.append(&sample(1)).unwrap();
        }
        let mut log = SampleLog::open(&path, 2).unwrap();
        log.append(&sample(2)).unwrap();
        drop(log);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
