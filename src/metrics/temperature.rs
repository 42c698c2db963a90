//! CPU temperature from sysfs thermal zones, with sysinfo components as fallback.

use crate::error::{Result, SystemError};
use std::fs;
use std::path::{Path, PathBuf};
use sysinfo::Components;

/// Reads the first exposed thermal sensor.
///
/// The sysinfo component list is built once and refreshed on every read, so
/// the hwmon session stays open across ticks.
pub struct ThermalProbe {
    thermal_root: PathBuf,
    components: Option<Components>,
}

impl ThermalProbe {
    /// Probe sysfs zones under `thermal_root`, falling back to hwmon components.
    pub fn new(thermal_root: impl Into<PathBuf>) -> Self {
        Self {
            thermal_root: thermal_root.into(),
            components: Some(Components::new_with_refreshed_list()),
        }
    }

    /// Probe sysfs zones only.
    pub fn sysfs_only(thermal_root: impl Into<PathBuf>) -> Self {
        Self {
            thermal_root: thermal_root.into(),
            components: None,
        }
    }

    /// Current temperature in degrees Celsius.
    ///
    /// `Unsupported` when neither source exposes a sensor; an error when a
    /// zone exists but cannot be read.
    pub fn read_celsius(&mut self) -> Result<f64> {
        if let Some(zone) = first_thermal_zone(&self.thermal_root) {
            return read_zone_celsius(&zone);
        }

        if let Some(components) = self.components.as_mut() {
            components.refresh();
            if let Some(component) = components
                .iter()
                .find(|component| component.temperature().is_finite())
            {
                tracing::trace!("Temperature from component {}", component.label());
                return Ok(component.temperature() as f64);
            }
        }

        Err(SystemError::unsupported("no thermal zone or temperature sensor"))
    }
}

/// Lowest-numbered `thermal_zoneN` directory under `root`.
fn first_thermal_zone(root: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(root).ok()?;

    entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name();
            let index = name
                .to_str()?
                .strip_prefix("thermal_zone")?
                .parse::<u32>()
                .ok()?;
            Some((index, entry.path()))
        })
        .min_by_key(|(index, _)| *index)
        .map(|(_, path)| path)
}

/// Read a zone's `temp` file, expressed in millidegrees Celsius.
fn read_zone_celsius(zone: &Path) -> Result<f64> {
    let raw = fs::read_to_string(zone.join("temp"))?;
    let millidegrees = raw.trim().parse::<i64>().map_err(|e| {
        SystemError::parse_error(format!("{}: {:?}: {}", zone.display(), raw.trim(), e))
    })?;
    Ok(millidegrees as f64 / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_zone(root: &Path, index: u32, temp: &str) {
        let zone = root.join(format!("thermal_zone{}", index));
        fs::create_dir_all(&zone).unwrap();
        fs::write(zone.join("temp"), temp).unwrap();
    }

    #[test]
    fn test_reads_lowest_zone() {
        let dir = tempfile::tempdir().unwrap();
        write_zone(dir.path(), 10, "90000\n");
        write_zone(dir.path(), 2, "47500\n");
        fs::create_dir_all(dir.path().join("cooling_device0")).unwrap();

        let mut probe = ThermalProbe::sysfs_only(dir.path());
        assert_eq!(probe.read_celsius().unwrap(), 47.5);
    }

    #[test]
    fn test_missing_root_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let mut probe = ThermalProbe::sysfs_only(dir.path().join("absent"));
        assert!(probe.read_celsius().unwrap_err().is_unsupported());
    }

    #[test]
    fn test_unparsable_zone_fails() {
        let dir = tempfile::tempdir().unwrap();
        write_zone(dir.path(), 0, "hot\n");
        let mut probe = ThermalProbe::sysfs_only(dir.path());
        assert!(matches!(
            probe.read_celsius(),
            Err(SystemError::ParseError(_))
        ));
    }

    #[test]
    fn test_unreadable_zone_fails() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("thermal_zone0")).unwrap();
        let mut probe = ThermalProbe::sysfs_only(dir.path());
        assert!(matches!(probe.read_celsius(), Err(SystemError::Io(_))));
    }
}
