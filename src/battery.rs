//! Battery status monitoring
//!
//! The face only needs two facts about the battery: the charge percent and
//! whether a charger is attached. On a Linux host both come from the kernel's
//! power-supply class in sysfs; tests and the `--battery` flag use a fixed value.

use crate::BatteryState;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Kernel power-supply class directory.
pub const POWER_SUPPLY_ROOT: &str = "/sys/class/power_supply";

#[derive(Error, Debug)]
pub enum BatteryError {
    #[error("battery IO: {0}")]
    Io(#[from] io::Error),

    #[error("unreadable battery value `{value}` in {file}")]
    Parse { file: &'static str, value: String },

    #[error("no battery found under {0}")]
    NotFound(PathBuf),
}

/// Source of battery readings.
pub trait BatteryMonitor: Send {
    /// Read the current state.
    fn peek(&mut self) -> Result<BatteryState, BatteryError>;
}

impl<M: BatteryMonitor + ?Sized> BatteryMonitor for Box<M> {
    fn peek(&mut self) -> Result<BatteryState, BatteryError> {
        (**self).peek()
    }
}

/// A battery that never changes.
#[derive(Clone, Copy, Debug)]
pub struct FixedBattery(pub BatteryState);

impl BatteryMonitor for FixedBattery {
    fn peek(&mut self) -> Result<BatteryState, BatteryError> {
        Ok(self.0)
    }
}

/// Battery exposed through a sysfs power-supply directory.
#[derive(Clone, Debug)]
pub struct SysfsBattery {
    supply: PathBuf,
}

impl SysfsBattery {
    /// Use a specific supply directory, e.g. `/sys/class/power_supply/BAT0`.
    pub fn new<P: Into<PathBuf>>(supply: P) -> Self {
        Self {
            supply: supply.into(),
        }
    }

    /// Find the first supply of type `Battery` under `root`.
    pub fn discover<P: AsRef<Path>>(root: P) -> Result<Self, BatteryError> {
        let root = root.as_ref();
        let mut entries: Vec<PathBuf> = fs::read_dir(root)?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .collect();
        entries.sort();

        entries
            .into_iter()
            .find(|supply| {
                fs::read_to_string(supply.join("type"))
                    .map(|kind| kind.trim() == "Battery")
                    .unwrap_or(false)
            })
            .map(Self::new)
            .ok_or_else(|| BatteryError::NotFound(root.to_path_buf()))
    }

    pub fn path(&self) -> &Path {
        &self.supply
    }

    fn read(&self, file: &'static str) -> Result<String, BatteryError> {
        Ok(fs::read_to_string(self.supply.join(file))?.trim().to_string())
    }
}

impl BatteryMonitor for SysfsBattery {
    fn peek(&mut self) -> Result<BatteryState, BatteryError> {
        let capacity = self.read("capacity")?;
        let percent = capacity
            .parse::<u8>()
            .map_err(|_| BatteryError::Parse {
                file: "capacity",
                value: capacity.clone(),
            })?;

        // "Full" means the charger is still attached
        let is_charging = matches!(self.read("status")?.as_str(), "Charging" | "Full");

        Ok(BatteryState::new(percent, is_charging))
    }
}
