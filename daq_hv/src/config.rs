//! Crate topology configuration.

use daq::config::{ConfigError, SharedConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Dimensions of one physical crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrateTopology {
    /// Crate id used in channel addresses.
    pub id: u32,
    /// Number of slots.
    pub slots: u32,
    /// Channels per slot.
    pub channels: u32,
}

/// Configuration of the HV control process.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "info"
/// service_name = "hv-master"
///
/// store_dir = "/var/lib/daq/hvconf"
///
/// [[crates]]
/// id = 1
/// slots = 4
/// channels = 8
///
/// [[crates]]
/// id = 2
/// slots = 4
/// channels = 8
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HvConfig {
    /// Common process configuration.
    pub shared: SharedConfig,
    /// Root directory of the versioned configuration store.
    pub store_dir: PathBuf,
    /// Controlled crates.
    pub crates: Vec<CrateTopology>,
}

impl HvConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        if self.crates.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one crate must be configured".to_string(),
            ));
        }
        for topology in &self.crates {
            if topology.slots == 0 || topology.channels == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "crate {} has an empty {}x{} grid",
                    topology.id, topology.slots, topology.channels
                )));
            }
            if self.crates.iter().filter(|t| t.id == topology.id).count() > 1 {
                return Err(ConfigError::ValidationError(format!(
                    "crate id {} configured more than once",
                    topology.id
                )));
            }
        }
        Ok(())
    }
}
