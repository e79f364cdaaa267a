//! Per-channel configuration and live measured state.

use crate::error::{HvError, HvResult};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Live condition flags of one channel.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct StatusFlags: u32 {
        /// Output is switched on.
        const ON = 1;
        /// Output voltage is still moving toward the demand value.
        const RAMPING = 1 << 1;
        /// Channel tripped; output was cut by the supply.
        const TRIPPED = 1 << 2;
        /// Measured current exceeded the configured limit.
        const OVER_CURRENT = 1 << 3;
    }
}

// Flags persist as their raw bits; unknown bits from newer writers are
// dropped on load.
mod flags_bits {
    use super::StatusFlags;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(flags: &StatusFlags, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u32(flags.bits())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<StatusFlags, D::Error> {
        u32::deserialize(d).map(StatusFlags::from_bits_truncate)
    }
}

/// Operator configuration of one channel.
///
/// Set through `set` commands and persisted by `save`; the hardware never
/// writes these fields.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChannelInfo {
    /// Demand voltage [V].
    pub nominal_voltage: f64,
    /// Hard output voltage limit [V].
    pub voltage_limit: f64,
    /// Trip threshold on measured current [uA].
    pub current_limit: f64,
    /// Ramp-up speed [V/s].
    pub ramp_up: f64,
    /// Ramp-down speed [V/s].
    pub ramp_down: f64,
}

impl ChannelInfo {
    /// Settable parameter names, as accepted by `set`.
    pub const PARAMS: [&'static str; 5] = ["voltage", "vlimit", "climit", "rampup", "rampdown"];

    /// Set one parameter by its command-line name.
    pub fn set_param(&mut self, name: &str, value: &str) -> HvResult<()> {
        let parsed: f64 = value.parse().map_err(|_| HvError::BadValue {
            param: name.to_string(),
            value: value.to_string(),
        })?;

        match name {
            "voltage" => self.nominal_voltage = parsed,
            "vlimit" => self.voltage_limit = parsed,
            "climit" => self.current_limit = parsed,
            "rampup" => self.ramp_up = parsed,
            "rampdown" => self.ramp_down = parsed,
            _ => {
                return Err(HvError::UnknownParam {
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Read one parameter by its command-line name.
    pub fn get_param(&self, name: &str) -> Option<f64> {
        match name {
            "voltage" => Some(self.nominal_voltage),
            "vlimit" => Some(self.voltage_limit),
            "climit" => Some(self.current_limit),
            "rampup" => Some(self.ramp_up),
            "rampdown" => Some(self.ramp_down),
            _ => None,
        }
    }
}

/// Live measured state of one channel, updated by hardware polling.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChannelStatus {
    /// Condition flags.
    #[serde(with = "flags_bits")]
    pub flags: StatusFlags,
    /// Measured output voltage [V].
    pub voltage: f64,
    /// Measured output current [uA].
    pub current: f64,
}

impl ChannelStatus {
    /// Whether the output is switched on.
    pub fn is_on(&self) -> bool {
        self.flags.contains(StatusFlags::ON)
    }

    /// Switch the output on or off. Switching on clears a trip.
    pub fn set_switch(&mut self, on: bool) {
        if on {
            self.flags.insert(StatusFlags::ON);
            self.flags.remove(StatusFlags::TRIPPED | StatusFlags::OVER_CURRENT);
        } else {
            self.flags.remove(StatusFlags::ON);
        }
    }

    /// Fold one hardware poll result into the status.
    ///
    /// Raises `OVER_CURRENT` and trips the channel when the measured
    /// current exceeds the configured limit; tracks `RAMPING` while the
    /// measured voltage is still away from the demand value.
    pub fn update_measurement(&mut self, voltage: f64, current: f64, info: &ChannelInfo) {
        self.voltage = voltage;
        self.current = current;

        if self.is_on() && info.current_limit > 0.0 && current > info.current_limit {
            self.flags.insert(StatusFlags::OVER_CURRENT | StatusFlags::TRIPPED);
            self.flags.remove(StatusFlags::ON);
        }

        let ramping = self.is_on() && (voltage - info.nominal_voltage).abs() > 0.5;
        self.flags.set(StatusFlags::RAMPING, ramping);
    }
}
