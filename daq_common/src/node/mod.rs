//! Node lifecycle states, command verbs and node types.
//!
//! Every hardware-control node in the system (readout, high-voltage,
//! trigger) shares one lifecycle state machine. The runtime node structs
//! live in `daq_runcontrol`; the enums here are the shared vocabulary used
//! across crates and over the wire.

pub mod command;
pub mod state;

pub use command::NodeCommand;
pub use state::NodeState;

use serde::{Deserialize, Serialize};

/// Kind of hardware-control node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeType {
    /// Readout node - drives event data toward downstream senders.
    Readout = 0,
    /// High-voltage control node.
    HighVoltage = 1,
    /// Trigger distribution node.
    Trigger = 2,
}

impl NodeType {
    /// Convert from raw `u8`. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Readout),
            1 => Some(Self::HighVoltage),
            2 => Some(Self::Trigger),
            _ => None,
        }
    }
}
