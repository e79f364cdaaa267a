//! Command verbs driving the node state machine.

use serde::{Deserialize, Serialize};

use super::state::NodeState;

/// A named command applied to a control node.
///
/// Each command is a transition of the node state machine; the table of
/// valid source states is encoded in [`NodeCommand::is_valid_from`] and the
/// destination state in [`NodeCommand::next_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeCommand {
    /// Apply configuration to the node.
    Load = 0,
    /// Start node processes and distribute boot parameters.
    Boot = 1,
    /// Begin a run.
    Start = 2,
    /// End the current run.
    Stop = 3,
    /// Drop all configuration and return to the initial state.
    Abort = 4,
}

impl NodeCommand {
    /// Convert from raw `u8`. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Load),
            1 => Some(Self::Boot),
            2 => Some(Self::Start),
            3 => Some(Self::Stop),
            4 => Some(Self::Abort),
            _ => None,
        }
    }

    /// Parse the upper-case wire name (`"LOAD"`, `"BOOT"`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "LOAD" => Some(Self::Load),
            "BOOT" => Some(Self::Boot),
            "START" => Some(Self::Start),
            "STOP" => Some(Self::Stop),
            "ABORT" => Some(Self::Abort),
            _ => None,
        }
    }

    /// Upper-case wire name of the command.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Load => "LOAD",
            Self::Boot => "BOOT",
            Self::Start => "START",
            Self::Stop => "STOP",
            Self::Abort => "ABORT",
        }
    }

    /// Whether this command is a legal transition out of `state`.
    pub const fn is_valid_from(self, state: NodeState) -> bool {
        matches!(
            (self, state),
            (
                Self::Load,
                NodeState::Unconfigured | NodeState::Loaded | NodeState::Stopped
            ) | (Self::Boot, NodeState::Loaded | NodeState::Booted)
                | (Self::Start, NodeState::Booted | NodeState::Stopped)
                | (Self::Stop, NodeState::Running)
                | (
                    Self::Abort,
                    NodeState::Loaded
                        | NodeState::Booted
                        | NodeState::Running
                        | NodeState::Stopped
                )
        )
    }

    /// State the node enters once this command has been applied.
    pub const fn next_state(self) -> NodeState {
        match self {
            Self::Load => NodeState::Loaded,
            Self::Boot => NodeState::Booted,
            Self::Start => NodeState::Running,
            Self::Stop => NodeState::Stopped,
            Self::Abort => NodeState::Unconfigured,
        }
    }
}

impl std::fmt::Display for NodeCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
