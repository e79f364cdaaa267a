//! Node lifecycle state machine.
//!
//! A node moves through `Unconfigured → Loaded → Booted → Running →
//! Stopped`; only the transitions named by [`super::NodeCommand`] are
//! legal. `#[repr(u8)]` keeps the state compact for wire transport.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a control node.
///
/// Exactly one state is active at a time. A command that is not valid from
/// the current state is rejected by the dispatcher without side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeState {
    /// Initial state - no configuration applied.
    Unconfigured = 0,
    /// Configuration loaded, processes not yet started.
    Loaded = 1,
    /// Boot sequence complete, ready to take data.
    Booted = 2,
    /// Run in progress.
    Running = 3,
    /// Run stopped, node still booted and configured.
    Stopped = 4,
}

impl NodeState {
    /// Convert from raw `u8`. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Unconfigured),
            1 => Some(Self::Loaded),
            2 => Some(Self::Booted),
            3 => Some(Self::Running),
            4 => Some(Self::Stopped),
            _ => None,
        }
    }

    /// Upper-case wire name of the state.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unconfigured => "UNCONFIGURED",
            Self::Loaded => "LOADED",
            Self::Booted => "BOOTED",
            Self::Running => "RUNNING",
            Self::Stopped => "STOPPED",
        }
    }
}

impl Default for NodeState {
    fn default() -> Self {
        Self::Unconfigured
    }
}

impl std::fmt::Display for NodeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_roundtrip() {
        for v in 0..=4u8 {
            let state = NodeState::from_u8(v).unwrap();
            assert_eq!(state as u8, v);
        }
        assert!(NodeState::from_u8(5).is_none());
    }

    #[test]
    fn default_is_unconfigured() {
        assert_eq!(NodeState::default(), NodeState::Unconfigured);
    }
}
