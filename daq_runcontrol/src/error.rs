//! Error types for the run control layer.

use daq::node::{NodeCommand, NodeState};
use thiserror::Error;

/// Errors that can occur while controlling a node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    /// The command is not a legal transition out of the current state.
    #[error("Command {command} is not valid from state {state}")]
    InvalidTransition {
        /// State the node was in.
        state: NodeState,
        /// Rejected command.
        command: NodeCommand,
    },

    /// More senders requested than the fixed sender list can hold.
    #[error("Sender list holds at most {max} entries, got {requested}")]
    TooManySenders {
        /// Requested sender count.
        requested: usize,
        /// Fixed capacity.
        max: usize,
    },

    /// A received payload did not match the command's wire contract.
    #[error("Malformed {command} payload: {reason}")]
    BadPayload {
        /// Command the payload belonged to.
        command: NodeCommand,
        /// What was wrong.
        reason: String,
    },
}

/// Result type for node control operations.
pub type NodeResult<T> = Result<T, NodeError>;
