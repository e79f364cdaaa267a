//! Command payloads and the per-node-type marshaling contract.

use crate::error::NodeResult;
use daq::node::NodeCommand;
use serde::{Deserialize, Serialize};

/// Marshaled arguments of one command: an int array plus a text blob.
///
/// This is the wire shape every node-management channel carries; the
/// meaning of the fields is defined per (node type, command) pair by the
/// node's [`NodeParams`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommandPayload {
    /// Integer arguments.
    pub ints: Vec<i32>,
    /// Text blob argument.
    pub text: String,
}

impl CommandPayload {
    /// Payload with ints and text.
    pub fn new(ints: Vec<i32>, text: impl Into<String>) -> Self {
        Self {
            ints,
            text: text.into(),
        }
    }

    /// Payload carrying nothing.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Command parameter marshaling contract of one node type.
///
/// # Contract
///
/// - `set_params(cmd, &get_params(cmd))` applied to a fresh node of the
///   same type reproduces the state that produced the `get_params` call
///   (round-trip law).
/// - `set_params` is idempotent: applying identical arguments twice
///   yields the same node state.
/// - Commands a node type does not care about produce an empty payload
///   from `get_params` and are a no-op in `set_params` - not an error.
pub trait NodeParams {
    /// Serialize the state relevant to sending `command` downstream.
    fn get_params(&self, command: NodeCommand) -> CommandPayload;

    /// Apply a received command's arguments to local state.
    fn set_params(&mut self, command: NodeCommand, payload: &CommandPayload) -> NodeResult<()>;
}
