//! Base node struct and accessor trait.

use daq::node::{NodeState, NodeType};
use serde::{Deserialize, Serialize};

/// An addressable control entity: name, type tag and lifecycle state.
///
/// Type-specific nodes embed this struct and add their own parameters
/// (see [`crate::RONode`]). Exactly one control-plane actor mutates a
/// node's state at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Unique node name.
    pub name: String,
    /// Kind of hardware this node controls.
    pub node_type: NodeType,
    /// Current lifecycle state.
    pub state: NodeState,
}

impl Node {
    /// New node in the initial `Unconfigured` state.
    pub fn new(name: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            name: name.into(),
            node_type,
            state: NodeState::default(),
        }
    }
}

/// Access to the embedded [`Node`] of a type-specific node struct.
///
/// The dispatcher works against this trait so the state machine is
/// enforced uniformly across node types.
pub trait ControlNode {
    /// Embedded base node.
    fn node(&self) -> &Node;
    /// Embedded base node, mutable.
    fn node_mut(&mut self) -> &mut Node;
}

impl ControlNode for Node {
    fn node(&self) -> &Node {
        self
    }

    fn node_mut(&mut self) -> &mut Node {
        self
    }
}
