//! # daqcore Run Control Layer
//!
//! Addressable control nodes, their bounded sender lists, and the command
//! parameter marshaling used to boot and configure them from a supervisor
//! process.
//!
//! A supervisor issues a [`daq::node::NodeCommand`] to a node; the
//! [`CommandDispatcher`] checks the node state machine, applies the
//! command's marshaled arguments through the node's [`NodeParams`]
//! implementation, and advances the state. The transport the command
//! travels over is out of scope here - payloads are plain int/text pairs
//! that any message channel can carry.
//!
//! # Module Structure
//!
//! - [`node`] - `Node` base struct and the `ControlNode` accessor trait
//! - [`sender`] - downstream data destinations owned by a readout node
//! - [`ronode`] - readout node with sender list and boot script
//! - [`payload`] - `CommandPayload` and the `NodeParams` contract
//! - [`dispatch`] - state-machine-checked command application
//! - [`config_row`] - persisted node configuration row

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod config_row;
pub mod dispatch;
pub mod error;
pub mod node;
pub mod payload;
pub mod ronode;
pub mod sender;

pub use config_row::NodeConfigRow;
pub use dispatch::CommandDispatcher;
pub use error::{NodeError, NodeResult};
pub use node::{ControlNode, Node};
pub use payload::{CommandPayload, NodeParams};
pub use ronode::RONode;
pub use sender::{MAX_SENDERS, Sender};
