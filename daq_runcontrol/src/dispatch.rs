//! State-machine-checked command application.

use crate::error::{NodeError, NodeResult};
use crate::node::ControlNode;
use crate::payload::{CommandPayload, NodeParams};
use daq::node::{NodeCommand, NodeState};
use tracing::{info, warn};

/// Applies named commands to nodes.
///
/// A command is rejected without side effects unless the node is in a
/// state the command is a valid transition from; otherwise the payload is
/// applied through the node's [`NodeParams`] contract and the state
/// advances.
pub struct CommandDispatcher;

impl CommandDispatcher {
    /// Apply `command` with `payload` to `node`.
    ///
    /// Returns the state the node ended up in. On any error the node
    /// state is unchanged.
    pub fn dispatch<N>(
        node: &mut N,
        command: NodeCommand,
        payload: &CommandPayload,
    ) -> NodeResult<NodeState>
    where
        N: ControlNode + NodeParams,
    {
        let state = node.node().state;
        if !command.is_valid_from(state) {
            warn!(
                node = %node.node().name,
                %command,
                %state,
                "command rejected by state machine"
            );
            return Err(NodeError::InvalidTransition { state, command });
        }

        node.set_params(command, payload)?;

        let next = command.next_state();
        node.node_mut().state = next;
        info!(
            node = %node.node().name,
            %command,
            from = %state,
            to = %next,
            "command applied"
        );
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ronode::RONode;
    use crate::sender::Sender;

    fn boot_payload(node: &RONode) -> CommandPayload {
        node.get_params(NodeCommand::Boot)
    }

    #[test]
    fn full_lifecycle() {
        let mut node = RONode::new("ro01");
        node.set_script("boot.sh");
        node.add_sender(Sender::new("ropc01")).unwrap();
        let boot = boot_payload(&node);

        let empty = CommandPayload::empty();
        assert_eq!(
            CommandDispatcher::dispatch(&mut node, NodeCommand::Load, &empty).unwrap(),
            NodeState::Loaded
        );
        assert_eq!(
            CommandDispatcher::dispatch(&mut node, NodeCommand::Boot, &boot).unwrap(),
            NodeState::Booted
        );
        assert_eq!(
            CommandDispatcher::dispatch(&mut node, NodeCommand::Start, &empty).unwrap(),
            NodeState::Running
        );
        assert_eq!(
            CommandDispatcher::dispatch(&mut node, NodeCommand::Stop, &empty).unwrap(),
            NodeState::Stopped
        );
        assert_eq!(
            CommandDispatcher::dispatch(&mut node, NodeCommand::Abort, &empty).unwrap(),
            NodeState::Unconfigured
        );
    }

    #[test]
    fn invalid_transition_is_rejected_without_side_effects() {
        let mut node = RONode::new("ro01");
        let result =
            CommandDispatcher::dispatch(&mut node, NodeCommand::Start, &CommandPayload::empty());
        assert_eq!(
            result,
            Err(NodeError::InvalidTransition {
                state: NodeState::Unconfigured,
                command: NodeCommand::Start,
            })
        );
        assert_eq!(node.node.state, NodeState::Unconfigured);
    }

    #[test]
    fn failed_set_params_leaves_state_unchanged() {
        let mut node = RONode::new("ro01");
        CommandDispatcher::dispatch(&mut node, NodeCommand::Load, &CommandPayload::empty())
            .unwrap();

        // Valid transition, malformed payload: state must not advance.
        let bad = CommandPayload::new(vec![2], "boot.sh one_host_only ");
        assert!(CommandDispatcher::dispatch(&mut node, NodeCommand::Boot, &bad).is_err());
        assert_eq!(node.node.state, NodeState::Loaded);
    }
}
