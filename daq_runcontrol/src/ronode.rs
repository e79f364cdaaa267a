//! Readout node: boot script plus a bounded, ordered sender list.

use crate::error::{NodeError, NodeResult};
use crate::node::{ControlNode, Node};
use crate::payload::{CommandPayload, NodeParams};
use crate::sender::{MAX_SENDERS, Sender};
use daq::node::{NodeCommand, NodeType};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A readout node.
///
/// Owns up to [`MAX_SENDERS`] downstream senders in a fixed order and the
/// path of the script its boot sequence executes. The BOOT command carries
/// both to the remote side:
///
/// - int args: `[sender_count]`
/// - text blob: `"<script> <host_1> <host_2> ... <host_n> "`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RONode {
    /// Embedded base node.
    pub node: Node,
    /// Boot script path.
    pub script: String,
    /// Ordered downstream senders.
    pub senders: heapless::Vec<Sender, MAX_SENDERS>,
}

impl RONode {
    /// New readout node with no script and no senders.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            node: Node::new(name, NodeType::Readout),
            script: String::new(),
            senders: heapless::Vec::new(),
        }
    }

    /// Set the boot script path.
    pub fn set_script(&mut self, script: impl Into<String>) {
        self.script = script.into();
    }

    /// Append a sender, failing once the fixed list is full.
    pub fn add_sender(&mut self, sender: Sender) -> NodeResult<()> {
        self.senders
            .push(sender)
            .map_err(|_| NodeError::TooManySenders {
                requested: MAX_SENDERS + 1,
                max: MAX_SENDERS,
            })
    }

    /// Hosts of the current senders, in list order.
    pub fn sender_hosts(&self) -> impl Iterator<Item = &str> {
        self.senders.iter().map(|s| s.host.as_str())
    }

    fn set_boot_params(&mut self, payload: &CommandPayload) -> NodeResult<()> {
        let bad = |reason: &str| NodeError::BadPayload {
            command: NodeCommand::Boot,
            reason: reason.to_string(),
        };

        let &count = payload.ints.first().ok_or_else(|| bad("missing sender count"))?;
        let count = usize::try_from(count).map_err(|_| bad("negative sender count"))?;
        if count > MAX_SENDERS {
            return Err(NodeError::TooManySenders {
                requested: count,
                max: MAX_SENDERS,
            });
        }

        let mut tokens = payload.text.split_whitespace();
        let script = tokens.next().ok_or_else(|| bad("missing script path"))?;

        // Collect hosts before touching any state: a malformed payload
        // must not leave the node half-updated.
        let hosts: Vec<&str> = tokens.take(count).collect();
        if hosts.len() < count {
            return Err(bad("fewer sender hosts than declared"));
        }

        self.script = script.to_string();
        for (slot, host) in hosts.iter().enumerate() {
            match self.senders.get_mut(slot) {
                // Reuse the existing slot, keeping its configured id.
                Some(sender) => sender.host = (*host).to_string(),
                None => {
                    let _ = self.senders.push(Sender::new(*host));
                }
            }
        }
        self.senders.truncate(count);

        debug!(
            node = %self.node.name,
            script = %self.script,
            senders = count,
            "boot parameters applied"
        );
        Ok(())
    }
}

impl ControlNode for RONode {
    fn node(&self) -> &Node {
        &self.node
    }

    fn node_mut(&mut self) -> &mut Node {
        &mut self.node
    }
}

impl NodeParams for RONode {
    fn get_params(&self, command: NodeCommand) -> CommandPayload {
        match command {
            NodeCommand::Boot => {
                let mut text = String::new();
                text.push_str(&self.script);
                text.push(' ');
                for sender in &self.senders {
                    text.push_str(&sender.host);
                    text.push(' ');
                }
                CommandPayload::new(vec![self.senders.len() as i32], text)
            }
            _ => CommandPayload::empty(),
        }
    }

    fn set_params(&mut self, command: NodeCommand, payload: &CommandPayload) -> NodeResult<()> {
        match command {
            NodeCommand::Boot => self.set_boot_params(payload),
            // Other commands carry nothing for a readout node.
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured(hosts: &[&str]) -> RONode {
        let mut node = RONode::new("ro01");
        node.set_script("daq/ropc_boot.sh");
        for host in hosts {
            node.add_sender(Sender::new(*host)).unwrap();
        }
        node
    }

    #[test]
    fn boot_params_roundtrip() {
        let original = configured(&["ropc01", "ropc02", "ropc03"]);
        let payload = original.get_params(NodeCommand::Boot);

        assert_eq!(payload.ints, vec![3]);
        assert_eq!(payload.text, "daq/ropc_boot.sh ropc01 ropc02 ropc03 ");

        let mut fresh = RONode::new("ro01");
        fresh.set_params(NodeCommand::Boot, &payload).unwrap();
        assert_eq!(fresh.script, original.script);
        assert_eq!(
            fresh.sender_hosts().collect::<Vec<_>>(),
            original.sender_hosts().collect::<Vec<_>>()
        );
    }

    #[test]
    fn roundtrip_with_no_senders() {
        let original = configured(&[]);
        let payload = original.get_params(NodeCommand::Boot);
        assert_eq!(payload.ints, vec![0]);

        let mut fresh = RONode::new("ro01");
        fresh.set_params(NodeCommand::Boot, &payload).unwrap();
        assert_eq!(fresh.script, "daq/ropc_boot.sh");
        assert!(fresh.senders.is_empty());
    }

    #[test]
    fn roundtrip_at_full_capacity() {
        let hosts: Vec<String> = (0..MAX_SENDERS).map(|i| format!("ropc{i:02}")).collect();
        let host_refs: Vec<&str> = hosts.iter().map(String::as_str).collect();
        let original = configured(&host_refs);

        let mut fresh = RONode::new("ro01");
        fresh
            .set_params(NodeCommand::Boot, &original.get_params(NodeCommand::Boot))
            .unwrap();
        assert_eq!(
            fresh.sender_hosts().collect::<Vec<_>>(),
            original.sender_hosts().collect::<Vec<_>>()
        );
    }

    #[test]
    fn set_params_is_idempotent() {
        let payload = configured(&["ropc01", "ropc02"]).get_params(NodeCommand::Boot);

        let mut node = RONode::new("ro01");
        node.set_params(NodeCommand::Boot, &payload).unwrap();
        let after_first = node.clone();
        node.set_params(NodeCommand::Boot, &payload).unwrap();
        assert_eq!(node, after_first);
    }

    #[test]
    fn set_params_reuses_slots_and_truncates() {
        let mut node = configured(&["old01", "old02", "old03"]);
        node.senders[0].id = Some(17);

        let payload = CommandPayload::new(vec![2], "new_boot.sh new01 new02 ".to_string());
        node.set_params(NodeCommand::Boot, &payload).unwrap();

        assert_eq!(node.script, "new_boot.sh");
        assert_eq!(node.sender_hosts().collect::<Vec<_>>(), ["new01", "new02"]);
        // Reused slot keeps its configured id.
        assert_eq!(node.senders[0].id, Some(17));
    }

    #[test]
    fn unknown_command_is_noop() {
        let mut node = configured(&["ropc01"]);
        let before = node.clone();

        assert_eq!(node.get_params(NodeCommand::Start), CommandPayload::empty());
        node.set_params(NodeCommand::Start, &CommandPayload::new(vec![99], "junk"))
            .unwrap();
        assert_eq!(node, before);
    }

    #[test]
    fn malformed_boot_payload_leaves_state_untouched() {
        let mut node = configured(&["ropc01"]);
        let before = node.clone();

        // Declares three hosts, carries one.
        let payload = CommandPayload::new(vec![3], "boot.sh only01 ");
        assert!(matches!(
            node.set_params(NodeCommand::Boot, &payload),
            Err(NodeError::BadPayload { .. })
        ));
        assert_eq!(node, before);

        // Negative sender count.
        let payload = CommandPayload::new(vec![-1], "boot.sh ");
        assert!(matches!(
            node.set_params(NodeCommand::Boot, &payload),
            Err(NodeError::BadPayload { .. })
        ));

        // Over-capacity sender count.
        let payload = CommandPayload::new(vec![MAX_SENDERS as i32 + 1], "boot.sh ");
        assert!(matches!(
            node.set_params(NodeCommand::Boot, &payload),
            Err(NodeError::TooManySenders { .. })
        ));
    }
}
