//! Persisted node configuration row.
//!
//! The row format is fixed: identity columns, the boot script, and one
//! sender-id column per sender slot with `-1` meaning "unset". The `-1`
//! sentinel exists only in this row - in-memory sender ids are
//! `Option<u32>` - and is converted at the persistence boundary.

use crate::error::{NodeError, NodeResult};
use crate::ronode::RONode;
use crate::sender::{MAX_SENDERS, Sender};
use daq::node::NodeType;
use daq_confdb::{ConfdbResult, ConfigStore};
use serde::{Deserialize, Serialize};

/// Sender-id column value meaning "slot unused".
pub const SENDER_ID_UNSET: i32 = -1;

/// One persisted configuration row for a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfigRow {
    /// Node name.
    pub name: String,
    /// Node type tag.
    pub node_type: NodeType,
    /// Boot script path.
    pub script: String,
    /// One column per sender slot; [`SENDER_ID_UNSET`] for unused slots.
    pub sender_ids: [i32; MAX_SENDERS],
}

impl NodeConfigRow {
    /// Build the row for a readout node's current configuration.
    pub fn from_ronode(node: &RONode) -> Self {
        let mut sender_ids = [SENDER_ID_UNSET; MAX_SENDERS];
        for (slot, sender) in node.senders.iter().enumerate() {
            if let Some(id) = sender.id {
                sender_ids[slot] = id as i32;
            }
        }
        Self {
            name: node.node.name.clone(),
            node_type: node.node.node_type,
            script: node.script.clone(),
            sender_ids,
        }
    }

    /// Apply this row to a readout node.
    ///
    /// Sets the script and the configured sender ids; sender hosts are not
    /// part of the row, they arrive with the BOOT payload. Slots beyond
    /// the row's used columns are dropped.
    pub fn apply_to(&self, node: &mut RONode) -> NodeResult<()> {
        node.script = self.script.clone();

        let used = self
            .sender_ids
            .iter()
            .take_while(|&&id| id != SENDER_ID_UNSET)
            .count();

        for slot in 0..used {
            let id = u32::try_from(self.sender_ids[slot]).map_err(|_| NodeError::BadPayload {
                command: daq::node::NodeCommand::Load,
                reason: format!("sender_id_{slot} is negative but not unset"),
            })?;
            match node.senders.get_mut(slot) {
                Some(sender) => sender.id = Some(id),
                None => {
                    let mut sender = Sender::new("");
                    sender.id = Some(id);
                    // Capacity equals the column count; cannot overflow.
                    let _ = node.senders.push(sender);
                }
            }
        }
        node.senders.truncate(used);
        Ok(())
    }

    /// Persist this row as a new version in the store.
    pub fn store(&self, store: &ConfigStore, version: u32) -> ConfdbResult<()> {
        store.write_record(&entity_name(&self.name), version, self)
    }

    /// Load a row from the store; `None` selects the latest version.
    pub fn load(store: &ConfigStore, name: &str, version: Option<u32>) -> ConfdbResult<Self> {
        store.read_record(&entity_name(name), version)
    }
}

fn entity_name(node_name: &str) -> String {
    format!("node.{node_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_with_ids(ids: &[Option<u32>]) -> RONode {
        let mut node = RONode::new("ro01");
        node.set_script("boot.sh");
        for (i, id) in ids.iter().enumerate() {
            let mut sender = Sender::new(format!("ropc{i:02}"));
            sender.id = *id;
            node.add_sender(sender).unwrap();
        }
        node
    }

    #[test]
    fn row_uses_unset_sentinel_for_unused_slots() {
        let node = node_with_ids(&[Some(11), Some(12)]);
        let row = NodeConfigRow::from_ronode(&node);

        assert_eq!(row.script, "boot.sh");
        assert_eq!(&row.sender_ids[..3], &[11, 12, SENDER_ID_UNSET]);
        assert!(row.sender_ids[2..].iter().all(|&id| id == SENDER_ID_UNSET));
    }

    #[test]
    fn apply_restores_ids_and_drops_extra_slots() {
        let row = NodeConfigRow {
            name: "ro01".to_string(),
            node_type: NodeType::Readout,
            script: "other.sh".to_string(),
            sender_ids: {
                let mut ids = [SENDER_ID_UNSET; MAX_SENDERS];
                ids[0] = 5;
                ids
            },
        };

        let mut node = node_with_ids(&[Some(1), Some(2), Some(3)]);
        row.apply_to(&mut node).unwrap();

        assert_eq!(node.script, "other.sh");
        assert_eq!(node.senders.len(), 1);
        assert_eq!(node.senders[0].id, Some(5));
        // The reused slot keeps its host.
        assert_eq!(node.senders[0].host, "ropc00");
    }

    #[test]
    fn store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::open(dir.path()).unwrap();

        let row = NodeConfigRow::from_ronode(&node_with_ids(&[Some(7), None, Some(9)]));
        row.store(&store, 1).unwrap();

        let loaded = NodeConfigRow::load(&store, "ro01", None).unwrap();
        assert_eq!(loaded, row);
        // The middle sender had no id: its column carries the sentinel.
        assert_eq!(loaded.sender_ids[1], SENDER_ID_UNSET);
    }
}
