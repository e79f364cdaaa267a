//! Supervisor-to-node command flow across a marshaling boundary.

use daq::node::{NodeCommand, NodeState};
use daq_confdb::ConfigStore;
use daq_runcontrol::{
    CommandDispatcher, CommandPayload, NodeConfigRow, NodeParams, RONode, Sender,
};

/// The supervisor serializes its view of the node; the remote side applies
/// it to a fresh instance. Both ends must agree afterwards.
#[test]
fn supervisor_boot_reaches_remote_node() {
    // Supervisor side.
    let mut master = RONode::new("ro01");
    master.set_script("daq/ropc_boot.sh");
    for host in ["ropc01", "ropc02", "ropc03"] {
        master.add_sender(Sender::new(host)).unwrap();
    }

    CommandDispatcher::dispatch(&mut master, NodeCommand::Load, &CommandPayload::empty()).unwrap();
    let wire = master.get_params(NodeCommand::Boot);

    // Payload survives a serialization hop (any message channel).
    let bytes = serde_json::to_vec(&wire).unwrap();
    let received: CommandPayload = serde_json::from_slice(&bytes).unwrap();

    // Remote side.
    let mut remote = RONode::new("ro01");
    remote.node.state = NodeState::Loaded;
    let state = CommandDispatcher::dispatch(&mut remote, NodeCommand::Boot, &received).unwrap();

    assert_eq!(state, NodeState::Booted);
    assert_eq!(remote.script, master.script);
    assert_eq!(
        remote.sender_hosts().collect::<Vec<_>>(),
        master.sender_hosts().collect::<Vec<_>>()
    );
}

#[test]
fn node_configuration_is_versioned_not_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::open(dir.path()).unwrap();

    let mut node = RONode::new("ro01");
    node.set_script("boot_v1.sh");
    let mut sender = Sender::new("ropc01");
    sender.id = Some(4);
    node.add_sender(sender).unwrap();

    NodeConfigRow::from_ronode(&node).store(&store, 1).unwrap();

    // A configuration change becomes a new version; version 1 survives.
    node.set_script("boot_v2.sh");
    NodeConfigRow::from_ronode(&node).store(&store, 2).unwrap();

    let v1 = NodeConfigRow::load(&store, "ro01", Some(1)).unwrap();
    let latest = NodeConfigRow::load(&store, "ro01", None).unwrap();
    assert_eq!(v1.script, "boot_v1.sh");
    assert_eq!(latest.script, "boot_v2.sh");
    assert_eq!(latest.sender_ids[0], 4);

    // Rollback: apply the old row to a fresh node.
    let mut restored = RONode::new("ro01");
    v1.apply_to(&mut restored).unwrap();
    assert_eq!(restored.script, "boot_v1.sh");
    assert_eq!(restored.senders.len(), 1);
    assert_eq!(restored.senders[0].id, Some(4));
}
