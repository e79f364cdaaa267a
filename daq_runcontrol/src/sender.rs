//! Downstream data destinations owned by a readout node.

use serde::{Deserialize, Serialize};

/// Maximum senders one readout node can own.
///
/// The sender list is a bounded vector; unused capacity is simply absent,
/// never a placeholder entry.
pub const MAX_SENDERS: usize = 8;

/// One downstream data destination: a host plus an optional stable
/// identifier assigned by configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    /// Destination host name.
    pub host: String,
    /// Configured sender identifier; `None` until assigned.
    pub id: Option<u32>,
}

impl Sender {
    /// New sender for `host` with no identifier assigned yet.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sender_has_no_id() {
        let sender = Sender::new("ropc01");
        assert_eq!(sender.host, "ropc01");
        assert_eq!(sender.id, None);
    }
}
