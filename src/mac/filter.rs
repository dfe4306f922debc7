//! Receiver address filtering.
//!
//! Radios without hardware address matching deliver every frame on the channel. This software
//! filter keeps only the frames a node has any business looking at: those addressed to it and
//! those addressed to everybody.

use crate::mac::NodeAddress;

/// Returns whether a frame with the given receiver address should be accepted by the node with
/// address `own`.
pub(crate) fn frame_accepted(own: &NodeAddress, receiver: &NodeAddress) -> bool {
    receiver.is_broadcast() || receiver == own
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_own_and_broadcast_only() {
        let own = NodeAddress::from_node_id(2);
        assert!(frame_accepted(&own, &own));
        assert!(frame_accepted(&own, &NodeAddress::BROADCAST));
        assert!(!frame_accepted(&own, &NodeAddress::from_node_id(3)));
        // same node id behind a different address is still someone else
        let mut other = *own.raw();
        other[0] = 0xff;
        assert!(!frame_accepted(&own, &NodeAddress::new(other)));
    }
}
