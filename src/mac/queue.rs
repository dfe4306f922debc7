//! Per-slot send queues.
//!
//! Outgoing frames wait here until the slot owned by their destination comes around. Each slot
//! has its own bounded FIFO; a full queue rejects the frame at enqueue time, which the driver
//! reports to the caller as a transmission error. No heap is involved, so enqueueing is safe
//! from any execution context as long as access to the table itself is serialized.

use crate::packet::QueueBuf;
use heapless::Deque;

/// Static upper bound on the slot table. `Config::TOTAL_SLOTS` must not exceed this.
pub const MAX_SLOTS: usize = 16;

/// Capacity of each slot's FIFO.
pub const FRAMES_PER_SLOT: usize = 4;

/// A frame parked in a send queue: the owned buffer plus the caller's token, returned through
/// the sent notification once the frame has been dealt with.
pub struct QueuedFrame<T: Copy> {
    pub buf: QueueBuf,
    pub token: T,
}

/// The slot table: one bounded FIFO of pending frames per slot.
pub struct SendQueues<T: Copy> {
    slots: [Deque<QueuedFrame<T>, FRAMES_PER_SLOT>; MAX_SLOTS],
}

impl<T: Copy> SendQueues<T> {
    const EMPTY: Deque<QueuedFrame<T>, FRAMES_PER_SLOT> = Deque::new();

    /// Creates a table of empty queues.
    pub fn new() -> Self {
        SendQueues {
            slots: [Self::EMPTY; MAX_SLOTS],
        }
    }

    /// Appends `frame` to the FIFO for `slot`.
    ///
    /// Fails and hands the frame back when the queue is full.
    pub fn enqueue(&mut self, slot: u8, frame: QueuedFrame<T>) -> Result<(), QueuedFrame<T>> {
        self.slots[usize::from(slot)].push_back(frame)
    }

    /// Pops the oldest pending frame for `slot`.
    pub fn dequeue(&mut self, slot: u8) -> Option<QueuedFrame<T>> {
        self.slots[usize::from(slot)].pop_front()
    }

    /// Returns whether `slot` has any pending frames.
    pub fn is_empty(&self, slot: u8) -> bool {
        self.slots[usize::from(slot)].is_empty()
    }

    /// Returns the number of frames pending for `slot`.
    pub fn len(&self, slot: u8) -> usize {
        self.slots[usize::from(slot)].len()
    }

    /// Discards all pending frames in every slot.
    pub fn clear(&mut self) {
        for q in self.slots.iter_mut() {
            while q.pop_front().is_some() {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mac::NodeAddress;
    use crate::packet::PacketBuf;

    fn frame(payload: &[u8], token: u8) -> QueuedFrame<u8> {
        let mut pb = PacketBuf::new();
        pb.set_payload(payload).unwrap();
        pb.set_receiver(NodeAddress::from_node_id(5));
        QueuedFrame {
            buf: QueueBuf::from_packet_buf(&pb),
            token,
        }
    }

    #[test]
    fn fifo_order_per_slot() {
        let mut queues = SendQueues::new();
        queues.enqueue(5, frame(b"a", 1)).ok().unwrap();
        queues.enqueue(5, frame(b"b", 2)).ok().unwrap();
        queues.enqueue(5, frame(b"c", 3)).ok().unwrap();
        queues.enqueue(0, frame(b"bc", 9)).ok().unwrap();

        assert_eq!(queues.len(5), 3);
        assert_eq!(queues.dequeue(5).unwrap().token, 1);
        assert_eq!(queues.dequeue(5).unwrap().token, 2);
        assert_eq!(queues.dequeue(5).unwrap().token, 3);
        assert!(queues.dequeue(5).is_none());

        // other slots are unaffected
        assert_eq!(queues.dequeue(0).unwrap().token, 9);
    }

    #[test]
    fn full_queue_rejects() {
        let mut queues = SendQueues::new();
        for i in 0..FRAMES_PER_SLOT as u8 {
            queues.enqueue(3, frame(b"x", i)).ok().unwrap();
        }
        let rejected = queues.enqueue(3, frame(b"y", 100)).err().unwrap();
        assert_eq!(rejected.token, 100);
        assert_eq!(queues.len(3), FRAMES_PER_SLOT);
    }

    #[test]
    fn clear_empties_all_slots() {
        let mut queues = SendQueues::new();
        queues.enqueue(1, frame(b"a", 1)).ok().unwrap();
        queues.enqueue(2, frame(b"b", 2)).ok().unwrap();
        queues.clear();
        assert!(queues.is_empty(1));
        assert!(queues.is_empty(2));
    }
}
