//! Duplicate suppression for received unicasts.
//!
//! Senders retry frames they believe lost, so a receiver can see the same frame twice. A short
//! window of `(sender, sequence number)` pairs, ordered most-recent first, catches those repeats
//! before they reach the upper layer.

use crate::mac::NodeAddress;

/// Static bound on the window; `Config::MAX_SEQNOS` must not exceed this.
pub(crate) const WINDOW_CAP: usize = 16;

#[derive(Copy, Clone)]
struct SeenSender {
    addr: NodeAddress,
    seqno: u8,
}

/// Most-recently-used window of observed `(sender, sequence number)` pairs.
pub(crate) struct SeqnoHistory {
    entries: [SeenSender; WINDOW_CAP],
    len: usize,
    window: usize,
}

impl SeqnoHistory {
    /// Creates an empty history holding up to `window` entries.
    pub fn new(window: usize) -> Self {
        debug_assert!(window <= WINDOW_CAP);
        SeqnoHistory {
            entries: [SeenSender {
                addr: NodeAddress::BROADCAST,
                seqno: 0,
            }; WINDOW_CAP],
            len: 0,
            window: window.min(WINDOW_CAP),
        }
    }

    /// Checks an observation against the window and records it.
    ///
    /// Returns `true` if `(sender, seqno)` was already present, leaving the window untouched.
    /// Otherwise the observation becomes the most recent entry, older entries shift down one
    /// position, and the oldest falls out once the window is full.
    pub fn register(&mut self, sender: NodeAddress, seqno: u8) -> bool {
        if self.entries[..self.len]
            .iter()
            .any(|e| e.addr == sender && e.seqno == seqno)
        {
            return true;
        }

        self.len = (self.len + 1).min(self.window);
        for i in (1..self.len).rev() {
            self.entries[i] = self.entries[i - 1];
        }
        self.entries[0] = SeenSender {
            addr: sender,
            seqno,
        };
        false
    }

    /// Forgets all recorded observations.
    pub fn clear(&mut self) {
        self.len = 0;
    }
}
