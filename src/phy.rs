//! Physical layer interactions.
//!
//! Don't expect to see much code here: the PHY *is* hardware. This module only pins down the
//! capability set the scheduler needs from a radio driver, and the result codes it hands back.

enum_with_unknown! {
    /// Result of a single transmission attempt, as reported by the radio driver.
    ///
    /// The numeric values match the classic Contiki-style driver codes, so implementations
    /// wrapping an existing C driver can use `TxOutcome::from(raw)` directly. Codes the layer
    /// doesn't know about survive as `Unknown` and are treated as generic errors.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub enum TxOutcome(u8) {
        /// The frame was transmitted (and acknowledged, where the driver checks for ACKs).
        Ok = 0,
        /// The driver failed in some unspecified way.
        Err = 1,
        /// The medium was busy or the transmission collided.
        Collision = 2,
        /// The frame was transmitted but no acknowledgement was received.
        NoAck = 3,
    }
}

/// Trait for half-duplex radio drivers.
///
/// The RDC layer powers the radio up and down around slot boundaries, asks it whether the channel
/// is clear during contention, and hands it fully framed bytes for transmission. Reception
/// happens outside this trait: the platform glue reads the frame out of the driver (`read`),
/// stages it in the layer's packet buffer and calls the driver facade's `packet_input`.
pub trait Radio {
    /// Powers the radio up so it can receive and transmit.
    fn on(&mut self);

    /// Powers the radio down. No frames are received or transmitted until `on` is called.
    fn off(&mut self);

    /// Performs a clear-channel assessment, returning `true` if the medium is currently idle.
    fn channel_clear(&mut self) -> bool;

    /// Returns whether the radio is currently receiving a frame.
    fn receiving_packet(&mut self) -> bool;

    /// Returns whether a received frame is waiting to be `read`.
    fn pending_packet(&mut self) -> bool;

    /// Copies `frame` into the driver's transmit buffer without starting a transmission.
    fn prepare(&mut self, frame: &[u8]);

    /// Transmits the first `len` bytes previously `prepare`d.
    fn transmit(&mut self, len: usize) -> TxOutcome;

    /// Prepares and transmits `frame` in one step.
    fn send(&mut self, frame: &[u8]) -> TxOutcome {
        self.prepare(frame);
        self.transmit(frame.len())
    }

    /// Copies a pending received frame into `buf`, returning its length (0 if nothing pending).
    fn read(&mut self, buf: &mut [u8]) -> usize;
}

/// Platform watchdog, kicked from inside the slot handler's bounded busy-waits.
pub trait Watchdog {
    /// Resets the watchdog counter.
    fn periodic(&mut self);
}

/// Platforms without a watchdog (and test code) can use `()`.
impl Watchdog for () {
    fn periodic(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_codes() {
        assert_eq!(TxOutcome::from(0u8), TxOutcome::Ok);
        assert_eq!(TxOutcome::from(2u8), TxOutcome::Collision);
        assert_eq!(TxOutcome::from(7u8), TxOutcome::Unknown(7));
        assert_eq!(u8::from(TxOutcome::NoAck), 3);
    }
}
