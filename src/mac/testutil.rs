//! Mock hardware shared by the driver test suites.

use crate::framer::SimpleFramer;
use crate::mac::{TxResult, UpperMac};
use crate::packet::PacketBuf;
use crate::phy::{Radio, TxOutcome};
use crate::time::{Instant, Timer};
use crate::{Config, Error};
use core::cell::Cell;
use std::rc::Rc;
use std::vec::Vec;

/// Mock rtimer at 1000 ticks per second. Every `now()` call advances time by one tick so the
/// handler's bounded busy-waits terminate without a real clock.
#[derive(Clone)]
pub(crate) struct MockTimer {
    ticks: Rc<Cell<u32>>,
}

impl MockTimer {
    pub fn new() -> Self {
        MockTimer {
            ticks: Rc::new(Cell::new(0)),
        }
    }
}

impl Timer for MockTimer {
    const TICKS_PER_SECOND: u32 = 1000;

    fn now(&self) -> Instant {
        let t = self.ticks.get();
        self.ticks.set(t.wrapping_add(1));
        Instant::from_raw_ticks(t)
    }
}

pub(crate) struct XorShift(u64);

impl rand_core::RngCore for XorShift {
    fn next_u32(&mut self) -> u32 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0 as u32
    }

    fn next_u64(&mut self) -> u64 {
        (u64::from(self.next_u32()) << 32) | u64::from(self.next_u32())
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        rand_core::impls::fill_bytes_via_next(self, dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl rand_core::SeedableRng for XorShift {
    type Seed = [u8; 8];

    fn from_seed(seed: [u8; 8]) -> Self {
        // xorshift state must not be zero
        XorShift(u64::from_le_bytes(seed) | 1)
    }
}

/// Radio mock with scriptable CCA and transmit results.
pub(crate) struct MockRadio {
    pub is_on: bool,
    pub cca_clear: bool,
    pub cca_calls: usize,
    pub outcome: TxOutcome,
    pending_tx: Vec<u8>,
    /// Everything transmitted, strobes included.
    pub transmitted: Vec<Vec<u8>>,
}

impl MockRadio {
    pub fn new() -> Self {
        MockRadio {
            is_on: false,
            cca_clear: true,
            cca_calls: 0,
            outcome: TxOutcome::Ok,
            pending_tx: Vec::new(),
            transmitted: Vec::new(),
        }
    }
}

impl Radio for MockRadio {
    fn on(&mut self) {
        self.is_on = true;
    }

    fn off(&mut self) {
        self.is_on = false;
    }

    fn channel_clear(&mut self) -> bool {
        self.cca_calls += 1;
        self.cca_clear
    }

    fn receiving_packet(&mut self) -> bool {
        false
    }

    fn pending_packet(&mut self) -> bool {
        false
    }

    fn prepare(&mut self, frame: &[u8]) {
        self.pending_tx = frame.to_vec();
    }

    fn transmit(&mut self, len: usize) -> TxOutcome {
        let frame = self.pending_tx[..len].to_vec();
        self.transmitted.push(frame);
        self.outcome
    }

    fn read(&mut self, _buf: &mut [u8]) -> usize {
        0
    }
}

#[derive(Default)]
pub(crate) struct RecordingUpper {
    pub sent: Vec<(u32, TxResult, u8)>,
    /// (sender id, seqno, payload) of every delivered frame.
    pub received: Vec<(u8, u8, Vec<u8>)>,
}

impl UpperMac for RecordingUpper {
    type Token = u32;

    fn sent(&mut self, token: u32, result: TxResult, transmissions: u8) {
        self.sent.push((token, result, transmissions));
    }

    fn input(&mut self, packet: &PacketBuf) {
        self.received.push((
            packet.sender().node_id(),
            packet.seqno(),
            packet.payload().to_vec(),
        ));
    }
}

pub(crate) struct TestConfig;

impl Config for TestConfig {
    type Timer = MockTimer;
    type Radio = MockRadio;
    type Framer = SimpleFramer;
    type Rng = XorShift;
    type Upper = RecordingUpper;
    type Watchdog = ();

    const TOTAL_SLOTS: u8 = 4;
}

/// Framer that rejects every frame, for exercising the fatal error paths.
pub(crate) struct RejectingFramer;

impl crate::framer::Framer for RejectingFramer {
    fn create(&mut self, _buf: &mut PacketBuf) -> Result<usize, Error> {
        Err(Error::Eof)
    }

    fn parse(&mut self, _buf: &mut PacketBuf) -> Result<usize, Error> {
        Err(Error::Eof)
    }
}

pub(crate) struct RejectingConfig;

impl Config for RejectingConfig {
    type Timer = MockTimer;
    type Radio = MockRadio;
    type Framer = RejectingFramer;
    type Rng = XorShift;
    type Upper = RecordingUpper;
    type Watchdog = ();

    const TOTAL_SLOTS: u8 = 4;
}
