//! A pass-through RDC driver.
//!
//! No schedule, no duty cycling: frames go on the air the moment the upper layer hands them
//! over, and the radio is left however the application put it. Useful for mains-powered nodes,
//! for bring-up of new radio drivers, and as the fallback when the scheduled driver misbehaves.

use crate::config::{Config, TokenOf};
use crate::framer::Framer;
use crate::mac::{NextUpdate, NodeAddress, RdcDriver, TxResult};
use crate::mac::UpperMac;
use crate::packet::{PacketBuf, QueueBuf};
use crate::phy::Radio;
use core::marker::PhantomData;

/// RDC driver that transmits immediately and never powers the radio down on its own.
pub struct NullRdc<C: Config> {
    addr: NodeAddress,
    packet_buf: PacketBuf,
    _config: PhantomData<C>,
}

impl<C: Config> NullRdc<C> {
    /// Creates the driver for the node with address `addr`.
    pub fn new(addr: NodeAddress) -> Self {
        Self {
            addr,
            packet_buf: PacketBuf::new(),
            _config: PhantomData,
        }
    }
}

impl<C: Config> RdcDriver for NullRdc<C> {
    type Config = C;

    fn init(&mut self) -> NextUpdate {
        NextUpdate::Disable
    }

    fn packet_buf(&mut self) -> &mut PacketBuf {
        &mut self.packet_buf
    }

    fn send_packet(
        &mut self,
        radio: &mut C::Radio,
        framer: &mut C::Framer,
        upper: &mut C::Upper,
        token: TokenOf<C>,
    ) {
        self.packet_buf.set_sender(self.addr);
        let result = match framer.create(&mut self.packet_buf) {
            Ok(_) => TxResult::from(radio.send(self.packet_buf.frame())),
            Err(e) => {
                warn!("send failed, too large header ({})", e);
                TxResult::ErrFatal
            }
        };
        upper.sent(token, result, 1);
    }

    fn send_list(
        &mut self,
        radio: &mut C::Radio,
        framer: &mut C::Framer,
        upper: &mut C::Upper,
        token: TokenOf<C>,
        list: &[QueueBuf],
    ) {
        if let Some(head) = list.first() {
            head.restore_into(&mut self.packet_buf);
            self.send_packet(radio, framer, upper, token);
        }
    }

    fn packet_input(&mut self, framer: &mut C::Framer, upper: &mut C::Upper) {
        if let Err(e) = framer.parse(&mut self.packet_buf) {
            warn!("failed to parse received frame ({})", e);
            return;
        }
        upper.input(&self.packet_buf);
    }

    fn on(&mut self, radio: &mut C::Radio) {
        radio.on();
    }

    fn off(&mut self, radio: &mut C::Radio, keep_on: bool) {
        if keep_on {
            radio.on();
        } else {
            radio.off();
        }
    }

    fn channel_check_interval(&self) -> u16 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framer::SimpleFramer;
    use crate::mac::testutil::*;
    use crate::phy::TxOutcome;

    fn node() -> (
        NullRdc<TestConfig>,
        MockRadio,
        SimpleFramer,
        RecordingUpper,
    ) {
        (
            NullRdc::new(NodeAddress::from_node_id(2)),
            MockRadio::new(),
            SimpleFramer,
            RecordingUpper::default(),
        )
    }

    #[test]
    fn sends_immediately() {
        let (mut rdc, mut radio, mut framer, mut upper) = node();
        rdc.packet_buf().set_payload(b"now").unwrap();
        rdc.packet_buf().set_receiver(NodeAddress::from_node_id(3));
        rdc.send_packet(&mut radio, &mut framer, &mut upper, 1);

        assert_eq!(upper.sent, vec![(1, TxResult::Ok, 1)]);
        assert_eq!(radio.transmitted.len(), 1);

        // sender address was stamped before framing
        let mut rx = PacketBuf::new();
        rx.set_payload(&radio.transmitted[0]).unwrap();
        SimpleFramer.parse(&mut rx).unwrap();
        assert_eq!(rx.sender(), NodeAddress::from_node_id(2));
        assert_eq!(rx.payload(), b"now");
    }

    #[test]
    fn maps_radio_outcomes() {
        let (mut rdc, mut radio, mut framer, mut upper) = node();
        radio.outcome = TxOutcome::NoAck;
        rdc.packet_buf().set_payload(b"x").unwrap();
        rdc.packet_buf().set_receiver(NodeAddress::from_node_id(3));
        rdc.send_packet(&mut radio, &mut framer, &mut upper, 1);
        assert_eq!(upper.sent, vec![(1, TxResult::NoAck, 1)]);
    }

    #[test]
    fn rejected_header_is_fatal() {
        let mut rdc: NullRdc<RejectingConfig> = NullRdc::new(NodeAddress::from_node_id(2));
        let mut radio = MockRadio::new();
        let mut framer = RejectingFramer;
        let mut upper = RecordingUpper::default();

        rdc.packet_buf().set_payload(b"x").unwrap();
        rdc.send_packet(&mut radio, &mut framer, &mut upper, 1);
        assert_eq!(upper.sent, vec![(1, TxResult::ErrFatal, 1)]);
        assert!(radio.transmitted.is_empty());
    }

    #[test]
    fn delivers_received_frames() {
        let (mut rdc, _radio, mut framer, mut upper) = node();

        let mut pb = PacketBuf::new();
        pb.set_payload(b"in").unwrap();
        pb.set_sender(NodeAddress::from_node_id(5));
        pb.set_receiver(NodeAddress::from_node_id(2));
        pb.set_seqno(9);
        SimpleFramer.create(&mut pb).unwrap();
        let raw = pb.frame().to_vec();

        rdc.packet_buf().set_payload(&raw).unwrap();
        rdc.packet_input(&mut framer, &mut upper);
        assert_eq!(upper.received, vec![(5, 9, b"in".to_vec())]);
    }

    #[test]
    fn advertises_no_wake_interval() {
        let (rdc, ..) = node();
        assert_eq!(rdc.channel_check_interval(), 0);
        assert!(matches!(
            NullRdc::<TestConfig>::new(NodeAddress::from_node_id(2)).init(),
            NextUpdate::Disable
        ));
    }
}
