//! Link-layer framing.
//!
//! The scheduler does not interpret frame bytes itself; a [`Framer`] implementation owns the
//! header format. [`SimpleFramer`] is a compact default good enough for homogeneous deployments;
//! gateways bridging into an existing 802.15.4 network will want to implement [`Framer`] against
//! their frame format instead.
//!
//! [`Framer`]: trait.Framer.html
//! [`SimpleFramer`]: struct.SimpleFramer.html

use crate::bytes::{ByteReader, ByteWriter, FromBytes, ToBytes};
use crate::mac::NodeAddress;
use crate::packet::PacketBuf;
use crate::Error;
use bitflags::bitflags;
use core::fmt;

/// Puts link-layer headers on outgoing frames and strips them from incoming ones.
///
/// Both operations work on the staging [`PacketBuf`] and return the header length, mirroring the
/// signed-length convention of classic netstack framers (an `Err` stands for a negative return).
///
/// [`PacketBuf`]: ../packet/struct.PacketBuf.html
pub trait Framer {
    /// Emits the header for the outbound frame staged in `buf`, using its address and attribute
    /// fields. Returns the header length.
    ///
    /// Fails with `Error::Eof` when the header does not fit the buffer's header reserve; the
    /// driver reports that as a fatal per-frame error.
    fn create(&mut self, buf: &mut PacketBuf) -> Result<usize, Error>;

    /// Parses the header of the raw inbound frame staged in `buf`, populating the buffer's
    /// address and attribute fields and consuming the header bytes so that only the payload
    /// remains. Returns the header length.
    fn parse(&mut self, buf: &mut PacketBuf) -> Result<usize, Error>;
}

bitflags! {
    /// Frame control field of [`SimpleFramer`]'s header.
    ///
    /// [`SimpleFramer`]: struct.SimpleFramer.html
    pub struct FrameControl: u16 {
        /// Frame carries upper-layer data. Currently the only defined frame kind.
        const DATA = 0b0000_0000_0000_0001;
        /// Sender requests a link-layer acknowledgement.
        const ACK_REQUEST = 0b0000_0000_0010_0000;
    }
}

/// Header emitted and parsed by [`SimpleFramer`].
///
/// Layout on the air (all multi-byte fields little endian):
///
/// ```notrust
/// +---------------+-----------+------------------+----------------+
/// | Frame Control | Sequence  |     Receiver     |     Sender     |
/// |  (2 octets)   | (1 octet) |    (8 octets)    |   (8 octets)   |
/// +---------------+-----------+------------------+----------------+
/// ```
///
/// The receiver field holds the null address for broadcast frames.
///
/// [`SimpleFramer`]: struct.SimpleFramer.html
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub control: FrameControl,
    pub seqno: u8,
    pub receiver: NodeAddress,
    pub sender: NodeAddress,
}

impl FrameHeader {
    /// Encoded size of the header in bytes.
    pub const SIZE: usize = 2 + 1 + NodeAddress::LEN * 2;
}

impl ToBytes for FrameHeader {
    fn to_bytes(&self, writer: &mut ByteWriter<'_>) -> Result<(), Error> {
        writer.write_u16_le(self.control.bits())?;
        writer.write_u8(self.seqno)?;
        writer.write_slice(self.receiver.raw())?;
        writer.write_slice(self.sender.raw())?;
        Ok(())
    }
}

impl<'a> FromBytes<'a> for FrameHeader {
    fn from_bytes(bytes: &mut ByteReader<'a>) -> Result<Self, Error> {
        let control = FrameControl::from_bits_truncate(bytes.read_u16_le()?);
        if !control.contains(FrameControl::DATA) {
            return Err(Error::InvalidValue);
        }
        Ok(FrameHeader {
            control,
            seqno: bytes.read_u8()?,
            receiver: NodeAddress::new(bytes.read_array()?),
            sender: NodeAddress::new(bytes.read_array()?),
        })
    }
}

impl fmt::Debug for FrameHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameHeader")
            .field("control", &self.control)
            .field("seqno", &self.seqno)
            .field("receiver", &self.receiver)
            .field("sender", &self.sender)
            .finish()
    }
}

/// The default [`Framer`]: a fixed 19-byte header carrying control field, sequence number and
/// both addresses.
///
/// [`Framer`]: trait.Framer.html
#[derive(Default)]
pub struct SimpleFramer;

impl Framer for SimpleFramer {
    fn create(&mut self, buf: &mut PacketBuf) -> Result<usize, Error> {
        let mut control = FrameControl::DATA;
        if buf.ack_requested() && !buf.receiver().is_broadcast() {
            control |= FrameControl::ACK_REQUEST;
        }
        let header = FrameHeader {
            control,
            seqno: buf.seqno(),
            receiver: buf.receiver(),
            sender: buf.sender(),
        };

        let space = buf.alloc_header(FrameHeader::SIZE)?;
        header.to_bytes(&mut ByteWriter::new(space))?;
        Ok(FrameHeader::SIZE)
    }

    fn parse(&mut self, buf: &mut PacketBuf) -> Result<usize, Error> {
        let header = FrameHeader::from_bytes(&mut ByteReader::new(buf.payload()))?;
        buf.consume_header(FrameHeader::SIZE)?;
        buf.set_receiver(header.receiver);
        buf.set_sender(header.sender);
        buf.set_seqno(header.seqno);
        buf.set_ack_requested(header.control.contains(FrameControl::ACK_REQUEST));
        Ok(FrameHeader::SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_and_parses() {
        let mut framer = SimpleFramer;
        let mut pb = PacketBuf::new();
        pb.set_payload(b"ping").unwrap();
        pb.set_receiver(NodeAddress::from_node_id(3));
        pb.set_sender(NodeAddress::from_node_id(2));
        pb.set_seqno(77);
        pb.set_ack_requested(true);
        assert_eq!(framer.create(&mut pb).unwrap(), FrameHeader::SIZE);
        assert_eq!(pb.total_len(), FrameHeader::SIZE + 4);

        // stage the transmitted bytes as a received frame
        let mut raw = [0; crate::packet::PACKET_BUF_SIZE];
        let len = pb.frame().len();
        raw[..len].copy_from_slice(pb.frame());

        let mut rx = PacketBuf::new();
        rx.set_payload(&raw[..len]).unwrap();
        assert_eq!(framer.parse(&mut rx).unwrap(), FrameHeader::SIZE);
        assert_eq!(rx.payload(), b"ping");
        assert_eq!(rx.receiver(), NodeAddress::from_node_id(3));
        assert_eq!(rx.sender(), NodeAddress::from_node_id(2));
        assert_eq!(rx.seqno(), 77);
        assert!(rx.ack_requested());
    }

    #[test]
    fn broadcast_never_requests_ack() {
        let mut framer = SimpleFramer;
        let mut pb = PacketBuf::new();
        pb.set_payload(b"hi").unwrap();
        pb.set_receiver(NodeAddress::BROADCAST);
        pb.set_ack_requested(true);
        framer.create(&mut pb).unwrap();

        let raw: std::vec::Vec<u8> = pb.frame().to_vec();
        let mut rx = PacketBuf::new();
        rx.set_payload(&raw).unwrap();
        framer.parse(&mut rx).unwrap();
        assert!(!rx.ack_requested());
        assert!(rx.receiver().is_broadcast());
    }

    #[test]
    fn truncated_frame_rejected() {
        let mut framer = SimpleFramer;
        let mut rx = PacketBuf::new();
        rx.set_payload(&[0x01, 0x00, 0x05]).unwrap();
        assert_eq!(framer.parse(&mut rx), Err(Error::Eof));
    }

    #[test]
    fn unknown_frame_kind_rejected() {
        let mut framer = SimpleFramer;
        let mut rx = PacketBuf::new();
        // control field without the DATA bit
        rx.set_payload(&[0x20, 0x00, 1, 0, 0, 0, 0, 0, 0, 0, 3, 0, 0, 0, 0, 0, 0, 0, 2])
            .unwrap();
        assert_eq!(framer.parse(&mut rx), Err(Error::InvalidValue));
    }
}
