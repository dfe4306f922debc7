//! Frame staging buffers.
//!
//! [`PacketBuf`] is the single in-place staging area every driver operation works on, the moral
//! equivalent of Contiki's `packetbuf`: the upper layer stages a payload and addressing
//! attributes in it before asking the driver to send, the framer grows a header in front of the
//! payload, and the PHY glue stages raw received frames in it before calling `packet_input`.
//!
//! [`QueueBuf`] is an owned snapshot of the staging area (payload plus attributes) that a frame
//! scheduled for a later slot lives in while it waits. It is a plain value backed by a fixed
//! capacity vector, so queuing a frame never touches a heap.
//!
//! [`PacketBuf`]: struct.PacketBuf.html
//! [`QueueBuf`]: struct.QueueBuf.html

use crate::mac::NodeAddress;
use crate::Error;
use core::fmt;
use heapless::Vec;

/// Maximum payload bytes a frame can carry. Raw inbound frames (header still attached) are
/// staged in the same region, so this also bounds the largest receivable frame.
pub const MAX_PAYLOAD_BUF: usize = 96;

/// Space reserved in front of the payload for link-layer headers.
pub const HEADER_RESERVE: usize = 32;

/// Total size of the staging buffer.
pub const PACKET_BUF_SIZE: usize = HEADER_RESERVE + MAX_PAYLOAD_BUF;

/// In-place staging area for the frame currently being assembled, transmitted or parsed.
///
/// The buffer is split into a header region that grows backwards from `HEADER_RESERVE` and a
/// payload region behind it. Outbound, the payload is written first and the framer then allocates
/// header space in front of it. Inbound, the raw frame is staged as payload and the framer
/// consumes the header off its front.
pub struct PacketBuf {
    buf: [u8; PACKET_BUF_SIZE],
    /// Offset of the first payload byte. `HEADER_RESERVE` for outbound frames; moves forward as
    /// headers are consumed from inbound frames.
    data_start: usize,
    data_len: usize,
    hdr_len: usize,
    sender: NodeAddress,
    receiver: NodeAddress,
    seqno: u8,
    ack_requested: bool,
}

impl PacketBuf {
    /// Creates an empty staging buffer with all attributes cleared.
    pub fn new() -> Self {
        PacketBuf {
            buf: [0; PACKET_BUF_SIZE],
            data_start: HEADER_RESERVE,
            data_len: 0,
            hdr_len: 0,
            sender: NodeAddress::BROADCAST,
            receiver: NodeAddress::BROADCAST,
            seqno: 0,
            ack_requested: false,
        }
    }

    /// Clears payload, header and all attributes.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Stages `data` as the payload, clearing any previously allocated header.
    ///
    /// This is used both by upper layers staging an outbound payload and by the PHY glue staging
    /// a raw received frame (whose header the framer will consume afterwards).
    ///
    /// Returns `Error::Eof` if `data` exceeds [`MAX_PAYLOAD_BUF`].
    ///
    /// [`MAX_PAYLOAD_BUF`]: constant.MAX_PAYLOAD_BUF.html
    pub fn set_payload(&mut self, data: &[u8]) -> Result<(), Error> {
        if data.len() > MAX_PAYLOAD_BUF {
            return Err(Error::Eof);
        }
        self.data_start = HEADER_RESERVE;
        self.hdr_len = 0;
        self.data_len = data.len();
        self.buf[HEADER_RESERVE..HEADER_RESERVE + data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Returns the payload region.
    pub fn payload(&self) -> &[u8] {
        &self.buf[self.data_start..self.data_start + self.data_len]
    }

    /// Allocates `len` additional header bytes in front of the current header and returns the
    /// newly allocated region, to be filled by the framer.
    ///
    /// Returns `Error::Eof` when the header would not fit into the reserved space. That is the
    /// "header too large" condition the driver reports as a fatal transmission error.
    pub fn alloc_header(&mut self, len: usize) -> Result<&mut [u8], Error> {
        if self.hdr_len + len > self.data_start {
            return Err(Error::Eof);
        }
        self.hdr_len += len;
        let start = self.data_start - self.hdr_len;
        Ok(&mut self.buf[start..start + len])
    }

    /// Returns the header region.
    pub fn header(&self) -> &[u8] {
        &self.buf[self.data_start - self.hdr_len..self.data_start]
    }

    /// Consumes `len` bytes of header from the front of the payload region.
    ///
    /// Used by the framer when parsing a received frame: the raw frame is staged as payload, and
    /// after its header fields have been read this moves the payload past them.
    pub fn consume_header(&mut self, len: usize) -> Result<(), Error> {
        if len > self.data_len {
            return Err(Error::InvalidLength);
        }
        self.data_start += len;
        self.data_len -= len;
        Ok(())
    }

    /// Returns the full frame: header followed by payload.
    pub fn frame(&self) -> &[u8] {
        &self.buf[self.data_start - self.hdr_len..self.data_start + self.data_len]
    }

    /// Returns the combined length of header and payload.
    pub fn total_len(&self) -> usize {
        self.hdr_len + self.data_len
    }

    /// Returns the length of the allocated header.
    pub fn header_len(&self) -> usize {
        self.hdr_len
    }

    /// Returns the sender address attribute.
    pub fn sender(&self) -> NodeAddress {
        self.sender
    }

    /// Sets the sender address attribute.
    pub fn set_sender(&mut self, sender: NodeAddress) {
        self.sender = sender;
    }

    /// Returns the receiver address attribute.
    pub fn receiver(&self) -> NodeAddress {
        self.receiver
    }

    /// Sets the receiver address attribute. The null address selects broadcast.
    pub fn set_receiver(&mut self, receiver: NodeAddress) {
        self.receiver = receiver;
    }

    /// Returns the sequence number (packet id) attribute.
    pub fn seqno(&self) -> u8 {
        self.seqno
    }

    /// Sets the sequence number (packet id) attribute.
    pub fn set_seqno(&mut self, seqno: u8) {
        self.seqno = seqno;
    }

    /// Returns whether the frame asks for a link-layer acknowledgement.
    pub fn ack_requested(&self) -> bool {
        self.ack_requested
    }

    /// Sets the acknowledgement request attribute.
    pub fn set_ack_requested(&mut self, ack: bool) {
        self.ack_requested = ack;
    }
}

impl Default for PacketBuf {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PacketBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PacketBuf")
            .field("sender", &self.sender)
            .field("receiver", &self.receiver)
            .field("seqno", &self.seqno)
            .field("hdr_len", &self.hdr_len)
            .field("data_len", &self.data_len)
            .finish()
    }
}

/// An owned copy of a staged frame, parked in a send queue until its slot comes around.
///
/// Holds the payload and the addressing attributes, but no header: headers are re-created by the
/// framer just before transmission, since fields like the sequence number may need to be fresh.
#[derive(Clone, Debug)]
pub struct QueueBuf {
    payload: Vec<u8, MAX_PAYLOAD_BUF>,
    sender: NodeAddress,
    receiver: NodeAddress,
    seqno: u8,
    ack_requested: bool,
}

impl QueueBuf {
    /// Snapshots the payload and attributes currently staged in `pb`.
    pub fn from_packet_buf(pb: &PacketBuf) -> Self {
        QueueBuf {
            // payload capacities match, this can't fail
            payload: Vec::from_slice(pb.payload()).unwrap(),
            sender: pb.sender(),
            receiver: pb.receiver(),
            seqno: pb.seqno(),
            ack_requested: pb.ack_requested(),
        }
    }

    /// Restores the snapshot into the staging area, replacing its contents.
    pub fn restore_into(&self, pb: &mut PacketBuf) {
        // payload came out of a PacketBuf, so it fits back in
        pb.set_payload(&self.payload).unwrap();
        pb.set_sender(self.sender);
        pb.set_receiver(self.receiver);
        pb.set_seqno(self.seqno);
        pb.set_ack_requested(self.ack_requested);
    }

    /// Returns the receiver address the frame is headed for.
    pub fn receiver(&self) -> NodeAddress {
        self.receiver
    }
}
