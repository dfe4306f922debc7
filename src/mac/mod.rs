//! The slot-scheduled MAC engine.
//!
//! # Schedule
//!
//! Time is cut into `TOTAL_SLOTS` equal slots repeating forever. Slot 0 carries broadcast
//! traffic; every other slot belongs to the node whose id matches the slot index, and only
//! frames addressed to that node may be transmitted in it:
//!
//! ```notrust
//! |<------------------------ one period ------------------------>|
//! +-----------+-----------+-----------+--         --+------------+
//! | broadcast |  node 1   |  node 2   |    . . .    | node N-1   |
//! |  slot 0   |  slot 1   |  slot 2   |             | slot N-1   |
//! +-----------+-----------+-----------+--         --+------------+
//! ```
//!
//! A node keeps its radio powered only for slot 0, its own slot, and slots it has queued
//! frames for. Everything else is radio silence, which is where the energy savings come from.
//!
//! # Contention
//!
//! Several nodes may hold frames for the same destination. Each send slot therefore starts
//! with a contention window: after a short quiet prefix, `CONTENTION_SLOTS` sub-slots follow,
//! and every contender draws one at random. When its sub-slot arrives, a contender performs a
//! CCA; if the channel is clear it transmits a filler strobe stretching to the end of the
//! window, so every later contender finds the channel busy and backs off. The winner then
//! sends the actual frame:
//!
//! ```notrust
//! |<--------------------- one slot ---------------------->|
//! +---------+------+------+------+------+-----------------+
//! | prepare | sub0 | sub1 | sub2 | sub3 |  frame exchange |
//! +---------+------+------+------+------+-----------------+
//!                     ^
//!                     winner draws sub1: CCA, then strobe
//!                     through sub2 and sub3
//! ```
//!
//! The slot handler runs from the platform's timer interrupt and finishes within the slot;
//! the waits above are short bounded busy-waits on the tick counter.

mod address;
mod contention;
#[cfg(feature = "address-filter")]
mod filter;
mod nullrdc;
mod queue;
#[cfg(feature = "duplicate-filter")]
mod sequence;
#[cfg(test)]
mod testutil;

pub use self::address::NodeAddress;
pub use self::nullrdc::NullRdc;
pub use self::queue::{FRAMES_PER_SLOT, MAX_SLOTS};

use self::queue::{QueuedFrame, SendQueues};
#[cfg(feature = "duplicate-filter")]
use self::sequence::SeqnoHistory;
use crate::config::{Config, FramerOf, RadioOf, TokenOf, UpperOf};
use crate::framer::Framer;
use crate::packet::{PacketBuf, QueueBuf};
use crate::phy::{Radio, TxOutcome, Watchdog};
use crate::time::{Duration, Instant, Timer};
use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Length of a hardware acknowledgement frame, used by the `hw-autoack` feature to recognize
/// ACKs that the radio did not filter out itself.
pub const ACK_FRAME_LEN: usize = 3;

/// MAC-level outcome of a transmission attempt, delivered through [`UpperMac::sent`].
///
/// [`UpperMac::sent`]: trait.UpperMac.html#tymethod.sent
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TxResult {
    /// The frame was transmitted (and acknowledged where applicable).
    Ok,

    /// The frame lost the contention for its slot, or the transmission collided.
    ///
    /// Worth retrying from a higher layer; this layer does not retry.
    Collision,

    /// The frame was transmitted but never acknowledged.
    NoAck,

    /// The frame was dropped: the radio failed in an unclassifiable way, or no queue space was
    /// left for it.
    Err,

    /// The frame was dropped because the framer rejected it (header too large).
    ErrFatal,
}

impl From<TxOutcome> for TxResult {
    fn from(outcome: TxOutcome) -> Self {
        match outcome {
            TxOutcome::Ok => TxResult::Ok,
            TxOutcome::Collision => TxResult::Collision,
            TxOutcome::NoAck => TxResult::NoAck,
            TxOutcome::Err | TxOutcome::Unknown(_) => TxResult::Err,
        }
    }
}

/// Interface to the MAC layer above the RDC driver.
///
/// Implemented by the application or network stack sitting on top of this layer.
pub trait UpperMac {
    /// Caller-chosen value attached to every outgoing frame and handed back in [`sent`], so the
    /// upper layer can tell its frames apart.
    ///
    /// [`sent`]: #tymethod.sent
    type Token: Copy;

    /// Called exactly once for every frame accepted by `send_packet`, after its fate is known.
    ///
    /// `transmissions` is the number of transmission attempts made for the frame. This layer
    /// never retries, so it is always 1.
    fn sent(&mut self, token: Self::Token, result: TxResult, transmissions: u8);

    /// Called for every received frame that survived parsing and filtering. The frame's payload
    /// and addressing attributes are staged in `packet`.
    fn input(&mut self, packet: &PacketBuf);
}

/// Tells the platform glue when to call [`Crankshaft::slot_update`] next.
///
/// [`Crankshaft::slot_update`]: struct.Crankshaft.html#method.slot_update
#[must_use]
#[derive(Debug, Copy, Clone)]
pub enum NextUpdate {
    /// Disable the timer; the layer is not running.
    Disable,

    /// Call `slot_update` at the given `Instant`.
    ///
    /// The instants form an exact arithmetic progression; the platform timer should be armed
    /// with the value as-is, not relative to "now", so that handler latency does not accumulate
    /// into slot drift. A set failure (the instant already passed) means the schedule has
    /// slipped and should be reported.
    At(Instant),
}

/// The RDC driver contract: the fixed operation set by which the network stack drives this
/// layer.
///
/// Every operation receives the collaborating netstack components it may need (radio, framer,
/// upper MAC); a driver uses the subset it cares about. Frame data moves through the staging
/// buffer returned by [`packet_buf`]: the upper layer fills payload and addressing attributes
/// before calling [`send_packet`], and the PHY glue stages raw received frames there before
/// calling [`packet_input`].
///
/// [`packet_buf`]: #tymethod.packet_buf
/// [`send_packet`]: #tymethod.send_packet
/// [`packet_input`]: #tymethod.packet_input
pub trait RdcDriver {
    /// The configuration this driver runs against.
    type Config: Config;

    /// Resets driver state and starts the layer. Returns the first timer deadline to arm (or
    /// `Disable` for drivers without a clock).
    fn init(&mut self) -> NextUpdate;

    /// The staging area shared by all operations.
    fn packet_buf(&mut self) -> &mut PacketBuf;

    /// Hands the staged frame to the driver for (possibly deferred) transmission.
    ///
    /// `token` is returned through [`UpperMac::sent`] together with the outcome.
    ///
    /// [`UpperMac::sent`]: trait.UpperMac.html#tymethod.sent
    fn send_packet(
        &mut self,
        radio: &mut RadioOf<Self::Config>,
        framer: &mut FramerOf<Self::Config>,
        upper: &mut UpperOf<Self::Config>,
        token: TokenOf<Self::Config>,
    );

    /// Projects the head buffer of `list` into the staging area, then behaves like
    /// [`send_packet`].
    ///
    /// [`send_packet`]: #tymethod.send_packet
    fn send_list(
        &mut self,
        radio: &mut RadioOf<Self::Config>,
        framer: &mut FramerOf<Self::Config>,
        upper: &mut UpperOf<Self::Config>,
        token: TokenOf<Self::Config>,
        list: &[QueueBuf],
    );

    /// Processes the raw received frame staged in the packet buffer, delivering it upward if it
    /// passes parsing and filtering.
    fn packet_input(
        &mut self,
        framer: &mut FramerOf<Self::Config>,
        upper: &mut UpperOf<Self::Config>,
    );

    /// Forces the radio on.
    fn on(&mut self, radio: &mut RadioOf<Self::Config>);

    /// Powers the radio down, unless `keep_on` forces it to stay up.
    fn off(&mut self, radio: &mut RadioOf<Self::Config>, keep_on: bool);

    /// The driver's periodic wake interval in system clock ticks, or 0 if it does not advertise
    /// one.
    fn channel_check_interval(&self) -> u16;
}

/// The Crankshaft-style scheduling RDC driver.
///
/// See the [module documentation] for the protocol. The struct owns all scheduler state; the
/// hardware collaborators are passed into each operation.
///
/// [module documentation]: index.html
pub struct Crankshaft<C: Config> {
    addr: NodeAddress,
    node_id: u8,
    timer: C::Timer,
    packet_buf: PacketBuf,
    queues: SendQueues<TokenOf<C>>,
    #[cfg(feature = "duplicate-filter")]
    seen: SeqnoHistory,

    /// Slot the schedule is currently in. Written only by the slot handler; read from any
    /// context.
    current_slot: AtomicU8,
    /// Whether this layer believes the radio is powered. Same access pattern as `current_slot`.
    radio_is_on: AtomicBool,
    /// Scheduled tick of the most recent slot boundary. All in-slot deadlines are offsets from
    /// this.
    last: Instant,
    running: bool,
}

impl<C: Config> Crankshaft<C> {
    /// Creates the driver for the node with address `addr`.
    ///
    /// The node id (last address byte) must lie in `[1, TOTAL_SLOTS)` and the configured
    /// geometry must fit the static bounds; both are checked with debug assertions.
    pub fn new(addr: NodeAddress, timer: C::Timer) -> Self {
        let node_id = addr.node_id();
        debug_assert!(C::TOTAL_SLOTS >= 2);
        debug_assert!(usize::from(C::TOTAL_SLOTS) <= MAX_SLOTS);
        debug_assert!(node_id != C::BROADCAST_SLOT && node_id < C::TOTAL_SLOTS);
        debug_assert!(C::MAX_STROBE_SIZE <= contention::STROBE_BUF_SIZE);
        #[cfg(feature = "duplicate-filter")]
        debug_assert!(C::MAX_SEQNOS <= sequence::WINDOW_CAP);

        trace!("new Crankshaft driver, addr={:?}", addr);
        Self {
            addr,
            node_id,
            timer,
            packet_buf: PacketBuf::new(),
            queues: SendQueues::new(),
            #[cfg(feature = "duplicate-filter")]
            seen: SeqnoHistory::new(C::MAX_SEQNOS),
            current_slot: AtomicU8::new(C::TOTAL_SLOTS + 1),
            radio_is_on: AtomicBool::new(false),
            last: Instant::from_raw_ticks(0),
            running: false,
        }
    }

    /// Length of one slot in timer ticks.
    fn regular_slot() -> Duration {
        let ticks_per_ms = C::Timer::TICKS_PER_SECOND / 1000;
        Duration::from_ticks(ticks_per_ms * (C::PERIOD_MS / u32::from(C::TOTAL_SLOTS)))
    }

    /// Length of the contention window (quiet prefix plus all sub-slots) in timer ticks.
    fn contention_window() -> Duration {
        Duration::from_ticks(
            C::CONTENTION_PREPARE + C::CONTENTION_TICKS * u32::from(C::CONTENTION_SLOTS),
        )
    }

    /// Boot-time phase bias, breaking the deterministic tie between nodes powered on by the
    /// same event. Low-id nodes get the larger of two tiers.
    fn phase_bias(&self) -> Duration {
        let slot = Self::regular_slot().as_ticks();
        Duration::from_ticks(if self.node_id < C::TOTAL_SLOTS / 2 {
            slot / 8
        } else {
            slot / 16
        })
    }

    /// Returns a reference to the timer instance used by the layer.
    pub fn timer(&mut self) -> &mut C::Timer {
        &mut self.timer
    }

    /// Returns the slot the schedule is currently in.
    ///
    /// Readable from any context; the slot handler may update it between two loads.
    pub fn current_slot(&self) -> u8 {
        self.current_slot.load(Ordering::Relaxed)
    }

    /// Returns whether the layer believes the radio is powered.
    pub fn radio_is_on(&self) -> bool {
        self.radio_is_on.load(Ordering::Relaxed)
    }

    /// Returns whether `init` has been called.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advances the schedule by one slot and applies the radio power policy. Call this when the
    /// timer armed from the previously returned [`NextUpdate`] fires; the handler performs this
    /// slot's contention and transmissions before returning the next deadline.
    ///
    /// [`NextUpdate`]: enum.NextUpdate.html
    pub fn slot_update(
        &mut self,
        radio: &mut C::Radio,
        framer: &mut C::Framer,
        upper: &mut C::Upper,
        watchdog: &mut C::Watchdog,
    ) -> NextUpdate {
        if !self.running {
            return NextUpdate::Disable;
        }

        self.last += Self::regular_slot();

        let mut slot = self.current_slot.load(Ordering::Relaxed);
        if slot == C::TOTAL_SLOTS + 1 {
            slot = C::BROADCAST_SLOT;
        } else {
            slot += 1;
        }
        if slot > C::TOTAL_SLOTS - 1 {
            slot = C::BROADCAST_SLOT;
        }
        self.current_slot.store(slot, Ordering::Relaxed);

        if !self.queues.is_empty(slot) {
            self.contend_and_send(slot, radio, framer, upper, watchdog);
        } else if slot == C::BROADCAST_SLOT || slot == self.node_id {
            // Senders with traffic for this slot are still resolving contention; nothing can be
            // heard before the window ends.
            self.busy_wait(watchdog, self.last + Self::contention_window());
            if !self.radio_is_on() {
                self.radio_on(radio);
            }
        } else {
            if self.radio_is_on() {
                self.radio_off(radio, C::TURN_OFF);
            }
        }

        let next = self.last + Self::regular_slot();
        if self.timer.now().is_at_or_after(next) {
            error!("slot clock overrun: boundary {} already passed", next);
        }
        NextUpdate::At(next)
    }

    /// Contends for the current slot and, on winning, transmits the head frame queued for it.
    ///
    /// The head frame is dequeued and resolved exactly once on every path through this
    /// function.
    fn contend_and_send(
        &mut self,
        slot: u8,
        radio: &mut C::Radio,
        framer: &mut C::Framer,
        upper: &mut C::Upper,
        watchdog: &mut C::Watchdog,
    ) {
        let QueuedFrame { buf, token } = match self.queues.dequeue(slot) {
            Some(frame) => frame,
            None => return,
        };

        buf.restore_into(&mut self.packet_buf);
        self.packet_buf.set_sender(self.addr);
        let header_len = match framer.create(&mut self.packet_buf) {
            Ok(len) => len,
            Err(e) => {
                warn!("send failed, too large header ({})", e);
                upper.sent(token, TxResult::ErrFatal, 1);
                return;
            }
        };

        let r = contention::draw_subslot::<C::Rng>(self.timer.now(), self.node_id, C::CONTENTION_SLOTS);
        let strobe_len = contention::strobe_len(
            header_len,
            r,
            C::CCA_CONTENTION_SIZE,
            C::CONTENTION_SIZE,
            C::CONTENTION_SLOTS,
            C::MAX_STROBE_SIZE,
        );
        let mut strobe_buf = [0; contention::STROBE_BUF_SIZE];
        let strobe = contention::fill_strobe(&mut strobe_buf[..strobe_len], self.packet_buf.header());

        // Quiet prefix, then sit out the sub-slots before the drawn one.
        let mut deadline = self.last + Duration::from_ticks(C::CONTENTION_PREPARE);
        self.busy_wait(watchdog, deadline);
        for _ in 0..r {
            deadline += Duration::from_ticks(C::CONTENTION_TICKS);
            self.busy_wait(watchdog, deadline);
        }

        if !self.radio_is_on() {
            self.radio_on(radio);
        }

        if !radio.channel_clear() {
            debug!("slot {}: contention lost, channel busy in sub-slot {}", slot, r);
            upper.sent(token, TxResult::Collision, 1);
            return;
        }

        // An empty strobe means the header already covers the rest of the window; the CCA alone
        // decided the slot then.
        if !strobe.is_empty() && radio.send(strobe) != TxOutcome::Ok {
            debug!("slot {}: strobe transmission failed", slot);
            upper.sent(token, TxResult::Collision, 1);
            return;
        }

        // Contention won. Restore the payload (the strobe shares the staging buffer) and
        // re-frame, since header fields may need fresh values.
        buf.restore_into(&mut self.packet_buf);
        self.packet_buf.set_sender(self.addr);
        let result = match framer.create(&mut self.packet_buf) {
            Ok(_) => TxResult::from(radio.send(self.packet_buf.frame())),
            Err(e) => {
                warn!("send failed, too large header ({})", e);
                TxResult::ErrFatal
            }
        };
        trace!("slot {}: frame resolved as {:?}", slot, result);
        upper.sent(token, result, 1);
    }

    /// Spins on the tick counter until `deadline`, keeping the watchdog fed.
    fn busy_wait(&self, watchdog: &mut C::Watchdog, deadline: Instant) {
        while !self.timer.now().is_at_or_after(deadline) {
            watchdog.periodic();
        }
    }

    fn radio_on(&self, radio: &mut C::Radio) {
        radio.on();
        self.radio_is_on.store(true, Ordering::Relaxed);
    }

    fn radio_off(&self, radio: &mut C::Radio, keep_on: bool) {
        if keep_on {
            self.radio_on(radio);
        } else {
            radio.off();
            self.radio_is_on.store(false, Ordering::Relaxed);
        }
    }
}

impl<C: Config> RdcDriver for Crankshaft<C> {
    type Config = C;

    fn init(&mut self) -> NextUpdate {
        self.queues.clear();
        #[cfg(feature = "duplicate-filter")]
        self.seen.clear();
        // Sentinel start value; the first slot_update wraps it to the broadcast slot.
        self.current_slot
            .store(C::TOTAL_SLOTS + 1, Ordering::Relaxed);
        self.last = self.timer.now() + self.phase_bias();
        self.running = true;
        info!(
            "crankshaft up: node {}, {} slots of {}",
            self.node_id,
            C::TOTAL_SLOTS,
            Self::regular_slot()
        );
        NextUpdate::At(self.last + Self::regular_slot())
    }

    fn packet_buf(&mut self) -> &mut PacketBuf {
        &mut self.packet_buf
    }

    fn send_packet(
        &mut self,
        _radio: &mut C::Radio,
        _framer: &mut C::Framer,
        upper: &mut C::Upper,
        token: TokenOf<C>,
    ) {
        let dest = self.packet_buf.receiver();
        let slot = if dest.is_broadcast() {
            C::BROADCAST_SLOT
        } else {
            dest.node_id()
        };

        if slot == self.node_id {
            // A node never transmits to itself.
            trace!("dropping frame addressed to own slot");
            return;
        }
        if slot >= C::TOTAL_SLOTS {
            warn!("destination id {} outside the slot table", slot);
            upper.sent(token, TxResult::Err, 1);
            return;
        }

        let frame = QueuedFrame {
            buf: QueueBuf::from_packet_buf(&self.packet_buf),
            token,
        };
        match self.queues.enqueue(slot, frame) {
            Ok(()) => trace!("frame queued for slot {} ({} pending)", slot, self.queues.len(slot)),
            Err(_) => {
                warn!("send queue for slot {} full, dropping frame", slot);
                upper.sent(token, TxResult::Err, 1);
            }
        }
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
        #[cfg(feature = "hw-autoack")]
        {
            if self.packet_buf.payload().len() == ACK_FRAME_LEN {
                trace!("dropping hardware acknowledgement frame");
                return;
            }
        }

        if let Err(e) = framer.parse(&mut self.packet_buf) {
            warn!(
                "failed to parse received frame ({}): {:?}",
                e,
                crate::utils::HexSlice(self.packet_buf.payload())
            );
            return;
        }

        #[cfg(feature = "address-filter")]
        {
            if !filter::frame_accepted(&self.addr, &self.packet_buf.receiver()) {
                trace!("frame for {:?} filtered", self.packet_buf.receiver());
                return;
            }
        }

        #[cfg(feature = "duplicate-filter")]
        {
            if self
                .seen
                .register(self.packet_buf.sender(), self.packet_buf.seqno())
            {
                debug!(
                    "duplicate seqno {} from {:?} dropped",
                    self.packet_buf.seqno(),
                    self.packet_buf.sender()
                );
                return;
            }
        }

        upper.input(&self.packet_buf);
    }

    fn on(&mut self, radio: &mut C::Radio) {
        self.radio_on(radio);
    }

    fn off(&mut self, radio: &mut C::Radio, keep_on: bool) {
        self.radio_off(radio, keep_on);
    }

    fn channel_check_interval(&self) -> u16 {
        let period_ticks =
            u64::from(Self::regular_slot().as_ticks()) * u64::from(C::TOTAL_SLOTS);
        (period_ticks * u64::from(C::CLOCK_SECOND) / u64::from(C::Timer::TICKS_PER_SECOND)) as u16
    }
}
