//! Layer configuration trait.

use crate::{
    framer::Framer,
    mac::UpperMac,
    phy::{Radio, Watchdog},
    time::Timer,
};
use rand_core::{RngCore, SeedableRng};

/// Trait for RDC layer configurations.
///
/// This trait defines the hardware interface types used throughout the layer, along with the
/// compile-time schedule and contention geometry. Every application must define a type
/// implementing this trait and supply it to the layer; the constants all have defaults matching
/// the reference deployment, so a minimal configuration only names the interface types.
///
/// The tick-valued constants are plain numbers, not derived from the timer rate; contention
/// geometry must be tuned against the radio's CCA and turnaround times for each platform.
pub trait Config {
    /// The real-time timer driving the slot clock, with tick resolution.
    type Timer: Timer;

    /// The radio PHY driver.
    type Radio: Radio;

    /// The link-layer framer putting headers on outgoing frames and stripping them from incoming
    /// ones.
    type Framer: Framer;

    /// Pseudo-random generator used for the contention sub-slot draw.
    ///
    /// Re-seeded from the current tick count and the node id at every draw, so a cheap
    /// non-cryptographic generator is the right choice here.
    type Rng: RngCore + SeedableRng;

    /// The upper MAC layer receiving inbound frames and transmission outcomes.
    type Upper: UpperMac;

    /// Platform watchdog, kicked during busy-waits.
    type Watchdog: Watchdog;

    /// Number of slots in a full schedule period.
    ///
    /// Node ids must lie in `[1, TOTAL_SLOTS)` so that every node's owned slot is distinct from
    /// [`BROADCAST_SLOT`]. Must not exceed [`MAX_SLOTS`].
    ///
    /// [`BROADCAST_SLOT`]: #associatedconstant.BROADCAST_SLOT
    /// [`MAX_SLOTS`]: ../mac/constant.MAX_SLOTS.html
    const TOTAL_SLOTS: u8 = 12;

    /// Wall-clock length of a full period, in milliseconds.
    const PERIOD_MS: u32 = 180;

    /// The slot reserved for broadcast traffic.
    const BROADCAST_SLOT: u8 = 0;

    /// `keep_on` argument passed to the facade's `off` when powering down between slots.
    const TURN_OFF: bool = false;

    /// Number of contention sub-slots at the start of every send slot.
    const CONTENTION_SLOTS: u8 = 4;

    /// Length of one contention sub-slot, in timer ticks.
    const CONTENTION_TICKS: u32 = 4;

    /// Quiet period at the start of a slot before the first contention sub-slot, in timer ticks.
    const CONTENTION_PREPARE: u32 = 5;

    /// Number of strobe bytes needed to cover one CCA from the following sub-slot.
    const CCA_CONTENTION_SIZE: usize = 24;

    /// Number of strobe bytes that occupy the air for one contention sub-slot.
    const CONTENTION_SIZE: usize = 8;

    /// Upper bound on the contention strobe, usually the PHY's maximum frame length.
    const MAX_STROBE_SIZE: usize = 127;

    /// Size of the seen-sender window used for duplicate suppression.
    ///
    /// Only meaningful with the `duplicate-filter` feature; must not exceed the static window
    /// bound of 16.
    const MAX_SEQNOS: usize = 16;

    /// System clock rate, in ticks per second, used to express the channel check interval.
    const CLOCK_SECOND: u32 = 1000;
}

// Helper aliases to make the facade signatures readable.
/// The radio type of a configuration.
pub type RadioOf<C> = <C as Config>::Radio;
/// The framer type of a configuration.
pub type FramerOf<C> = <C as Config>::Framer;
/// The upper MAC type of a configuration.
pub type UpperOf<C> = <C as Config>::Upper;
/// The per-frame token type of a configuration's upper MAC.
pub type TokenOf<C> = <<C as Config>::Upper as UpperMac>::Token;
