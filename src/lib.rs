//! A Crankshaft-style Radio Duty Cycling (RDC) layer.
//!
//! On a low-power wireless node the radio dominates the energy budget, so the point of this layer
//! is to keep it powered off as much as possible while still delivering link-layer frames. Time is
//! divided into fixed-length slots; every potential receiver owns the slot matching the low byte
//! of its link-layer address, and slot 0 is shared for broadcast. A sender holds each outgoing
//! frame until the slot owned by its destination comes around, wins a short randomized
//! contention/CCA exchange inside that slot, and only then transmits. A receiver keeps the radio
//! on solely for its own slot, the broadcast slot, and slots it has queued traffic for.
//!
//! # Using the layer
//!
//! The crate is runtime and hardware-agnostic: It does not need an RTOS (although you can
//! certainly use one if you want) and defines hardware interfaces that need to be implemented
//! once for every supported MCU family. Applications provide these via [`Config`]:
//! * A tick-granularity [`Timer`] backed by the platform's real-time timer.
//! * A [`Radio`] driver able to transmit frames and perform clear-channel assessment.
//! * A [`Framer`] that puts link-layer headers on outgoing frames and strips them from incoming
//!   ones.
//! * An [`UpperMac`] receiving inbound frames and transmission outcomes.
//!
//! The slot clock is driven from the outside: [`RdcDriver::init`] and
//! [`Crankshaft::slot_update`] return a [`NextUpdate`] naming the instant of the next slot
//! boundary, and the platform support code arms its timer interrupt from that, calling
//! `slot_update` again when it fires. All shared state mutated by the slot handler is owned by
//! the [`Crankshaft`] value, so the usual embedded discipline applies: place it in whatever
//! critical-section or RTOS resource serializes your timer interrupt against mainline code.
//!
//! [`Config`]: config/trait.Config.html
//! [`Timer`]: time/trait.Timer.html
//! [`Radio`]: phy/trait.Radio.html
//! [`Framer`]: framer/trait.Framer.html
//! [`UpperMac`]: mac/trait.UpperMac.html
//! [`RdcDriver::init`]: mac/trait.RdcDriver.html#tymethod.init
//! [`Crankshaft::slot_update`]: mac/struct.Crankshaft.html#method.slot_update
//! [`NextUpdate`]: mac/enum.NextUpdate.html
//! [`Crankshaft`]: mac/struct.Crankshaft.html

#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

#[macro_use]
mod log;
#[macro_use]
mod utils;
pub mod bytes;
pub mod config;
mod error;
pub mod framer;
pub mod mac;
pub mod packet;
pub mod phy;
pub mod time;

pub use self::config::Config;
pub use self::error::Error;
