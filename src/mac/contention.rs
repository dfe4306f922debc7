//! Contention arithmetic.
//!
//! A send slot starts with a short quiet period followed by `CONTENTION_SLOTS` sub-slots. Every
//! contending sender draws a random sub-slot, waits for it, checks the channel and, if it is
//! clear, transmits a filler *strobe* sized to occupy the medium through the rest of the
//! contention window. A sender that drew a later sub-slot then hears a busy channel and backs
//! off. The pure helpers here compute the draw and the strobe; the surrounding protocol lives in
//! the slot handler.

use crate::time::Instant;
use rand_core::{RngCore, SeedableRng};

/// Byte value the strobe is padded with.
pub(crate) const STROBE_FILL: u8 = 7;

/// Largest value the contention draw operates on (15-bit range, like the classic `random_rand`).
pub(crate) const RAND_MAX: u16 = 0x7fff;

/// Size of the stack buffer strobes are assembled in. `Config::MAX_STROBE_SIZE` must not exceed
/// this.
pub(crate) const STROBE_BUF_SIZE: usize = 127;

/// Buckets a raw draw from `[0, RAND_MAX]` into a sub-slot index in `[0, subslots)`.
///
/// The range is divided into `subslots` equal brackets; the division remainder would leave a
/// short tail of values past the last bracket, so those are absorbed into the last sub-slot.
pub(crate) fn map_to_subslot(x: u16, subslots: u8) -> u8 {
    debug_assert!(subslots > 0);
    let bucket = (u32::from(RAND_MAX) + 1) / u32::from(subslots);
    let r = u32::from(x) / bucket;
    r.min(u32::from(subslots) - 1) as u8
}

/// Draws the contention sub-slot for this transmission.
///
/// The generator is seeded from the current tick count and the node id, so two nodes contending
/// in the same slot diverge even when their clocks agree.
pub(crate) fn draw_subslot<R>(now: Instant, node_id: u8, subslots: u8) -> u8
where
    R: RngCore + SeedableRng,
{
    let seed = (u64::from(now.raw_ticks()) << 8) | u64::from(node_id);
    let mut rng = R::seed_from_u64(seed);
    map_to_subslot((rng.next_u32() & u32::from(RAND_MAX)) as u16, subslots)
}

/// Computes the strobe length for a frame with `header_len` header bytes whose sender drew
/// sub-slot `r`.
///
/// The strobe has to hold the medium from the chosen sub-slot to the end of the contention
/// window: a base of `cca_size` bytes covers the CCA of the immediately following sub-slot, and
/// each further sub-slot adds `unit` bytes. Header bytes already on the air count against the
/// base. The result is capped at `max`; a sender that drew the last sub-slot with a large header
/// may end up with length zero, in which case the CCA alone decides the slot.
pub(crate) fn strobe_len(
    header_len: usize,
    r: u8,
    cca_size: usize,
    unit: usize,
    subslots: u8,
    max: usize,
) -> usize {
    let tail = unit * usize::from(subslots - 1 - r);
    (cca_size + tail).saturating_sub(header_len).min(max)
}

/// Fills `strobe` with the frame header followed by filler bytes.
pub(crate) fn fill_strobe<'a>(strobe: &'a mut [u8], header: &[u8]) -> &'a [u8] {
    let n = header.len().min(strobe.len());
    strobe[..n].copy_from_slice(&header[..n]);
    for b in &mut strobe[n..] {
        *b = STROBE_FILL;
    }
    strobe
}
