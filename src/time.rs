//! Time APIs for obtaining the current time and calculating with points in time and durations.
//!
//! These APIs are made for the RDC layer and are not meant to be general-purpose. Everything is
//! counted in ticks of the platform's real-time timer (the rate is exposed as
//! [`Timer::TICKS_PER_SECOND`]) and uses 32-bit arithmetic wherever possible.
//!
//! [`Timer::TICKS_PER_SECOND`]: trait.Timer.html#associatedconstant.TICKS_PER_SECOND

use core::fmt;
use core::ops::{Add, AddAssign, Sub, SubAssign};

/// A duration expressed in real-time timer ticks.
///
/// Overflows in `Duration` arithmetic result in a panic, but shouldn't happen since the RDC layer
/// only deals with durations up to a few slot periods.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration(u32);

impl Duration {
    /// Creates a [`Duration`] from a number of hardware ticks.
    pub fn from_ticks(ticks: u32) -> Self {
        Duration(ticks)
    }

    /// Returns the number of ticks represented by `self`.
    pub fn as_ticks(&self) -> u32 {
        self.0
    }
}

impl Add for Duration {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Duration(self.0.checked_add(rhs.0).expect("duration overflow"))
    }
}

impl AddAssign for Duration {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Duration {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Duration(self.0.checked_sub(rhs.0).expect("duration underflow"))
    }
}

impl SubAssign for Duration {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ticks", self.0)
    }
}

impl fmt::Debug for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        <Self as fmt::Display>::fmt(self, f)
    }
}

/// A point in time, relative to an unspecified epoch.
///
/// This has tick resolution and may wrap around. Apart from the wraparound, it is monotonic.
///
/// `Instant`s are obtained from an implementation of [`Timer`]. `Instant`s created from different
/// [`Timer`] instances (even when using the same implementation) are not compatible, and mixing
/// them in operations causes unspecified results. [`Duration`]s are independent of the [`Timer`]
/// implementation and thus can be mixed freely.
///
/// [`Timer`]: trait.Timer.html
#[derive(Copy, Clone)]
pub struct Instant(u32);

impl Instant {
    /// The maximum time between two `Instant`s that can be handled by [`Instant::duration_since`].
    ///
    /// Chosen as a quarter of the tick range: long enough for many slot periods at any realistic
    /// tick rate, short enough to make wraparound bugs show up quickly.
    ///
    /// [`Instant::duration_since`]: #method.duration_since
    pub const MAX_TIME_BETWEEN: Duration = Duration(0x4000_0000);

    /// Creates an `Instant` from a raw tick count since an arbitrary implementation-defined
    /// reference point.
    ///
    /// This should only be called from a [`Timer`] implementation.
    ///
    /// [`Timer`]: trait.Timer.html
    pub fn from_raw_ticks(ticks: u32) -> Self {
        Instant(ticks)
    }

    /// Returns the raw value from which this `Instant` was created.
    pub fn raw_ticks(&self) -> u32 {
        self.0
    }

    /// Calculates the duration of time that has passed between `earlier` and `self`.
    ///
    /// The maximum duration that can be calculated by this method is defined as
    /// [`Instant::MAX_TIME_BETWEEN`]. Calling this method when the `Instant`s are further apart
    /// is an error and may panic in debug builds. This is done as a safeguard, since `Instant`s
    /// can wrap around, which can cause the result of this function to be incorrect. It does not
    /// prevent that from happening, but makes unexpected durations show up much earlier.
    ///
    /// [`Instant::MAX_TIME_BETWEEN`]: #associatedconstant.MAX_TIME_BETWEEN
    pub fn duration_since(&self, earlier: Instant) -> Duration {
        let ticks_passed = self.0.wrapping_sub(earlier.0);
        debug_assert!(
            ticks_passed <= Self::MAX_TIME_BETWEEN.0,
            "{} ticks between instants {} and {}",
            ticks_passed,
            earlier,
            self
        );

        Duration(ticks_passed)
    }

    /// Returns whether `self` lies at or after `t`, in wrapping tick arithmetic.
    ///
    /// Used for deadline checks in the slot handler's bounded busy-waits. The two instants must
    /// be less than half the tick range apart for the comparison to be meaningful.
    pub fn is_at_or_after(&self, t: Instant) -> bool {
        self.0.wrapping_sub(t.0) as i32 >= 0
    }
}

/// [`Instant`]s can be subtracted, which computes the [`Duration`] between the rhs and lhs using
/// [`Instant::duration_since`].
///
/// [`Instant::duration_since`]: struct.Instant.html#method.duration_since
impl Sub<Instant> for Instant {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Duration {
        self.duration_since(rhs)
    }
}

/// A [`Duration`] can be added to an [`Instant`], moving the [`Instant`] forwards in time.
impl Add<Duration> for Instant {
    type Output = Self;

    fn add(self, d: Duration) -> Self {
        Instant(self.0.wrapping_add(d.as_ticks()))
    }
}

impl AddAssign<Duration> for Instant {
    fn add_assign(&mut self, d: Duration) {
        *self = *self + d;
    }
}

/// A [`Duration`] can be subtracted from an [`Instant`], moving the [`Instant`] backwards in
/// time.
impl Sub<Duration> for Instant {
    type Output = Self;

    fn sub(self, d: Duration) -> Self {
        Instant(self.0.wrapping_sub(d.as_ticks()))
    }
}

impl SubAssign<Duration> for Instant {
    fn sub_assign(&mut self, d: Duration) {
        *self = *self - d;
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

impl fmt::Debug for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        <Self as fmt::Display>::fmt(self, f)
    }
}

/// Trait for time providers.
///
/// The hardware interface has to provide an implementation of `Timer` to the layer, backed by the
/// platform's free-running real-time timer.
///
/// This trait can also be implemented by a mock timer for testing.
pub trait Timer {
    /// Tick rate of this timer, in ticks per second.
    const TICKS_PER_SECOND: u32;

    /// Obtain the current time as an [`Instant`].
    ///
    /// The [`Instant`]s returned by this function must never move backwards in time, except when
    /// the underlying value wraps around.
    ///
    /// [`Instant`]: struct.Instant.html
    fn now(&self) -> Instant;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_since_wraps() {
        let before = Instant::from_raw_ticks(u32::max_value() - 9);
        let after = Instant::from_raw_ticks(20);
        assert_eq!(after.duration_since(before).as_ticks(), 30);
    }

    #[test]
    fn deadline_comparison() {
        let deadline = Instant::from_raw_ticks(100);
        assert!(!Instant::from_raw_ticks(99).is_at_or_after(deadline));
        assert!(Instant::from_raw_ticks(100).is_at_or_after(deadline));
        assert!(Instant::from_raw_ticks(101).is_at_or_after(deadline));

        // across the wrap point
        let deadline = Instant::from_raw_ticks(5);
        assert!(!Instant::from_raw_ticks(u32::max_value()).is_at_or_after(deadline));
        assert!(Instant::from_raw_ticks(6).is_at_or_after(deadline));
    }

    #[test]
    fn instant_arithmetic() {
        let t = Instant::from_raw_ticks(u32::max_value());
        let later = t + Duration::from_ticks(3);
        assert_eq!(later.raw_ticks(), 2);
        assert_eq!(later.duration_since(t).as_ticks(), 3);
        assert_eq!((later - Duration::from_ticks(3)).raw_ticks(), t.raw_ticks());
    }
}
