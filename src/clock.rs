//! Wall-clock timestamps layered over a monotonic [`Clock`].
//!
//! The board boots without knowing the time of day. At startup the clock is
//! synchronized once from a [`TimeSource`](crate::traits::TimeSource) and
//! shifted by a fixed timezone offset; from then on [`WallClock::now`] maps
//! the monotonic clock onto local epoch time.
//!
//! # Example
//!
//! ```rust
//! use slide_timer::clock::{Timestamp, WallClock};
//! use slide_timer::hal::MockClock;
//!
//! let mut wall = WallClock::new(MockClock::new());
//! // 2024-06-01 17:00:00 UTC, shown at UTC-5
//! wall.set_utc(1_717_261_200_000, -5);
//! assert_eq!(wall.now().to_string(), "06/01/2024 12:00:00");
//!
//! let later = wall.now().add_ms(2_000);
//! assert_eq!(later.millis_since(wall.now()), Some(2_000));
//! ```

use core::fmt;

use crate::traits::Clock;

/// Milliseconds per hour, used for timezone offsets.
pub const MS_PER_HOUR: i64 = 3_600_000;

/// Local wall-clock time in milliseconds since the Unix epoch.
///
/// "Local" means the configured timezone offset has already been applied, so
/// the value formats directly as the time of day shown to riders and sent in
/// run reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from local epoch milliseconds.
    #[inline]
    pub const fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    /// Returns the local epoch milliseconds.
    #[inline]
    pub const fn as_millis(&self) -> i64 {
        self.0
    }

    /// Returns this timestamp shifted forward by `ms` milliseconds.
    #[inline]
    pub fn add_ms(self, ms: u64) -> Self {
        Self(self.0.saturating_add(i64::try_from(ms).unwrap_or(i64::MAX)))
    }

    /// Milliseconds from `earlier` to `self`, or `None` if `earlier` is later.
    pub fn millis_since(self, earlier: Timestamp) -> Option<u64> {
        let delta = self.0.checked_sub(earlier.0)?;
        u64::try_from(delta).ok()
    }
}

impl fmt::Display for Timestamp {
    /// Formats as `MM/dd/yyyy HH:mm:ss`, the controller's default text form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match chrono::DateTime::from_timestamp_millis(self.0) {
            Some(dt) => write!(f, "{}", dt.naive_utc().format("%m/%d/%Y %H:%M:%S")),
            None => write!(f, "{}ms", self.0),
        }
    }
}

/// Maps a monotonic [`Clock`] onto local wall-clock time.
///
/// Before [`set_utc`](Self::set_utc) is called the wall clock counts from the
/// Unix epoch, the same way an unsynchronized board reports a date in 1970.
#[derive(Clone, Debug)]
pub struct WallClock<C: Clock> {
    clock: C,
    /// Local epoch ms corresponding to monotonic time zero.
    epoch_offset_ms: i64,
    synced: bool,
}

impl<C: Clock> WallClock<C> {
    /// Wraps a monotonic clock; unsynchronized until [`set_utc`](Self::set_utc).
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            epoch_offset_ms: 0,
            synced: false,
        }
    }

    /// Sets the wall clock from a UTC reading and a fixed offset in hours.
    pub fn set_utc(&mut self, utc_ms: i64, utc_offset_hours: i8) {
        let local_ms = utc_ms + i64::from(utc_offset_hours) * MS_PER_HOUR;
        self.epoch_offset_ms = local_ms - self.monotonic_ms();
        self.synced = true;
    }

    /// Current local time.
    pub fn now(&self) -> Timestamp {
        Timestamp(self.epoch_offset_ms.saturating_add(self.monotonic_ms()))
    }

    /// Whether the clock has been synchronized since startup.
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    /// Mutable access to the underlying monotonic clock.
    pub fn monotonic_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    fn monotonic_ms(&self) -> i64 {
        i64::try_from(self.clock.now_ms()).unwrap_or(i64::MAX)
    }
}
