//! Hardware abstraction traits for the slide's sensors and time base.
//!
//! The physical drivers (analog proximity sensors, the Wiegand/HID card
//! decoder) live outside this crate. They only need to turn their interrupts
//! into [`SlideEvent`](crate::SlideEvent)s; the types here describe what those
//! events carry.
//!
//! # Key Types
//!
//! | Item | Purpose |
//! |------|---------|
//! | [`SensorId`] | Which proximity sensor fired |
//! | [`Clock`] | Monotonic millisecond time source |
//!
//! # Example
//!
//! ```rust
//! use slide_timer::traits::{Clock, SensorId};
//! use slide_timer::hal::MockClock;
//!
//! let mut clock = MockClock::new();
//! clock.advance(250);
//! assert_eq!(clock.now_ms(), 250);
//!
//! assert_eq!(SensorId::from_text("top"), Some(SensorId::Upper));
//! ```

/// Identity of a proximity sensor on the slide.
///
/// The upper sensor marks the start of the timed section, the lower sensor
/// marks its end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorId {
    /// Sensor at the top of the slide (run start).
    Upper,
    /// Sensor at the bottom of the slide (run end).
    Lower,
}

impl SensorId {
    /// Returns the sensor name as a lowercase string.
    ///
    /// # Examples
    ///
    /// ```
    /// use slide_timer::SensorId;
    ///
    /// assert_eq!(SensorId::Upper.as_str(), "upper");
    /// assert_eq!(SensorId::Lower.as_str(), "lower");
    /// ```
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            SensorId::Upper => "upper",
            SensorId::Lower => "lower",
        }
    }

    /// Label used on the status display ("Upper sensor" / "Lower sensor").
    #[inline]
    pub const fn display_label(&self) -> &'static str {
        match self {
            SensorId::Upper => "Upper sensor",
            SensorId::Lower => "Lower sensor",
        }
    }

    /// Parse a sensor identity from text input.
    ///
    /// Accepts `"upper"`/`"top"`/`"start"` and `"lower"`/`"bottom"`/`"end"`.
    /// Input is trimmed and case-insensitive.
    ///
    /// # Examples
    ///
    /// ```
    /// use slide_timer::SensorId;
    ///
    /// assert_eq!(SensorId::from_text("Upper"), Some(SensorId::Upper));
    /// assert_eq!(SensorId::from_text(" bottom "), Some(SensorId::Lower));
    /// assert_eq!(SensorId::from_text("middle"), None);
    /// ```
    pub fn from_text(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "upper" | "top" | "start" => Some(SensorId::Upper),
            "lower" | "bottom" | "end" => Some(SensorId::Lower),
            _ => None,
        }
    }
}

/// Monotonic time source.
///
/// Provides milliseconds since an arbitrary epoch (usually boot). Wall-clock
/// time is layered on top by [`WallClock`](crate::clock::WallClock) once the
/// clock has been synchronized.
pub trait Clock {
    /// Returns current time in milliseconds since an arbitrary epoch.
    ///
    /// Must be monotonically increasing.
    fn now_ms(&self) -> u64;
}
