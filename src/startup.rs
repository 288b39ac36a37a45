//! Boot sequence.
//!
//! Each subsystem is announced on the display as it comes up, the clock is
//! synchronized once, and the controller finally shows `Ready`. Nothing here
//! is fatal: a failed clock sync leaves the wall clock counting from the
//! epoch and the controller still starts.

use crate::clock::{Timestamp, WallClock};
use crate::config::ClockConfig;
use crate::traits::{Clock, StatusDisplay, TimeSource};

/// First line shown while a subsystem starts.
pub const INITIALIZING_BANNER: &str = "- Initializing -";

/// Subsystems in the order they are brought up.
pub const MODULES: [&str; 4] = ["Clock", "HID Decoder", "Lower Sensor", "Upper Sensor"];

/// Final startup message.
pub const READY: &str = "Ready";

/// Shows the initialization banner for `module`.
pub fn announce<D: StatusDisplay>(display: &mut D, module: &str) {
    log::info!("initializing {}", module);
    show(display, INITIALIZING_BANNER, module);
}

fn show<D: StatusDisplay>(display: &mut D, line1: &str, line2: &str) {
    if let Err(e) = display.show(line1, line2) {
        log::warn!("display error: {:?}", e);
    }
}

/// Sets `wall` from `source`, applying the configured UTC offset.
///
/// On failure the error is logged and shown as `Failed to / initialize
/// clock!`, and the wall clock is left untouched.
pub fn sync_clock<D, T, C>(
    display: &mut D,
    source: &mut T,
    wall: &mut WallClock<C>,
    config: &ClockConfig,
) -> Result<Timestamp, T::Error>
where
    D: StatusDisplay,
    T: TimeSource,
    C: Clock,
{
    match source.fetch_utc_ms() {
        Ok(utc_ms) => {
            wall.set_utc(utc_ms, config.utc_offset_hours);
            let now = wall.now();
            log::info!("clock set to {} (UTC{:+})", now, config.utc_offset_hours);
            Ok(now)
        }
        Err(e) => {
            log::warn!("clock sync failed: {}", e);
            show(display, "Failed to", "initialize clock!");
            Err(e)
        }
    }
}

/// Runs the whole boot sequence and returns whether the clock was set.
///
/// # Example
///
/// ```rust
/// use slide_timer::clock::WallClock;
/// use slide_timer::config::ClockConfig;
/// use slide_timer::hal::{MockClock, MockDisplay, MockTimeSource};
/// use slide_timer::startup;
///
/// let mut display = MockDisplay::new();
/// let mut wall = WallClock::new(MockClock::new());
/// let mut ntp = MockTimeSource::at(1_717_261_200_000);
///
/// let synced = startup::initialize(&mut display, &mut ntp, &mut wall, &ClockConfig::default());
///
/// assert!(synced);
/// assert_eq!(wall.now().to_string(), "06/01/2024 12:00:00");
/// assert_eq!(display.last_page(), Some(("Ready", "")));
/// ```
pub fn initialize<D, T, C>(
    display: &mut D,
    source: &mut T,
    wall: &mut WallClock<C>,
    config: &ClockConfig,
) -> bool
where
    D: StatusDisplay,
    T: TimeSource,
    C: Clock,
{
    let mut synced = false;
    for module in MODULES {
        announce(display, module);
        if module == "Clock" {
            if config.enabled {
                synced = sync_clock(display, source, wall, config).is_ok();
            } else {
                log::info!("clock sync disabled");
            }
        }
    }
    show(display, READY, "");
    synced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{MockClock, MockDisplay, MockTimeSource};

    #[test]
    fn announces_every_module_then_ready() {
        let mut display = MockDisplay::new();
        let mut wall = WallClock::new(MockClock::new());
        let mut source = MockTimeSource::at(0);

        initialize(&mut display, &mut source, &mut wall, &ClockConfig::default());

        let pages = display.pages_as_str();
        assert_eq!(
            pages,
            [
                (INITIALIZING_BANNER, "Clock"),
                (INITIALIZING_BANNER, "HID Decoder"),
                (INITIALIZING_BANNER, "Lower Sensor"),
                (INITIALIZING_BANNER, "Upper Sensor"),
                (READY, ""),
            ]
        );
    }

    #[test]
    fn clock_failure_is_shown_and_not_fatal() {
        let mut display = MockDisplay::new();
        let mut wall = WallClock::new(MockClock::new());
        let mut source = MockTimeSource::failing();

        let synced = initialize(&mut display, &mut source, &mut wall, &ClockConfig::default());

        assert!(!synced);
        assert!(!wall.is_synced());
        assert_eq!(display.pages_as_str()[1], ("Failed to", "initialize clock!"));
        assert_eq!(display.last_page(), Some((READY, "")));
    }

    #[test]
    fn failing_display_does_not_stop_boot() {
        let mut display = MockDisplay::failing();
        let mut wall = WallClock::new(MockClock::new());
        let mut source = MockTimeSource::failing();

        let synced = initialize(&mut display, &mut source, &mut wall, &ClockConfig::default());

        assert!(!synced);
        assert_eq!(source.calls, 1);
        // four banners, the clock failure, then ready
        assert_eq!(display.show_count, 6);
        assert!(display.pages.is_empty());
    }

    #[test]
    fn disabled_sync_skips_fetch() {
        let mut display = MockDisplay::new();
        let mut wall = WallClock::new(MockClock::new());
        let mut source = MockTimeSource::at(0);
        let config = ClockConfig::default().with_enabled(false);

        assert!(!initialize(&mut display, &mut source, &mut wall, &config));
        assert_eq!(source.calls, 0);
    }

    #[test]
    fn sync_applies_offset() {
        let mut display = MockDisplay::new();
        let mut wall = WallClock::new(MockClock::new());
        let mut source = MockTimeSource::at(10 * 3_600_000);
        let config = ClockConfig::default().with_utc_offset_hours(2);

        let now = sync_clock(&mut display, &mut source, &mut wall, &config).unwrap();
        assert_eq!(now.as_millis(), 12 * 3_600_000);
        assert!(display.pages.is_empty());
    }
}
