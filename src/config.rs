//! Controller configuration.
//!
//! Uses `heapless::String` so the same structs work on a `no_std` board and
//! on the desktop bench setup. Every section has defaults matching the
//! installed slide and `with_*` builder setters.
//!
//! # Example
//!
//! ```rust
//! use slide_timer::config::{ApiConfig, Config, TrackConfig};
//! use slide_timer::ElapsedMode;
//!
//! let config = Config::default()
//!     .with_api(ApiConfig::default().with_host("192.168.1.20").with_port(8081))
//!     .with_track(TrackConfig::default().with_elapsed_mode(ElapsedMode::Total));
//!
//! assert_eq!(config.api.url().as_str(), "http://192.168.1.20:8081/slideruns");
//! ```

use core::fmt::Write as _;

use heapless::String as HString;

use crate::run::ElapsedMode;
use crate::traits::SensorId;

/// Maximum length for short config strings (hostnames, paths, names)
pub const MAX_SHORT_STRING: usize = 64;

/// Maximum length for longer config strings (URLs)
pub const MAX_LONG_STRING: usize = 128;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Type alias for longer config strings
pub type LongString = HString<MAX_LONG_STRING>;

/// Copies `s` into a fixed-capacity string, truncating on a char boundary.
pub fn bounded<const N: usize>(s: &str) -> HString<N> {
    let mut out = HString::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Create a ShortString from a &str, truncating if too long
pub fn short_string(s: &str) -> ShortString {
    bounded(s)
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete controller configuration
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Remote run-report API
    pub api: ApiConfig,
    /// Startup clock synchronization
    pub clock: ClockConfig,
    /// Timed section and run policy
    pub track: TrackConfig,
    /// Proximity sensor wiring
    pub sensors: SensorConfig,
    /// Event loop tuning
    pub service: ServiceConfig,
    /// Bench status/injection web server
    pub web: WebConfig,
    /// Device identification
    pub device: DeviceConfig,
}

impl Config {
    /// Set API configuration
    pub fn with_api(mut self, api: ApiConfig) -> Self {
        self.api = api;
        self
    }

    /// Set clock configuration
    pub fn with_clock(mut self, clock: ClockConfig) -> Self {
        self.clock = clock;
        self
    }

    /// Set track configuration
    pub fn with_track(mut self, track: TrackConfig) -> Self {
        self.track = track;
        self
    }

    /// Set sensor configuration
    pub fn with_sensors(mut self, sensors: SensorConfig) -> Self {
        self.sensors = sensors;
        self
    }

    /// Set event loop configuration
    pub fn with_service(mut self, service: ServiceConfig) -> Self {
        self.service = service;
        self
    }

    /// Set web configuration
    pub fn with_web(mut self, web: WebConfig) -> Self {
        self.web = web;
        self
    }

    /// Set device configuration
    pub fn with_device(mut self, device: DeviceConfig) -> Self {
        self.device = device;
        self
    }
}

// ============================================================================
// API Config
// ============================================================================

/// Remote run-report API configuration
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// API hostname or IP
    pub host: ShortString,
    /// API port
    pub port: u16,
    /// Path runs are POSTed to
    pub path: ShortString,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u32,
    /// Whether completed runs are reported at all
    pub enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: short_string("devsnaggertown"),
            port: 8081,
            path: short_string("/slideruns"),
            timeout_ms: 5_000,
            enabled: true,
        }
    }
}

impl ApiConfig {
    /// Set the API host
    pub fn with_host(mut self, host: &str) -> Self {
        self.host = short_string(host);
        self
    }

    /// Set the API port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the report path (a leading `/` is added if missing)
    pub fn with_path(mut self, path: &str) -> Self {
        self.path = if path.starts_with('/') {
            short_string(path)
        } else {
            let mut p = ShortString::new();
            let _ = p.push('/');
            let _ = p.push_str(bounded::<{ MAX_SHORT_STRING - 1 }>(path).as_str());
            p
        };
        self
    }

    /// Set the request timeout
    pub fn with_timeout_ms(mut self, ms: u32) -> Self {
        self.timeout_ms = ms;
        self
    }

    /// Enable or disable reporting
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Full URL runs are POSTed to
    pub fn url(&self) -> LongString {
        let mut url = LongString::new();
        let _ = write!(url, "http://{}:{}{}", self.host, self.port, self.path);
        url
    }
}

// ============================================================================
// Clock Config
// ============================================================================

/// Startup clock synchronization configuration
#[derive(Clone, Debug)]
pub struct ClockConfig {
    /// SNTP server hostname
    pub ntp_host: ShortString,
    /// SNTP server port
    pub ntp_port: u16,
    /// Fixed offset from UTC applied after sync, in hours
    pub utc_offset_hours: i8,
    /// Time to wait for the server's reply in milliseconds
    pub timeout_ms: u32,
    /// Whether to sync at startup
    pub enabled: bool,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            ntp_host: short_string("pool.ntp.org"),
            ntp_port: 123,
            utc_offset_hours: -5,
            timeout_ms: 3_000,
            enabled: true,
        }
    }
}

impl ClockConfig {
    /// Set the SNTP server host
    pub fn with_ntp_host(mut self, host: &str) -> Self {
        self.ntp_host = short_string(host);
        self
    }

    /// Set the SNTP server port
    pub fn with_ntp_port(mut self, port: u16) -> Self {
        self.ntp_port = port;
        self
    }

    /// Set the UTC offset (clamped to -12..=14)
    pub fn with_utc_offset_hours(mut self, hours: i8) -> Self {
        self.utc_offset_hours = hours.clamp(-12, 14);
        self
    }

    /// Set the reply timeout
    pub fn with_timeout_ms(mut self, ms: u32) -> Self {
        self.timeout_ms = ms;
        self
    }

    /// Enable or disable startup sync
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

// ============================================================================
// Track Config
// ============================================================================

/// Timed section and run policy configuration
#[derive(Clone, Debug)]
pub struct TrackConfig {
    /// Distance between the two sensors in feet
    pub length_feet: f64,
    /// How elapsed time is computed
    pub elapsed_mode: ElapsedMode,
    /// Discard a started run after this long without completing (0 = never)
    pub stale_run_timeout_ms: u32,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            length_feet: crate::velocity::TRACK_LENGTH_FEET,
            elapsed_mode: ElapsedMode::Total,
            stale_run_timeout_ms: 120_000,
        }
    }
}

impl TrackConfig {
    /// Set the section length (non-positive values are ignored)
    pub fn with_length_feet(mut self, feet: f64) -> Self {
        if feet > 0.0 {
            self.length_feet = feet;
        }
        self
    }

    /// Set the elapsed-time mode
    pub fn with_elapsed_mode(mut self, mode: ElapsedMode) -> Self {
        self.elapsed_mode = mode;
        self
    }

    /// Set the stale run timeout
    pub fn with_stale_run_timeout_ms(mut self, ms: u32) -> Self {
        self.stale_run_timeout_ms = ms;
        self
    }

    /// Stale run timeout, if enabled
    pub fn stale_timeout(&self) -> Option<u64> {
        (self.stale_run_timeout_ms > 0).then_some(u64::from(self.stale_run_timeout_ms))
    }
}

// ============================================================================
// Sensor Config
// ============================================================================

/// Analog channels the proximity sensors are wired to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SensorConfig {
    /// Channel of the sensor at the top of the slide
    pub upper_channel: u8,
    /// Channel of the sensor at the bottom of the slide
    pub lower_channel: u8,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            upper_channel: 0,
            lower_channel: 1,
        }
    }
}

impl SensorConfig {
    /// Set the upper sensor channel
    pub fn with_upper_channel(mut self, channel: u8) -> Self {
        self.upper_channel = channel;
        self
    }

    /// Set the lower sensor channel
    pub fn with_lower_channel(mut self, channel: u8) -> Self {
        self.lower_channel = channel;
        self
    }

    /// Which sensor is wired to `channel`.
    ///
    /// If both sensors are misconfigured onto the same channel, it resolves
    /// to the upper sensor.
    pub fn identify(&self, channel: u8) -> Option<SensorId> {
        if channel == self.upper_channel {
            Some(SensorId::Upper)
        } else if channel == self.lower_channel {
            Some(SensorId::Lower)
        } else {
            None
        }
    }

    /// Channel a sensor is wired to.
    pub fn channel(&self, sensor: SensorId) -> u8 {
        match sensor {
            SensorId::Upper => self.upper_channel,
            SensorId::Lower => self.lower_channel,
        }
    }
}

// ============================================================================
// Service Config
// ============================================================================

/// Event loop configuration
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    /// Capacity of the bounded event queue
    pub queue_capacity: usize,
    /// How often the loop checks for stale runs in milliseconds
    pub stale_check_interval_ms: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 32,
            stale_check_interval_ms: 1_000,
        }
    }
}

impl ServiceConfig {
    /// Set the queue capacity (minimum 1)
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Set the stale check interval (minimum 10ms)
    pub fn with_stale_check_interval_ms(mut self, ms: u32) -> Self {
        self.stale_check_interval_ms = ms.max(10);
        self
    }
}

// ============================================================================
// Web Config
// ============================================================================

/// Web server configuration
#[derive(Clone, Debug)]
pub struct WebConfig {
    /// Port to listen on
    pub port: u16,
    /// Whether to enable CORS for all origins
    pub cors_permissive: bool,
    /// Whether web server is enabled
    pub enabled: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            cors_permissive: true,
            enabled: true,
        }
    }
}

impl WebConfig {
    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set CORS mode
    pub fn with_cors(mut self, permissive: bool) -> Self {
        self.cors_permissive = permissive;
        self
    }

    /// Enable or disable web server
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

// ============================================================================
// Device Config
// ============================================================================

/// Device identification configuration
#[derive(Clone, Debug)]
pub struct DeviceConfig {
    /// Human-readable device name
    pub name: ShortString,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: short_string("slide-timer"),
        }
    }
}

impl DeviceConfig {
    /// Set the device name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = short_string(name);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
