//! Average rider velocity over the timed section.
//!
//! The slide's timed section is 31 feet long. Velocity is the section length
//! in miles divided by the elapsed time as a fraction of an hour.
//!
//! ```rust
//! use slide_timer::velocity::{velocity_mph, VelocityError};
//!
//! let mph = velocity_mph(2_000).unwrap();
//! assert!((mph - 10.568).abs() < 0.01);
//!
//! assert_eq!(velocity_mph(0), Err(VelocityError::ZeroElapsed));
//! ```

/// Length of the timed section in feet.
pub const TRACK_LENGTH_FEET: f64 = 31.0;

/// Feet per statute mile.
pub const FEET_PER_MILE: f64 = 5280.0;

/// Milliseconds per hour.
pub const MS_PER_HOUR: f64 = 3_600_000.0;

/// Why a velocity could not be computed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum VelocityError {
    /// The run took zero milliseconds.
    #[error("elapsed time is zero")]
    ZeroElapsed,
    /// The track length produced a NaN or infinite speed.
    #[error("velocity is not a finite number")]
    NotFinite,
}

/// Velocity in miles per hour over the standard 31 ft section.
pub fn velocity_mph(elapsed_ms: u64) -> Result<f64, VelocityError> {
    velocity_mph_for(TRACK_LENGTH_FEET, elapsed_ms)
}

/// Velocity in miles per hour over a section of `length_feet`.
pub fn velocity_mph_for(length_feet: f64, elapsed_ms: u64) -> Result<f64, VelocityError> {
    if elapsed_ms == 0 {
        return Err(VelocityError::ZeroElapsed);
    }
    let miles = length_feet / FEET_PER_MILE;
    let hours = elapsed_ms as f64 / MS_PER_HOUR;
    let mph = miles / hours;
    if mph.is_finite() {
        Ok(mph)
    } else {
        Err(VelocityError::NotFinite)
    }
}
