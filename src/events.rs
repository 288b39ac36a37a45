//! Typed events fed to the run tracker.
//!
//! Sensor interrupts and the card reader each push a [`SlideEvent`]; the
//! tracker applies them one at a time in arrival order.

use crate::clock::Timestamp;
use crate::traits::SensorId;

/// A notification from one of the slide's event sources.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlideEvent {
    /// The RFID reader decoded a rider's card.
    CardDecoded {
        /// Numeric card (key fob) id.
        card_id: u32,
    },
    /// A sensor with a known identity detected an object.
    ObjectDetected {
        /// Which sensor fired.
        sensor: SensorId,
        /// When it fired.
        at: Timestamp,
    },
    /// A raw analog channel reported an object; mapped to a sensor by the
    /// tracker's wiring.
    Proximity {
        /// Analog channel number.
        channel: u8,
        /// When it fired.
        at: Timestamp,
    },
}

impl SlideEvent {
    /// Card read event.
    pub const fn card(card_id: u32) -> Self {
        Self::CardDecoded { card_id }
    }

    /// Upper sensor trip at `at`.
    pub const fn upper(at: Timestamp) -> Self {
        Self::ObjectDetected {
            sensor: SensorId::Upper,
            at,
        }
    }

    /// Lower sensor trip at `at`.
    pub const fn lower(at: Timestamp) -> Self {
        Self::ObjectDetected {
            sensor: SensorId::Lower,
            at,
        }
    }

    /// Timestamp carried by the event, if any.
    pub fn timestamp(&self) -> Option<Timestamp> {
        match self {
            Self::CardDecoded { .. } => None,
            Self::ObjectDetected { at, .. } | Self::Proximity { at, .. } => Some(*at),
        }
    }
}
