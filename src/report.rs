//! Run report wire format.
//!
//! A completed run is sent to the remote service as a JSON object with
//! exactly three string fields:
//!
//! ```json
//! {"keyfobNum":"12345","startTimeStamp":"06/01/2024 12:00:00","endTimeStamp":"06/01/2024 12:00:02"}
//! ```
//!
//! Timestamps use [`Timestamp`](crate::clock::Timestamp)'s display form.
//! A run without a card read reports rider `"0"`.

use alloc::string::{String, ToString};

use serde::{Deserialize, Serialize};

use crate::run::CompletedRun;

/// Rider number reported when no card was read before the run.
pub const UNKNOWN_RIDER: u32 = 0;

/// Body of the `POST /slideruns` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideRunReport {
    /// Decimal rider (key fob) number.
    pub keyfob_num: String,
    /// Upper-sensor time.
    pub start_time_stamp: String,
    /// Start plus elapsed time.
    pub end_time_stamp: String,
}

impl SlideRunReport {
    /// Serializes the report to its JSON body.
    ///
    /// # Example
    ///
    /// ```
    /// use slide_timer::run::CompletedRun;
    /// use slide_timer::clock::Timestamp;
    /// use slide_timer::SlideRunReport;
    ///
    /// let run = CompletedRun {
    ///     rider_id: Some(7),
    ///     started_at: Timestamp::from_millis(0),
    ///     elapsed_ms: 2_000,
    /// };
    /// assert_eq!(
    ///     SlideRunReport::from(&run).to_json(),
    ///     r#"{"keyfobNum":"7","startTimeStamp":"01/01/1970 00:00:00","endTimeStamp":"01/01/1970 00:00:02"}"#
    /// );
    /// ```
    pub fn to_json(&self) -> String {
        // Three string fields cannot fail to serialize
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl From<&CompletedRun> for SlideRunReport {
    fn from(run: &CompletedRun) -> Self {
        Self {
            keyfob_num: run.rider_id.unwrap_or(UNKNOWN_RIDER).to_string(),
            start_time_stamp: run.started_at.to_string(),
            end_time_stamp: run.ended_at().to_string(),
        }
    }
}
