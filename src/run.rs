//! Run records: the in-flight [`Run`] and the immutable [`CompletedRun`].
//!
//! A run moves forward only: unstarted, started (upper sensor), completed
//! (lower sensor). The tracker owns exactly one [`Run`] and replaces it with
//! a fresh one as soon as a run completes.

use crate::clock::Timestamp;

/// How elapsed time is derived from the two sensor timestamps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElapsedMode {
    /// True total milliseconds between the upper and lower trips.
    #[default]
    Total,
    /// Only the 0-999 millisecond component of the difference.
    ///
    /// Matches the legacy controller, which read the milliseconds field of
    /// the time difference instead of its total. Runs of one second or more
    /// report a wrapped value.
    MillisecondComponent,
}

impl ElapsedMode {
    /// Applies the mode to a total elapsed duration.
    ///
    /// # Examples
    ///
    /// ```
    /// use slide_timer::ElapsedMode;
    ///
    /// assert_eq!(ElapsedMode::Total.apply(2_345), 2_345);
    /// assert_eq!(ElapsedMode::MillisecondComponent.apply(2_345), 345);
    /// ```
    #[inline]
    pub const fn apply(self, total_ms: u64) -> u64 {
        match self {
            ElapsedMode::Total => total_ms,
            ElapsedMode::MillisecondComponent => total_ms % 1_000,
        }
    }
}

/// Where a run is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// No upper-sensor trip recorded.
    Unstarted,
    /// Upper sensor tripped, waiting for the lower sensor.
    Started,
    /// Lower sensor tripped.
    ///
    /// Only seen on a [`Run`] after [`Run::complete`]; the tracker replaces a
    /// completed run before returning, so its [`phase`](crate::RunTracker::phase)
    /// is never `Completed`.
    Completed,
}

/// One candidate slide traversal, populated incrementally by events.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Run {
    /// Rider read from the most recent card event (`None` = unknown rider).
    pub rider_id: Option<u32>,
    /// When the upper sensor fired (`None` = no run in progress).
    pub started_at: Option<Timestamp>,
    /// Elapsed time once the lower sensor fired.
    pub elapsed_ms: Option<u64>,
}

impl Run {
    /// Creates an empty, unstarted run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> RunPhase {
        match (self.started_at, self.elapsed_ms) {
            (_, Some(_)) => RunPhase::Completed,
            (Some(_), None) => RunPhase::Started,
            (None, None) => RunPhase::Unstarted,
        }
    }

    /// Whether a start is recorded and the run has not completed.
    pub fn is_in_progress(&self) -> bool {
        self.phase() == RunPhase::Started
    }

    /// Marks the run complete at `ended_at`.
    ///
    /// Returns `None` (leaving the run untouched) unless the run is in
    /// progress and `ended_at` is not earlier than the recorded start.
    pub fn complete(&mut self, ended_at: Timestamp, mode: ElapsedMode) -> Option<CompletedRun> {
        if !self.is_in_progress() {
            return None;
        }
        let started_at = self.started_at?;
        let total_ms = ended_at.millis_since(started_at)?;
        let elapsed_ms = mode.apply(total_ms);
        self.elapsed_ms = Some(elapsed_ms);
        Some(CompletedRun {
            rider_id: self.rider_id,
            started_at,
            elapsed_ms,
        })
    }
}

/// A finished run, ready to report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompletedRun {
    /// Rider identity, if a card was read.
    pub rider_id: Option<u32>,
    /// Upper-sensor timestamp.
    pub started_at: Timestamp,
    /// Elapsed milliseconds (per the configured [`ElapsedMode`]).
    pub elapsed_ms: u64,
}

impl CompletedRun {
    /// Start plus elapsed time.
    pub fn ended_at(&self) -> Timestamp {
        self.started_at.add_ms(self.elapsed_ms)
    }
}
