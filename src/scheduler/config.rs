//! Scheduler configuration.

use serde::{Deserialize, Serialize};

/// Tuning knobs for [`LineupScheduler`](super::LineupScheduler).
///
/// Deserializes from partial documents; missing fields take their
/// defaults.
///
/// ```
/// use u_roster::scheduler::SchedulerConfig;
///
/// let config = SchedulerConfig::default().with_seed(7);
/// assert_eq!(config.candidate_window, 3);
/// assert_eq!(config.seed, Some(7));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// How many of the least-assigned candidates a pick is drawn from.
    ///
    /// `1` makes the run deterministic (always the least-assigned
    /// candidate); `0` behaves like `1`.
    pub candidate_window: usize,
    /// Seed for the random source. `None` uses the thread RNG.
    pub seed: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            candidate_window: 3,
            seed: None,
        }
    }
}

impl SchedulerConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the candidate window.
    pub fn with_candidate_window(mut self, window: usize) -> Self {
        self.candidate_window = window;
        self
    }

    /// Sets a fixed seed for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Candidate window, never below one.
    pub(crate) fn effective_window(&self) -> usize {
        self.candidate_window.max(1)
    }
}
