//! Planner-wide search settings.

use crate::shared::Duration;

use super::nearby::{DEFAULT_DEPARTURES_PER_STOP, NearbyOptions};

/// Settings that apply to every query a [`super::Planner`] answers.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Time box for trips boarded after the first transit hop (minutes).
    /// A query's own time buffer wins when it is larger.
    pub later_hop_window_mins: u32,

    /// How far ahead the nearby departures listing looks (minutes).
    pub departures_window_mins: u32,

    /// Maximum departures listed per stop.
    pub departures_per_stop: usize,
}

impl SearchConfig {
    pub fn later_hop_window(&self) -> Duration {
        Duration::from_minutes(self.later_hop_window_mins)
    }

    pub fn nearby_options(&self) -> NearbyOptions {
        NearbyOptions {
            window: Duration::from_minutes(self.departures_window_mins),
            per_stop_limit: self.departures_per_stop,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            later_hop_window_mins: 180,
            departures_window_mins: 180,
            departures_per_stop: DEFAULT_DEPARTURES_PER_STOP,
        }
    }
}
