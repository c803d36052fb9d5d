use std::{collections::HashSet, sync::Arc};

use thiserror::Error;
use tracing::warn;

use crate::{
    repository::StopTime,
    shared::{Duration, TimeOfDay},
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("published arrival time <{0}> is unintelligible")]
    UnparsableArrival(Arc<str>),
}

/// A stop time row that could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub trip_id: Arc<str>,
    pub stop_id: Arc<str>,
    pub reason: SkipReason,
}

/// What a single stop time row contributes to a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// The trip reaches the stop inside the time box. `minutes_away` is only
    /// known when the scan had a reference time.
    Accepted {
        trip_id: Arc<str>,
        minutes_away: Option<i64>,
    },
    OutsideWindow {
        trip_id: Arc<str>,
        minutes_away: i64,
    },
    Skipped(SkippedRow),
}

/// Aggregate of every row a [`trips_serving`] call looked at.
#[derive(Debug, Clone, Default)]
pub struct TripScan {
    pub trips: HashSet<Arc<str>>,
    pub skipped: Vec<SkippedRow>,
    pub outside_window: usize,
}

impl TripScan {
    fn record(&mut self, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Accepted { trip_id, .. } => {
                self.trips.insert(trip_id);
            }
            RowOutcome::OutsideWindow { .. } => self.outside_window += 1,
            RowOutcome::Skipped(row) => self.skipped.push(row),
        }
    }
}

/// Evaluates one row against an optional reference time.
///
/// With a reference, the row is accepted when the arrival falls `0..=time_box`
/// minutes after it. Without one, any row with a readable arrival is accepted.
pub fn evaluate_row(
    stop_time: &StopTime,
    reference: Option<TimeOfDay>,
    time_box: Duration,
) -> RowOutcome {
    let arrival = match TimeOfDay::parse(&stop_time.arrival_time) {
        Ok(arrival) => arrival,
        Err(_) => {
            return RowOutcome::Skipped(SkippedRow {
                trip_id: stop_time.trip_id.clone(),
                stop_id: stop_time.stop_id.clone(),
                reason: SkipReason::UnparsableArrival(stop_time.arrival_time.clone()),
            });
        }
    };

    let Some(reference) = reference else {
        return RowOutcome::Accepted {
            trip_id: stop_time.trip_id.clone(),
            minutes_away: None,
        };
    };

    let minutes_away = reference.minutes_until(arrival);
    if (0..=time_box.as_minutes()).contains(&minutes_away) {
        RowOutcome::Accepted {
            trip_id: stop_time.trip_id.clone(),
            minutes_away: Some(minutes_away),
        }
    } else {
        RowOutcome::OutsideWindow {
            trip_id: stop_time.trip_id.clone(),
            minutes_away,
        }
    }
}

/// Distinct trips calling at `stop_id` inside the time box.
///
/// Rows for other stops are ignored, so the full stop time table can be
/// passed as well as a pre-filtered slice.
pub fn trips_serving<'a, I>(
    stop_times: I,
    stop_id: &str,
    reference: Option<TimeOfDay>,
    time_box: Duration,
) -> TripScan
where
    I: IntoIterator<Item = &'a StopTime>,
{
    let mut scan = TripScan::default();
    stop_times
        .into_iter()
        .filter(|stop_time| stop_time.stop_id.as_ref() == stop_id)
        .for_each(|stop_time| scan.record(evaluate_row(stop_time, reference, time_box)));
    scan
}

pub(crate) fn log_skipped(skipped: &[SkippedRow]) {
    for row in skipped {
        warn!(
            "Skipping trip {} at stop {}: {}",
            row.trip_id, row.stop_id, row.reason
        );
    }
}
