use serde::Serialize;

use crate::{
    planner::{
        collector::{RowOutcome, SkippedRow, evaluate_row, log_skipped},
        locator::stops_within,
    },
    repository::{Repository, Stop},
    shared::{Coordinate, Distance, Duration, TimeOfDay},
};

pub const DEFAULT_DEPARTURES_WINDOW: Duration = Duration::from_hours(3);
pub const DEFAULT_DEPARTURES_PER_STOP: usize = 20;

#[derive(Debug, Clone, Copy)]
pub struct NearbyOptions {
    /// How far ahead of the reference time to look.
    pub window: Duration,
    pub per_stop_limit: usize,
}

impl Default for NearbyOptions {
    fn default() -> Self {
        Self {
            window: DEFAULT_DEPARTURES_WINDOW,
            per_stop_limit: DEFAULT_DEPARTURES_PER_STOP,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Departure {
    pub trip_id: String,
    pub headsign: Option<String>,
    pub minutes_away: i64,
    pub arrival_time: String,
    pub departure_time: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NearbyStop {
    pub stop_id: String,
    pub name: String,
    pub code: Option<String>,
    pub coordinate: Coordinate,
    pub distance: Distance,
    pub departures: Vec<Departure>,
}

/// Stops within `radius` of `point`, closest first, each with the trips
/// reaching it inside the window, soonest first.
pub fn departures_near(
    repository: &Repository,
    point: Coordinate,
    radius: Distance,
    reference: TimeOfDay,
    options: &NearbyOptions,
) -> Vec<NearbyStop> {
    let mut nearby: Vec<NearbyStop> = stops_within(repository.stops(), &point, radius)
        .iter()
        .filter_map(|id| repository.stop_by_id(id))
        .map(|stop| {
            let departures = upcoming(repository, stop, reference, options);
            NearbyStop {
                stop_id: stop.id.to_string(),
                name: stop.name.to_string(),
                code: stop.code.as_ref().map(|code| code.to_string()),
                coordinate: stop.coordinate,
                distance: point.distance(&stop.coordinate),
                departures,
            }
        })
        .collect();

    nearby.sort_by(|a, b| {
        a.distance
            .as_feet()
            .total_cmp(&b.distance.as_feet())
            .then_with(|| a.stop_id.cmp(&b.stop_id))
    });
    nearby
}

fn upcoming(
    repository: &Repository,
    stop: &Stop,
    reference: TimeOfDay,
    options: &NearbyOptions,
) -> Vec<Departure> {
    let mut skipped: Vec<SkippedRow> = Vec::new();
    let mut departures: Vec<Departure> = Vec::new();

    for stop_time in repository.stop_times_by_stop_id(&stop.id) {
        match evaluate_row(stop_time, Some(reference), options.window) {
            RowOutcome::Accepted {
                trip_id,
                minutes_away,
            } => departures.push(Departure {
                headsign: repository
                    .trip_by_id(&trip_id)
                    .and_then(|trip| trip.headsign.as_ref())
                    .map(|headsign| headsign.to_string()),
                trip_id: trip_id.to_string(),
                minutes_away: minutes_away.unwrap_or_default(),
                arrival_time: stop_time.arrival_time.to_string(),
                departure_time: stop_time.departure_time.to_string(),
            }),
            RowOutcome::OutsideWindow { .. } => {}
            RowOutcome::Skipped(row) => skipped.push(row),
        }
    }
    log_skipped(&skipped);

    departures.sort_by(|a, b| {
        a.minutes_away
            .cmp(&b.minutes_away)
            .then_with(|| a.trip_id.cmp(&b.trip_id))
    });
    departures.truncate(options.per_stop_limit);
    departures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{StopTime, Trip};

    fn stop(id: &str, lat: f64, lon: f64) -> Stop {
        Stop {
            id: id.into(),
            name: format!("Stop {id}").into(),
            code: None,
            coordinate: Coordinate::new(lat, lon),
        }
    }

    fn call(trip: &str, stop: &str, arrival: &str) -> StopTime {
        StopTime {
            trip_id: trip.into(),
            stop_id: stop.into(),
            arrival_time: arrival.into(),
            departure_time: arrival.into(),
            sequence: 1,
        }
    }

    fn repository() -> Repository {
        Repository::from_records(
            vec![stop("A", 0.0, 0.0), stop("B", 0.0, 0.001), stop("Z", 1.0, 1.0)],
            vec![Trip {
                id: "T1".into(),
                route_id: "R".into(),
                headsign: Some("Downtown".into()),
                short_name: None,
            }],
            vec![
                call("T1", "A", "08:30:00"),
                call("T2", "A", "08:10:00"),
                call("T3", "A", "12:00:00"),
                call("T4", "A", "07:00:00"),
                call("T5", "A", "garbage"),
                call("T6", "B", "08:00:00"),
            ],
        )
    }

    #[test]
    fn closest_stop_first() {
        let repository = repository();
        let stops = departures_near(
            &repository,
            Coordinate::new(0.0, 0.0001),
            Distance::from_feet(1000.0),
            TimeOfDay::parse("08:00").unwrap(),
            &NearbyOptions::default(),
        );
        let ids: Vec<&str> = stops.iter().map(|stop| stop.stop_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert!(stops[0].distance < stops[1].distance);
    }

    #[test]
    fn departures_sorted_and_windowed() {
        let repository = repository();
        let stops = departures_near(
            &repository,
            Coordinate::new(0.0, 0.0),
            Distance::from_feet(100.0),
            TimeOfDay::parse("08:00").unwrap(),
            &NearbyOptions::default(),
        );
        assert_eq!(stops.len(), 1);
        let trips: Vec<&str> = stops[0]
            .departures
            .iter()
            .map(|departure| departure.trip_id.as_str())
            .collect();
        assert_eq!(trips, vec!["T2", "T1"]);
        assert_eq!(stops[0].departures[0].minutes_away, 10);
        assert_eq!(stops[0].departures[1].headsign.as_deref(), Some("Downtown"));
    }

    #[test]
    fn per_stop_limit_truncates() {
        let repository = repository();
        let options = NearbyOptions {
            window: Duration::from_hours(12),
            per_stop_limit: 1,
        };
        let stops = departures_near(
            &repository,
            Coordinate::new(0.0, 0.0),
            Distance::from_feet(100.0),
            TimeOfDay::parse("08:00").unwrap(),
            &options,
        );
        assert_eq!(stops[0].departures.len(), 1);
        assert_eq!(stops[0].departures[0].trip_id, "T2");
    }
}
