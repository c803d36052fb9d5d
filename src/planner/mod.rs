pub mod collector;
mod config;
pub mod expander;
pub mod locator;
pub mod nearby;
pub mod resolver;

pub use config::*;
pub use expander::DEFAULT_HUB_DEPTH;
pub use nearby::{Departure, NearbyOptions, NearbyStop};

use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::{
    repository::Repository,
    shared::{Coordinate, DEFAULT_WALKING_DISTANCE, Distance, Duration, TimeOfDay, time},
};
use resolver::{ResolveParams, Resolution, resolve};

pub const DEFAULT_TIME_BUFFER_MINS: u32 = 15;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    InvalidTimestamp(#[from] time::Error),
    #[error("Coordinate ({0}) is not a valid latitude/longitude pair")]
    InvalidCoordinate(Coordinate),
    #[error("Walking distance must be finite and not negative, got {0} ft")]
    InvalidDistance(f64),
}

/// One transfer point search, from `source` to `destination`.
#[derive(Debug, Clone)]
pub struct TransferQuery {
    pub source: Coordinate,
    pub destination: Coordinate,
    /// Departure time as published in a feed, e.g. `08:15` or `8:15 AM`.
    pub time_of_day: String,
    pub walking_distance: Distance,
    /// Time box for the first trip boarded from either end.
    pub time_buffer_minutes: u32,
    pub hub_depth: u8,
}

impl TransferQuery {
    pub fn new(source: Coordinate, destination: Coordinate, time_of_day: impl Into<String>) -> Self {
        Self {
            source,
            destination,
            time_of_day: time_of_day.into(),
            walking_distance: DEFAULT_WALKING_DISTANCE,
            time_buffer_minutes: DEFAULT_TIME_BUFFER_MINS,
            hub_depth: DEFAULT_HUB_DEPTH,
        }
    }

    pub fn walking_distance(mut self, walking_distance: Distance) -> Self {
        self.walking_distance = walking_distance;
        self
    }

    pub fn time_buffer_minutes(mut self, minutes: u32) -> Self {
        self.time_buffer_minutes = minutes;
        self
    }

    pub fn hub_depth(mut self, hub_depth: u8) -> Self {
        self.hub_depth = hub_depth;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferReport {
    /// Stop ids reachable from both ends, sorted.
    pub transfer_points: Vec<String>,
    pub source_stop_count: usize,
    pub source_trip_count: usize,
    pub dest_stop_count: usize,
    pub dest_trip_count: usize,
}

impl From<&Resolution> for TransferReport {
    fn from(value: &Resolution) -> Self {
        Self {
            transfer_points: value
                .sorted_transfer_points()
                .iter()
                .map(|id| id.to_string())
                .collect(),
            source_stop_count: value.source.stops.len(),
            source_trip_count: value.source.trips.len(),
            dest_stop_count: value.destination.stops.len(),
            dest_trip_count: value.destination.trips.len(),
        }
    }
}

/// Answers queries against a loaded [`Repository`].
///
/// The repository is only ever read, so one planner can serve many threads.
pub struct Planner<'a> {
    repository: &'a Repository,
    config: SearchConfig,
}

impl<'a> Planner<'a> {
    pub fn new(repository: &'a Repository) -> Self {
        Self {
            repository,
            config: SearchConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Runs both expansions and keeps their full results.
    pub fn resolve(&self, query: &TransferQuery) -> Result<Resolution, self::Error> {
        let params = self.resolve_params(query)?;
        let now = Instant::now();
        let resolution = resolve(self.repository, query.source, query.destination, &params);
        debug!(
            "Resolving {} -> {} took {:?}",
            query.source,
            query.destination,
            now.elapsed()
        );
        Ok(resolution)
    }

    pub fn find_transfer_points(&self, query: &TransferQuery) -> Result<TransferReport, self::Error> {
        let resolution = self.resolve(query)?;
        Ok(TransferReport::from(&resolution))
    }

    /// Answers independent queries in parallel. Results keep the input order.
    pub fn find_transfer_points_batch(
        &self,
        queries: &[TransferQuery],
    ) -> Vec<Result<TransferReport, self::Error>> {
        let now = Instant::now();
        let reports: Vec<_> = queries
            .par_iter()
            .map(|query| self.find_transfer_points(query))
            .collect();
        debug!("Batch of {} queries took {:?}", queries.len(), now.elapsed());
        reports
    }

    /// Stops near `point` with the trips about to reach them.
    pub fn departures_near(
        &self,
        point: Coordinate,
        radius: Distance,
        time: TimeOfDay,
        options: &NearbyOptions,
    ) -> Result<Vec<NearbyStop>, self::Error> {
        validate_coordinate(point)?;
        validate_radius(radius)?;
        let now = Instant::now();
        let stops = nearby::departures_near(self.repository, point, radius, time, options);
        debug!("Listing departures near {} took {:?}", point, now.elapsed());
        Ok(stops)
    }

    fn resolve_params(&self, query: &TransferQuery) -> Result<ResolveParams, self::Error> {
        let reference = TimeOfDay::parse(&query.time_of_day)?;
        validate_coordinate(query.source)?;
        validate_coordinate(query.destination)?;
        validate_radius(query.walking_distance)?;

        let first_hop_time_box = Duration::from_minutes(query.time_buffer_minutes);
        let later_hop_time_box = first_hop_time_box.max(self.config.later_hop_window());
        Ok(ResolveParams {
            reference,
            first_hop_time_box,
            later_hop_time_box,
            walk_radius: query.walking_distance,
            hub_depth: query.hub_depth,
        })
    }
}

fn validate_coordinate(coordinate: Coordinate) -> Result<(), self::Error> {
    if coordinate.is_valid() {
        Ok(())
    } else {
        Err(self::Error::InvalidCoordinate(coordinate))
    }
}

fn validate_radius(radius: Distance) -> Result<(), self::Error> {
    if radius.is_valid_radius() {
        Ok(())
    } else {
        Err(self::Error::InvalidDistance(radius.as_feet()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{Stop, StopTime, Trip};

    fn repository() -> Repository {
        let stop = |id: &str, lon: f64| Stop {
            id: id.into(),
            name: id.into(),
            code: None,
            coordinate: Coordinate::new(0.0, lon),
        };
        let call = |stop: &str, arrival: &str, sequence: u32| StopTime {
            trip_id: "T1".into(),
            stop_id: stop.into(),
            arrival_time: arrival.into(),
            departure_time: arrival.into(),
            sequence,
        };
        Repository::from_records(
            vec![stop("A", 0.0), stop("B", 0.001), stop("C", 0.002)],
            vec![Trip {
                id: "T1".into(),
                route_id: "R1".into(),
                ..Default::default()
            }],
            vec![
                call("A", "08:00:00", 1),
                call("B", "08:05:00", 2),
                call("C", "08:10:00", 3),
            ],
        )
    }

    #[test]
    fn report_is_sorted() {
        let repository = repository();
        let planner = Planner::new(&repository);
        let here = Coordinate::new(0.0, 0.001);
        let report = planner
            .find_transfer_points(&TransferQuery::new(here, here, "7:55 AM"))
            .unwrap();
        assert_eq!(report.transfer_points, vec!["A", "B", "C"]);
        assert_eq!(report.source_trip_count, 1);
        assert_eq!(report.dest_trip_count, 1);
    }

    #[test]
    fn rejects_bad_time() {
        let repository = repository();
        let planner = Planner::new(&repository);
        let here = Coordinate::new(0.0, 0.0);
        let err = planner
            .find_transfer_points(&TransferQuery::new(here, here, "25:99"))
            .unwrap_err();
        assert_eq!(
            err,
            Error::InvalidTimestamp(time::Error::InvalidTimestamp("25:99".into()))
        );
    }

    #[test]
    fn rejects_bad_inputs() {
        let repository = repository();
        let planner = Planner::new(&repository);
        let here = Coordinate::new(0.0, 0.0);

        let query = TransferQuery::new(Coordinate::new(91.0, 0.0), here, "08:00");
        assert!(matches!(
            planner.find_transfer_points(&query),
            Err(Error::InvalidCoordinate(_))
        ));

        let query = TransferQuery::new(here, here, "08:00").walking_distance(Distance::from_feet(-1.0));
        assert!(matches!(
            planner.find_transfer_points(&query),
            Err(Error::InvalidDistance(_))
        ));
    }

    #[test]
    fn later_hops_never_narrower_than_first() {
        let repository = repository();
        let planner = Planner::new(&repository).with_config(SearchConfig {
            later_hop_window_mins: 5,
            ..Default::default()
        });
        let here = Coordinate::new(0.0, 0.0);
        let params = planner
            .resolve_params(&TransferQuery::new(here, here, "08:00").time_buffer_minutes(30))
            .unwrap();
        assert_eq!(params.later_hop_time_box, Duration::from_minutes(30));
    }

    #[test]
    fn huge_time_buffer_is_accepted() {
        let repository = repository();
        let planner = Planner::new(&repository).with_config(SearchConfig {
            later_hop_window_mins: u32::MAX,
            ..Default::default()
        });
        let here = Coordinate::new(0.0, 0.0);
        let query = TransferQuery::new(here, here, "00:00").time_buffer_minutes(100_000_000);
        let report = planner.find_transfer_points(&query).unwrap();
        assert_eq!(report.source_trip_count, 1);
        assert_eq!(report.transfer_points, vec!["A", "B", "C"]);

        let options = NearbyOptions {
            window: Duration::from_minutes(u32::MAX),
            per_stop_limit: 5,
        };
        let stops = planner
            .departures_near(here, Distance::from_feet(100.0), TimeOfDay::from_seconds(0), &options)
            .unwrap();
        assert_eq!(stops[0].departures.len(), 1);
    }

    #[test]
    fn batch_keeps_order() {
        let repository = repository();
        let planner = Planner::new(&repository);
        let here = Coordinate::new(0.0, 0.0);
        let far = Coordinate::new(45.0, 45.0);
        let reports = planner.find_transfer_points_batch(&[
            TransferQuery::new(here, here, "07:55"),
            TransferQuery::new(here, far, "07:55"),
            TransferQuery::new(here, here, "bogus"),
        ]);
        assert_eq!(reports.len(), 3);
        assert!(!reports[0].as_ref().unwrap().transfer_points.is_empty());
        assert!(reports[1].as_ref().unwrap().transfer_points.is_empty());
        assert!(reports[2].is_err());
    }
}
