use std::{collections::HashMap, sync::Arc};

mod entities;
mod source;
pub use entities::*;

use rayon::prelude::*;
use tracing::warn;

type IdToIndex = HashMap<Arc<str>, u32>;
type IdToIndexes = HashMap<Arc<str>, Box<[u32]>>;

/// Immutable, in-memory snapshot of a feed.
///
/// Built once, then shared read-only by every query. Nothing in the planner
/// mutates it, so one repository can serve concurrent queries.
#[derive(Debug, Clone, Default)]
pub struct Repository {
    pub(crate) agencies: Box<[Agency]>,
    pub(crate) routes: Box<[Route]>,
    pub(crate) stops: HashMap<Arc<str>, Stop>,
    pub(crate) trips: Box<[Trip]>,
    pub(crate) stop_times: Box<[StopTime]>,

    trip_lookup: IdToIndex,
    stop_to_stop_times: IdToIndexes,
    trip_to_stop_times: IdToIndexes,
}

impl Repository {
    pub fn new() -> Self {
        Default::default()
    }

    /// Builds a repository from records already in memory.
    pub fn from_records(stops: Vec<Stop>, trips: Vec<Trip>, stop_times: Vec<StopTime>) -> Self {
        let mut repository = Self::new();
        repository.insert_stops(stops);
        repository.insert_trips(trips);
        repository.insert_stop_times(stop_times);
        repository
    }

    pub(crate) fn insert_stops(&mut self, stops: Vec<Stop>) {
        let mut lookup: HashMap<Arc<str>, Stop> = HashMap::with_capacity(stops.len());
        for stop in stops {
            if lookup.contains_key(&stop.id) {
                warn!("Duplicate stop id {}, keeping the first record", stop.id);
                continue;
            }
            lookup.insert(stop.id.clone(), stop);
        }
        self.stops = lookup;
    }

    pub(crate) fn insert_trips(&mut self, trips: Vec<Trip>) {
        let mut trip_lookup: IdToIndex = HashMap::with_capacity(trips.len());
        trips.iter().enumerate().for_each(|(i, trip)| {
            trip_lookup.entry(trip.id.clone()).or_insert(i as u32);
        });
        self.trips = trips.into();
        self.trip_lookup = trip_lookup;
    }

    /// Stores stop times grouped by trip and ordered by sequence, then
    /// indexes them by stop and by trip.
    pub(crate) fn insert_stop_times(&mut self, mut stop_times: Vec<StopTime>) {
        stop_times.par_sort_by(|a, b| {
            a.trip_id
                .cmp(&b.trip_id)
                .then_with(|| a.sequence.cmp(&b.sequence))
        });

        let mut stop_to_stop_times: HashMap<Arc<str>, Vec<u32>> = HashMap::new();
        let mut trip_to_stop_times: HashMap<Arc<str>, Vec<u32>> = HashMap::new();
        let mut dangling = 0usize;
        stop_times.iter().enumerate().for_each(|(i, stop_time)| {
            if !self.stops.contains_key(&stop_time.stop_id) {
                dangling += 1;
            }
            stop_to_stop_times
                .entry(stop_time.stop_id.clone())
                .or_default()
                .push(i as u32);
            trip_to_stop_times
                .entry(stop_time.trip_id.clone())
                .or_default()
                .push(i as u32);
        });
        if dangling > 0 {
            warn!("{dangling} stop times reference stops missing from the stop table");
        }

        self.stop_times = stop_times.into();
        self.stop_to_stop_times = stop_to_stop_times
            .into_iter()
            .map(|(key, value)| (key, value.into()))
            .collect();
        self.trip_to_stop_times = trip_to_stop_times
            .into_iter()
            .map(|(key, value)| (key, value.into()))
            .collect();
    }

    /// All stops keyed by id. Iteration order is unspecified.
    pub fn stops(&self) -> &HashMap<Arc<str>, Stop> {
        &self.stops
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn stop_times(&self) -> &[StopTime] {
        &self.stop_times
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn agencies(&self) -> &[Agency] {
        &self.agencies
    }

    /// Get a stop with the given id.
    /// If no stop is found with the given id None is returned.
    pub fn stop_by_id(&self, id: &str) -> Option<&Stop> {
        self.stops.get(id)
    }

    /// Gets a trip with the given id.
    /// If no trip with the given id was found None is returned.
    pub fn trip_by_id(&self, id: &str) -> Option<&Trip> {
        let trip_idx = self.trip_lookup.get(id)?;
        Some(&self.trips[*trip_idx as usize])
    }

    pub fn route_by_id(&self, id: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.id.as_ref() == id)
    }

    /// Every stop time calling at the given stop, in no particular order.
    pub fn stop_times_by_stop_id(&self, stop_id: &str) -> Vec<&StopTime> {
        self.stop_to_stop_times
            .get(stop_id)
            .map(|indexes| self.indexed(indexes))
            .unwrap_or_default()
    }

    /// The stop times of a trip, ordered by sequence.
    pub fn stop_times_by_trip_id(&self, trip_id: &str) -> Vec<&StopTime> {
        self.trip_to_stop_times
            .get(trip_id)
            .map(|indexes| self.indexed(indexes))
            .unwrap_or_default()
    }

    fn indexed(&self, indexes: &[u32]) -> Vec<&StopTime> {
        indexes
            .iter()
            .map(|idx| &self.stop_times[*idx as usize])
            .collect()
    }
}
