use crate::{
    gtfs::{self, GtfsReader},
    repository::{Agency, Repository, Route, Stop, StopTime, Trip},
};
use std::time::Instant;
use tracing::debug;

impl Repository {
    /// Reads every table of the feed into the repository.
    ///
    /// Any loader failure aborts the whole load: a repository is either built
    /// from a complete feed or not at all. `agency.txt` and `routes.txt` are
    /// optional since the planner never needs them.
    pub fn load_gtfs(mut self, gtfs: GtfsReader) -> Result<Self, gtfs::Error> {
        self.load_agencies(&gtfs)?;
        self.load_routes(&gtfs)?;
        self.load_stops(&gtfs)?;
        self.load_trips(&gtfs)?;
        self.load_stop_times(&gtfs)?;
        Ok(self)
    }

    fn load_agencies(&mut self, gtfs: &GtfsReader) -> Result<(), gtfs::Error> {
        debug!("Loading agencies...");
        let now = Instant::now();
        let mut agencies: Vec<Agency> = Vec::new();
        optional(gtfs.stream_agencies(|(_, agency)| agencies.push(agency.into())))?;
        self.agencies = agencies.into();
        debug!("Loading agencies took {:?}", now.elapsed());
        Ok(())
    }

    fn load_routes(&mut self, gtfs: &GtfsReader) -> Result<(), gtfs::Error> {
        debug!("Loading routes...");
        let now = Instant::now();
        let mut routes: Vec<Route> = Vec::new();
        optional(gtfs.stream_routes(|(_, route)| routes.push(route.into())))?;
        self.routes = routes.into();
        debug!("Loading routes took {:?}", now.elapsed());
        Ok(())
    }

    fn load_stops(&mut self, gtfs: &GtfsReader) -> Result<(), gtfs::Error> {
        debug!("Loading stops...");
        let now = Instant::now();
        let mut stops: Vec<Stop> = Vec::new();
        gtfs.stream_stops(|(_, stop)| stops.push(stop.into()))?;
        self.insert_stops(stops);
        debug!("Loading {} stops took {:?}", self.stops.len(), now.elapsed());
        Ok(())
    }

    fn load_trips(&mut self, gtfs: &GtfsReader) -> Result<(), gtfs::Error> {
        debug!("Loading trips...");
        let now = Instant::now();
        let mut trips: Vec<Trip> = Vec::new();
        gtfs.stream_trips(|(_, trip)| trips.push(trip.into()))?;
        self.insert_trips(trips);
        debug!("Loading {} trips took {:?}", self.trips.len(), now.elapsed());
        Ok(())
    }

    fn load_stop_times(&mut self, gtfs: &GtfsReader) -> Result<(), gtfs::Error> {
        debug!("Loading stop times...");
        let now = Instant::now();
        let mut stop_times: Vec<StopTime> = Vec::new();
        gtfs.stream_stop_times(|(_, stop_time)| stop_times.push(stop_time.into()))?;
        self.insert_stop_times(stop_times);
        debug!(
            "Loading {} stop times took {:?}",
            self.stop_times.len(),
            now.elapsed()
        );
        Ok(())
    }
}

fn optional(result: Result<(), gtfs::Error>) -> Result<(), gtfs::Error> {
    match result {
        Err(err) if err.is_missing_file() => {
            debug!("Skipping optional table: {err}");
            Ok(())
        }
        other => other,
    }
}
