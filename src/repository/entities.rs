use std::sync::Arc;

use crate::{
    gtfs::models::{GtfsAgency, GtfsRoute, GtfsStop, GtfsStopTime, GtfsTrip},
    shared::geo::Coordinate,
};

/// A physical point where passengers can board or alight from a vehicle.
#[derive(Debug, Default, Clone)]
pub struct Stop {
    /// Unique external identifier for the stop.
    pub id: Arc<str>,
    /// Human-readable name (e.g., "Peachtree St & 5th St").
    pub name: Arc<str>,
    /// Short rider-facing code, when the agency publishes one.
    pub code: Option<Arc<str>>,
    pub coordinate: Coordinate,
}

impl From<GtfsStop> for Stop {
    fn from(value: GtfsStop) -> Self {
        Self {
            id: value.stop_id.into(),
            name: value.stop_name.into(),
            code: value.stop_code.map(|val| val.into()),
            coordinate: Coordinate::new(value.stop_lat, value.stop_lon),
        }
    }
}

/// Individual event within a trip where a vehicle calls at a stop.
#[derive(Debug, Default, Clone)]
pub struct StopTime {
    pub trip_id: Arc<str>,
    /// Stop served by this call. Not guaranteed to exist in the stop table.
    pub stop_id: Arc<str>,
    /// Published arrival, validated only when a query reads it.
    pub arrival_time: Arc<str>,
    /// Published departure, validated only when a query reads it.
    pub departure_time: Arc<str>,
    /// The order of this stop within the trip.
    pub sequence: u32,
}

impl From<GtfsStopTime> for StopTime {
    fn from(value: GtfsStopTime) -> Self {
        Self {
            trip_id: value.trip_id.into(),
            stop_id: value.stop_id.into(),
            arrival_time: value.arrival_time.into(),
            departure_time: value.departure_time.into(),
            sequence: value.stop_sequence,
        }
    }
}

/// A specific journey taken by a vehicle through a sequence of stops.
#[derive(Debug, Default, Clone)]
pub struct Trip {
    pub id: Arc<str>,
    /// Pointer to the parent [`Route`].
    pub route_id: Arc<str>,
    pub headsign: Option<Arc<str>>,
    pub short_name: Option<Arc<str>>,
}

impl From<GtfsTrip> for Trip {
    fn from(value: GtfsTrip) -> Self {
        Self {
            id: value.trip_id.into(),
            route_id: value.route_id.into(),
            headsign: value.trip_headsign.map(|val| val.into()),
            short_name: value.trip_short_name.map(|val| val.into()),
        }
    }
}

/// A grouping of trips that are displayed to riders under a single name (e.g., "Blue Line").
#[derive(Debug, Default, Clone)]
pub struct Route {
    pub id: Arc<str>,
    pub agency_id: Option<Arc<str>>,
    pub short_name: Option<Arc<str>>,
    pub long_name: Option<Arc<str>>,
    /// Classification of the vehicle (0: Tram, 1: Subway, 3: Bus, etc.).
    pub route_type: Option<i32>,
}

impl From<GtfsRoute> for Route {
    fn from(value: GtfsRoute) -> Self {
        Self {
            id: value.route_id.into(),
            agency_id: value.agency_id.map(|val| val.into()),
            short_name: value.route_short_name.map(|val| val.into()),
            long_name: value.route_long_name.map(|val| val.into()),
            route_type: value.route_type,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct Agency {
    pub id: Option<Arc<str>>,
    pub name: Arc<str>,
    pub url: Option<Arc<str>>,
    pub timezone: Option<Arc<str>>,
    pub email: Option<Arc<str>>,
}

impl From<GtfsAgency> for Agency {
    fn from(value: GtfsAgency) -> Self {
        Self {
            id: value.agency_id.map(|val| val.into()),
            name: value.agency_name.into(),
            url: value.agency_url.map(|val| val.into()),
            timezone: value.agency_timezone.map(|val| val.into()),
            email: value.agency_email.map(|val| val.into()),
        }
    }
}
