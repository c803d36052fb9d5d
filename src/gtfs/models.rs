//! Raw records as they appear in the feed files.
//!
//! Only the columns the planner reads are declared; any other column in a
//! feed is ignored. Optional numeric columns fall back to `None` when the
//! value cannot be read instead of failing the whole load.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GtfsAgency {
    pub agency_id: Option<String>,
    pub agency_name: String,
    pub agency_url: Option<String>,
    pub agency_timezone: Option<String>,
    pub agency_email: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GtfsRoute {
    pub route_id: String,
    pub agency_id: Option<String>,
    pub route_short_name: Option<String>,
    pub route_long_name: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub route_type: Option<i32>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GtfsStop {
    pub stop_id: String,
    pub stop_code: Option<String>,
    #[serde(default)]
    pub stop_name: String,
    pub stop_lat: f64,
    pub stop_lon: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GtfsTrip {
    pub route_id: String,
    pub trip_id: String,
    pub trip_headsign: Option<String>,
    pub trip_short_name: Option<String>,
}

/// Arrival and departure stay as published text; they are validated per row
/// when a query reads them.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GtfsStopTime {
    pub trip_id: String,
    #[serde(default)]
    pub arrival_time: String,
    #[serde(default)]
    pub departure_time: String,
    pub stop_id: String,
    pub stop_sequence: u32,
}
