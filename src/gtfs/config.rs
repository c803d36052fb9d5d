/// File names of the tables inside a feed.
pub struct Config {
    pub agency_file_name: String,
    pub routes_file_name: String,
    pub stops_file_name: String,
    pub trips_file_name: String,
    pub stop_times_file_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            agency_file_name: "agency.txt".into(),
            routes_file_name: "routes.txt".into(),
            stops_file_name: "stops.txt".into(),
            trips_file_name: "trips.txt".into(),
            stop_times_file_name: "stop_times.txt".into(),
        }
    }
}
