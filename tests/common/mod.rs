#![allow(dead_code)]

use std::{fs, io::Write, path::Path};

use zip::{ZipWriter, write::SimpleFileOptions};

pub const STOPS: &str = "\
stop_id,stop_code,stop_name,stop_lat,stop_lon
A,100,Alpha,0.0,0.0
B,,Bravo,0.0,0.001
C,,Charlie,0.0,0.002
";

pub const TRIPS: &str = "\
route_id,service_id,trip_id,trip_headsign
R1,WK,T1,Eastbound
";

pub const STOP_TIMES: &str = "\
trip_id,arrival_time,departure_time,stop_id,stop_sequence
T1,08:00:00,08:00:00,A,1
T1,08:05:00,08:05:00,B,2
T1,08:10:00,08:10:00,C,3
";

pub const AGENCY: &str = "\
agency_id,agency_name,agency_url,agency_timezone,agency_email
MTA,Metro Transit,https://example.org,America/New_York,help@example.org
";

pub const ROUTES: &str = "\
route_id,agency_id,route_short_name,route_long_name,route_type
R1,MTA,1,Crosstown,3
";

/// The three stop line used across the tests, with agency and routes.
pub fn line_feed() -> Vec<(&'static str, &'static str)> {
    vec![
        ("agency.txt", AGENCY),
        ("routes.txt", ROUTES),
        ("stops.txt", STOPS),
        ("trips.txt", TRIPS),
        ("stop_times.txt", STOP_TIMES),
    ]
}

pub fn write_dir(dir: &Path, files: &[(&str, &str)]) {
    for (name, contents) in files {
        fs::write(dir.join(name), contents).unwrap();
    }
}

pub fn write_zip(path: &Path, files: &[(&str, &str)]) {
    let file = fs::File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    for (name, contents) in files {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(contents.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}
