mod common;

use common::{STOP_TIMES, STOPS, TRIPS, line_feed, write_dir, write_zip};
use hubhop::{
    gtfs::{self, GtfsReader},
    repository::Repository,
};
use tempfile::tempdir;

fn load_dir(files: &[(&str, &str)]) -> Result<Repository, gtfs::Error> {
    let dir = tempdir().unwrap();
    write_dir(dir.path(), files);
    let gtfs = GtfsReader::new().from_dir(dir.path())?;
    Repository::new().load_gtfs(gtfs)
}

#[test]
fn load_from_dir_test() {
    let repository = load_dir(&line_feed()).unwrap();
    assert_eq!(repository.stops().len(), 3);
    assert_eq!(repository.trips().len(), 1);
    assert_eq!(repository.stop_times().len(), 3);
    assert_eq!(repository.routes().len(), 1);

    let alpha = repository.stop_by_id("A").unwrap();
    assert_eq!(alpha.name.as_ref(), "Alpha");
    assert_eq!(alpha.code.as_deref(), Some("100"));
    assert!(repository.stop_by_id("B").unwrap().code.is_none());

    let agency = &repository.agencies()[0];
    assert_eq!(agency.email.as_deref(), Some("help@example.org"));

    let trip = repository.trip_by_id("T1").unwrap();
    assert_eq!(trip.headsign.as_deref(), Some("Eastbound"));
    assert_eq!(
        repository.route_by_id("R1").unwrap().long_name.as_deref(),
        Some("Crosstown")
    );
}

#[test]
fn zip_and_dir_load_identically() {
    let dir = tempdir().unwrap();
    let zip_path = dir.path().join("feed.zip");
    write_zip(&zip_path, &line_feed());

    let from_zip = Repository::new()
        .load_gtfs(GtfsReader::new().from_zip(&zip_path).unwrap())
        .unwrap();
    let from_dir = load_dir(&line_feed()).unwrap();

    assert_eq!(from_zip.stops().len(), from_dir.stops().len());
    assert_eq!(from_zip.stop_times().len(), from_dir.stop_times().len());
    let order = |repository: &Repository| -> Vec<String> {
        repository
            .stop_times_by_trip_id("T1")
            .into_iter()
            .map(|stop_time| stop_time.stop_id.to_string())
            .collect()
    };
    assert_eq!(order(&from_zip), order(&from_dir));
}

#[test]
fn open_detects_storage() {
    let dir = tempdir().unwrap();
    write_dir(dir.path(), &line_feed());
    let reader = GtfsReader::new().open(dir.path()).unwrap();
    assert!(matches!(reader.storage(), gtfs::StorageType::Directory(_)));

    let zip_path = dir.path().join("feed.zip");
    write_zip(&zip_path, &line_feed());
    let reader = GtfsReader::new().open(&zip_path).unwrap();
    assert!(matches!(reader.storage(), gtfs::StorageType::Zip(_)));
}

#[test]
fn quoted_fields_test() {
    let stops = "\
stop_id,stop_name,stop_lat,stop_lon
\"Q1\",\"Main St, \"\"North\"\" Entrance\",0.0,0.0
  Q2,  Padded,  0.5,  0.5
";
    let stop_times = "trip_id,arrival_time,departure_time,stop_id,stop_sequence\n";
    let repository = load_dir(&[
        ("stops.txt", stops),
        ("trips.txt", TRIPS),
        ("stop_times.txt", stop_times),
    ])
    .unwrap();
    assert_eq!(
        repository.stop_by_id("Q1").unwrap().name.as_ref(),
        "Main St, \"North\" Entrance"
    );
    let padded = repository.stop_by_id("Q2").unwrap();
    assert_eq!(padded.name.as_ref(), "Padded");
    assert_eq!(padded.coordinate.latitude, 0.5);
}

#[test]
fn optional_tables_may_be_missing() {
    let repository = load_dir(&[
        ("stops.txt", STOPS),
        ("trips.txt", TRIPS),
        ("stop_times.txt", STOP_TIMES),
    ])
    .unwrap();
    assert!(repository.agencies().is_empty());
    assert!(repository.routes().is_empty());
    assert_eq!(repository.stops().len(), 3);
}

#[test]
fn missing_file_test() {
    let err = load_dir(&[("stops.txt", STOPS), ("trips.txt", TRIPS)]).unwrap_err();
    match err {
        gtfs::Error::MissingFile(file) => assert!(file.ends_with("stop_times.txt")),
        other => panic!("expected MissingFile, got {other:?}"),
    }

    let dir = tempdir().unwrap();
    let err = GtfsReader::new()
        .from_dir(dir.path().join("nowhere"))
        .err()
        .unwrap();
    assert!(err.is_missing_file());
}

#[test]
fn missing_file_in_zip_test() {
    let dir = tempdir().unwrap();
    let zip_path = dir.path().join("feed.zip");
    write_zip(&zip_path, &[("stops.txt", STOPS)]);
    let err = Repository::new()
        .load_gtfs(GtfsReader::new().from_zip(&zip_path).unwrap())
        .unwrap_err();
    assert!(matches!(err, gtfs::Error::MissingFile(file) if file == "trips.txt"));
}

#[test]
fn missing_required_field_test() {
    let stops = "\
stop_id,stop_name,stop_lon
A,Alpha,0.0
";
    let err = load_dir(&[
        ("stops.txt", stops),
        ("trips.txt", TRIPS),
        ("stop_times.txt", STOP_TIMES),
    ])
    .unwrap_err();
    match err {
        gtfs::Error::MissingRequiredField { file, .. } => assert_eq!(file, "stops.txt"),
        other => panic!("expected MissingRequiredField, got {other:?}"),
    }
}

#[test]
fn unreadable_coordinate_test() {
    let stops = "\
stop_id,stop_name,stop_lat,stop_lon
A,Alpha,0.0,0.0
B,Bravo,north,0.0
";
    let err = load_dir(&[
        ("stops.txt", stops),
        ("trips.txt", TRIPS),
        ("stop_times.txt", STOP_TIMES),
    ])
    .unwrap_err();
    assert!(matches!(
        err,
        gtfs::Error::MissingRequiredField { line: 3, .. }
    ));
}

#[test]
fn malformed_quoting_test() {
    let stops = "\
stop_id,stop_name,stop_lat,stop_lon
A,\"Alpha,0.0,0.0
B,Bravo,0.0,0.001
";
    let err = load_dir(&[
        ("stops.txt", stops),
        ("trips.txt", TRIPS),
        ("stop_times.txt", STOP_TIMES),
    ])
    .unwrap_err();
    assert!(matches!(
        err,
        gtfs::Error::MalformedQuoting { ref file, .. } if file == "stops.txt"
    ));
}

#[test]
fn unterminated_last_line_test() {
    let stops = "stop_id,stop_name,stop_lat,stop_lon\nA,\"Alpha,0.0,0.0";
    let err = load_dir(&[
        ("stops.txt", stops),
        ("trips.txt", TRIPS),
        ("stop_times.txt", STOP_TIMES),
    ])
    .unwrap_err();
    assert!(matches!(
        err,
        gtfs::Error::MalformedQuoting { ref file, line: 2 } if file == "stops.txt"
    ));
}

#[test]
fn short_row_is_missing_field_test() {
    let stop_times = "\
trip_id,arrival_time,departure_time,stop_id,stop_sequence
T1,08:00:00,08:00:00,A
";
    let err = load_dir(&[
        ("stops.txt", STOPS),
        ("trips.txt", TRIPS),
        ("stop_times.txt", stop_times),
    ])
    .unwrap_err();
    match err {
        gtfs::Error::MissingRequiredField { file, line, reason } => {
            assert_eq!(file, "stop_times.txt");
            assert_eq!(line, 2);
            assert_eq!(reason, "expected 5 fields, found 4");
        }
        other => panic!("expected MissingRequiredField, got {other:?}"),
    }

    // Balanced quotes do not make a short row a quoting problem
    let stop_times = "\
trip_id,arrival_time,departure_time,stop_id,stop_sequence
T1,08:00:00,08:00:00,A,1
T1,\"08:05:00\",08:05:00,\"B \"\"east\"\"\"
";
    let err = load_dir(&[
        ("stops.txt", STOPS),
        ("trips.txt", TRIPS),
        ("stop_times.txt", stop_times),
    ])
    .unwrap_err();
    assert!(matches!(
        err,
        gtfs::Error::MissingRequiredField { ref file, line: 3, .. } if file == "stop_times.txt"
    ));
}

#[test]
fn blank_arrivals_survive_loading() {
    let stop_times = "\
trip_id,arrival_time,departure_time,stop_id,stop_sequence
T1,,,A,1
T1,08:05:00,08:05:00,GHOST,2
";
    let repository = load_dir(&[
        ("stops.txt", STOPS),
        ("trips.txt", TRIPS),
        ("stop_times.txt", stop_times),
    ])
    .unwrap();
    let rows = repository.stop_times_by_trip_id("T1");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].arrival_time.as_ref(), "");
}
