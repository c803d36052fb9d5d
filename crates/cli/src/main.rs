mod logger;

use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use hubhop::prelude::*;
use serde::Serialize;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "hubhop",
    version,
    about = "Find transfer points between two locations in a GTFS feed"
)]
struct Cli {
    /// Verbose output (show debug messages)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find stops reachable from both the start and the destination
    Plan(PlanArgs),
    /// List stops near a point and the trips about to reach them
    Nearby(NearbyArgs),
}

#[derive(Args, Debug)]
struct PlanArgs {
    /// GTFS feed, either a directory or a zip archive
    feed: PathBuf,
    #[arg(allow_negative_numbers = true)]
    start_lat: f64,
    #[arg(allow_negative_numbers = true)]
    start_lon: f64,
    /// Departure time, e.g. 08:15 or "8:15 PM"
    time: String,
    #[arg(allow_negative_numbers = true)]
    dest_lat: f64,
    #[arg(allow_negative_numbers = true)]
    dest_lon: f64,

    /// Maximum walk to or between stops, in feet
    #[arg(long, default_value_t = 1000.0)]
    walk_feet: f64,

    /// Minutes to wait for the first trip
    #[arg(long, default_value_t = hubhop::planner::DEFAULT_TIME_BUFFER_MINS)]
    time_buffer: u32,

    /// Number of transit hops taken outward from each end
    #[arg(long, default_value_t = hubhop::planner::DEFAULT_HUB_DEPTH)]
    hub_depth: u8,

    /// Minutes to wait for trips after the first hop
    #[arg(long, default_value_t = 180)]
    later_window: u32,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct NearbyArgs {
    /// GTFS feed, either a directory or a zip archive
    feed: PathBuf,
    #[arg(allow_negative_numbers = true)]
    lat: f64,
    #[arg(allow_negative_numbers = true)]
    lon: f64,
    /// Reference time, defaults to the local time now
    time: Option<String>,

    #[arg(long, default_value_t = 1000.0)]
    walk_feet: f64,

    /// Minutes ahead to look for departures
    #[arg(long, default_value_t = 180)]
    window: u32,

    /// Maximum departures listed per stop
    #[arg(long, default_value_t = 20)]
    limit: usize,

    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct NamedTransfer<'a> {
    stop_id: &'a str,
    name: Option<&'a str>,
}

#[derive(Serialize)]
struct PlanOutput<'a> {
    #[serde(flatten)]
    report: &'a TransferReport,
    named_transfer_points: Vec<NamedTransfer<'a>>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init_logger(cli.verbose);

    match cli.command {
        Command::Plan(args) => plan(args),
        Command::Nearby(args) => nearby(args),
    }
}

fn load(feed: &Path) -> Result<Repository> {
    info!("Loading data...");
    let now = Instant::now();
    let gtfs = GtfsReader::new()
        .open(feed)
        .with_context(|| format!("Failed to open feed {}", feed.display()))?;
    let repository = Repository::new()
        .load_gtfs(gtfs)
        .with_context(|| format!("Failed to load feed {}", feed.display()))?;
    info!(
        "Loaded {} stops and {} stop times in {:?}",
        repository.stops().len(),
        repository.stop_times().len(),
        now.elapsed()
    );
    Ok(repository)
}

fn plan(args: PlanArgs) -> Result<()> {
    let repository = load(&args.feed)?;
    let planner = Planner::new(&repository).with_config(SearchConfig {
        later_hop_window_mins: args.later_window,
        ..Default::default()
    });

    let query = TransferQuery::new(
        Coordinate::new(args.start_lat, args.start_lon),
        Coordinate::new(args.dest_lat, args.dest_lon),
        args.time.as_str(),
    )
    .walking_distance(Distance::from_feet(args.walk_feet))
    .time_buffer_minutes(args.time_buffer)
    .hub_depth(args.hub_depth);

    let report = planner
        .find_transfer_points(&query)
        .context("Invalid query")?;

    if args.json {
        let output = PlanOutput {
            report: &report,
            named_transfer_points: named(&repository, &report.transfer_points),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "From {}: {} stops, {} trips",
        query.source, report.source_stop_count, report.source_trip_count
    );
    println!(
        "From {}: {} stops, {} trips",
        query.destination, report.dest_stop_count, report.dest_trip_count
    );
    if report.transfer_points.is_empty() {
        println!("No transfer points found");
        return Ok(());
    }
    println!("{} transfer points:", report.transfer_points.len());
    for transfer in named(&repository, &report.transfer_points) {
        match transfer.name {
            Some(name) => println!("  {} ({})", name, transfer.stop_id),
            None => println!("  {}", transfer.stop_id),
        }
    }
    Ok(())
}

fn named<'a>(repository: &'a Repository, ids: &'a [String]) -> Vec<NamedTransfer<'a>> {
    ids.iter()
        .map(|id| NamedTransfer {
            stop_id: id,
            name: repository.stop_by_id(id).map(|stop| stop.name.as_ref()),
        })
        .collect()
}

fn nearby(args: NearbyArgs) -> Result<()> {
    let repository = load(&args.feed)?;
    let planner = Planner::new(&repository);

    let time = match &args.time {
        Some(time) => TimeOfDay::parse(time).context("Invalid time")?,
        None => TimeOfDay::now(),
    };
    let options = SearchConfig {
        departures_window_mins: args.window,
        departures_per_stop: args.limit,
        ..Default::default()
    }
    .nearby_options();
    let stops = planner
        .departures_near(
            Coordinate::new(args.lat, args.lon),
            Distance::from_feet(args.walk_feet),
            time,
            &options,
        )
        .context("Invalid query")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stops)?);
        return Ok(());
    }

    if stops.is_empty() {
        println!("No stops within {}", Distance::from_feet(args.walk_feet));
        return Ok(());
    }
    for stop in &stops {
        println!("{} ({}), {} away", stop.name, stop.stop_id, stop.distance);
        if stop.departures.is_empty() {
            println!("  no departures in the next {}", options.window);
        }
        for departure in &stop.departures {
            let headsign = departure.headsign.as_deref().unwrap_or("");
            println!(
                "  {:>3} min  {}  {} {}",
                departure.minutes_away, departure.arrival_time, departure.trip_id, headsign
            );
        }
    }
    Ok(())
}
