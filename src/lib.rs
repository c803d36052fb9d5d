//! Transfer point discovery over static GTFS feeds.
//!
//! `hubhop` loads a GTFS feed into an immutable [`repository::Repository`] and
//! answers one question: which stops can a rider reach, within a walking and
//! waiting budget, from *both* ends of a journey? Those stops are the transfer
//! points a caller can build an itinerary around.
//!
//! ```no_run
//! use hubhop::prelude::*;
//!
//! let gtfs = GtfsReader::new().from_dir("feed/")?;
//! let repository = Repository::new().load_gtfs(gtfs)?;
//! let planner = Planner::new(&repository);
//! let report = planner.find_transfer_points(&TransferQuery::new(
//!     Coordinate::new(33.749, -84.388),
//!     Coordinate::new(33.775, -84.396),
//!     "08:15",
//! ))?;
//! println!("{} transfer points", report.transfer_points.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod gtfs;
pub mod planner;
pub mod repository;
pub mod shared;

pub mod prelude {
    pub use crate::gtfs::GtfsReader;
    pub use crate::planner::{
        NearbyOptions, Planner, SearchConfig, TransferQuery, TransferReport,
    };
    pub use crate::repository::{Agency, Repository, Route, Stop, StopTime, Trip};
    pub use crate::shared::{Coordinate, Distance, Duration, TimeOfDay};
}
