use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use crate::{
    repository::Stop,
    shared::{Coordinate, Distance},
};

/// Ids of every stop strictly closer than `radius` to `center`.
///
/// A full scan of the stop table. A stop sitting exactly on the radius is
/// left out, so a zero radius never matches anything.
pub fn stops_within(
    stops: &HashMap<Arc<str>, Stop>,
    center: &Coordinate,
    radius: Distance,
) -> HashSet<Arc<str>> {
    stops
        .values()
        .filter(|stop| center.distance(&stop.coordinate) < radius)
        .map(|stop| stop.id.clone())
        .collect()
}
