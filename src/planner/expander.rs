//! Bounded breadth-first expansion of the transit network around a point.
//!
//! Each level walks to every stop near the current frontier, boards the
//! trips calling there inside the level's time box and rides them to every
//! stop they serve. Those stops form the next frontier. The search stops
//! after `hub_depth` transit hops, so it deliberately under-approximates
//! what is reachable: anything needing more hops is never seen.

use std::{collections::HashSet, sync::Arc};

use tracing::{trace, warn};

use crate::{
    planner::{
        collector::{log_skipped, trips_serving},
        locator::stops_within,
    },
    repository::Repository,
    shared::{Coordinate, Distance, Duration, TimeOfDay},
};

pub const DEFAULT_HUB_DEPTH: u8 = 2;

#[derive(Debug, Clone, Copy)]
pub struct ExpansionParams {
    pub seed: Coordinate,
    /// Number of transit hops taken outward from the seed.
    pub hub_depth: u8,
    pub reference: TimeOfDay,
    /// Time box for trips boarded at stops within walking range of the seed.
    pub first_hop_time_box: Duration,
    /// Time box for trips boarded at every later level.
    pub later_hop_time_box: Duration,
    pub walk_radius: Distance,
}

/// Set sizes after one level of expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelStats {
    pub level: u8,
    pub frontier: usize,
    pub stops: usize,
    pub trips: usize,
    pub new_stops: usize,
    pub new_trips: usize,
}

/// Everything one expansion discovered.
#[derive(Debug, Clone, Default)]
pub struct Expansion {
    pub stops: HashSet<Arc<str>>,
    pub trips: HashSet<Arc<str>>,
    /// Stops whose serving trips have been collected.
    pub expanded_stops: HashSet<Arc<str>>,
    /// Trips whose stops have been pushed onto a frontier.
    pub expanded_trips: HashSet<Arc<str>>,
    pub levels: Vec<LevelStats>,
    pub skipped_rows: usize,
    pub dangling_stop_refs: usize,
}

/// Working state of a single expansion. Never shared between queries.
#[derive(Debug, Default)]
pub struct ExpansionContext {
    expansion: Expansion,
    /// Stops that have already served as a frontier point.
    seeded: HashSet<Arc<str>>,
}

impl ExpansionContext {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn stops(&self) -> &HashSet<Arc<str>> {
        &self.expansion.stops
    }

    pub fn trips(&self) -> &HashSet<Arc<str>> {
        &self.expansion.trips
    }

    pub fn into_expansion(self) -> Expansion {
        self.expansion
    }

    /// Adds every stop within walking range of the frontier and returns the
    /// stops located this time.
    fn locate(
        &mut self,
        repository: &Repository,
        frontier: &[Coordinate],
        radius: Distance,
    ) -> HashSet<Arc<str>> {
        let located: HashSet<Arc<str>> = frontier
            .iter()
            .flat_map(|point| stops_within(repository.stops(), point, radius))
            .collect();
        self.expansion.stops.extend(located.iter().cloned());
        located
    }

    fn collect_trips(
        &mut self,
        repository: &Repository,
        located: &HashSet<Arc<str>>,
        reference: TimeOfDay,
        time_box: Duration,
    ) {
        for stop_id in located {
            if !self.expansion.expanded_stops.insert(stop_id.clone()) {
                continue;
            }
            let scan = trips_serving(
                repository.stop_times_by_stop_id(stop_id),
                stop_id,
                Some(reference),
                time_box,
            );
            log_skipped(&scan.skipped);
            self.expansion.skipped_rows += scan.skipped.len();
            self.expansion.trips.extend(scan.trips);
        }
    }

    /// Rides every trip not ridden yet and returns the stops it reaches that
    /// have not been a frontier point before.
    fn ride_trips(&mut self, repository: &Repository) -> Vec<Coordinate> {
        let pending: Vec<Arc<str>> = self
            .expansion
            .trips
            .difference(&self.expansion.expanded_trips)
            .cloned()
            .collect();

        let mut frontier = Vec::new();
        for trip_id in pending {
            for stop_time in repository.stop_times_by_trip_id(&trip_id) {
                match repository.stop_by_id(&stop_time.stop_id) {
                    Some(stop) => {
                        if self.seeded.insert(stop.id.clone()) {
                            frontier.push(stop.coordinate);
                        }
                    }
                    None => {
                        warn!(
                            "Trip {} references unknown stop {}, not following it",
                            trip_id, stop_time.stop_id
                        );
                        self.expansion.dangling_stop_refs += 1;
                    }
                }
            }
            self.expansion.expanded_trips.insert(trip_id);
        }
        frontier
    }
}

/// Expands outward from `params.seed`, level by level.
///
/// Terminates on any finite network, cycles included: every level either
/// grows the stop or trip set or ends the search, and both sets are bounded
/// by the repository.
pub fn expand(repository: &Repository, params: &ExpansionParams) -> Expansion {
    let mut context = ExpansionContext::new();
    let mut frontier = vec![params.seed];
    let mut level: u8 = 0;

    loop {
        let stops_before = context.stops().len();
        let trips_before = context.trips().len();

        let located = context.locate(repository, &frontier, params.walk_radius);

        let exhausted = level >= params.hub_depth;
        let next_frontier = if exhausted {
            Vec::new()
        } else {
            let time_box = if level == 0 {
                params.first_hop_time_box
            } else {
                params.later_hop_time_box
            };
            context.collect_trips(repository, &located, params.reference, time_box);
            context.ride_trips(repository)
        };

        let stats = LevelStats {
            level,
            frontier: frontier.len(),
            stops: context.stops().len(),
            trips: context.trips().len(),
            new_stops: context.stops().len() - stops_before,
            new_trips: context.trips().len() - trips_before,
        };
        trace!(
            "Level {} from {} points: {} stops (+{}), {} trips (+{})",
            stats.level, stats.frontier, stats.stops, stats.new_stops, stats.trips, stats.new_trips
        );
        context.expansion.levels.push(stats);

        let fixed_point = stats.new_stops == 0 && stats.new_trips == 0;
        if exhausted || fixed_point || next_frontier.is_empty() {
            break;
        }
        frontier = next_frontier;
        level += 1;
    }

    context.into_expansion()
}
