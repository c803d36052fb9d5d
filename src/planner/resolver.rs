use std::{collections::HashSet, sync::Arc};

use crate::{
    planner::expander::{Expansion, ExpansionParams, expand},
    repository::Repository,
    shared::{Coordinate, Distance, Duration, TimeOfDay},
};

/// Search parameters shared by both ends of a journey.
#[derive(Debug, Clone, Copy)]
pub struct ResolveParams {
    pub reference: TimeOfDay,
    pub first_hop_time_box: Duration,
    pub later_hop_time_box: Duration,
    pub walk_radius: Distance,
    pub hub_depth: u8,
}

impl ResolveParams {
    pub fn expansion_from(&self, seed: Coordinate) -> ExpansionParams {
        ExpansionParams {
            seed,
            hub_depth: self.hub_depth,
            reference: self.reference,
            first_hop_time_box: self.first_hop_time_box,
            later_hop_time_box: self.later_hop_time_box,
            walk_radius: self.walk_radius,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub source: Expansion,
    pub destination: Expansion,
    /// Stops reached from both ends. May be empty.
    pub transfer_points: HashSet<Arc<str>>,
}

impl Resolution {
    /// Transfer points in id order.
    pub fn sorted_transfer_points(&self) -> Vec<Arc<str>> {
        let mut points: Vec<Arc<str>> = self.transfer_points.iter().cloned().collect();
        points.sort();
        points
    }
}

/// Expands from both endpoints independently and intersects what they reach.
pub fn resolve(
    repository: &Repository,
    source: Coordinate,
    destination: Coordinate,
    params: &ResolveParams,
) -> Resolution {
    let source = expand(repository, &params.expansion_from(source));
    let destination = expand(repository, &params.expansion_from(destination));
    let transfer_points = source
        .stops
        .intersection(&destination.stops)
        .cloned()
        .collect();
    Resolution {
        source,
        destination,
        transfer_points,
    }
}
