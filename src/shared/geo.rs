use std::{cmp, fmt::Display};

use serde::{Deserialize, Serialize};

pub(crate) const FEET_PER_METER: f64 = 3.280_84;
/// Mean earth radius, in feet.
pub const EARTH_RADIUS: Distance = Distance::from_meters(6_371_000.0);
/// Walking buffer used when a caller does not provide one.
pub const DEFAULT_WALKING_DISTANCE: Distance = Distance::from_feet(1000.0);

/// A distance, stored in feet.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Distance(f64);

impl PartialEq for Distance {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl Display for Distance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0} ft", self.0)
    }
}

impl Distance {
    pub const ZERO: Distance = Distance(0.0);

    pub const fn from_feet(distance: f64) -> Self {
        Self(distance)
    }

    pub const fn from_meters(distance: f64) -> Self {
        Self(distance * FEET_PER_METER)
    }

    pub const fn as_feet(&self) -> f64 {
        self.0
    }

    pub const fn as_meters(&self) -> f64 {
        self.0 / FEET_PER_METER
    }

    /// A usable search radius: finite and not negative.
    pub fn is_valid_radius(&self) -> bool {
        self.0.is_finite() && self.0 >= 0.0
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}, {}", self.latitude, self.longitude))
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Latitude within ±90, longitude within ±180, both finite.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude.abs() <= 90.0
            && self.longitude.abs() <= 180.0
    }

    /// Great-circle distance using the haversine formula.
    pub fn distance(&self, coord: &Self) -> Distance {
        let dist_lat = f64::to_radians(coord.latitude - self.latitude);
        let dist_lon = f64::to_radians(coord.longitude - self.longitude);
        let a = f64::powi(f64::sin(dist_lat / 2.0), 2)
            + f64::cos(f64::to_radians(self.latitude))
                * f64::cos(f64::to_radians(coord.latitude))
                * f64::powi(f64::sin(dist_lon / 2.0), 2);
        // Rounding can push `a` just past 1.0 for antipodal points.
        let c = 2.0 * f64::asin(f64::sqrt(a).clamp(0.0, 1.0));
        Distance::from_feet(EARTH_RADIUS.as_feet() * c)
    }
}

/// Distance in feet between two latitude/longitude pairs given in degrees.
pub fn distance_feet(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    Coordinate::new(lat1, lon1)
        .distance(&Coordinate::new(lat2, lon2))
        .as_feet()
}

#[test]
fn distance_test() {
    let paris = Coordinate::new(48.85800943005911, 2.3514350059357927);
    let london = Coordinate::new(51.5052389927712, -0.12495407345099824);
    let d = paris.distance(&london);
    assert!((d.as_meters() / 1000.0 - 343.08).abs() < 0.5);
}

#[test]
fn distance_nashville_los_angeles_test() {
    // 2886.44 km on the mean-radius sphere
    let d = distance_feet(36.12, -86.67, 33.94, -118.4);
    assert!((d / FEET_PER_METER / 1000.0 - 2886.44).abs() < 0.5);
}

#[test]
fn distance_coincident_test() {
    let coord = Coordinate::new(33.749, -84.388);
    assert_eq!(coord.distance(&coord), Distance::ZERO);
}

#[test]
fn distance_antipodal_test() {
    let d = distance_feet(0.0, 0.0, 0.0, 180.0);
    assert!(d.is_finite());
    let half_circumference = std::f64::consts::PI * EARTH_RADIUS.as_feet();
    assert!((d - half_circumference).abs() < 1.0);
}

#[test]
fn distance_units_test() {
    let dist_a = Distance::from_meters(1000.0);
    let dist_b = Distance::from_feet(3280.84);
    assert!((dist_a.as_feet() - dist_b.as_feet()).abs() < 1e-9);
}

#[test]
fn distance_cmp_test() {
    let dist_a = Distance::from_feet(1000.0);
    let dist_b = Distance::from_meters(100.0);
    assert!(dist_a > dist_b)
}

#[test]
fn invalid_coordinate_test() {
    assert!(!Coordinate::new(91.0, 0.0).is_valid());
    assert!(!Coordinate::new(0.0, f64::NAN).is_valid());
    assert!(Coordinate::new(-33.86, 151.2).is_valid());
}
