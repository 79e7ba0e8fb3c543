//! Great-circle distance between two coordinates

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::location::LatLng;

/// Mean earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

const KM_PER_MILE: f64 = 1.609344;
const KM_PER_NAUTICAL_MILE: f64 = 1.852;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    #[default]
    #[value(name = "km")]
    Kilometers,
    #[value(name = "mi")]
    Miles,
    #[value(name = "nm")]
    NauticalMiles,
}

impl DistanceUnit {
    /// Parse a unit code (`K`/`km`, `M`/`mi`, `N`/`nm`); anything else is kilometers
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "m" | "mi" | "mile" | "miles" => DistanceUnit::Miles,
            "n" | "nm" | "nautical" => DistanceUnit::NauticalMiles,
            _ => DistanceUnit::Kilometers,
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            DistanceUnit::Kilometers => "KM",
            DistanceUnit::Miles => "MI",
            DistanceUnit::NauticalMiles => "NM",
        }
    }

    fn convert_km(&self, km: f64) -> f64 {
        match self {
            DistanceUnit::Kilometers => km,
            DistanceUnit::Miles => km / KM_PER_MILE,
            DistanceUnit::NauticalMiles => km / KM_PER_NAUTICAL_MILE,
        }
    }
}

/// A distance value tagged with its unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Distance {
    pub value: f64,
    pub unit: DistanceUnit,
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.value, self.unit.suffix())
    }
}

/// Haversine distance between `a` and `b` in the requested unit
///
/// Identical points always yield exactly zero.
pub fn distance(a: LatLng, b: LatLng, unit: DistanceUnit) -> f64 {
    if a == b {
        return 0.0;
    }

    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    // Rounding can push h a hair outside [0, 1], which would make asin return NaN
    let h = h.clamp(0.0, 1.0);
    let central_angle = 2.0 * h.sqrt().asin();

    unit.convert_km(EARTH_RADIUS_KM * central_angle)
}

pub fn measure(a: LatLng, b: LatLng, unit: DistanceUnit) -> Distance {
    Distance {
        value: distance(a, b, unit),
        unit,
    }
}
