//! Location model: a saved, rated place

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const MIN_RATE: u8 = 1;
pub const MAX_RATE: u8 = 5;

/// Name used when a location is added without one
pub const DEFAULT_NAME: &str = "Just a place";

/// A point in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Checks the point lies within the valid latitude/longitude ranges
    pub fn validate(&self) -> Result<(), ValidationError> {
        let in_range = self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng);
        if in_range {
            Ok(())
        } else {
            Err(ValidationError::InvalidCoordinates {
                lat: self.lat,
                lng: self.lng,
            })
        }
    }

    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lng)
    }
}

impl std::str::FromStr for LatLng {
    type Err = ValidationError;

    /// Parses `"LAT,LNG"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidPosition(s.to_string());
        let (lat, lng) = s.split_once(',').ok_or_else(invalid)?;
        let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
        let lng: f64 = lng.trim().parse().map_err(|_| invalid())?;
        let pos = LatLng::new(lat, lng);
        pos.validate()?;
        Ok(pos)
    }
}

/// Geocoded position of a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geo {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub address: String,
}

impl Geo {
    pub fn new(lat: f64, lng: f64, address: impl Into<String>) -> Self {
        Self {
            lat,
            lng,
            address: address.into(),
        }
    }

    pub fn lat_lng(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

/// A saved place, as owned by the location store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    pub name: String,
    pub rate: u8,
    pub geo: Geo,
    /// Milliseconds since epoch
    pub created_at: i64,
    /// Milliseconds since epoch; equals `created_at` until the first update
    pub updated_at: i64,
}

impl Location {
    /// True once the location has been modified after creation
    pub fn is_updated(&self) -> bool {
        self.updated_at != self.created_at
    }

    pub fn stars(&self) -> String {
        stars(self.rate)
    }
}

/// Insert-or-update request handed to [`crate::store::LocationStore::save`]
///
/// `id: None` inserts a new location; `Some(id)` updates the existing one.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationDraft {
    pub id: Option<String>,
    pub name: String,
    pub rate: u8,
    pub geo: Geo,
}

impl LocationDraft {
    /// Build an insert draft; a blank name falls back to [`DEFAULT_NAME`]
    pub fn new(name: &str, rate: u8, geo: Geo) -> Self {
        let name = name.trim();
        Self {
            id: None,
            name: if name.is_empty() {
                DEFAULT_NAME.to_string()
            } else {
                name.to_string()
            },
            rate,
            geo,
        }
    }
}

impl From<Location> for LocationDraft {
    fn from(loc: Location) -> Self {
        Self {
            id: Some(loc.id),
            name: loc.name,
            rate: loc.rate,
            geo: loc.geo,
        }
    }
}

/// Validates a raw rating value
pub fn validate_rate(rate: i64) -> Result<u8, ValidationError> {
    if (i64::from(MIN_RATE)..=i64::from(MAX_RATE)).contains(&rate) {
        Ok(rate as u8)
    } else {
        Err(ValidationError::InvalidRate(rate))
    }
}

/// Star display for a rating
pub fn stars(rate: u8) -> String {
    "★".repeat(rate as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rate() {
        assert_eq!(validate_rate(1), Ok(1));
        assert_eq!(validate_rate(5), Ok(5));
        assert_eq!(validate_rate(0), Err(ValidationError::InvalidRate(0)));
        assert_eq!(validate_rate(6), Err(ValidationError::InvalidRate(6)));
    }

    #[test]
    fn test_draft_default_name() {
        let draft = LocationDraft::new("   ", 3, Geo::new(1.0, 2.0, "Somewhere"));
        assert_eq!(draft.name, DEFAULT_NAME);
        assert!(draft.id.is_none());
    }

    #[test]
    fn test_lat_lng_parse() {
        let pos: LatLng = "32.0853, 34.7818".parse().unwrap();
        assert_eq!(pos, LatLng::new(32.0853, 34.7818));

        assert!("32.0".parse::<LatLng>().is_err());
        assert!("91,0".parse::<LatLng>().is_err());
        assert!("abc,def".parse::<LatLng>().is_err());
    }

    #[test]
    fn test_serde_uses_camel_case() {
        let loc = Location {
            id: "a1".to_string(),
            name: "Park".to_string(),
            rate: 4,
            geo: Geo::new(1.0, 2.0, "Main st"),
            created_at: 10,
            updated_at: 10,
        };
        let json = serde_json::to_value(&loc).unwrap();
        assert_eq!(json["createdAt"], 10);
        assert_eq!(json["updatedAt"], 10);
        assert!(!loc.is_updated());
        assert_eq!(loc.stars(), "★★★★");
    }
}
