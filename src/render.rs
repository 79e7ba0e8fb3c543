//! Renderable list records for the visible locations

use serde::Serialize;

use crate::distance::{self, Distance, DistanceUnit};
use crate::location::{LatLng, Location};
use crate::utils::elapsed_time;

/// Inputs shared by every record of one render pass
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub user_pos: Option<LatLng>,
    pub selected_id: Option<&'a str>,
    pub unit: DistanceUnit,
    pub now_ms: i64,
}

/// One list row, ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    pub id: String,
    pub name: String,
    pub address: String,
    pub rate: u8,
    pub stars: String,
    pub created_ago: String,
    /// Only present once the location was updated after creation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_ago: Option<String>,
    /// Only present when the user's position is known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<Distance>,
    pub active: bool,
}

pub fn render_record(loc: &Location, ctx: &RenderContext, active: bool) -> LocationRecord {
    LocationRecord {
        id: loc.id.clone(),
        name: loc.name.clone(),
        address: loc.geo.address.clone(),
        rate: loc.rate,
        stars: loc.stars(),
        created_ago: elapsed_time(loc.created_at, ctx.now_ms),
        updated_ago: loc
            .is_updated()
            .then(|| elapsed_time(loc.updated_at, ctx.now_ms)),
        distance: ctx
            .user_pos
            .map(|pos| distance::measure(loc.geo.lat_lng(), pos, ctx.unit)),
        active,
    }
}

/// One record per location, in order; at most one is marked active
pub fn render_records(visible: &[Location], ctx: &RenderContext) -> Vec<LocationRecord> {
    let mut active_taken = false;
    visible
        .iter()
        .map(|loc| {
            let active = !active_taken && ctx.selected_id == Some(loc.id.as_str());
            active_taken |= active;
            render_record(loc, ctx, active)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Geo;

    const NOW: i64 = 1_700_000_000_000;
    const HOUR: i64 = 60 * 60 * 1000;

    fn locs() -> Vec<Location> {
        vec![
            Location {
                id: "a".to_string(),
                name: "Jaffa port".to_string(),
                rate: 4,
                geo: Geo::new(32.0534, 34.7506, "Jaffa"),
                created_at: NOW - 3 * HOUR,
                updated_at: NOW - 3 * HOUR,
            },
            Location {
                id: "b".to_string(),
                name: "Dizengoff".to_string(),
                rate: 2,
                geo: Geo::new(32.0780, 34.7740, "Tel Aviv"),
                created_at: NOW - 48 * HOUR,
                updated_at: NOW - 2 * HOUR,
            },
        ]
    }

    fn ctx<'a>(user_pos: Option<LatLng>, selected_id: Option<&'a str>) -> RenderContext<'a> {
        RenderContext {
            user_pos,
            selected_id,
            unit: DistanceUnit::Kilometers,
            now_ms: NOW,
        }
    }

    #[test]
    fn test_distance_absent_without_position() {
        let records = render_records(&locs(), &ctx(None, None));
        assert!(records.iter().all(|r| r.distance.is_none()));

        let json = serde_json::to_value(&records[0]).unwrap();
        assert!(json.get("distance").is_none());
    }

    #[test]
    fn test_distance_with_position() {
        let here = LatLng::new(32.0534, 34.7506);
        let records = render_records(&locs(), &ctx(Some(here), None));
        assert_eq!(records[0].distance.map(|d| d.value), Some(0.0));
        let far = records[1].distance.unwrap();
        assert!(far.value > 2.0 && far.value < 5.0, "got {}", far.value);
    }

    #[test]
    fn test_active_marking() {
        let records = render_records(&locs(), &ctx(None, Some("b")));
        let active: Vec<&str> = records
            .iter()
            .filter(|r| r.active)
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(active, vec!["b"]);

        let records = render_records(&locs(), &ctx(None, Some("gone")));
        assert!(records.iter().all(|r| !r.active));
    }

    #[test]
    fn test_age_strings() {
        let records = render_records(&locs(), &ctx(None, None));
        assert_eq!(records[0].created_ago, "3 hours ago");
        assert_eq!(records[0].updated_ago, None);
        assert_eq!(records[1].created_ago, "2 days ago");
        assert_eq!(records[1].updated_ago.as_deref(), Some("2 hours ago"));
        assert_eq!(records[0].stars, "★★★★");
    }
}
