//! Address lookup and user positioning over HTTP

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::error::GeocodeError;
use crate::location::{Geo, LatLng};

/// Address lookup and user positioning, consumed by the presentation glue
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn lookup_address(&self, text: &str) -> Result<Geo, GeocodeError>;

    async fn user_position(&self) -> Result<LatLng, GeocodeError>;
}

// Nominatim-style search result; coordinates come back as strings
#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(deserialize_with = "deserialize_coordinate")]
    lat: f64,
    #[serde(deserialize_with = "deserialize_coordinate")]
    lon: f64,
    #[serde(default)]
    display_name: String,
}

// ip-api style position response
#[derive(Debug, Deserialize)]
struct IpPosition {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

// Accept both `"32.08"` and `32.08`
fn deserialize_coordinate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;

    match value {
        Value::Number(num) => num
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom("Invalid coordinate")),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom("Invalid coordinate string")),
        _ => Err(serde::de::Error::custom("Coordinate must be a string or number")),
    }
}

/// Parse a search response body into the first hit
pub fn parse_search_response(query: &str, body: &str) -> Result<Geo, GeocodeError> {
    let hits: Vec<SearchHit> = serde_json::from_str(body)
        .map_err(|e| GeocodeError::InvalidResponse(format!("Failed to parse search results: {}", e)))?;

    let hit = hits
        .into_iter()
        .next()
        .ok_or_else(|| GeocodeError::NoResults(query.to_string()))?;

    let address = if hit.display_name.is_empty() {
        query.to_string()
    } else {
        hit.display_name
    };
    Ok(Geo::new(hit.lat, hit.lon, address))
}

/// Parse a position response body
pub fn parse_position_response(body: &str) -> Result<LatLng, GeocodeError> {
    let pos: IpPosition = serde_json::from_str(body)
        .map_err(|e| GeocodeError::InvalidResponse(format!("Failed to parse position: {}", e)))?;

    if let Some(status) = &pos.status {
        if status != "success" {
            return Err(GeocodeError::RequestFailed(
                pos.message.unwrap_or_else(|| status.clone()),
            ));
        }
    }

    match (pos.lat, pos.lon) {
        (Some(lat), Some(lng)) => Ok(LatLng::new(lat, lng)),
        _ => Err(GeocodeError::InvalidResponse(
            "Position response has no coordinates".to_string(),
        )),
    }
}

/// HTTP geocoder against a Nominatim-compatible search endpoint and an
/// IP-geolocation endpoint
pub struct HttpGeocoder {
    client: Client,
    search_url: String,
    position_url: String,
    user_agent: String,
}

impl HttpGeocoder {
    pub fn new(search_url: String, position_url: String, user_agent: String) -> Self {
        HttpGeocoder {
            client: Client::new(),
            search_url,
            position_url,
            user_agent,
        }
    }

    async fn get_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String, GeocodeError> {
        tracing::debug!(url, "Geocoding request");

        let response = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GeocodeError::RequestFailed(format!("{} ({}): {}", url, status, error_text)));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn lookup_address(&self, text: &str) -> Result<Geo, GeocodeError> {
        let body = self
            .get_text(&self.search_url, &[("q", text), ("format", "json"), ("limit", "1")])
            .await?;
        let geo = parse_search_response(text, &body)?;
        tracing::info!(query = text, lat = geo.lat, lng = geo.lng, "Address resolved");
        Ok(geo)
    }

    async fn user_position(&self) -> Result<LatLng, GeocodeError> {
        let body = self.get_text(&self.position_url, &[]).await?;
        parse_position_response(&body)
    }
}
