//! HTTP clients: Open-Meteo geocoding and IP geolocation

use serde::Deserialize;

use crate::service::ServiceError;
use crate::state::{Coordinates, Place};

// ============================================================================
// Geocoding API
// ============================================================================

const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const SEARCH_RESULT_COUNT: usize = 10;

/// Geocoding API response from Open-Meteo
///
/// Rejected requests come back as `{"error": true, "reason": "..."}`.
#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeocodingResult>>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
}

fn place_from_result(result: GeocodingResult) -> Place {
    let label = match &result.country {
        Some(country) => format!("{}, {}", result.name, country),
        None => result.name,
    };
    Place {
        label,
        lat: result.latitude,
        lon: result.longitude,
    }
}

fn places_from_response(response: GeocodingResponse) -> Result<Vec<Place>, ServiceError> {
    if response.error {
        let reason = response
            .reason
            .unwrap_or_else(|| "unknown geocoding error".to_string());
        return Err(ServiceError::Api(reason));
    }
    Ok(response
        .results
        .unwrap_or_default()
        .into_iter()
        .map(place_from_result)
        .collect())
}

#[derive(Clone, Debug)]
pub struct Geocoder {
    client: reqwest::Client,
    base_url: String,
}

impl Default for Geocoder {
    fn default() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: GEOCODING_URL.to_string(),
        }
    }
}

impl Geocoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Search for places matching a query
    pub async fn search(&self, query: &str) -> Result<Vec<Place>, ServiceError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}?name={}&count={}&language=en",
            self.base_url,
            urlencoding::encode(query),
            SEARCH_RESULT_COUNT
        );

        let response = self.client.get(&url).send().await?.error_for_status()?;
        let data: GeocodingResponse = response.json().await?;
        places_from_response(data)
    }
}

// ============================================================================
// IP geolocation
// ============================================================================

const IP_LOCATION_URL: &str = "http://ip-api.com/json";

#[derive(Debug, Deserialize)]
struct IpLocationResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
}

fn coordinates_from_response(response: IpLocationResponse) -> Option<Coordinates> {
    if response.status != "success" {
        return None;
    }
    Some(Coordinates {
        lat: response.lat?,
        lon: response.lon?,
    })
}

/// Approximates the device position from its public IP address
#[derive(Clone, Debug)]
pub struct IpLocator {
    client: reqwest::Client,
    url: String,
}

impl Default for IpLocator {
    fn default() -> Self {
        Self {
            client: reqwest::Client::new(),
            url: IP_LOCATION_URL.to_string(),
        }
    }
}

impl IpLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn locate(&self) -> Result<Option<Coordinates>, ServiceError> {
        let response = self.client.get(&self.url).send().await?.error_for_status()?;
        let data: IpLocationResponse = response.json().await?;
        Ok(coordinates_from_response(data))
    }
}
