//! Google Maps Geocoding client.
//!
//! Every lookup is bounded by `geocoder.timeout_seconds`. The first result
//! returned for an address wins.

use crate::config::toml_config::GeocoderConfig;
use crate::domain::model::GeoPoint;
use crate::domain::ports::Geocoder;
use crate::utils::error::{Result, SquirrelError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: Option<String>,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Debug, Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Clone)]
pub struct GoogleGeocoder {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl GoogleGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SquirrelError::config(format!("cannot build geocoding client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.base_url.clone(),
            api_key: config.api_key.clone(),
            timeout,
        })
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeoPoint> {
        tracing::debug!("Geocoding address: {}", address);

        let mut request = self.client.get(&self.endpoint).query(&[("address", address)]);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SquirrelError::resolution(
                    address,
                    format!("geocoder timed out after {}s", self.timeout.as_secs()),
                )
            } else {
                SquirrelError::resolution(address, format!("geocoder unreachable: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SquirrelError::resolution(
                address,
                format!("geocoder returned HTTP {}", status),
            ));
        }

        let body: GeocodeResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                SquirrelError::resolution(address, "geocoder timed out while sending the response")
            } else {
                SquirrelError::resolution(address, format!("malformed geocoder response: {}", e))
            }
        })?;

        match body.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" => {
                return Err(SquirrelError::resolution(address, "no match found"));
            }
            other => {
                let detail = body.error_message.unwrap_or_default();
                return Err(SquirrelError::resolution(
                    address,
                    format!("geocoder status {} {}", other, detail).trim_end().to_string(),
                ));
            }
        }

        let first = body
            .results
            .into_iter()
            .next()
            .ok_or_else(|| SquirrelError::resolution(address, "no match found"))?;

        tracing::debug!(
            "Resolved '{}' to {} ({}, {})",
            address,
            first.formatted_address.as_deref().unwrap_or("?"),
            first.geometry.location.lat,
            first.geometry.location.lng
        );

        Ok(GeoPoint {
            latitude: first.geometry.location.lat,
            longitude: first.geometry.location.lng,
        })
    }
}
