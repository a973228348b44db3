use crate::domain::model::{Credentials, Estimate, GeoPoint, Product};
use crate::domain::ports::RideApi;
use crate::utils::error::{Result, SquirrelError};
use crate::utils::validation;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Number;

#[derive(Debug, Deserialize)]
struct ProductsResponse {
    products: Vec<Product>,
}

#[derive(Debug, Serialize)]
struct EstimateRequest<'a> {
    product_id: &'a str,
    start_latitude: f64,
    start_longitude: f64,
    end_latitude: f64,
    end_longitude: f64,
}

#[derive(Debug, Deserialize)]
struct EstimateResponse {
    trip: TripEstimate,
    fare: FareEstimate,
}

#[derive(Debug, Deserialize)]
struct TripEstimate {
    distance_estimate: Number,
    duration_estimate: Number,
}

#[derive(Debug, Deserialize)]
struct FareEstimate {
    value: Number,
}

/// Authenticated handle on the Uber Rides API.
///
/// Built from static credentials without touching the network. The provider
/// first sees the token on the first call.
#[derive(Debug, Clone)]
pub struct UberClient {
    client: Client,
    base_url: String,
    expires_at: Option<DateTime<Utc>>,
}

impl UberClient {
    pub fn from_credentials(base_url: &str, credentials: &Credentials) -> Result<Self> {
        Self::issued_at(base_url, credentials, Utc::now())
    }

    pub fn issued_at(
        base_url: &str,
        credentials: &Credentials,
        issued_at: DateTime<Utc>,
    ) -> Result<Self> {
        validation::validate_secret("ride.access_token", &credentials.access_token)?;
        validation::validate_secret("ride.client_id", &credentials.client_id)?;
        validation::validate_secret("ride.client_secret", &credentials.client_secret)?;
        if credentials.expires_in_seconds <= 0 {
            return Err(SquirrelError::InvalidConfigValueError {
                field: "ride.expires_in_seconds".to_string(),
                value: credentials.expires_in_seconds.to_string(),
                reason: "Credential lifetime must be positive".to_string(),
            });
        }

        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", credentials.access_token))
            .map_err(|_| {
                SquirrelError::config("ride.access_token contains characters not allowed in an HTTP header")
            })?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en_US"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| SquirrelError::config(format!("cannot build ride API client: {}", e)))?;

        tracing::debug!(
            "Ride API client ready (grant type {:?}, scopes {:?})",
            credentials.grant_type,
            credentials.scopes
        );

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            expires_at: credentials.expires_at(issued_at),
        })
    }

    fn ensure_fresh(&self) -> Result<()> {
        match self.expires_at {
            Some(expires_at) if expires_at <= Utc::now() => Err(SquirrelError::config(format!(
                "access token expired at {}; no refresh is performed",
                expires_at
            ))),
            _ => Ok(()),
        }
    }

    async fn checked(response: Response, call: &str) -> Result<String> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SquirrelError::estimate(format!("{}: cannot read response: {}", call, e)))?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(SquirrelError::config(format!(
                "{}: credentials rejected by the ride API",
                call
            )));
        }
        if !status.is_success() {
            return Err(SquirrelError::estimate(format!(
                "{}: HTTP {}: {}",
                call, status, body
            )));
        }
        Ok(body)
    }
}

#[async_trait]
impl RideApi for UberClient {
    async fn products(&self, at: GeoPoint) -> Result<Vec<Product>> {
        self.ensure_fresh()?;

        let url = format!("{}/v1.2/products", self.base_url);
        tracing::debug!("Listing products near ({}, {})", at.latitude, at.longitude);

        let response = self
            .client
            .get(&url)
            .query(&[("latitude", at.latitude), ("longitude", at.longitude)])
            .send()
            .await
            .map_err(|e| SquirrelError::estimate(format!("product lookup failed: {}", e)))?;

        let body = Self::checked(response, "product lookup").await?;
        let parsed: ProductsResponse = serde_json::from_str(&body).map_err(|e| {
            SquirrelError::estimate(format!("malformed products response: {}", e))
        })?;

        tracing::debug!("{} products offered", parsed.products.len());
        Ok(parsed.products)
    }

    async fn estimate(&self, product_id: &str, start: GeoPoint, end: GeoPoint) -> Result<Estimate> {
        if product_id.trim().is_empty() {
            return Err(SquirrelError::estimate("product identifier is empty"));
        }
        self.ensure_fresh()?;

        let url = format!("{}/v1.2/requests/estimate", self.base_url);
        let request = EstimateRequest {
            product_id,
            start_latitude: start.latitude,
            start_longitude: start.longitude,
            end_latitude: end.latitude,
            end_longitude: end.longitude,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SquirrelError::estimate(format!("estimate request failed: {}", e)))?;

        let body = Self::checked(response, "ride estimate").await?;
        let parsed: EstimateResponse = serde_json::from_str(&body).map_err(|e| {
            SquirrelError::estimate(format!("malformed estimate response: {}", e))
        })?;

        Ok(Estimate {
            distance: parsed.trip.distance_estimate,
            duration: parsed.trip.duration_estimate,
            fare: parsed.fare.value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::GrantType;
    use httpmock::prelude::*;

    fn credentials() -> Credentials {
        Credentials {
            access_token: "token-123".to_string(),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            expires_in_seconds: 9_999_999_999,
            grant_type: GrantType::AuthorizationCode,
            scopes: None,
        }
    }

    const PARIS: GeoPoint = GeoPoint {
        latitude: 48.8556,
        longitude: 2.3522,
    };
    const EIFFEL: GeoPoint = GeoPoint {
        latitude: 48.8584,
        longitude: 2.2945,
    };

    #[test]
    fn test_malformed_credentials_fail_fast() {
        let mut bad = credentials();
        bad.client_secret = String::new();
        let err = UberClient::from_credentials("http://127.0.0.1:1", &bad).unwrap_err();
        assert_eq!(err.category(), crate::utils::error::ErrorCategory::Configuration);

        let mut bad = credentials();
        bad.access_token = "line\nbreak".to_string();
        assert!(UberClient::from_credentials("http://127.0.0.1:1", &bad).is_err());

        let mut bad = credentials();
        bad.expires_in_seconds = 0;
        assert!(UberClient::from_credentials("http://127.0.0.1:1", &bad).is_err());
    }

    #[tokio::test]
    async fn test_products_sends_bearer_token() {
        let server = MockServer::start_async().await;
        let products_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v1.2/products")
                    .query_param("latitude", "48.8556")
                    .query_param("longitude", "2.3522")
                    .header("Authorization", "Bearer token-123")
                    .header("Accept-Language", "en_US");
                then.status(200).json_body(serde_json::json!({
                    "products": [
                        {"product_id": "p-pool", "display_name": "UberPOOL", "capacity": 2},
                        {"product_id": "p-x", "display_name": "uberX", "capacity": 4}
                    ]
                }));
            })
            .await;

        let client = UberClient::from_credentials(&server.base_url(), &credentials()).unwrap();
        let products = client.products(PARIS).await.unwrap();

        products_mock.assert_async().await;
        assert_eq!(products.len(), 2);
        assert_eq!(products[1].product_id, "p-x");
        assert_eq!(products[1].display_name, "uberX");
    }

    #[tokio::test]
    async fn test_unauthorized_is_a_configuration_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1.2/products");
                then.status(401).body(r#"{"message":"Invalid OAuth 2.0 credentials provided.","code":"unauthorized"}"#);
            })
            .await;

        let client = UberClient::from_credentials(&server.base_url(), &credentials()).unwrap();
        let err = client.products(PARIS).await.unwrap_err();
        assert!(matches!(err, SquirrelError::ConfigError { .. }));
    }

    #[tokio::test]
    async fn test_estimate_extracts_trip_and_fare() {
        let server = MockServer::start_async().await;
        let estimate_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1.2/requests/estimate")
                    .header("Authorization", "Bearer token-123")
                    .json_body(serde_json::json!({
                        "product_id": "p-x",
                        "start_latitude": 48.8556,
                        "start_longitude": 2.3522,
                        "end_latitude": 48.8584,
                        "end_longitude": 2.2945
                    }));
                then.status(200).json_body(serde_json::json!({
                    "fare": {"value": 12.5, "fare_id": "f-1", "currency_code": "EUR", "display": "€12.50"},
                    "trip": {"distance_unit": "mile", "duration_estimate": 840, "distance_estimate": 3.01},
                    "pickup_estimate": 2
                }));
            })
            .await;

        let client = UberClient::from_credentials(&server.base_url(), &credentials()).unwrap();
        let estimate = client.estimate("p-x", PARIS, EIFFEL).await.unwrap();

        estimate_mock.assert_async().await;
        assert_eq!(estimate.distance.to_string(), "3.01");
        assert_eq!(estimate.duration.to_string(), "840");
        assert_eq!(estimate.fare.to_string(), "12.5");
    }

    #[tokio::test]
    async fn test_estimate_missing_fare_is_an_estimate_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1.2/requests/estimate");
                then.status(200).json_body(serde_json::json!({
                    "trip": {"duration_estimate": 840, "distance_estimate": 3.01}
                }));
            })
            .await;

        let client = UberClient::from_credentials(&server.base_url(), &credentials()).unwrap();
        let err = client.estimate("p-x", PARIS, EIFFEL).await.unwrap_err();
        assert!(matches!(err, SquirrelError::EstimateError { .. }));
        assert!(err.to_string().contains("malformed estimate response"));
    }

    #[tokio::test]
    async fn test_empty_product_id_never_hits_the_network() {
        let server = MockServer::start_async().await;
        let estimate_mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/v1.2/requests/estimate");
                then.status(200);
            })
            .await;

        let client = UberClient::from_credentials(&server.base_url(), &credentials()).unwrap();
        let err = client.estimate("  ", PARIS, EIFFEL).await.unwrap_err();

        assert!(matches!(err, SquirrelError::EstimateError { .. }));
        estimate_mock.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn test_stale_credentials_never_hit_the_network() {
        let server = MockServer::start_async().await;
        let products_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/v1.2/products");
                then.status(200).json_body(serde_json::json!({"products": []}));
            })
            .await;

        let mut short_lived = credentials();
        short_lived.expires_in_seconds = 60;
        let issued = Utc::now() - chrono::Duration::hours(1);
        let client = UberClient::issued_at(&server.base_url(), &short_lived, issued).unwrap();

        let err = client.products(PARIS).await.unwrap_err();
        assert!(err.to_string().contains("expired"));
        products_mock.assert_hits_async(0).await;
    }
}
