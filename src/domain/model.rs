use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Column headers of the monitoring log, in write order.
///
/// The 4th entry carries the start longitude. Its name is kept as-is so that
/// logs written by earlier runs keep a single consistent header.
pub const CSV_HEADERS: [&str; 10] = [
    "date",
    "start_place",
    "start_latitude",
    "end_longitude",
    "end_place",
    "end_latitude",
    "end_longitude",
    "distance_estimation",
    "duration_estimation",
    "price",
];

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Whole degrees keep their `.0`, e.g. `2.0` rather than `2`.
pub fn format_coordinate(value: f64) -> String {
    format!("{:?}", value)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Short name written into the log instead of the full address.
    pub label: String,
    pub address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    AuthorizationCode,
    ClientCredentials,
    Implicit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    pub client_id: String,
    pub client_secret: String,
    pub expires_in_seconds: i64,
    pub grant_type: GrantType,
    pub scopes: Option<Vec<String>>,
}

impl Credentials {
    /// `None` when the expiry lies beyond what chrono can represent.
    pub fn expires_at(&self, issued_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        chrono::Duration::try_seconds(self.expires_in_seconds)
            .and_then(|lifetime| issued_at.checked_add_signed(lifetime))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    pub display_name: String,
}

/// Numbers are kept exactly as the provider formatted them.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    pub distance: Number,
    pub duration: Number,
    pub fare: Number,
}

/// An estimate together with the local time it was requested at.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub taken_at: String,
    pub estimate: Estimate,
}

/// Resolved once per process and shared by every stage of the run.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub start: Place,
    pub start_point: GeoPoint,
    pub end: Place,
    pub end_point: GeoPoint,
    pub product: Product,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CsvRecord {
    pub date: String,
    pub start_place: String,
    pub start: GeoPoint,
    pub end_place: String,
    pub end: GeoPoint,
    pub distance: Number,
    pub duration: Number,
    pub price: Number,
}

impl CsvRecord {
    pub fn new(context: &RunContext, sample: Sample) -> Self {
        let Sample { taken_at, estimate } = sample;
        Self {
            date: taken_at,
            start_place: context.start.label.clone(),
            start: context.start_point,
            end_place: context.end.label.clone(),
            end: context.end_point,
            distance: estimate.distance,
            duration: estimate.duration,
            price: estimate.fare,
        }
    }

    /// Fields in `CSV_HEADERS` order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.date.clone(),
            self.start_place.clone(),
            format_coordinate(self.start.latitude),
            format_coordinate(self.start.longitude),
            self.end_place.clone(),
            format_coordinate(self.end.latitude),
            format_coordinate(self.end.longitude),
            self.distance.to_string(),
            self.duration.to_string(),
            self.price.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn context() -> RunContext {
        RunContext {
            start: Place {
                label: "home".to_string(),
                address: "1 Rue de Rivoli, Paris".to_string(),
            },
            start_point: GeoPoint {
                latitude: 48.8556,
                longitude: 2.3522,
            },
            end: Place {
                label: "office".to_string(),
                address: "5 Avenue Anatole France, Paris".to_string(),
            },
            end_point: GeoPoint {
                latitude: 48.8584,
                longitude: 2.2945,
            },
            product: Product {
                product_id: "a1111c8c-c720-46c3-8534-2fcdd730040d".to_string(),
                display_name: "uberX".to_string(),
            },
        }
    }

    #[test]
    fn test_row_follows_header_order() {
        let estimate: Estimate = Estimate {
            distance: serde_json::from_str("5.34").unwrap(),
            duration: serde_json::from_str("840").unwrap(),
            fare: serde_json::from_str("10.0").unwrap(),
        };
        let sample = Sample {
            taken_at: "2024-03-01 08:15".to_string(),
            estimate,
        };
        let record = CsvRecord::new(&context(), sample);
        let row = record.to_row();

        assert_eq!(row.len(), CSV_HEADERS.len());
        assert_eq!(
            row,
            vec![
                "2024-03-01 08:15",
                "home",
                "48.8556",
                "2.3522",
                "office",
                "48.8584",
                "2.2945",
                "5.34",
                "840",
                "10.0",
            ]
        );
    }

    #[test]
    fn test_whole_degree_coordinates_keep_decimal_point() {
        let mut ctx = context();
        ctx.start_point = GeoPoint {
            latitude: 48.0,
            longitude: 2.0,
        };
        ctx.end_point.longitude = -0.5;
        let sample = Sample {
            taken_at: "2024-03-01 08:15".to_string(),
            estimate: Estimate {
                distance: serde_json::from_str("3").unwrap(),
                duration: serde_json::from_str("600").unwrap(),
                fare: serde_json::from_str("9").unwrap(),
            },
        };
        let row = CsvRecord::new(&ctx, sample).to_row();

        assert_eq!(&row[2..4], &["48.0", "2.0"]);
        assert_eq!(row[6], "-0.5");
        assert_eq!(format_coordinate(48.8556), "48.8556");
    }

    #[test]
    fn test_header_keeps_historical_column_names() {
        assert_eq!(CSV_HEADERS[3], "end_longitude");
        assert_eq!(CSV_HEADERS[6], "end_longitude");
        assert_eq!(CSV_HEADERS[0], "date");
        assert_eq!(CSV_HEADERS[9], "price");
    }

    #[test]
    fn test_credentials_expiry() {
        let issued = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut credentials = Credentials {
            access_token: "token".to_string(),
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            expires_in_seconds: 3600,
            grant_type: GrantType::AuthorizationCode,
            scopes: None,
        };
        assert_eq!(
            credentials.expires_at(issued),
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap())
        );

        credentials.expires_in_seconds = 9_999_999_999;
        let far = credentials.expires_at(issued).unwrap();
        assert!(far.timestamp() > issued.timestamp() + 9_999_999_000);
    }
}
