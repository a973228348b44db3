use crate::domain::model::{CsvRecord, Estimate, GeoPoint, Product, Sample};
use crate::utils::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<GeoPoint>;
}

#[async_trait]
pub trait RideApi: Send + Sync {
    /// Products in provider order.
    async fn products(&self, at: GeoPoint) -> Result<Vec<Product>>;
    async fn estimate(&self, product_id: &str, start: GeoPoint, end: GeoPoint)
        -> Result<Estimate>;
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Appends `row`, writing `headers` first when the log does not exist yet.
    /// Returns the location written to.
    async fn append(&self, headers: &[&str], row: &[String]) -> Result<String>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Sample>;
    async fn transform(&self, sample: Sample) -> Result<CsvRecord>;
    async fn load(&self, record: CsvRecord) -> Result<String>;
}
