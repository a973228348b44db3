use crate::config::toml_config::SquirrelConfig;
use crate::core::{CsvRecord, Geocoder, Pipeline, Product, RecordStore, RideApi, Sample};
use crate::domain::model::{RunContext, CSV_HEADERS, TIMESTAMP_FORMAT};
use crate::utils::error::{Result, SquirrelError};
use chrono::{DateTime, Local};

/// First product in provider order whose display name matches exactly.
pub fn select_product(products: Vec<Product>, name: &str) -> Result<Product> {
    let available: Vec<String> = products.iter().map(|p| p.display_name.clone()).collect();

    products
        .into_iter()
        .find(|p| p.display_name == name)
        .ok_or_else(|| SquirrelError::ProductNotFound {
            name: name.to_string(),
            available,
        })
}

/// One sample: estimate for the resolved route, turned into a row, appended to the log.
pub struct SamplePipeline<R: RideApi, S: RecordStore> {
    ride_api: R,
    store: S,
    context: RunContext,
    clock: fn() -> DateTime<Local>,
}

impl<R: RideApi, S: RecordStore> SamplePipeline<R, S> {
    /// Resolves both places and the configured product. Nothing is written yet.
    pub async fn prepare<G: Geocoder>(
        geocoder: &G,
        ride_api: R,
        store: S,
        config: &SquirrelConfig,
    ) -> Result<Self> {
        let start = config.places.start.clone();
        let end = config.places.end.clone();

        let start_point = geocoder.geocode(&start.address).await?;
        let end_point = geocoder.geocode(&end.address).await?;
        tracing::info!(
            "📍 {} = ({}, {}), {} = ({}, {})",
            start.label,
            start_point.latitude,
            start_point.longitude,
            end.label,
            end_point.latitude,
            end_point.longitude
        );

        let products = ride_api.products(start_point).await?;
        let product = select_product(products, &config.ride.product_name)?;
        tracing::info!("🚗 Using product {} ({})", product.display_name, product.product_id);

        Ok(Self {
            ride_api,
            store,
            context: RunContext {
                start,
                start_point,
                end,
                end_point,
                product,
            },
            clock: Local::now,
        })
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Local>) -> Self {
        self.clock = clock;
        self
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }
}

#[async_trait::async_trait]
impl<R: RideApi, S: RecordStore> Pipeline for SamplePipeline<R, S> {
    async fn extract(&self) -> Result<Sample> {
        // 時間戳記取自送出估價請求之前
        let taken_at = (self.clock)().format(TIMESTAMP_FORMAT).to_string();
        let ctx = &self.context;
        let estimate = self
            .ride_api
            .estimate(&ctx.product.product_id, ctx.start_point, ctx.end_point)
            .await?;
        Ok(Sample { taken_at, estimate })
    }

    async fn transform(&self, sample: Sample) -> Result<CsvRecord> {
        Ok(CsvRecord::new(&self.context, sample))
    }

    async fn load(&self, record: CsvRecord) -> Result<String> {
        self.store.append(&CSV_HEADERS, &record.to_row()).await
    }
}
