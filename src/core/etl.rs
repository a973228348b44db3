use crate::adapters::{CsvFileStore, GoogleGeocoder, UberClient};
use crate::config::toml_config::SquirrelConfig;
use crate::core::pipeline::SamplePipeline;
use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        // Extract
        tracing::info!("Requesting ride estimate...");
        let sample = self.pipeline.extract().await?;
        tracing::debug!(
            "Estimate at {}: distance {}, duration {}, fare {}",
            sample.taken_at,
            sample.estimate.distance,
            sample.estimate.duration,
            sample.estimate.fare
        );

        // Transform
        let record = self.pipeline.transform(sample).await?;

        // Load
        let output_path = self.pipeline.load(record).await?;
        tracing::info!("Row appended to: {}", output_path);

        Ok(output_path)
    }
}

/// Takes one sample with the real providers and appends it to the configured log.
///
/// Credentials are checked before any request goes out.
pub async fn sample_once(config: &SquirrelConfig) -> Result<String> {
    let ride_api = UberClient::from_credentials(&config.ride.base_url, &config.credentials())?;
    let geocoder = GoogleGeocoder::new(&config.geocoder)?;
    let store = CsvFileStore::new(config.output_path());

    let pipeline = SamplePipeline::prepare(&geocoder, ride_api, store, config).await?;
    EtlEngine::new(pipeline).run().await
}
