pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::SquirrelConfig;

pub use adapters::{CsvFileStore, GoogleGeocoder, UberClient};
pub use crate::core::{etl::sample_once, etl::EtlEngine, pipeline::SamplePipeline};
pub use domain::model::CSV_HEADERS;
pub use utils::error::{Result, SquirrelError};
