pub mod etl;
pub mod pipeline;

pub use crate::domain::model::{CsvRecord, Estimate, GeoPoint, Product, Sample};
pub use crate::domain::ports::{Geocoder, Pipeline, RecordStore, RideApi};
pub use crate::utils::error::Result;
