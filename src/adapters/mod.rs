// Adapters layer: concrete implementations of the domain ports (geocoding, ride API, storage).

pub mod geocoding;
pub mod ride_api;
pub mod storage;

pub use geocoding::GoogleGeocoder;
pub use ride_api::UberClient;
pub use storage::CsvFileStore;
