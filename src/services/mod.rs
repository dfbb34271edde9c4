pub mod box_office;
pub mod enrichment;

pub use box_office::{BoxOfficeClient, BoxOfficeError, BoxOfficeProvider};
pub use enrichment::EnrichmentQueue;
