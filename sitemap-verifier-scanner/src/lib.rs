pub mod error;
pub mod fetcher;
pub mod result;
pub mod scheduler;
pub mod sitemap;
pub mod verifier;

pub use error::ScanError;
pub use fetcher::{FetchConfig, FetchOutcome, FetchResponse, Fetcher};
pub use result::VerificationRecord;
pub use scheduler::{BatchScheduler, ResultCallback, ResultCollector, WaveCallback};
pub use sitemap::{ExpandConfig, SitemapCallback, SitemapExpander};
pub use verifier::UrlVerifier;
