use crate::fetcher::{FetchOutcome, Fetcher};
use crate::result::VerificationRecord;
use chrono::Utc;
use tracing::debug;

/// Checks one leaf URL and reports what happened.
#[derive(Debug, Clone)]
pub struct UrlVerifier {
    fetcher: Fetcher,
}

impl UrlVerifier {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }

    pub async fn verify(&self, url: &str) -> VerificationRecord {
        let mut record = VerificationRecord::new(url.to_string());

        match self.fetcher.fetch(url).await {
            FetchOutcome::Response(response) => {
                record.complete(response.status, Utc::now());
            }
            FetchOutcome::NoResponse { attempts, reason } => {
                debug!("{} unverified after {} attempt(s): {}", url, attempts, reason);
            }
        }

        record
    }
}
