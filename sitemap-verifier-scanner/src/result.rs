use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of checking a single leaf URL.
///
/// `status_code` and `end_time` stay unset when no response was ever
/// received; `duration` (seconds) is only measured for verified records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub url: String,
    pub status_code: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration: Option<f64>,
    #[serde(rename = "url_verified")]
    pub verified: bool,
}

impl VerificationRecord {
    pub fn new(url: String) -> Self {
        Self {
            url,
            status_code: None,
            start_time: Utc::now(),
            end_time: None,
            duration: None,
            verified: false,
        }
    }

    /// Mark the record as answered with `status` at `end_time`.
    pub fn complete(&mut self, status: u16, end_time: DateTime<Utc>) {
        let elapsed = end_time - self.start_time;
        self.status_code = Some(status.to_string());
        self.end_time = Some(end_time);
        self.duration = Some((elapsed.num_microseconds().unwrap_or(0) as f64 / 1_000_000.0).max(0.0));
        self.verified = true;
    }

    pub fn status(&self) -> Option<u16> {
        self.status_code.as_deref().and_then(|s| s.parse().ok())
    }
}
