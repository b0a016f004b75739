use crate::error::Result;
use rand::seq::SliceRandom;
use reqwest::Client;
use reqwest::header::USER_AGENT;
use std::error::Error as StdError;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Browser user agents rotated across requests to get past trivial bot blocking.
pub const USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (X11; Linux x86_64; rv:60.0) Gecko/20100101 Firefox/81.0",
    "Mozilla/5.0 (compatible; MSIE 10.0.0; Windows Phone OS 8.0.0; Trident/6.0.0; IEMobile/10.0.0; Lumia 630",
    "Mozilla/5.0 (iPad; CPU OS 6_0_1 like Mac OS X) AppleWebKit/536.26 (KHTML, like Gecko) Version/6.0 Mobile/10A523 Safari/8536.25",
];

pub fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// Settings for the HTTP layer
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Deadline for a whole attempt (connect, request, body)
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Extra attempts after the first one, only for transient errors
    pub max_retries: usize,
    /// Skip TLS certificate validation
    pub accept_invalid_certs: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            max_retries: 2,
            accept_invalid_certs: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
    pub elapsed: Duration,
    pub attempts: usize,
}

#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Response(FetchResponse),
    /// Nothing came back: retries exhausted or a definitive failure
    NoResponse { attempts: usize, reason: String },
}

impl FetchOutcome {
    pub fn attempts(&self) -> usize {
        match self {
            FetchOutcome::Response(response) => response.attempts,
            FetchOutcome::NoResponse { attempts, .. } => *attempts,
        }
    }

    pub fn response(self) -> Option<FetchResponse> {
        match self {
            FetchOutcome::Response(response) => Some(response),
            FetchOutcome::NoResponse { .. } => None,
        }
    }
}

/// Single-GET HTTP fetcher with bounded retry on transient errors.
///
/// Cloning is cheap; the underlying client keeps no idle connections, so
/// every attempt opens a fresh one.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_retries: usize,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        if config.accept_invalid_certs {
            warn!("TLS certificate validation is disabled");
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(0)
            .redirect(reqwest::redirect::Policy::none())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
        })
    }

    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        let mut attempts = 0;

        loop {
            attempts += 1;
            let start = Instant::now();

            match self.attempt(url).await {
                Ok((status, body)) => {
                    let elapsed = start.elapsed();
                    debug!("GET {} -> {} in {:?} (attempt {})", url, status, elapsed, attempts);
                    return FetchOutcome::Response(FetchResponse {
                        status,
                        body,
                        elapsed,
                        attempts,
                    });
                }
                Err(e) if is_transient(&e) && attempts <= self.max_retries => {
                    warn!("Transient error for {} (attempt {}): {}", url, attempts, e);
                }
                Err(e) => {
                    debug!("No response from {} after {} attempt(s): {}", url, attempts, e);
                    return FetchOutcome::NoResponse {
                        attempts,
                        reason: e.to_string(),
                    };
                }
            }
        }
    }

    async fn attempt(&self, url: &str) -> std::result::Result<(u16, String), reqwest::Error> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, random_user_agent())
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok((status, body))
    }
}

/// Deadline expiry and TLS handshake failures are worth another try;
/// DNS failures, refused connections and the rest are not.
fn is_transient(error: &reqwest::Error) -> bool {
    if error.is_timeout() {
        return true;
    }
    error.is_connect() && error.source().is_some_and(|cause| mentions_tls(cause))
}

fn mentions_tls(error: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(cause) = current {
        let message = cause.to_string().to_lowercase();
        if ["tls", "ssl", "certificate", "handshake"]
            .iter()
            .any(|needle| message.contains(needle))
        {
            return true;
        }
        current = cause.source();
    }
    false
}
