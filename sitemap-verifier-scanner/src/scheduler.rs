use crate::result::VerificationRecord;
use crate::verifier::UrlVerifier;
use futures::future::join_all;
use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Called with `(wave_index, wave_size)` just before a wave is dispatched
pub type WaveCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Called with each record as soon as its verification finishes
pub type ResultCallback = Arc<dyn Fn(VerificationRecord) + Send + Sync>;

/// Width of a dispatch wave: never wider than the URL list, 0 when there is nothing to do.
pub fn effective_window(url_count: usize, concurrency_cap: usize) -> usize {
    url_count.min(concurrency_cap.max(1))
}

/// Split `0..url_count` into consecutive, non-overlapping waves.
pub fn plan_waves(url_count: usize, concurrency_cap: usize) -> Vec<Range<usize>> {
    let window = effective_window(url_count, concurrency_cap);
    if window == 0 {
        return Vec::new();
    }

    (0..url_count)
        .step_by(window)
        .map(|start| start..(start + window).min(url_count))
        .collect()
}

/// Append-only record store shared by concurrently finishing verifications.
#[derive(Debug, Clone, Default)]
pub struct ResultCollector {
    records: Arc<Mutex<Vec<VerificationRecord>>>,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, record: VerificationRecord) {
        self.records.lock().await.push(record);
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    pub async fn into_records(self) -> Vec<VerificationRecord> {
        std::mem::take(&mut *self.records.lock().await)
    }
}

/// Verifies URLs in waves of at most `concurrency_cap` parallel tasks,
/// waiting for each wave to drain before starting the next.
pub struct BatchScheduler {
    verifier: UrlVerifier,
    concurrency_cap: usize,
    wave_callback: Option<WaveCallback>,
    result_callback: Option<ResultCallback>,
}

impl BatchScheduler {
    pub fn new(verifier: UrlVerifier, concurrency_cap: usize) -> Self {
        Self {
            verifier,
            concurrency_cap,
            wave_callback: None,
            result_callback: None,
        }
    }

    pub fn with_wave_callback(mut self, callback: WaveCallback) -> Self {
        self.wave_callback = Some(callback);
        self
    }

    pub fn with_result_callback(mut self, callback: ResultCallback) -> Self {
        self.result_callback = Some(callback);
        self
    }

    pub async fn run(&self, urls: Vec<String>) -> Vec<VerificationRecord> {
        let waves = plan_waves(urls.len(), self.concurrency_cap);
        info!(
            "Verifying {} URL(s) in {} wave(s) of up to {}",
            urls.len(),
            waves.len(),
            effective_window(urls.len(), self.concurrency_cap)
        );

        let collector = ResultCollector::new();

        for (wave_index, range) in waves.into_iter().enumerate() {
            let wave = &urls[range];
            debug!("Dispatching wave {} with {} URL(s)", wave_index, wave.len());

            if let Some(ref callback) = self.wave_callback {
                callback(wave_index, wave.len());
            }

            let tasks: Vec<_> = wave
                .iter()
                .map(|url| {
                    let verifier = self.verifier.clone();
                    let collector = collector.clone();
                    let result_cb = self.result_callback.clone();
                    let url = url.clone();
                    let stored = Arc::new(AtomicBool::new(false));
                    let stored_flag = stored.clone();

                    let handle = tokio::spawn(async move {
                        let record = verifier.verify(&url).await;
                        collector.push(record.clone()).await;
                        stored_flag.store(true, Ordering::SeqCst);
                        if let Some(callback) = result_cb {
                            callback(record);
                        }
                    });
                    (handle, stored)
                })
                .collect();

            let (handles, stored): (Vec<_>, Vec<_>) = tasks.into_iter().unzip();
            let joined = join_all(handles).await;

            for ((url, result), stored) in wave.iter().zip(joined).zip(stored) {
                if let Err(e) = result {
                    warn!("Verification task for {} failed: {}", url, e);
                    // Keep the count 1:1 when the task died before storing its record
                    if !stored.load(Ordering::SeqCst) {
                        collector.push(VerificationRecord::new(url.clone())).await;
                    }
                }
            }
        }

        let records = collector.into_records().await;
        info!("Verification complete. {} record(s) collected", records.len());
        records
    }
}
