use crate::error::Result;
use indicatif::{ProgressBar, ProgressStyle};
use sitemap_verifier_scanner::result::VerificationRecord;
use sitemap_verifier_scanner::scheduler::effective_window;
use sitemap_verifier_scanner::{
    BatchScheduler, ExpandConfig, FetchConfig, Fetcher, ScanError, SitemapExpander, UrlVerifier,
};
use std::sync::Arc;
use tracing::info;
use url::Url;

/// Options for configuring a verification run
#[derive(Debug, Clone)]
pub struct VerifyOptions {
    pub sitemap_url: String,
    /// Maximum number of URLs verified in parallel per wave
    pub concurrency: usize,
    /// Nested sitemap index levels followed below the root
    pub max_depth: usize,
    pub fetch: FetchConfig,
    pub show_progress_bars: bool,
}

impl VerifyOptions {
    pub fn new(sitemap_url: impl Into<String>) -> Self {
        Self {
            sitemap_url: sitemap_url.into(),
            concurrency: 30,
            max_depth: ExpandConfig::default().max_depth,
            fetch: FetchConfig::default(),
            show_progress_bars: false,
        }
    }
}

/// Callback for each child sitemap about to be expanded
pub type SitemapProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Callback for reporting individual verification records as they come in
pub type VerifyResultCallback = Arc<dyn Fn(VerificationRecord) + Send + Sync>;

/// Check that the root is an absolute http(s) URL
pub fn parse_sitemap_url(raw: &str) -> std::result::Result<Url, ScanError> {
    let url = Url::parse(raw).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(ScanError::InvalidUrl(format!(
            "{}: expected an absolute http or https URL",
            raw
        ))),
    }
}

/// Expand the sitemap tree and verify every leaf URL it lists.
///
/// Only setup problems (bad root URL, HTTP client construction) are errors.
/// An unreachable or empty sitemap yields an empty result set.
pub async fn execute_verification(
    options: VerifyOptions,
    sitemap_callback: Option<SitemapProgressCallback>,
    result_callback: Option<VerifyResultCallback>,
) -> Result<Vec<VerificationRecord>> {
    let VerifyOptions {
        sitemap_url,
        concurrency,
        max_depth,
        fetch,
        show_progress_bars,
    } = options;

    let root = parse_sitemap_url(&sitemap_url)?;
    let fetcher = Fetcher::new(fetch)?;

    let mut expander = SitemapExpander::new(fetcher.clone(), ExpandConfig { max_depth });
    if let Some(callback) = sitemap_callback {
        expander = expander.with_sitemap_callback(callback);
    }

    let urls = expander.expand(root.as_str()).await;
    let window = effective_window(urls.len(), concurrency);
    info!(
        "Discovered {} URL(s) under {}; concurrency window {}",
        urls.len(),
        root,
        window
    );

    if urls.is_empty() {
        return Ok(Vec::new());
    }

    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new(urls.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("=>-"));
        }
        pb.set_message("verifying");
        Some(Arc::new(pb))
    } else {
        None
    };

    let mut scheduler = BatchScheduler::new(UrlVerifier::new(fetcher), window);

    if result_callback.is_some() || progress_bar.is_some() {
        let pb_clone = progress_bar.clone();
        let user_callback = result_callback.clone();
        scheduler = scheduler.with_result_callback(Arc::new(move |record: VerificationRecord| {
            if let Some(ref pb) = pb_clone {
                pb.inc(1);
            }
            if let Some(ref callback) = user_callback {
                callback(record);
            }
        }));
    }

    let records = scheduler.run(urls).await;

    if let Some(ref pb) = progress_bar {
        pb.finish_with_message(format!("{} URL(s) verified", records.len()));
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sitemap_url_accepts_http_and_https() {
        assert!(parse_sitemap_url("https://example.test/sitemap.xml").is_ok());
        assert!(parse_sitemap_url("http://example.test:8080/sitemap.xml").is_ok());
    }

    #[test]
    fn test_parse_sitemap_url_rejects_other_input() {
        for raw in ["not a url", "/sitemap.xml", "ftp://example.test/sitemap.xml", "file:///tmp/sitemap.xml"] {
            assert!(
                matches!(parse_sitemap_url(raw), Err(ScanError::InvalidUrl(_))),
                "{} should be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_default_options() {
        let options = VerifyOptions::new("https://example.test/sitemap.xml");
        assert_eq!(options.concurrency, 30);
        assert_eq!(options.max_depth, 3);
        assert!(!options.fetch.accept_invalid_certs);
        assert!(!options.show_progress_bars);
    }

    #[tokio::test]
    async fn test_invalid_root_is_an_error() {
        let result = execute_verification(VerifyOptions::new("nope"), None, None).await;
        assert!(result.is_err());
    }
}
