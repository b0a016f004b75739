use crate::error::Result;
use crate::fetcher::{FetchOutcome, Fetcher};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Called with the URL of every child sitemap before it is fetched
pub type SitemapCallback = Arc<dyn Fn(String) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SitemapKind {
    /// `<sitemapindex>`: entries point at further sitemaps
    Index,
    /// `<urlset>` or anything else: entries are pages
    UrlSet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapDocument {
    pub kind: SitemapKind,
    pub locs: Vec<String>,
}

/// Parse a sitemap or sitemap index, collecting every `<loc>` in document order.
///
/// Only `<loc>` elements in the root element's namespace count, which for real
/// sitemaps is `http://www.sitemaps.org/schemas/sitemap/0.9`.
pub fn parse_sitemap(xml: &str) -> Result<SitemapDocument> {
    let document = roxmltree::Document::parse(xml)?;
    let root = document.root_element();
    let namespace = root.tag_name().namespace();

    let kind = if root.tag_name().name() == "sitemapindex" {
        SitemapKind::Index
    } else {
        SitemapKind::UrlSet
    };

    let locs = root
        .descendants()
        .filter(|node| {
            node.is_element()
                && node.tag_name().name() == "loc"
                && node.tag_name().namespace() == namespace
        })
        .filter_map(|node| node.text())
        .map(str::trim)
        .filter(|loc| !loc.is_empty())
        .map(String::from)
        .collect();

    Ok(SitemapDocument { kind, locs })
}

#[derive(Debug, Clone)]
pub struct ExpandConfig {
    /// Levels of `<sitemapindex>` nesting followed beyond the root's own
    /// children; 0 still expands root -> child sitemaps -> pages
    pub max_depth: usize,
}

impl Default for ExpandConfig {
    fn default() -> Self {
        Self { max_depth: 3 }
    }
}

pub struct SitemapExpander {
    fetcher: Fetcher,
    max_depth: usize,
    sitemap_callback: Option<SitemapCallback>,
}

impl SitemapExpander {
    pub fn new(fetcher: Fetcher, config: ExpandConfig) -> Self {
        Self {
            fetcher,
            max_depth: config.max_depth,
            sitemap_callback: None,
        }
    }

    pub fn with_sitemap_callback(mut self, callback: SitemapCallback) -> Self {
        self.sitemap_callback = Some(callback);
        self
    }

    /// Walk the sitemap tree under `root_url` and return every leaf URL.
    ///
    /// The root's `<loc>` entries are always child sitemaps. Below the root a
    /// `<sitemapindex>` is expanded further while its nesting is within
    /// `max_depth`, and any other document lists leaf URLs.
    ///
    /// Failures never abort the walk: an unreachable, non-200 or malformed
    /// document simply contributes no children.
    pub async fn expand(&self, root_url: &str) -> Vec<String> {
        info!("Expanding sitemap {} (max depth {})", root_url, self.max_depth);

        let mut queue = VecDeque::new();
        let mut leaves = Vec::new();

        // Each entry carries the sitemaps above it; only those are cycles
        queue.push_back((root_url.to_string(), 0usize, Arc::new(Vec::<String>::new())));

        while let Some((url, depth, ancestors)) = queue.pop_front() {
            if depth > 0
                && let Some(ref callback) = self.sitemap_callback
            {
                callback(url.clone());
            }

            let Some(document) = self.fetch_document(&url).await else {
                continue;
            };

            if depth > 0 && document.kind == SitemapKind::UrlSet {
                debug!("{} lists {} URL(s)", url, document.locs.len());
                leaves.extend(document.locs);
                continue;
            }

            if depth > self.max_depth {
                warn!(
                    "Skipping sitemap index {} at depth {}: nesting limit is {}",
                    url, depth, self.max_depth
                );
                continue;
            }

            debug!("{} lists {} child sitemap(s)", url, document.locs.len());
            let mut path = ancestors.as_ref().clone();
            path.push(url);
            let path = Arc::new(path);

            for child in document.locs {
                if path.contains(&child) {
                    debug!("{} refers back to an enclosing sitemap, skipping", child);
                    continue;
                }
                queue.push_back((child, depth + 1, path.clone()));
            }
        }

        info!("Sitemap expansion complete. Found {} URL(s)", leaves.len());
        leaves
    }

    async fn fetch_document(&self, url: &str) -> Option<SitemapDocument> {
        let response = match self.fetcher.fetch(url).await {
            FetchOutcome::Response(response) => response,
            FetchOutcome::NoResponse { attempts, reason } => {
                warn!("Sitemap {} unreachable after {} attempt(s): {}", url, attempts, reason);
                return None;
            }
        };

        if response.status != 200 {
            warn!("Sitemap {} returned HTTP {}, ignoring", url, response.status);
            return None;
        }

        match parse_sitemap(&response.body) {
            Ok(document) => Some(document),
            Err(e) => {
                warn!("Sitemap {} is not valid XML: {}", url, e);
                None
            }
        }
    }
}
