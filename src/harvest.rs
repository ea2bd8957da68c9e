//! Harvest orchestration
//!
//! Ties the pieces together for one run:
//! - Loading and validating the proxy pool
//! - Building the resilient fetcher on top of it
//! - Fetching every target page concurrently
//! - Handing each page body to the extractor

use crate::config::Config;
use crate::extract::{Extractor, MediaRecord};
use crate::fetcher::ResilientFetcher;
use crate::proxy::load_validated_pool;
use crate::HarvestError;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::watch;

/// Result of harvesting a single page
#[derive(Debug)]
pub struct PageHarvest {
    /// The page URL as requested
    pub url: String,

    /// Records found on the page, or why the page could not be harvested
    pub outcome: Result<Vec<MediaRecord>, HarvestError>,
}

impl PageHarvest {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Runs a complete harvest
///
/// This will:
/// 1. Load the proxy list and validate every proxy
/// 2. Build the fetcher over the surviving proxies
/// 3. Fetch all `urls` (at most `fetcher.concurrency` at once)
/// 4. Extract media records from each page
///
/// # Returns
///
/// * `Ok(Vec<PageHarvest>)` - One entry per URL, in input order
/// * `Err(HarvestError)` - The proxy pool could not be built
pub async fn run_harvest(
    config: &Config,
    urls: &[String],
    extractor: &dyn Extractor,
    shutdown: watch::Receiver<bool>,
) -> Result<Vec<PageHarvest>, HarvestError> {
    let pool = Arc::new(load_validated_pool(config).await?);
    let fetcher = ResilientFetcher::new(pool, &config.fetcher);

    let concurrency = config.fetcher.concurrency as usize;
    Ok(harvest_pages(&fetcher, urls, extractor, concurrency, shutdown).await)
}

/// Fetches and extracts every URL with an existing fetcher
///
/// Failures are kept per page; one page failing does not stop the others.
pub async fn harvest_pages(
    fetcher: &ResilientFetcher,
    urls: &[String],
    extractor: &dyn Extractor,
    concurrency: usize,
    shutdown: watch::Receiver<bool>,
) -> Vec<PageHarvest> {
    tracing::info!(
        "Harvesting {} page(s) through {} proxies",
        urls.len(),
        fetcher.pool().len()
    );

    futures::stream::iter(urls)
        .map(|url| {
            let shutdown = shutdown.clone();
            async move {
                let outcome = harvest_page(fetcher, url, extractor, shutdown).await;
                if let Err(e) = &outcome {
                    tracing::error!("Failed to harvest {}: {}", url, e);
                }
                PageHarvest {
                    url: url.clone(),
                    outcome,
                }
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}

async fn harvest_page(
    fetcher: &ResilientFetcher,
    url: &str,
    extractor: &dyn Extractor,
    shutdown: watch::Receiver<bool>,
) -> Result<Vec<MediaRecord>, HarvestError> {
    let body = fetcher.fetch_with_shutdown(url, shutdown).await?;
    let html = String::from_utf8_lossy(&body);
    Ok(extractor.extract(&html)?)
}
