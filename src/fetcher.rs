use indicatif::ProgressBar;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::{CacheError, ContentCache};
use crate::config::Settings;
use crate::extract::{read_body, read_comments};
use crate::models::{CacheEntry, CacheMap, FetchStats, PostRecord};
use crate::nav::visit;
use crate::page::{PageClient, PageError};
use crate::throttle::Throttle;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("navigation failed: {0}")]
    Navigate(#[source] PageError),

    #[error("no post body on {0}")]
    MissingBody(String),

    #[error("reading page: {0}")]
    Read(#[source] PageError),
}

/// Loads one post page and reads its body and first comments.
pub async fn fetch_post<C: PageClient>(
    client: &C,
    url: &str,
    settings: &Settings,
) -> Result<CacheEntry, FetchError> {
    visit(client, url, settings.post_settle).await.map_err(FetchError::Navigate)?;

    let content = read_body(client, &settings.layout)
        .await
        .map_err(FetchError::Read)?
        .ok_or_else(|| FetchError::MissingBody(url.to_string()))?;
    let top_comments = read_comments(client, &settings.layout, settings.max_comments)
        .await
        .map_err(FetchError::Read)?;

    Ok(CacheEntry { content, top_comments })
}

fn short_title(title: &str) -> String {
    let mut out: String = title.chars().take(40).collect();
    if title.chars().count() > 40 {
        out.push('…');
    }
    out
}

/// Fills in content for every record, in listing order.
///
/// Cached URLs are copied without touching the network or the throttle.
/// Everything else is fetched; a success goes into the returned mapping, a
/// failure leaves the record empty and the mapping untouched so the next run
/// tries again. One bad post never stops the batch.
pub async fn enrich<C: PageClient>(
    client: &C,
    records: &mut [PostRecord],
    mut cache: CacheMap,
    settings: &Settings,
    throttle: &Throttle,
    progress: &ProgressBar,
) -> (CacheMap, FetchStats) {
    let mut stats = FetchStats::default();
    let total = records.len();
    info!(posts = total, cached_entries = cache.len(), "fetching post contents");

    for (i, record) in records.iter_mut().enumerate() {
        if let Some(hit) = cache.get(&record.url) {
            debug!(url = %record.url, "cache hit");
            record.apply(hit);
            stats.cached += 1;
            continue;
        }

        progress.set_message(format!("[{}/{total}] {}", i + 1, short_title(&record.title)));
        info!(n = i + 1, total, title = %short_title(&record.title), "fetching post");

        match fetch_post(client, &record.url, settings).await {
            Ok(entry) => {
                record.apply(&entry);
                cache.insert(record.url.clone(), entry);
                stats.fetched += 1;
                throttle.wait().await;
            }
            Err(e) => {
                warn!(url = %record.url, error = %e, "post fetch failed");
                record.clear_content();
                stats.failed += 1;
            }
        }
    }

    info!(fetched = stats.fetched, cached = stats.cached, failed = stats.failed, "post contents done");
    (cache, stats)
}

/// [`enrich`] followed by a single flush of the grown mapping.
///
/// The records and stats are filled in even when the flush fails.
pub async fn fetch_contents<C: PageClient>(
    client: &C,
    records: &mut [PostRecord],
    cache: CacheMap,
    store: &ContentCache,
    settings: &Settings,
    throttle: &Throttle,
    progress: &ProgressBar,
) -> (FetchStats, Result<(), CacheError>) {
    let (cache, stats) = enrich(client, records, cache, settings, throttle, progress).await;
    (stats, store.save(&cache))
}
