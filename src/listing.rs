use std::collections::HashSet;

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::dates::RunWindow;
use crate::extract::read_row;
use crate::models::PostRecord;
use crate::nav::visit;
use crate::page::PageClient;
use crate::throttle::Throttle;

/// Walks listing pages 1, 2, 3, ... collecting row metadata.
///
/// The board lists newest first, so the first row dated before the window
/// ends the walk: rows already taken stay, that row and everything after it
/// (including later pages) are dropped. An empty page means the board ran
/// out. A row that cannot be read is skipped; a page that cannot be loaded
/// fails the walk.
pub async fn collect<C: PageClient>(
    client: &C,
    settings: &Settings,
    window: &RunWindow,
    throttle: &Throttle,
    progress: &ProgressBar,
) -> Result<Vec<PostRecord>> {
    let base = settings.base()?;
    let layout = &settings.layout;

    let mut posts = Vec::new();
    let mut seen = HashSet::new();
    let mut page = 1u32;

    'pages: loop {
        if settings.max_pages.is_some_and(|max| page > max) {
            info!(max_pages = page - 1, "page cap reached");
            break;
        }

        let url = settings.page_url(page);
        progress.set_message(format!("listing page {page} ({} posts)", posts.len()));
        info!(page, "collecting listing page");

        visit(client, &url, settings.list_settle)
            .await
            .with_context(|| format!("loading listing page {page}"))?;
        let rows = client
            .find_all(&layout.rows)
            .await
            .with_context(|| format!("reading rows of listing page {page}"))?;
        if rows.is_empty() {
            info!(page, "no rows; end of board");
            break;
        }

        for row in &rows {
            let meta = match read_row(row, layout, &base).await {
                Ok(meta) => meta,
                Err(e) => {
                    warn!(page, error = %e, "skipping listing row");
                    continue;
                }
            };

            let parsed = window.parse(&meta.raw_date);
            if !window.admits(parsed) {
                info!(
                    page,
                    raw_date = %meta.raw_date,
                    days_back = window.days_back,
                    "post older than the window; stopping"
                );
                break 'pages;
            }

            if !seen.insert(meta.url.clone()) {
                debug!(url = %meta.url, "already listed; keeping the first");
                continue;
            }
            posts.push(PostRecord::new(
                meta.title,
                meta.url,
                meta.raw_date,
                parsed,
                meta.views,
                meta.comments,
            ));
        }

        page += 1;
        throttle.wait().await;
    }

    info!(count = posts.len(), "listing collected");
    Ok(posts)
}
