use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::BoardLayout;
use crate::page::{PageClient, PageElement, PageError};

#[derive(Debug, Error)]
pub enum RowError {
    #[error("row has no title link")]
    NoTitle,

    #[error("title link has no href")]
    NoHref,

    #[error("cannot resolve `{href}`: {reason}")]
    BadHref { href: String, reason: String },

    #[error(transparent)]
    Page(#[from] PageError),
}

/// Listing cells of one row, before the date is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowMeta {
    pub title: String,
    pub url: String,
    pub raw_date: String,
    pub views: u64,
    pub comments: u64,
}

/// Trims every line, drops the blank ones and rejoins with `\n`.
pub fn normalize_text(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reads a counter cell such as `1,234` or `[12]`. Decoration in `strip` is
/// removed, then the leading digits are parsed; anything else counts as 0.
pub fn parse_count(text: &str, strip: &[char]) -> u64 {
    let cleaned: String = text.trim().chars().filter(|c| !strip.contains(c)).collect();
    let digits: String = cleaned.trim().chars().take_while(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

const VIEW_DECORATION: &[char] = &[','];
const COMMENT_DECORATION: &[char] = &['[', ']', '(', ')', ','];

async fn cell_text<E: PageElement>(row: &E, selector: &str) -> Result<Option<String>, PageError> {
    match row.find(selector).await? {
        Some(el) => Ok(Some(el.text().await?.trim().to_string())),
        None => Ok(None),
    }
}

pub async fn read_row<E: PageElement>(row: &E, layout: &BoardLayout, base: &Url) -> Result<RowMeta, RowError> {
    let link = row.find(&layout.row_title).await?.ok_or(RowError::NoTitle)?;
    let title = link.text().await?.trim().to_string();
    let href = link.attr("href").await?.filter(|h| !h.trim().is_empty()).ok_or(RowError::NoHref)?;
    let url = base
        .join(href.trim())
        .map_err(|e| RowError::BadHref { href: href.clone(), reason: e.to_string() })?
        .to_string();

    let raw_date = cell_text(row, &layout.row_date).await?.unwrap_or_default();
    let views = cell_text(row, &layout.row_views)
        .await?
        .map(|t| parse_count(&t, VIEW_DECORATION))
        .unwrap_or(0);
    let comments = cell_text(row, &layout.row_comments)
        .await?
        .map(|t| parse_count(&t, COMMENT_DECORATION))
        .unwrap_or(0);

    Ok(RowMeta { title, url, raw_date, views, comments })
}

/// Body text of the current post page, `None` when no body element matches.
pub async fn read_body<C: PageClient>(client: &C, layout: &BoardLayout) -> Result<Option<String>, PageError> {
    match client.find(&layout.body).await? {
        Some(el) => Ok(Some(normalize_text(el.text().await?.trim()))),
        None => Ok(None),
    }
}

/// First `limit` comment items of the current post page, normalized. Items
/// that fail to read or come out empty are skipped.
pub async fn read_comments<C: PageClient>(
    client: &C,
    layout: &BoardLayout,
    limit: usize,
) -> Result<Vec<String>, PageError> {
    let items = client.find_all(&layout.comment_items).await?;
    let mut out = Vec::new();
    for item in items.into_iter().take(limit) {
        let text = match cell_text(&item, &layout.comment_text).await {
            Ok(Some(text)) => normalize_text(&text),
            Ok(None) => continue,
            Err(e) => {
                debug!(error = %e, "skipping unreadable comment");
                continue;
            }
        };
        if !text.is_empty() {
            out.push(text);
        }
    }
    Ok(out)
}
