use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::models::{FetchStats, PostRecord};

const TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ranked {
    pub title: String,
    pub url: String,
    pub raw_date: String,
    pub view_count: u64,
    pub comment_count: u64,
}

impl From<&PostRecord> for Ranked {
    fn from(p: &PostRecord) -> Self {
        Self {
            title: p.title.clone(),
            url: p.url.clone(),
            raw_date: p.raw_date.clone(),
            view_count: p.view_count,
            comment_count: p.comment_count,
        }
    }
}

/// What a run hands to summarisation and rendering.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub generated_on: NaiveDate,
    pub days_back: u32,
    pub total: usize,
    pub stats: FetchStats,
    pub top_by_views: Vec<Ranked>,
    pub top_by_comments: Vec<Ranked>,
    pub posts: Vec<PostRecord>,
}

impl Report {
    pub fn build(generated_on: NaiveDate, days_back: u32, posts: Vec<PostRecord>, stats: FetchStats) -> Self {
        Self {
            generated_on,
            days_back,
            total: posts.len(),
            stats,
            top_by_views: top_by(&posts, |p| p.view_count),
            top_by_comments: top_by(&posts, |p| p.comment_count),
            posts,
        }
    }
}

/// Highest `key` first; equal keys keep listing order.
fn top_by(posts: &[PostRecord], key: impl Fn(&PostRecord) -> u64) -> Vec<Ranked> {
    let mut sorted: Vec<&PostRecord> = posts.iter().collect();
    sorted.sort_by(|a, b| key(b).cmp(&key(a)));
    sorted.into_iter().take(TOP_N).map(Ranked::from).collect()
}

pub trait ReportSink {
    fn deliver(&mut self, report: &Report) -> Result<()>;
}

/// Writes `report_{date}.json` into the output directory.
pub struct JsonReportWriter {
    dir: PathBuf,
    written: Option<PathBuf>,
}

impl JsonReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), written: None }
    }

    pub fn written(&self) -> Option<&PathBuf> {
        self.written.as_ref()
    }
}

impl ReportSink for JsonReportWriter {
    fn deliver(&mut self, report: &Report) -> Result<()> {
        fs::create_dir_all(&self.dir).with_context(|| format!("creating {}", self.dir.display()))?;
        let path = self.dir.join(format!("report_{}.json", report.generated_on.format("%Y-%m-%d")));
        let json = serde_json::to_string_pretty(report)?;
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), posts = report.total, "report written");
        self.written = Some(path);
        Ok(())
    }
}
