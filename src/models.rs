use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One listing row, later enriched with its body and comments.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    pub title: String,
    pub url: String,
    pub raw_date: String,
    pub parsed_date: Option<NaiveDate>,
    pub view_count: u64,
    pub comment_count: u64,
    pub content: String,
    pub top_comments: Vec<String>,
}

impl PostRecord {
    pub fn new(
        title: String,
        url: String,
        raw_date: String,
        parsed_date: Option<NaiveDate>,
        view_count: u64,
        comment_count: u64,
    ) -> Self {
        Self {
            title,
            url,
            raw_date,
            parsed_date,
            view_count,
            comment_count,
            content: String::new(),
            top_comments: Vec::new(),
        }
    }

    pub fn apply(&mut self, entry: &CacheEntry) {
        self.content = entry.content.clone();
        self.top_comments = entry.top_comments.clone();
    }

    pub fn clear_content(&mut self) {
        self.content.clear();
        self.top_comments.clear();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub content: String,
    #[serde(default)]
    pub top_comments: Vec<String>,
}

/// Post URL -> fetched content. Ordered so the cache file diffs cleanly.
pub type CacheMap = BTreeMap<String, CacheEntry>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FetchStats {
    pub fetched: usize,
    pub cached: usize,
    pub failed: usize,
}
