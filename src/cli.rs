use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::Settings;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Incremental board harvester (listing walk + cached post contents)")]
pub struct Args {
    #[arg(long, default_value = "https://theqoo.net/")]
    pub base_url: String,

    #[arg(long, default_value = "https://theqoo.net/akb48")]
    pub board_url: String,

    #[arg(long, default_value_t = 3)]
    pub days_back: u32,

    // values in ms
    #[arg(long, default_value_t = 1000)]
    pub delay_min: u64,

    #[arg(long, default_value_t = 2000)]
    pub delay_max: u64,

    #[arg(long, default_value_t = 1000)]
    pub list_settle: u64,

    #[arg(long, default_value_t = 500)]
    pub post_settle: u64,

    #[arg(long, default_value_t = 10)]
    pub max_comments: usize,

    /// Stop after this many listing pages even if the window is not exhausted.
    #[arg(long)]
    pub max_pages: Option<u32>,

    #[arg(long, default_value = "output/posts_cache.json")]
    pub cache: PathBuf,

    #[arg(long, default_value = "output")]
    pub output_dir: PathBuf,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub headless: bool,

    #[arg(long)]
    pub chrome_user_data_dir: Option<String>,
}

impl Args {
    pub fn settings(&self) -> Settings {
        let defaults = Settings::default();
        Settings {
            base_url: self.base_url.clone(),
            board_url: self.board_url.trim_end_matches('/').to_string(),
            days_back: self.days_back,
            delay_min_ms: self.delay_min,
            delay_max_ms: self.delay_max,
            list_settle: Duration::from_millis(self.list_settle),
            post_settle: Duration::from_millis(self.post_settle),
            max_comments: self.max_comments,
            max_pages: self.max_pages,
            cache_path: self.cache.clone(),
            output_dir: self.output_dir.clone(),
            ..defaults
        }
    }
}
