use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

pub const ID_VAR: &str = "THEQOO_ID";
pub const PW_VAR: &str = "THEQOO_PW";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set (environment or .env)")]
    MissingCredential(&'static str),

    #[error("invalid board url `{url}`: {reason}")]
    BoardUrl { url: String, reason: String },
}

/// Account used to open the board session.
#[derive(Clone)]
pub struct Credentials {
    pub user_id: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingCredential(key))
        };
        Ok(Self {
            user_id: read(ID_VAR)?,
            password: read(PW_VAR)?,
        })
    }

    pub fn is_complete(&self) -> bool {
        !self.user_id.trim().is_empty() && !self.password.trim().is_empty()
    }
}

/// Loads `.env` into the process environment when one exists.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(e) if is_missing_file(&e) => info!("no .env file; reading credentials from the environment"),
        Err(e) => warn!(error = %e, ".env could not be loaded; reading credentials from the environment"),
    }
}

fn is_missing_file(e: &dotenvy::Error) -> bool {
    matches!(e, dotenvy::Error::Io(io) if io.kind() == std::io::ErrorKind::NotFound)
}

/// CSS selector lists for one board skin. Alternates are comma-separated.
#[derive(Debug, Clone)]
pub struct BoardLayout {
    pub rows: String,
    pub row_title: String,
    pub row_date: String,
    pub row_views: String,
    pub row_comments: String,
    pub body: String,
    pub comment_items: String,
    pub comment_text: String,
    pub login_user: String,
    pub login_password: String,
    pub login_submit: String,
}

impl Default for BoardLayout {
    fn default() -> Self {
        Self {
            rows: "table.bd_lst tbody tr:not(.notice)".into(),
            row_title: "td.title a, td.title .title_wrapper a".into(),
            row_date: "td.time, td.date".into(),
            row_views: "td.m_no, td.readNum".into(),
            row_comments: "td.title .replyNum, td.title .cmt, a.replyNum".into(),
            body: "div.rd_body article, div.rd_body .xe_content, div.document_srl .xe_content".into(),
            comment_items: ".fdb_lst_ul li.fdb_itm, .comment_list .comment-item, .cmt_list li".into(),
            comment_text: ".comment-content, .xe_content, .cmt_content, .fdb_itm_cont".into(),
            login_user: r#"input[name="user_id"]"#.into(),
            login_password: r#"input[name="password"]"#.into(),
            login_submit: r#".btn-login, input[type="submit"], button[type="submit"]"#.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    /// Site root; relative post links resolve against it.
    pub base_url: String,
    /// Listing URL without the page query.
    pub board_url: String,
    pub days_back: u32,
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
    pub list_settle: Duration,
    pub post_settle: Duration,
    pub login_settle: Duration,
    pub submit_settle: Duration,
    pub max_comments: usize,
    pub max_pages: Option<u32>,
    pub cache_path: PathBuf,
    pub output_dir: PathBuf,
    pub layout: BoardLayout,
}

impl Settings {
    pub fn base(&self) -> Result<url::Url, ConfigError> {
        url::Url::parse(&self.base_url).map_err(|e| ConfigError::BoardUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })
    }

    pub fn login_url(&self) -> String {
        format!("{}/?act=dispMemberLoginForm", self.base_url.trim_end_matches('/'))
    }

    pub fn page_url(&self, page: u32) -> String {
        format!("{}?page={page}", self.board_url)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "https://theqoo.net/".into(),
            board_url: "https://theqoo.net/akb48".into(),
            days_back: 3,
            delay_min_ms: 1000,
            delay_max_ms: 2000,
            list_settle: Duration::from_millis(1000),
            post_settle: Duration::from_millis(500),
            login_settle: Duration::from_millis(1000),
            submit_settle: Duration::from_millis(2000),
            max_comments: 10,
            max_pages: None,
            cache_path: PathBuf::from("output").join("posts_cache.json"),
            output_dir: PathBuf::from("output"),
            layout: BoardLayout::default(),
        }
    }
}
