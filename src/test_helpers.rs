//! In-memory board used by the unit tests. Pages are keyed by URL, elements
//! by the exact selector string the layout asks for.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{BoardLayout, Settings};
use crate::page::{PageClient, PageElement, PageError};

const AFTER_LOGIN: &str = "about:after-login";

/// Board settings pointing at `https://board.test`, with every wait zeroed.
pub fn test_settings() -> Settings {
    Settings {
        base_url: "https://board.test/".into(),
        board_url: "https://board.test/akb48".into(),
        delay_min_ms: 0,
        delay_max_ms: 0,
        list_settle: Duration::ZERO,
        post_settle: Duration::ZERO,
        login_settle: Duration::ZERO,
        submit_settle: Duration::ZERO,
        ..Settings::default()
    }
}

pub fn post_url(id: u32) -> String {
    format!("https://board.test/akb48/{id}")
}

#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    text: String,
    attrs: HashMap<String, String>,
    children: HashMap<String, Vec<FakeElement>>,
    broken: bool,
}

impl FakeElement {
    pub fn with_text(text: &str) -> Self {
        Self { text: text.to_string(), ..Self::default() }
    }

    /// An element whose text read fails, like a node detached mid-read.
    pub fn broken() -> Self {
        Self { broken: true, ..Self::default() }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_child(mut self, selector: &str, child: FakeElement) -> Self {
        self.children.entry(selector.to_string()).or_default().push(child);
        self
    }
}

#[async_trait]
impl PageElement for FakeElement {
    async fn text(&self) -> Result<String, PageError> {
        if self.broken {
            return Err(PageError::NotFound("stale element".into()));
        }
        Ok(self.text.clone())
    }

    async fn attr(&self, name: &str) -> Result<Option<String>, PageError> {
        Ok(self.attrs.get(name).cloned())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Self>, PageError> {
        Ok(self.children.get(selector).cloned().unwrap_or_default())
    }
}

/// Listing row carrying every cell the layout reads.
pub fn row(layout: &BoardLayout, title: &str, href: &str, date: &str, views: &str, comments: &str) -> FakeElement {
    FakeElement::default()
        .with_child(&layout.row_title, FakeElement::with_text(title).with_attr("href", href))
        .with_child(&layout.row_date, FakeElement::with_text(date))
        .with_child(&layout.row_views, FakeElement::with_text(views))
        .with_child(&layout.row_comments, FakeElement::with_text(comments))
}

#[derive(Default)]
struct Session {
    current: Option<String>,
    visits: Vec<String>,
    fills: Vec<(String, String)>,
    clicks: Vec<String>,
}

#[derive(Default)]
pub struct FakeBoard {
    pages: HashMap<String, HashMap<String, Vec<FakeElement>>>,
    failing: HashSet<String>,
    login_url: Option<String>,
    accept_login: bool,
    session: Mutex<Session>,
}

impl FakeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_elements(mut self, url: &str, selector: &str, elements: Vec<FakeElement>) -> Self {
        self.pages
            .entry(url.to_string())
            .or_default()
            .entry(selector.to_string())
            .or_default()
            .extend(elements);
        self
    }

    pub fn with_listing(self, settings: &Settings, page: u32, rows: Vec<FakeElement>) -> Self {
        let url = settings.page_url(page);
        let selector = settings.layout.rows.clone();
        self.with_elements(&url, &selector, rows)
    }

    /// Post page with an optional body and one comment item per entry.
    pub fn with_post(self, url: &str, layout: &BoardLayout, body: Option<&str>, comments: &[&str]) -> Self {
        let bodies = body.map(|b| vec![FakeElement::with_text(b)]).unwrap_or_default();
        let items = comments
            .iter()
            .map(|c| FakeElement::default().with_child(&layout.comment_text, FakeElement::with_text(c)))
            .collect();
        self.with_elements(url, &layout.body, bodies)
            .with_elements(url, &layout.comment_items, items)
    }

    pub fn with_login_page(mut self, url: &str, layout: &BoardLayout, accept: bool) -> Self {
        self.login_url = Some(url.to_string());
        self.accept_login = accept;
        self.with_elements(url, &layout.login_user, vec![FakeElement::default()])
            .with_elements(url, &layout.login_password, vec![FakeElement::default()])
            .with_elements(url, &layout.login_submit, vec![FakeElement::default()])
    }

    pub fn with_failure(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub fn visits(&self) -> Vec<String> {
        self.session.lock().unwrap().visits.clone()
    }

    pub fn visit_count(&self, url: &str) -> usize {
        self.session.lock().unwrap().visits.iter().filter(|v| *v == url).count()
    }

    pub fn fills(&self) -> Vec<(String, String)> {
        self.session.lock().unwrap().fills.clone()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.session.lock().unwrap().clicks.clone()
    }

    fn current_elements(&self, selector: &str) -> Vec<FakeElement> {
        let session = self.session.lock().unwrap();
        session
            .current
            .as_ref()
            .and_then(|url| self.pages.get(url))
            .and_then(|page| page.get(selector))
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl PageClient for FakeBoard {
    type Element = FakeElement;

    async fn navigate(&self, url: &str) -> Result<(), PageError> {
        let mut session = self.session.lock().unwrap();
        session.visits.push(url.to_string());
        if self.failing.contains(url) {
            return Err(PageError::Navigation { url: url.to_string(), reason: "connection reset".into() });
        }
        session.current = Some(url.to_string());
        Ok(())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<FakeElement>, PageError> {
        Ok(self.current_elements(selector))
    }

    async fn fill_field(&self, selector: &str, value: &str) -> Result<(), PageError> {
        if self.current_elements(selector).is_empty() {
            return Err(PageError::NotFound(selector.to_string()));
        }
        self.session.lock().unwrap().fills.push((selector.to_string(), value.to_string()));
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<(), PageError> {
        if self.current_elements(selector).is_empty() {
            return Err(PageError::NotFound(selector.to_string()));
        }
        let mut session = self.session.lock().unwrap();
        session.clicks.push(selector.to_string());
        if self.accept_login && session.current == self.login_url {
            session.current = Some(AFTER_LOGIN.to_string());
        }
        Ok(())
    }
}
