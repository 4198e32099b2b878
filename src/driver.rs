use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{seq::SliceRandom, SeedableRng};
use thirtyfour::prelude::*;
use thirtyfour::PageLoadStrategy;

use crate::page::{PageClient, PageElement, PageError};

static UAS: &[&str] = &[
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
];
static LANGS: &[&str] = &["ko-KR,ko;q=0.9,en;q=0.8", "ko-KR,ko;q=0.9", "en-US,en;q=0.9,ko;q=0.8"];
static SIZES: &[(u32, u32)] = &[(1366, 768), (1440, 900), (1600, 900), (1680, 1050)];

pub async fn make_driver(
    headless: bool,
    user_data_dir: Option<&str>,
    seed: u64,
    webdriver_url: &str,
) -> WebDriverResult<WebDriver> {
    let mut caps = DesiredCapabilities::chrome();

    let mut args: Vec<String> = vec![
        "--disable-gpu".into(),
        "--no-sandbox".into(),
        "--disable-dev-shm-usage".into(),
        "--disable-blink-features=AutomationControlled".into(),
        "--no-first-run".into(),
        "--no-default-browser-check".into(),
    ];
    if headless {
        args.push("--headless=new".into());
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let ua = UAS.choose(&mut rng).copied().unwrap_or(UAS[0]);
    let lang = LANGS.choose(&mut rng).copied().unwrap_or(LANGS[0]);
    let (w, h) = SIZES.choose(&mut rng).copied().unwrap_or(SIZES[0]);

    args.push(format!("--user-agent={ua}"));
    args.push(format!("--lang={lang}"));
    args.push(format!("--window-size={w},{h}"));
    if let Some(dir) = user_data_dir {
        args.push(format!("--user-data-dir={dir}"));
    }

    for a in &args {
        caps.add_arg(a)?;
    }
    caps.set_page_load_strategy(PageLoadStrategy::Eager)?;

    WebDriver::new(webdriver_url, caps).await
}

/// A WebDriver session seen through the [`PageClient`] capability.
pub struct BrowserPage {
    driver: WebDriver,
}

impl BrowserPage {
    pub fn new(driver: WebDriver) -> Self {
        Self { driver }
    }

    pub async fn quit(self) -> WebDriverResult<()> {
        self.driver.quit().await
    }
}

#[async_trait]
impl PageElement for WebElement {
    async fn text(&self) -> Result<String, PageError> {
        Ok(WebElement::text(self).await?)
    }

    async fn attr(&self, name: &str) -> Result<Option<String>, PageError> {
        Ok(WebElement::attr(self, name).await?)
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Self>, PageError> {
        Ok(WebElement::find_all(self, By::Css(selector)).await?)
    }
}

#[async_trait]
impl PageClient for BrowserPage {
    type Element = WebElement;

    async fn navigate(&self, url: &str) -> Result<(), PageError> {
        self.driver.goto(url).await.map_err(|e| PageError::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<WebElement>, PageError> {
        Ok(self.driver.find_all(By::Css(selector)).await?)
    }

    async fn fill_field(&self, selector: &str, value: &str) -> Result<(), PageError> {
        let field = PageClient::find(self, selector)
            .await?
            .ok_or_else(|| PageError::NotFound(selector.to_string()))?;
        field.clear().await?;
        field.send_keys(value).await?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<(), PageError> {
        let target = PageClient::find(self, selector)
            .await?
            .ok_or_else(|| PageError::NotFound(selector.to_string()))?;
        target.click().await?;
        Ok(())
    }
}
