//! Browser capability the harvester depends on.
//!
//! Everything above this module talks to a page only through CSS selector
//! lists; which alternate inside a list matched is the client's business.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("webdriver: {0}")]
    Driver(#[from] thirtyfour::error::WebDriverError),

    #[error("no element matches `{0}`")]
    NotFound(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },
}

#[async_trait]
pub trait PageElement: Send + Sync + Sized {
    async fn text(&self) -> Result<String, PageError>;

    async fn attr(&self, name: &str) -> Result<Option<String>, PageError>;

    async fn find_all(&self, selector: &str) -> Result<Vec<Self>, PageError>;

    /// First descendant matching `selector`, if any.
    async fn find(&self, selector: &str) -> Result<Option<Self>, PageError> {
        Ok(self.find_all(selector).await?.into_iter().next())
    }
}

#[async_trait]
pub trait PageClient: Send + Sync {
    type Element: PageElement;

    async fn navigate(&self, url: &str) -> Result<(), PageError>;

    async fn find_all(&self, selector: &str) -> Result<Vec<Self::Element>, PageError>;

    async fn fill_field(&self, selector: &str, value: &str) -> Result<(), PageError>;

    async fn click(&self, selector: &str) -> Result<(), PageError>;

    async fn find(&self, selector: &str) -> Result<Option<Self::Element>, PageError> {
        Ok(self.find_all(selector).await?.into_iter().next())
    }
}
