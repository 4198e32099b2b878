use std::time::Duration;

use thiserror::Error;
use tracing::info;

use crate::config::{BoardLayout, Credentials};
use crate::page::{PageClient, PageError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("credentials are incomplete")]
    MissingCredentials,

    #[error("login rejected: the login form is still shown after submitting")]
    Rejected,

    #[error(transparent)]
    Page(#[from] PageError),
}

/// Navigate, then give the page a moment to render its DOM.
pub async fn visit<C: PageClient>(
    client: &C,
    url: &str,
    settle: Duration,
) -> Result<(), PageError> {
    client.navigate(url).await?;
    if !settle.is_zero() {
        tokio::time::sleep(settle).await;
    }
    Ok(())
}

/// Submits the member login form and checks it went away.
pub async fn login<C: PageClient>(
    client: &C,
    login_url: &str,
    layout: &BoardLayout,
    creds: &Credentials,
    settle: Duration,
    after_submit: Duration,
) -> Result<(), AuthError> {
    if !creds.is_complete() {
        return Err(AuthError::MissingCredentials);
    }

    info!(user = %creds.user_id, "logging in");
    visit(client, login_url, settle).await?;
    client.fill_field(&layout.login_user, &creds.user_id).await?;
    client.fill_field(&layout.login_password, &creds.password).await?;
    client.click(&layout.login_submit).await?;
    if !after_submit.is_zero() {
        tokio::time::sleep(after_submit).await;
    }

    if client.find(&layout.login_password).await?.is_some() {
        return Err(AuthError::Rejected);
    }
    info!("login ok");
    Ok(())
}
