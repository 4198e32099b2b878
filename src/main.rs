use anyhow::{Context, Result};
use clap::Parser;
use indicatif::ProgressBar;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod cache;
mod cli;
mod config;
mod crawler;
mod dates;
mod driver;
mod extract;
mod fetcher;
mod listing;
mod models;
mod nav;
mod page;
mod report;
mod throttle;

#[cfg(test)]
mod test_helpers;

use crate::cli::Args;
use crate::config::Credentials;
use crate::crawler::{Harvester, RunState};
use crate::dates::RunWindow;
use crate::driver::{make_driver, BrowserPage};
use crate::report::JsonReportWriter;

/// Seeds the user agent / language / window-size pick for the browser profile.
const PROFILE_SEED: u64 = 1000;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    config::load_dotenv();
    let credentials = Credentials::from_env()?;
    let settings = args.settings();
    settings.base()?;

    let window = RunWindow::starting_today(settings.days_back);
    let webdriver_url = std::env::var("WEBDRIVER_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:9515".to_string());

    let driver = make_driver(
        args.headless,
        args.chrome_user_data_dir.as_deref(),
        PROFILE_SEED,
        &webdriver_url,
    )
    .await
    .with_context(|| format!("starting webdriver session at {webdriver_url}"))?;
    let page = BrowserPage::new(driver);

    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message("Starting...");

    let mut sink = JsonReportWriter::new(settings.output_dir.clone());
    let harvester = Harvester::new(settings, credentials).with_progress(pb.clone());
    let outcome = harvester.run(&page, window, &mut sink).await;
    pb.finish_and_clear();

    if let Err(e) = page.quit().await {
        warn!(error = %e, "closing webdriver session");
    }

    match outcome.state {
        RunState::Done => {
            info!(
                posts = outcome.posts.len(),
                fetched = outcome.stats.fetched,
                cached = outcome.stats.cached,
                failed = outcome.stats.failed,
                "[RUN] finished"
            );
            if let Some(path) = sink.written() {
                info!(path = %path.display(), "[RUN] report");
            }
            Ok(())
        }
        _ => Err(outcome
            .error
            .unwrap_or_else(|| anyhow::anyhow!("run ended in {:?}", outcome.state))),
    }
}
