use anyhow::{Context, Result};
use indicatif::ProgressBar;
use tracing::{error, info};

use crate::cache::ContentCache;
use crate::config::{Credentials, Settings};
use crate::dates::RunWindow;
use crate::fetcher::fetch_contents;
use crate::listing::collect;
use crate::models::{FetchStats, PostRecord};
use crate::nav::login;
use crate::page::PageClient;
use crate::report::{Report, ReportSink};
use crate::throttle::Throttle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    AuthenticatingSession,
    CollectingListing,
    FetchingContent,
    Done,
    Failed,
}

#[derive(Debug)]
pub struct RunOutcome {
    pub state: RunState,
    /// Where the run was when it failed.
    pub failed_in: Option<RunState>,
    pub posts: Vec<PostRecord>,
    pub stats: FetchStats,
    pub error: Option<anyhow::Error>,
}

struct Tracker {
    state: RunState,
    posts: Vec<PostRecord>,
    stats: FetchStats,
}

impl Tracker {
    fn enter(&mut self, next: RunState) {
        info!(from = ?self.state, to = ?next, "run state");
        self.state = next;
    }
}

/// One harvesting run over a session lent by the caller. The session is
/// never closed here.
pub struct Harvester {
    settings: Settings,
    credentials: Credentials,
    store: ContentCache,
    throttle: Throttle,
    progress: ProgressBar,
}

impl Harvester {
    pub fn new(settings: Settings, credentials: Credentials) -> Self {
        let store = ContentCache::new(settings.cache_path.clone());
        let throttle = Throttle::new(settings.delay_min_ms, settings.delay_max_ms);
        Self {
            settings,
            credentials,
            store,
            throttle,
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Drives the run to `Done` or `Failed`. Errors never escape: they are
    /// logged and reported through the outcome.
    pub async fn run<C, R>(&self, client: &C, window: RunWindow, sink: &mut R) -> RunOutcome
    where
        C: PageClient,
        R: ReportSink + ?Sized,
    {
        let mut tracker = Tracker {
            state: RunState::AuthenticatingSession,
            posts: Vec::new(),
            stats: FetchStats::default(),
        };

        match self.drive(client, window, sink, &mut tracker).await {
            Ok(()) => RunOutcome {
                state: RunState::Done,
                failed_in: None,
                posts: tracker.posts,
                stats: tracker.stats,
                error: None,
            },
            Err(e) => {
                error!(state = ?tracker.state, error = %format!("{e:#}"), "run failed");
                RunOutcome {
                    state: RunState::Failed,
                    failed_in: Some(tracker.state),
                    posts: tracker.posts,
                    stats: tracker.stats,
                    error: Some(e),
                }
            }
        }
    }

    async fn drive<C, R>(
        &self,
        client: &C,
        window: RunWindow,
        sink: &mut R,
        tracker: &mut Tracker,
    ) -> Result<()>
    where
        C: PageClient,
        R: ReportSink + ?Sized,
    {
        let s = &self.settings;
        info!(board = %s.board_url, days_back = window.days_back, cutoff = %window.cutoff, "run started");
        let cache = self.store.load();
        info!(path = %self.store.path().display(), entries = cache.len(), "content cache loaded");

        self.progress.set_message("logging in");
        login(
            client,
            &s.login_url(),
            &s.layout,
            &self.credentials,
            s.login_settle,
            s.submit_settle,
        )
        .await
        .context("authenticating")?;

        tracker.enter(RunState::CollectingListing);
        let mut posts = collect(client, s, &window, &self.throttle, &self.progress).await?;

        if posts.is_empty() {
            info!("no posts inside the window");
            tracker.enter(RunState::Done);
            sink.deliver(&Report::build(window.today, window.days_back, Vec::new(), FetchStats::default()))
                .context("delivering report")?;
            return Ok(());
        }

        tracker.enter(RunState::FetchingContent);
        let (stats, saved) =
            fetch_contents(client, &mut posts, cache, &self.store, s, &self.throttle, &self.progress).await;
        tracker.posts = posts;
        tracker.stats = stats;
        saved.context("saving content cache")?;

        tracker.enter(RunState::Done);
        self.progress.set_message("writing report");
        let report = Report::build(window.today, window.days_back, tracker.posts.clone(), stats);
        sink.deliver(&report).context("delivering report")?;
        Ok(())
    }
}
