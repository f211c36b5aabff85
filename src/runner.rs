use anyhow::Result;
use clap::ValueEnum;
use log::info;

use crate::caption::CaptionStyle;
use crate::config::Config;
use crate::gateway::Gateway;
use crate::models::ContentKind;
use crate::notifier::{Notifier, NotifyReport};
use crate::store::{AuditLog, NotifiedSet, NotifiedStore};
use crate::tmdb::TmdbClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RunMode {
    /// Weekly top-rated movies, then top-rated TV shows.
    #[default]
    TopRated,
    /// The single latest movie and TV show.
    Latest,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub fetched: usize,
    pub report: NotifyReport,
}

/// One complete invocation: fetch, filter against the notified set, notify,
/// persist. Only store errors abort the run.
pub async fn run(config: &Config, mode: RunMode) -> Result<RunSummary> {
    let store = NotifiedStore::new(&config.storage.notified_path);
    let audit = AuditLog::new(&config.storage.audit_log_path);
    let gateway = Gateway::new(&config.gateway);
    let notifier = Notifier::new(&gateway, &audit, &config.tmdb.web_base_url);
    let mut tmdb = TmdbClient::new(&config.tmdb);

    let mut notified = store.load()?;
    info!("{} ids already notified", notified.len());

    let mut summary = RunSummary::default();
    match mode {
        RunMode::TopRated => {
            // Both passes share one set, so an id sent as a movie is skipped as a show.
            for kind in [ContentKind::Movie, ContentKind::Tv] {
                top_rated_pass(kind, &mut tmdb, &notifier, &store, &mut notified, &mut summary).await?;
            }
        }
        RunMode::Latest => latest_pass(&mut tmdb, &notifier, &store, &mut notified, &mut summary).await?,
    }

    info!(
        "Run finished: {} fetched, {} sent, {} already notified, {} without poster, {} failed",
        summary.fetched,
        summary.report.sent,
        summary.report.already_notified,
        summary.report.missing_poster,
        summary.report.failed
    );
    Ok(summary)
}

async fn top_rated_pass(
    kind: ContentKind,
    tmdb: &mut TmdbClient,
    notifier: &Notifier<'_>,
    store: &NotifiedStore,
    notified: &mut NotifiedSet,
    summary: &mut RunSummary,
) -> Result<()> {
    info!("Fetching top {} for the week...", kind.plural_label());
    let items = tmdb.fetch_top_rated(kind).await;

    if items.is_empty() {
        info!("No top {} found", kind.plural_label());
        return Ok(());
    }

    info!("Found {} top {}, sending notifications", items.len(), kind.plural_label());
    summary.fetched += items.len();
    let report = notifier.notify(&items, notified, CaptionStyle::TopRated(kind)).await;
    summary.report.merge(report);

    store.save(notified)?;
    Ok(())
}

async fn latest_pass(
    tmdb: &mut TmdbClient,
    notifier: &Notifier<'_>,
    store: &NotifiedStore,
    notified: &mut NotifiedSet,
    summary: &mut RunSummary,
) -> Result<()> {
    info!("Fetching latest movie and TV show...");
    let mut items = Vec::new();
    for kind in [ContentKind::Movie, ContentKind::Tv] {
        if let Some(item) = tmdb.fetch_latest(kind).await {
            items.push(item);
        }
    }

    if items.is_empty() {
        info!("No latest content found");
        return Ok(());
    }

    summary.fetched += items.len();
    let report = notifier.notify(&items, notified, CaptionStyle::Latest).await;
    summary.report.merge(report);

    store.save(notified)?;
    Ok(())
}
