//! Listing → detail pipeline
//!
//! The listing worker walks the paginated index and extracts one link list
//! per page. Each list is handed to a consumer task, which runs a detail
//! worker over those links with the spell strategy. Both stages share one
//! abort handle.

use crate::config::Config;
use crate::loader::{LoaderSettings, PageLoader};
use crate::model::{LinkList, SpellRecord};
use crate::notify::Notifier;
use crate::pipeline::handoff::{self, HandOffReceiver};
use crate::strategy::{LinkListStrategy, SpellStrategy};
use crate::worker::{ParseFailurePolicy, ParserWorker, RetryPolicy, RunReport, WorkerHandle};
use crate::{ConfigError, Result};
use serde::Serialize;
use std::sync::Arc;
use url::Url;

/// Reports of both stages
#[derive(Debug, Clone, Serialize)]
pub struct TwoStageReport {
    pub listing: RunReport,
    /// One report per link list, in the order the lists were produced
    pub details: Vec<RunReport>,
}

impl TwoStageReport {
    pub fn links_found(&self) -> u32 {
        self.listing.records_emitted
    }

    pub fn records_emitted(&self) -> u32 {
        self.details.iter().map(|r| r.records_emitted).sum()
    }

    /// Pages skipped across both stages
    pub fn pages_skipped(&self) -> u32 {
        self.listing.pages_skipped() + self.details.iter().map(RunReport::pages_skipped).sum::<u32>()
    }

    pub fn is_aborted(&self) -> bool {
        self.listing.is_aborted() || self.details.iter().any(RunReport::is_aborted)
    }
}

/// Everything the consumer task needs to build detail workers
struct DetailStage {
    base_url: Url,
    strategy: Arc<SpellStrategy>,
    loader: Arc<dyn PageLoader>,
    notifier: Arc<dyn Notifier<SpellRecord>>,
    retry: RetryPolicy,
    parse_failure: ParseFailurePolicy,
    handle: WorkerHandle,
}

pub struct TwoStagePipeline {
    listing: LoaderSettings,
    links: Arc<LinkListStrategy>,
    list_notifier: Arc<dyn Notifier<LinkList>>,
    capacity: Option<usize>,
    detail: DetailStage,
}

impl TwoStagePipeline {
    /// Builds both stages from configuration
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `loader` - Page loader shared by both stages
    /// * `list_notifier` - Receives every link list from the listing stage
    /// * `record_notifier` - Receives every spell record from the detail stage
    pub fn from_config(
        config: &Config,
        loader: Arc<dyn PageLoader>,
        list_notifier: Arc<dyn Notifier<LinkList>>,
        record_notifier: Arc<dyn Notifier<SpellRecord>>,
    ) -> Result<Self> {
        let base_url = Url::parse(&config.detail.base_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("detail base URL '{}': {}", config.detail.base_url, e))
        })?;

        Ok(Self {
            listing: LoaderSettings::from_listing(&config.listing)?,
            links: Arc::new(LinkListStrategy::from_config(&config.selectors)?),
            list_notifier,
            capacity: config.pipeline.capacity(),
            detail: DetailStage {
                base_url,
                strategy: Arc::new(SpellStrategy::new(&config.selectors)?),
                loader,
                notifier: record_notifier,
                retry: RetryPolicy::from_config(&config.retry),
                parse_failure: config.pipeline.parse_failure,
                handle: WorkerHandle::new(),
            },
        })
    }

    /// Overrides the retry policy of both stages
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.detail.retry = retry;
        self
    }

    /// Handle that aborts both stages
    pub fn handle(&self) -> WorkerHandle {
        self.detail.handle.clone()
    }

    /// Runs both stages to completion or abort
    pub async fn run(self) -> Result<TwoStageReport> {
        let (tx, rx) = handoff::channel(self.capacity);
        tracing::info!(
            "Starting pipeline: {} listing pages, hand-off queue {}",
            self.listing.len(),
            self.capacity
                .map_or_else(|| "unbounded".to_string(), |c| format!("bounded at {}", c))
        );

        let mut listing = ParserWorker::new(
            "listing",
            self.listing,
            self.links,
            self.detail.loader.clone(),
            self.list_notifier,
        )
        .with_retry(self.detail.retry.clone())
        .with_parse_failure(self.detail.parse_failure)
        .with_hand_off(tx)
        .with_handle(self.detail.handle.clone());

        let producer = tokio::spawn(async move { listing.start().await });
        let consumer = tokio::spawn(consume(rx, self.detail));

        let (listing, details) = tokio::join!(producer, consumer);
        let report = TwoStageReport {
            listing: listing??,
            details: details??,
        };

        tracing::info!(
            "Pipeline finished: {} link lists, {} records, {} pages skipped",
            report.links_found(),
            report.records_emitted(),
            report.pages_skipped()
        );

        Ok(report)
    }
}

async fn consume(mut queue: HandOffReceiver<LinkList>, stage: DetailStage) -> Result<Vec<RunReport>> {
    let mut reports = Vec::new();
    let mut batch = 0usize;

    while let Some(links) = queue.recv().await {
        if stage.handle.is_aborted() {
            break;
        }

        batch += 1;
        let Some(settings) = detail_settings(&stage.base_url, &links) else {
            tracing::debug!("Link list {} has no usable links", batch);
            continue;
        };

        let mut worker = ParserWorker::new(
            format!("detail-{}", batch),
            settings,
            stage.strategy.clone(),
            stage.loader.clone(),
            stage.notifier.clone(),
        )
        .with_retry(stage.retry.clone())
        .with_parse_failure(stage.parse_failure)
        .with_handle(stage.handle.clone());

        reports.push(worker.start().await?);

        if stage.handle.is_aborted() {
            break;
        }
    }

    // Closing releases a producer blocked on a full queue
    queue.close();
    let mut discarded = 0usize;
    while queue.recv().await.is_some() {
        discarded += 1;
    }
    if discarded > 0 {
        tracing::info!("Discarded {} queued link lists after abort", discarded);
    }

    Ok(reports)
}

/// Turns listing links into detail-stage settings
///
/// Links are resolved against `base_url`; each becomes an identifier relative
/// to the site root, so `/spells/alarm` is requested as
/// `{origin}/spells/alarm`. Links to other sites, and links that resolve
/// to the site root (`""`, `"#top"`, `"/"`), are dropped.
pub fn detail_settings(base_url: &Url, links: &[String]) -> Option<LoaderSettings> {
    let origin = base_url.origin();
    let mut identifiers = Vec::with_capacity(links.len());

    for link in links {
        match base_url.join(link) {
            Ok(url) if url.origin() == origin => {
                let mut identifier = url.path().trim_start_matches('/').to_string();
                if let Some(query) = url.query() {
                    identifier.push('?');
                    identifier.push_str(query);
                }
                if identifier.is_empty() {
                    tracing::debug!("Skipping link '{}' to the site root", link);
                    continue;
                }
                identifiers.push(identifier);
            }
            Ok(url) => tracing::warn!("Skipping off-site link {}", url),
            Err(e) => tracing::warn!("Skipping unresolvable link '{}': {}", link, e),
        }
    }

    LoaderSettings::from_identifiers(origin.ascii_serialization(), identifiers)
}
