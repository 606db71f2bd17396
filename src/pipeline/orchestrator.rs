// file: src/pipeline/orchestrator.rs
// description: drives one fetch, normalize, package, import cycle across the fallback ladder
// reference: sequential polling workflow

use crate::config::Config;
use crate::error::{ConnectorError, Result};
use crate::feed::{
    FeedSession, Fetcher, FilterResolver, PaginationCollector, QueryParam, ReqwestTransport,
    RetryPolicy, Transport, filter_header,
};
use crate::models::{FallbackLadder, LadderEntry, TimeWindow};
use crate::pipeline::report::{CycleOutcome, CycleReport};
use crate::platform::{BundleImporter, ImportDispatcher};
use crate::stix::{BundlePackager, ShapeNormalizer};
use crate::utils::Validator;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, info, warn};

const PREVIEW_CHARS: usize = 800;

pub struct PollingOrchestrator {
    config: Config,
    poll_interval: chrono::Duration,
    fetcher: Fetcher,
    filter: FilterResolver,
    ladder: FallbackLadder,
    normalizer: ShapeNormalizer,
    packager: BundlePackager,
    importer: Arc<dyn BundleImporter>,
}

impl PollingOrchestrator {
    pub fn new(
        config: Config,
        transport: Arc<dyn Transport>,
        importer: Arc<dyn BundleImporter>,
    ) -> Result<Self> {
        let poll_interval = config.poll_interval()?;
        let session = FeedSession::new(&config.feed.api_root, &config.feed.api_key);
        Ok(Self {
            poll_interval,
            fetcher: Fetcher::new(transport, session, RetryPolicy::from_config(&config.feed)),
            filter: FilterResolver::from_config(&config.feed),
            ladder: FallbackLadder::from_config(&config.feed),
            normalizer: ShapeNormalizer::new(),
            packager: BundlePackager::new(config.polling.max_objects_per_bundle),
            importer,
            config,
        })
    }

    pub fn from_config(config: Config, importer: Arc<dyn BundleImporter>) -> Result<Self> {
        let transport = ReqwestTransport::new(Duration::from_secs(config.feed.request_timeout_secs))?;
        Self::new(config, Arc::new(transport), importer)
    }

    pub fn ladder(&self) -> &FallbackLadder {
        &self.ladder
    }

    pub async fn resolve_filter(&self) -> String {
        self.filter.resolve(&self.fetcher).await
    }

    /// Runs cycles separated by `sleep_interval` until `shutdown` flips to
    /// true. A cycle in flight always completes; only the sleep is cut short.
    /// Returns the number of cycles run.
    pub async fn run_until_shutdown(
        &self,
        sleep_interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> usize {
        let mut cycles = 0;

        loop {
            self.run_cycle().await.log();
            cycles += 1;

            if *shutdown.borrow_and_update() {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(sleep_interval) => {}
                Ok(()) = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        cycles
    }

    pub async fn run_cycle(&self) -> CycleReport {
        self.run_cycle_at(Utc::now()).await
    }

    /// One full cycle for the window ending at `now`. Never fails: every
    /// per-cycle error is folded into the report's outcome.
    pub async fn run_cycle_at(&self, now: DateTime<Utc>) -> CycleReport {
        let started = Instant::now();
        let window = TimeWindow::ending_at(now, self.poll_interval);

        let filter = self.resolve_filter().await;
        let headers = vec![filter_header(&filter)];
        let base_url = self.fetcher.session().feeds_url();
        let collector = PaginationCollector::new(&self.fetcher, self.config.feed.max_pages);

        let mut attempts = 0;
        let mut last_error: Option<ConnectorError> = None;

        for entry in self.ladder.entries() {
            attempts += 1;
            let label = entry.label();
            let params = request_params(&window, entry);
            debug!("Trying: {} | params={:?}", label, params);

            let raw_items = match collector.collect_all(&base_url, &headers, &params).await {
                Ok(items) => items,
                Err(e) => {
                    warn!("Attempt failed ({}): {}", label, e);
                    last_error = Some(e);
                    continue;
                }
            };

            let outcome = self.process_items(raw_items, label).await;
            return CycleReport {
                window,
                attempts,
                duration: started.elapsed(),
                outcome,
            };
        }

        CycleReport {
            window,
            attempts,
            duration: started.elapsed(),
            outcome: CycleOutcome::AllAttemptsFailed {
                last_error: last_error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "no ladder entries configured".to_string()),
            },
        }
    }

    async fn process_items(&self, raw_items: Vec<Value>, label: String) -> CycleOutcome {
        let Some(first) = raw_items.first() else {
            return CycleOutcome::EmptyWindow { label };
        };

        let raw_count = raw_items.len();
        let preview = Validator::preview_json(first, PREVIEW_CHARS);

        let objects = self.normalizer.flatten_objects(raw_items);
        if objects.is_empty() {
            return CycleOutcome::UnrecognizedShape {
                raw_items: raw_count,
                preview,
                label,
            };
        }

        let bundles = self.packager.package_bundles(objects);
        info!(
            "Packaged {} raw item(s) into {} bundle(s) of at most {} objects",
            raw_count,
            bundles.len(),
            self.packager.max_objects()
        );

        match ImportDispatcher::new(self.importer.as_ref())
            .import_all(&bundles)
            .await
        {
            Ok(stats) => CycleOutcome::Imported { stats, label },
            Err(ConnectorError::Import {
                bundles_committed,
                message,
            }) => CycleOutcome::ImportFailed {
                bundles_committed,
                error: message,
            },
            Err(e) => CycleOutcome::ImportFailed {
                bundles_committed: 0,
                error: e.to_string(),
            },
        }
    }
}

fn request_params(window: &TimeWindow, entry: &LadderEntry) -> Vec<QueryParam> {
    vec![
        (
            "responseObjectFormat".to_string(),
            entry.format.as_str().to_string(),
        ),
        ("startDateTime".to_string(), window.start_param()),
        ("endDateTime".to_string(), window.end_param()),
        ("topReport".to_string(), entry.top_report.to_string()),
    ]
}
