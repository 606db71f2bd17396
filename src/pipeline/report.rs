// file: src/pipeline/report.rs
// description: terminal per-cycle outcomes and their tagged log lines

use crate::models::TimeWindow;
use crate::platform::ImportStats;
use crate::utils::logging::{format_error, format_info, format_ok, format_warning};
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Imported { stats: ImportStats, label: String },
    /// The window legitimately held no feed items.
    EmptyWindow { label: String },
    /// Items arrived but none matched a known wrapper shape.
    UnrecognizedShape {
        raw_items: usize,
        preview: String,
        label: String,
    },
    AllAttemptsFailed { last_error: String },
    /// Bundles imported before the failure stay committed.
    ImportFailed {
        bundles_committed: usize,
        error: String,
    },
}

impl CycleOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            CycleOutcome::AllAttemptsFailed { .. } | CycleOutcome::ImportFailed { .. }
        )
    }

    pub fn summary(&self) -> String {
        match self {
            CycleOutcome::Imported { stats, label } => format!(
                "Imported {} bundle(s), {} object(s) using {}",
                stats.bundles, stats.objects, label
            ),
            CycleOutcome::EmptyWindow { label } => {
                format!("No feed items in window using {}", label)
            }
            CycleOutcome::UnrecognizedShape {
                raw_items,
                preview,
                label,
            } => format!(
                "No STIX objects found in {} item(s) using {}. First item preview:\n{}",
                raw_items, label, preview
            ),
            CycleOutcome::AllAttemptsFailed { last_error } => {
                format!("All attempts failed: {}", last_error)
            }
            CycleOutcome::ImportFailed {
                bundles_committed,
                error,
            } => format!(
                "Import stopped after {} committed bundle(s): {}",
                bundles_committed, error
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CycleReport {
    pub window: TimeWindow,
    pub attempts: usize,
    pub duration: Duration,
    pub outcome: CycleOutcome,
}

impl CycleReport {
    pub fn log(&self) {
        let span = format!(
            "window {} .. {}, {} attempt(s), {:.2}s",
            self.window.start_param(),
            self.window.end_param(),
            self.attempts,
            self.duration.as_secs_f64()
        );

        match &self.outcome {
            CycleOutcome::Imported { .. } => info!("[OK] {} ({})", self.outcome.summary(), span),
            CycleOutcome::EmptyWindow { .. } => {
                info!("[INFO] {} ({})", self.outcome.summary(), span)
            }
            CycleOutcome::UnrecognizedShape { .. } => {
                warn!("[WARN] {} ({})", self.outcome.summary(), span)
            }
            CycleOutcome::AllAttemptsFailed { .. } | CycleOutcome::ImportFailed { .. } => {
                error!("[ERROR] {} ({})", self.outcome.summary(), span)
            }
        }
    }

    /// Tagged, colored one-shot rendering for interactive use.
    pub fn render(&self) -> String {
        let summary = self.outcome.summary();
        match &self.outcome {
            CycleOutcome::Imported { .. } => format_ok(&summary),
            CycleOutcome::EmptyWindow { .. } => format_info(&summary),
            CycleOutcome::UnrecognizedShape { .. } => format_warning(&summary),
            CycleOutcome::AllAttemptsFailed { .. } | CycleOutcome::ImportFailed { .. } => {
                format_error(&summary)
            }
        }
    }
}
