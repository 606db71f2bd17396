// file: src/feed/filter.rs
// description: contextual filter header resolution (configured, defaults, or discovered)

use crate::config::FeedConfig;
use crate::feed::fetcher::{Fetcher, Header};
use serde_json::Value;
use tracing::{debug, warn};

pub const FILTER_HEADER: &str = "TMV1-Contextual-Filter";

const NO_SPECIFIED_PREFIX: &str = "no specified";
const DISCOVERED_DIMENSIONS: [&str; 2] = ["location", "industry"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum FilterSource {
    /// Fixed for the life of the process.
    Static(String),
    /// Asked of the feed every cycle; `fallback` is used when discovery fails.
    Discover { fallback: String },
}

#[derive(Debug, Clone)]
pub struct FilterResolver {
    source: FilterSource,
}

impl FilterResolver {
    pub fn from_config(feed: &FeedConfig) -> Self {
        let configured = feed.contextual_filter.trim();
        let source = if !configured.is_empty() {
            FilterSource::Static(configured.to_string())
        } else if feed.discover_filter {
            FilterSource::Discover {
                fallback: defaults_predicate(&feed.location, &feed.industry),
            }
        } else {
            FilterSource::Static(defaults_predicate(&feed.location, &feed.industry))
        };

        Self { source }
    }

    pub async fn resolve(&self, fetcher: &Fetcher) -> String {
        match &self.source {
            FilterSource::Static(filter) => filter.clone(),
            FilterSource::Discover { fallback } => {
                let url = fetcher.session().filter_definition_url();
                match fetcher.fetch(&url, &[], None).await {
                    Ok(definition) => match discovered_predicate(&definition) {
                        Some(filter) => {
                            debug!("Discovered contextual filter: {}", filter);
                            filter
                        }
                        None => {
                            warn!(
                                "[WARN] Filter definition has no 'No specified' values; using defaults"
                            );
                            fallback.clone()
                        }
                    },
                    Err(e) => {
                        warn!("[WARN] Filter discovery failed ({}); using defaults", e);
                        fallback.clone()
                    }
                }
            }
        }
    }
}

pub fn filter_header(filter: &str) -> Header {
    (FILTER_HEADER.to_string(), filter.to_string())
}

pub fn defaults_predicate(location: &str, industry: &str) -> String {
    format!(
        "(location eq {} or location eq 'No specified locations') and industry eq {}",
        quote(location),
        quote(industry)
    )
}

/// Picks, per dimension, the first allowed value following the
/// "No specified ..." convention and joins the equalities with `and`.
pub fn discovered_predicate(definition: &Value) -> Option<String> {
    let object = definition.as_object()?;

    let clauses: Vec<String> = DISCOVERED_DIMENSIONS
        .iter()
        .filter_map(|dimension| {
            let allowed = object
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(dimension))
                .and_then(|(_, values)| values.as_array())?;

            allowed
                .iter()
                .filter_map(Value::as_str)
                .find(|value| value.to_lowercase().starts_with(NO_SPECIFIED_PREFIX))
                .map(|value| format!("{} eq {}", dimension, quote(value)))
        })
        .collect();

    if clauses.is_empty() {
        None
    } else {
        Some(clauses.join(" and "))
    }
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
