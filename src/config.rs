// file: src/config.rs
// description: application configuration management with toml and environment support
// reference: https://docs.rs/config

use crate::error::{ConnectorError, Result};
use crate::models::ResponseFormat;
use crate::utils::Validator;
use chrono::Utc;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Flat environment variables the connector has always been deployed with,
/// mapped onto their nested configuration keys.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("OPENCTI_URL", "platform.url"),
    ("OPENCTI_TOKEN", "platform.token"),
    ("TV1_API_ROOT", "feed.api_root"),
    ("TV1_API_KEY", "feed.api_key"),
    ("TV1_CONTEXTUAL_FILTER", "feed.contextual_filter"),
    ("TV1_LOCATION", "feed.location"),
    ("TV1_INDUSTRY", "feed.industry"),
    ("RESPONSE_FORMAT", "feed.response_format"),
    ("TOP_REPORT", "feed.top_report"),
    ("POLL_MINUTES", "polling.poll_minutes"),
    ("SLEEP_SECONDS", "polling.sleep_seconds"),
    ("DEBUG", "polling.debug"),
];

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub feed: FeedConfig,
    pub platform: PlatformConfig,
    pub polling: PollingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedConfig {
    pub api_root: String,
    pub api_key: String,
    pub response_format: ResponseFormat,
    #[serde(default)]
    pub fallback_formats: Vec<ResponseFormat>,
    pub top_report: u32,
    #[serde(default)]
    pub fallback_page_sizes: Vec<u32>,
    #[serde(default)]
    pub contextual_filter: String,
    pub location: String,
    pub industry: String,
    #[serde(default)]
    pub discover_filter: bool,
    pub request_timeout_secs: u64,
    pub max_attempts: u32,
    pub backoff_initial_secs: u64,
    pub backoff_cap_secs: u64,
    pub max_pages: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformMode {
    Http,
    Directory,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlatformConfig {
    pub mode: PlatformMode,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub token: String,
    pub ingest_path: String,
    pub output_dir: PathBuf,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollingConfig {
    pub poll_minutes: u64,
    pub sleep_seconds: u64,
    pub max_objects_per_bundle: usize,
    #[serde(default)]
    pub debug: bool,
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = Self::load_unvalidated(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Merges every configuration source without checking required values,
    /// so callers can adjust the result before validating it.
    pub fn load_unvalidated(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));

        let defaults = config::Config::try_from(&Self::default_config())
            .map_err(|e| ConnectorError::Config(e.to_string()))?;

        let mut builder = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix("TV1_CONNECTOR")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        for (var, key) in LEGACY_ENV {
            let value = std::env::var(var).ok().filter(|v| !v.trim().is_empty());
            builder = builder
                .set_override_option(*key, value)
                .map_err(|e| ConnectorError::Config(e.to_string()))?;
        }

        let settings = builder
            .build()
            .map_err(|e| ConnectorError::Config(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| ConnectorError::Config(e.to_string()))
    }

    pub fn default_config() -> Self {
        Self {
            feed: FeedConfig {
                api_root: "https://api.eu.xdr.trendmicro.com".to_string(),
                api_key: String::new(),
                response_format: ResponseFormat::TaxiiEnvelope,
                fallback_formats: vec![ResponseFormat::StixBundle],
                top_report: 100,
                fallback_page_sizes: vec![200, 100, 50, 25, 10],
                contextual_filter: String::new(),
                location: "No specified locations".to_string(),
                industry: "No specified industries".to_string(),
                discover_filter: false,
                request_timeout_secs: 60,
                max_attempts: 5,
                backoff_initial_secs: 1,
                backoff_cap_secs: 16,
                max_pages: 1000,
            },
            platform: PlatformConfig {
                mode: PlatformMode::Http,
                url: String::new(),
                token: String::new(),
                ingest_path: "/import/stix-bundle".to_string(),
                output_dir: PathBuf::from("./bundles"),
                request_timeout_secs: 120,
            },
            polling: PollingConfig {
                poll_minutes: 60,
                sleep_seconds: 900,
                max_objects_per_bundle: 5000,
                debug: false,
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();

        if self.feed.api_key.trim().is_empty() {
            missing.push("feed.api_key".to_string());
        }

        if self.platform.mode == PlatformMode::Http {
            if self.platform.url.trim().is_empty() {
                missing.push("platform.url".to_string());
            }
            if self.platform.token.trim().is_empty() {
                missing.push("platform.token".to_string());
            }
        }

        if !missing.is_empty() {
            return Err(ConnectorError::ConfigMissing(missing));
        }

        Validator::validate_url(&self.feed.api_root)?;
        if self.platform.mode == PlatformMode::Http {
            Validator::validate_url(&self.platform.url)?;
        }

        Validator::validate_bundle_size(self.polling.max_objects_per_bundle)?;

        if self.feed.top_report == 0 || self.feed.fallback_page_sizes.contains(&0) {
            return Err(ConnectorError::Config(
                "page sizes must be greater than 0".to_string(),
            ));
        }

        if self.feed.max_attempts == 0 {
            return Err(ConnectorError::Config(
                "max_attempts must be greater than 0".to_string(),
            ));
        }

        if self.feed.max_pages == 0 {
            return Err(ConnectorError::Config(
                "max_pages must be greater than 0".to_string(),
            ));
        }

        if self.polling.poll_minutes == 0 {
            return Err(ConnectorError::Config(
                "poll_minutes must be greater than 0".to_string(),
            ));
        }
        self.poll_interval()?;

        if i64::try_from(self.polling.sleep_seconds)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .is_none()
        {
            return Err(ConnectorError::Config(format!(
                "sleep_seconds {} is out of range",
                self.polling.sleep_seconds
            )));
        }

        Ok(())
    }

    /// Window length. Fails when the window start would not be representable.
    pub fn poll_interval(&self) -> Result<chrono::Duration> {
        let minutes = self.polling.poll_minutes;
        i64::try_from(minutes)
            .ok()
            .and_then(chrono::Duration::try_minutes)
            .filter(|interval| Utc::now().checked_sub_signed(*interval).is_some())
            .ok_or_else(|| {
                ConnectorError::Config(format!("poll_minutes {} is out of range", minutes))
            })
    }

    pub fn sleep_interval(&self) -> Duration {
        Duration::from_secs(self.polling.sleep_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
