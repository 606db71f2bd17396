// file: src/feed/fetcher.rs
// description: resilient JSON GET against the feed API with bounded exponential backoff
// reference: https://docs.rs/reqwest

use crate::config::FeedConfig;
use crate::error::{ConnectorError, Result};
use crate::models::Page;
use crate::utils::Validator;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const FEEDS_PATH: &str = "/v3.0/threatintel/feeds";
pub const FILTER_DEFINITION_PATH: &str = "/v3.0/threatintel/feeds/filterDefinition";

const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];
const MAX_ERROR_BODY_CHARS: usize = 1000;

pub type Header = (String, String);
pub type QueryParam = (String, String);

/// Status, content type and body of a single HTTP exchange.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: String,
    pub body: String,
}

/// Issues exactly one GET per call. Network-level failures must surface as
/// `ConnectorError::TransientHttp` so the fetcher can back off.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(
        &self,
        url: &str,
        headers: &[Header],
        params: Option<&[QueryParam]>,
    ) -> Result<RawResponse>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConnectorError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        headers: &[Header],
        params: Option<&[QueryParam]>,
    ) -> Result<RawResponse> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(params) = params {
            request = request.query(params);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_builder() {
                ConnectorError::Request(e.to_string())
            } else {
                ConnectorError::TransientHttp(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response
            .text()
            .await
            .map_err(|e| ConnectorError::TransientHttp(format!("Failed to read body: {}", e)))?;

        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
            max_delay,
        }
    }

    pub fn from_config(feed: &FeedConfig) -> Self {
        Self::new(
            feed.max_attempts,
            Duration::from_secs(feed.backoff_initial_secs),
            Duration::from_secs(feed.backoff_cap_secs),
        )
    }

    pub fn next_delay(&self, current: Duration) -> Duration {
        (current * 2).min(self.max_delay)
    }

    /// Sleeps taken between attempts when every attempt fails.
    pub fn delays(&self) -> Vec<Duration> {
        let mut delays = Vec::new();
        let mut delay = self.initial_delay;
        for _ in 1..self.max_attempts {
            delays.push(delay);
            delay = self.next_delay(delay);
        }
        delays
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(1), Duration::from_secs(16))
    }
}

/// Process-wide feed credentials and endpoint root, built once at startup.
#[derive(Clone)]
pub struct FeedSession {
    api_root: String,
    api_key: String,
}

impl FeedSession {
    pub fn new(api_root: &str, api_key: &str) -> Self {
        Self {
            api_root: api_root.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn feeds_url(&self) -> String {
        format!("{}{}", self.api_root, FEEDS_PATH)
    }

    pub fn filter_definition_url(&self) -> String {
        format!("{}{}", self.api_root, FILTER_DEFINITION_PATH)
    }

    fn base_headers(&self) -> Vec<Header> {
        vec![(
            "Authorization".to_string(),
            format!("Bearer {}", self.api_key),
        )]
    }
}

impl std::fmt::Debug for FeedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedSession")
            .field("api_root", &self.api_root)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

pub struct Fetcher {
    transport: Arc<dyn Transport>,
    session: FeedSession,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn Transport>, session: FeedSession, policy: RetryPolicy) -> Self {
        Self {
            transport,
            session,
            policy,
        }
    }

    pub fn session(&self) -> &FeedSession {
        &self.session
    }

    pub async fn fetch(
        &self,
        url: &str,
        headers: &[Header],
        params: Option<&[QueryParam]>,
    ) -> Result<Value> {
        let mut request_headers = self.session.base_headers();
        request_headers.extend_from_slice(headers);

        let mut delay = self.policy.initial_delay;
        let mut last_error: Option<ConnectorError> = None;

        for attempt in 1..=self.policy.max_attempts {
            let result = match self.transport.get(url, &request_headers, params).await {
                Ok(response) => {
                    debug!(
                        "[HTTP] GET {} {} CT={}",
                        response.status, url, response.content_type
                    );
                    interpret_response(response)
                }
                Err(e) => Err(e),
            };

            match result {
                Ok(payload) => return Ok(payload),
                Err(e) if e.is_retryable() => {
                    warn!(
                        "Attempt {}/{} for {} failed: {}",
                        attempt, self.policy.max_attempts, url, e
                    );
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }

            if attempt < self.policy.max_attempts {
                debug!("Backing off for {:?}", delay);
                tokio::time::sleep(delay).await;
                delay = self.policy.next_delay(delay);
            }
        }

        Err(ConnectorError::MaxRetriesExceeded {
            attempts: self.policy.max_attempts,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown error".to_string()),
        })
    }
}

fn interpret_response(response: RawResponse) -> Result<Value> {
    let status = response.status;

    if status == 204 {
        return Ok(Page::empty_payload());
    }

    if (200..300).contains(&status) {
        if !is_json_content_type(&response.content_type) {
            return Err(ConnectorError::UnexpectedContentType(response.content_type));
        }
        return serde_json::from_str(&response.body).map_err(|e| {
            ConnectorError::InvalidPayload(format!(
                "{} (body starts with: {})",
                e,
                Validator::truncate_text(&response.body, 200)
            ))
        });
    }

    if RETRYABLE_STATUSES.contains(&status) {
        return Err(ConnectorError::TransientHttp(format!("HTTP {}", status)));
    }

    Err(ConnectorError::HttpStatus {
        status,
        body: Validator::truncate_text(&response.body, MAX_ERROR_BODY_CHARS),
    })
}

fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}
