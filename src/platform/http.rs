// file: src/platform/http.rs
// description: pushes bundles to the graph platform's bundle-ingest endpoint over HTTP
// reference: https://docs.rs/reqwest

use crate::config::PlatformConfig;
use crate::error::{ConnectorError, Result};
use crate::models::StixBundle;
use crate::platform::importer::BundleImporter;
use crate::utils::Validator;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct IngestRequest<'a> {
    bundle: &'a StixBundle,
    update: bool,
}

pub struct HttpBundleImporter {
    client: Client,
    endpoint: String,
    token: String,
}

impl HttpBundleImporter {
    pub fn new(config: &PlatformConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ConnectorError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: ingest_endpoint(&config.url, &config.ingest_path),
            token: config.token.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl BundleImporter for HttpBundleImporter {
    async fn import_bundle(&self, bundle: &StixBundle, update: bool) -> Result<()> {
        debug!(
            "Posting {} ({} objects) to {}",
            bundle.id(),
            bundle.object_count(),
            self.endpoint
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.token))
            .json(&IngestRequest { bundle, update })
            .send()
            .await
            .map_err(|e| ConnectorError::TransientHttp(format!("Failed to send bundle: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ConnectorError::HttpStatus {
                status,
                body: Validator::truncate_text(&body, 1000),
            });
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "platform"
    }
}

fn ingest_endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
