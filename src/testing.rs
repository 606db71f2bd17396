// file: src/testing.rs
// description: scripted feed transport and recording import collaborator for unit tests

use crate::error::{ConnectorError, Result};
use crate::feed::{Header, QueryParam, RawResponse, Transport};
use crate::models::StixBundle;
use crate::platform::BundleImporter;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub url: String,
    pub headers: Vec<Header>,
    pub params: Option<Vec<QueryParam>>,
}

impl RecordedRequest {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .as_ref()?
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Replays canned responses in order and records every request it sees.
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<RawResponse>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<RawResponse>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(
        &self,
        url: &str,
        headers: &[Header],
        params: Option<&[QueryParam]>,
    ) -> Result<RawResponse> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            headers: headers.to_vec(),
            params: params.map(|p| p.to_vec()),
        });

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ConnectorError::Request("script exhausted".to_string())))
    }
}

pub fn json_response(body: Value) -> Result<RawResponse> {
    Ok(RawResponse {
        status: 200,
        content_type: "application/json".to_string(),
        body: body.to_string(),
    })
}

pub fn status_response(status: u16, body: &str) -> Result<RawResponse> {
    Ok(RawResponse {
        status,
        content_type: "text/plain".to_string(),
        body: body.to_string(),
    })
}

/// Accepts bundles until `fail_on` (1-based) is reached.
#[derive(Default)]
pub struct RecordingImporter {
    imported: Mutex<Vec<(StixBundle, bool)>>,
    fail_on: Option<usize>,
}

impl RecordingImporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(call: usize) -> Self {
        Self {
            imported: Mutex::new(Vec::new()),
            fail_on: Some(call),
        }
    }

    pub fn imported(&self) -> Vec<(StixBundle, bool)> {
        self.imported.lock().unwrap().clone()
    }
}

#[async_trait]
impl BundleImporter for RecordingImporter {
    async fn import_bundle(&self, bundle: &StixBundle, update: bool) -> Result<()> {
        let mut imported = self.imported.lock().unwrap();
        if self.fail_on == Some(imported.len() + 1) {
            return Err(ConnectorError::Request("platform unavailable".to_string()));
        }
        imported.push((bundle.clone(), update));
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Answers exactly one HTTP request on a loopback port with `status` and
/// `body`. Returns the base URL and a handle yielding the raw request text.
pub async fn serve_once(status: u16, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {} Canned\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request
    });

    (base_url, handle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let content_length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}
