//! JSON-over-HTTP transport to a single node endpoint.
//!
//! # Responsibilities
//! - POST a JSON body to an RPC path and hand back status + JSON body
//! - Map connection failures, timeouts and unparsable 2xx bodies to `Network`
//! - Keep the endpoint's own path prefix in front of every RPC path
//!
//! Classifying non-2xx replies into rejections or not-found is left to the
//! caller, so that the same logic runs against real and scripted transports.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::blockchain::types::{ChainError, ChainResult};

/// Raw reply from the node.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcReply {
    pub status: u16,
    pub body: Value,
}

impl RpcReply {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A request/response channel to a node.
///
/// Each call is one independent round trip; implementations hold no
/// per-request state.
pub trait RpcTransport: Send + Sync {
    /// POST `body` to `path` (e.g. `/v1/chain/get_info`).
    fn post(&self, path: &str, body: Value) -> impl Future<Output = ChainResult<RpcReply>> + Send;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport for `endpoint`.
    ///
    /// Fails with `ChainError::Config` if the URL is not http(s).
    pub fn new(endpoint: &str, timeout: Duration) -> ChainResult<Self> {
        let base_url: Url = endpoint
            .parse()
            .map_err(|e| ChainError::Config(format!("Invalid endpoint URL '{}': {}", endpoint, e)))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ChainError::Config(format!(
                "Unsupported endpoint scheme '{}'",
                base_url.scheme()
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChainError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `path` appended to the endpoint, keeping any path prefix the
    /// endpoint already has (e.g. `http://host/eos/` + `/v1/chain/get_info`).
    pub fn endpoint_for(&self, path: &str) -> ChainResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ChainError::Config(format!("Endpoint '{}' cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(path.trim_start_matches('/').split('/'));
        Ok(url)
    }
}

impl RpcTransport for HttpTransport {
    async fn post(&self, path: &str, body: Value) -> ChainResult<RpcReply> {
        let url = self.endpoint_for(path)?;

        let resp = self.client.post(url).json(&body).send().await.map_err(|e| {
            if e.is_timeout() {
                ChainError::Network(format!(
                    "{} timed out after {} seconds",
                    path,
                    self.timeout.as_secs()
                ))
            } else {
                ChainError::Network(format!("{} failed: {}", path, e))
            }
        })?;

        let status = resp.status().as_u16();
        let text = resp
            .text()
            .await
            .map_err(|e| ChainError::Network(format!("{} body read failed: {}", path, e)))?;

        let body = match serde_json::from_str::<Value>(&text) {
            Ok(body) => body,
            // Error pages from proxies are often plain text; the status
            // still decides how the reply is classified.
            Err(_) if !(200..300).contains(&status) => Value::String(text),
            Err(e) => {
                return Err(ChainError::Network(format!(
                    "Malformed response from {} (status {}): {}",
                    path, status, e
                )))
            }
        };

        Ok(RpcReply { status, body })
    }
}
