//! JSON-RPC 2.0 over HTTP(S).

use crate::ports::{RpcChannel, RpcError, SChainRpc};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorObject {
    code: i64,
    #[serde(default)]
    message: String,
}

/// Channel factory backed by a shared `reqwest` client.
#[derive(Clone)]
pub struct HttpSChainRpc {
    client: Client,
}

impl HttpSChainRpc {
    /// Build a factory whose requests time out after `request_timeout`.
    pub fn new(request_timeout: Duration) -> Result<Self, RpcError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(request_timeout.min(Duration::from_secs(5)))
            .build()
            .map_err(|e| RpcError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SChainRpc for HttpSChainRpc {
    async fn connect(&self, endpoint: &str) -> Result<Arc<dyn RpcChannel>, RpcError> {
        let url = Url::parse(endpoint)
            .map_err(|e| RpcError::Transport(format!("invalid endpoint {}: {}", endpoint, e)))?;
        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(RpcError::Transport(format!(
                    "unsupported scheme {} in {}",
                    other, endpoint
                )))
            }
        }
        Ok(Arc::new(HttpRpcChannel {
            client: self.client.clone(),
            url,
            next_id: AtomicU64::new(1),
        }))
    }
}

/// One HTTP JSON-RPC endpoint.
pub struct HttpRpcChannel {
    client: Client,
    url: Url,
    next_id: AtomicU64,
}

#[async_trait]
impl RpcChannel for HttpRpcChannel {
    async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        trace!(url = %self.url, method, "[ima-01] JSON-RPC call");

        let response = self
            .client
            .post(self.url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Transport(format!("HTTP status {}", status)));
        }

        let body: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| RpcError::InvalidResponse(e.to_string()))?;

        if let Some(error) = body.error {
            return Err(RpcError::Remote {
                code: error.code,
                message: error.message,
            });
        }
        Ok(body.result.unwrap_or(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_rejects_invalid_endpoint() {
        let rpc = HttpSChainRpc::new(DEFAULT_REQUEST_TIMEOUT).unwrap();
        let err = rpc.connect("not a url").await.err().unwrap();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_connect_rejects_unsupported_scheme() {
        let rpc = HttpSChainRpc::new(DEFAULT_REQUEST_TIMEOUT).unwrap();
        let err = rpc.connect("ftp://10.0.0.1:2231").await.err().unwrap();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[tokio::test]
    async fn test_connect_accepts_http_endpoint() {
        let rpc = HttpSChainRpc::new(DEFAULT_REQUEST_TIMEOUT).unwrap();
        assert!(rpc.connect("http://127.0.0.1:2231").await.is_ok());
    }

    #[test]
    fn test_null_result_is_not_an_error() {
        let body: JsonRpcResponse =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":null}"#).unwrap();
        assert!(body.error.is_none());
        assert!(body.result.is_none());
    }
}
