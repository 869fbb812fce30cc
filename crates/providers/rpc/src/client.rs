//! Single-request JSON-RPC client.

use crate::RpcError;
use alloy_json_rpc::{RpcRecv, RpcSend};
use alloy_rpc_client::RpcClient as AlloyRpcClient;
use alloy_transport::IntoBoxTransport;
use alloy_transport_http::Http;
use std::{borrow::Cow, time::Duration};
use tracing::{debug, trace};
use url::Url;

/// Default per-request timeout for HTTP endpoints.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// Sends JSON-RPC 2.0 requests to one endpoint.
///
/// Cloning is cheap; clones share the underlying connection pool. Calls are independent of
/// one another and may run concurrently.
#[derive(Debug, Clone)]
pub struct RpcClient {
    inner: AlloyRpcClient,
    endpoint: String,
}

impl RpcClient {
    /// Wraps an existing transport. `endpoint` only labels log lines.
    pub fn new(transport: impl IntoBoxTransport, endpoint: impl Into<String>) -> Self {
        Self { inner: AlloyRpcClient::new(transport, false), endpoint: endpoint.into() }
    }

    /// Connects to an HTTP endpoint with a per-request timeout.
    pub fn http(url: &str, timeout: Duration) -> Result<Self, RpcError> {
        let parsed =
            Url::parse(url).map_err(|err| RpcError::InvalidEndpoint(format!("{url}: {err}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RpcError::InvalidEndpoint(format!("{url}: unsupported scheme")));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| RpcError::InvalidEndpoint(format!("{url}: {err}")))?;
        let transport = Http::with_client(client, parsed);
        let is_local = transport.guess_local();
        Ok(Self {
            inner: AlloyRpcClient::new(transport, is_local),
            endpoint: url.to_string(),
        })
    }

    /// The endpoint this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends one request and decodes its result.
    ///
    /// A transport failure surfaces as [`RpcError::Transport`] and an error envelope as
    /// [`RpcError::Protocol`] carrying the node's message. Nothing is retried here.
    pub async fn call<P, R>(&self, method: &'static str, params: P) -> Result<R, RpcError>
    where
        P: RpcSend,
        R: RpcRecv,
    {
        trace!(target: "rpc::client", endpoint = %self.endpoint, method, "Sending request");
        self.inner.request::<P, R>(Cow::Borrowed(method), params).await.map_err(|err| {
            let err = RpcError::from(err);
            debug!(
                target: "rpc::client",
                endpoint = %self.endpoint,
                method,
                %err,
                "Request failed"
            );
            err
        })
    }
}
